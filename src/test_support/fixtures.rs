//! Test fixtures for common test scenarios.
//!
//! Declaration file texts taken from real cookbooks, and a small template
//! pack that can be written into a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

/// Berksfile with comments, a constraint and mixed attribute spacing.
pub const FIRST_BERKS: &str = "
source 'https://supermarket.getchef.com'

cookbook 'newrelic_plugins', git: 'git@github.com:rackspace-cookbooks/newrelic_plugins_chef.git'
cookbook 'disable_ipv6', path: 'test/fixtures/cookbooks/disable_ipv6'
cookbook 'wrapper', path: 'test/fixtures/cookbooks/wrapper'
cookbook 'apt'

# until https://github.com/elasticsearch/cookbook-elasticsearch/pull/230
cookbook 'elasticsearch', '~> 0.3', git:'git@github.com:racker/cookbook-elasticsearch.git'

# until https://github.com/lusis/chef-logstash/pull/336 & 394
cookbook 'logstash', git:'git@github.com:racker/chef-logstash.git'

metadata
";

/// Berksfile overlapping [`FIRST_BERKS`] on some cookbooks.
pub const SECOND_BERKS: &str = "
source \"https://supermarket.chef.io\"

metadata

cookbook 'cron', git: 'git@github.com:rackspace-cookbooks/cron.git'
# until https://github.com/elastic/cookbook-elasticsearch/pull/230

cookbook 'disable_ipv6', path: 'test/fixtures/cookbooks/disable_ipv6'
cookbook 'wrapper', path: 'test/fixtures/cookbooks/wrapper'
cookbook 'yum'

cookbook 'fake', '~> 9.1'
";

/// metadata.rb with tabs, comments and repeated `supports`.
pub const METADATA_RB: &str = "name 'test_cookbook'
maintainer 'Rackspace'
maintainer_email 'rackspace-cookbooks@rackspace.com'
license 'Apache 2.0'
description 'Installs/Configures test_cookbook'
version\t'0.1.0'

# platforms
supports 'ubuntu'
supports 'centos'

depends 'apt'
depends 'mysql', '>= 5.0'
";

/// Write a cookbook directory with the given declaration files.
pub fn write_cookbook(
    home: &Path,
    name: &str,
    metadata: &str,
    berksfile: Option<&str>,
) -> PathBuf {
    let path = home.join(name);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("metadata.rb"), metadata).unwrap();
    if let Some(berks) = berksfile {
        fs::write(path.join("Berksfile"), berks).unwrap();
    }
    path
}

/// A template pack with `utility` and `newrelic` stencil sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackFixture;

impl PackFixture {
    /// Write the pack under `dir` and return its root.
    pub fn write(dir: &Path) -> PathBuf {
        let root = dir.join("templatepack");

        write_json(
            &root.join("manifest.json"),
            &json!({
                "api": 1,
                "base": {
                    "files": ["metadata.rb", "Berksfile", "README.md"],
                    "directories": ["recipes", "attributes"]
                },
                "stencil_sets": {"utility": {}, "newrelic": {}, "broken": {}}
            }),
        );

        write_file(
            &root.join("base/metadata.rb"),
            "name '|{ cookbook.name }|'
maintainer 'Rackspace'
license 'Apache 2.0'
description 'Installs/Configures |{ cookbook.name }|'
version '0.1.0'

depends 'apt'
",
        );
        write_file(
            &root.join("base/Berksfile"),
            "source 'https://supermarket.chef.io'

metadata

cookbook 'apt'
",
        );
        write_file(
            &root.join("base/README.md"),
            "# |{ cookbook.name }|\n\nCopyright |{ cookbook.year }|\n",
        );

        let utility = root.join("stencils/utility");
        write_json(
            &utility.join("manifest.json"),
            &json!({
                "api": 1,
                "default_stencil": "default",
                "options": {
                    "name": {"help": "Recipe name", "default": "default"},
                    "openfor": {"help": "Who the recipe is open for", "default": "everyone"}
                },
                "files": {"recipes/<NAME>.rb": "templates/recipe.rb"},
                "partials": {"attributes/default.rb": "templates/attributes.rb"},
                "dependencies": {"sudo": null, "users": [">= 1.0"]},
                "berks_dependencies": {
                    "users": {"git": "git@github.com:opscode-cookbooks/users.git"}
                },
                "stencils": {
                    "default": {},
                    "deploy_guard": {
                        "files": {"recipes/deploy_guard.rb": "templates/deploy_guard.rb"},
                        "dependencies": {"cron": null}
                    }
                }
            }),
        );
        write_file(
            &utility.join("templates/recipe.rb"),
            "# |{ cookbook.name }|::|{ options.name }|\nlog 'open for |{ options.openfor }|'\n",
        );
        write_file(
            &utility.join("templates/deploy_guard.rb"),
            "# |{ cookbook.name }|::deploy_guard\n",
        );
        write_file(
            &utility.join("templates/attributes.rb"),
            "default['|{ cookbook.name }|']['|{ options.name }|'] = true\n",
        );

        let newrelic = root.join("stencils/newrelic");
        write_json(
            &newrelic.join("manifest.json"),
            &json!({
                "api": 1,
                "default_stencil": "default",
                "files": {"recipes/newrelic.rb": "templates/newrelic.rb"},
                "dependencies": {"newrelic": ["~> 2.0"]},
                "berks_dependencies": {"newrelic": null},
                "stencils": {"default": {}}
            }),
        );
        write_file(
            &newrelic.join("templates/newrelic.rb"),
            "include_recipe 'newrelic'\n",
        );

        // Listed in the pack but declares an attribute Berkshelf doesn't know.
        let broken = root.join("stencils/broken");
        write_json(
            &broken.join("manifest.json"),
            &json!({
                "api": 1,
                "default_stencil": "default",
                "berks_dependencies": {"thing": {"github": "someone/thing"}},
                "stencils": {"default": {}}
            }),
        );

        root
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_json(path: &Path, value: &serde_json::Value) {
    write_file(path, &serde_json::to_string_pretty(value).unwrap());
}
