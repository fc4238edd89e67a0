//! Implementation of `fastfood build` and `fastfood gen`.
//!
//! Both apply stencils to a cookbook: render the stencil's files and
//! partials, then merge its `dependencies` into `metadata.rb` and its
//! `berks_dependencies` into the `Berksfile`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::cookbook::CookBook;
use crate::core::dialect::{BERKSFILE, METADATA};
use crate::core::manifest::Manifest;
use crate::core::pack::TemplatePack;
use crate::ops::manifest_update::{update_manifest, UpdateReport};
use crate::ops::render::{ensure_cookbook_dir, template_context, FileEvent, RunLog, WriteMode};
use crate::templating;
use crate::util::fs;

/// A `fastfood.json` build file.
///
/// ```json
/// { "name": "web",
///   "stencils": [ { "stencil_set": "utility", "stencil": "default", "name": "nginx" } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildConfig {
    /// Cookbook name
    pub name: String,

    /// Stencils to apply, in order
    #[serde(default)]
    pub stencils: Vec<StencilRequest>,
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse build config: {}", path.display()))
    }
}

/// One stencil to apply. Keys other than `stencil_set` and `stencil` are
/// stencil options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StencilRequest {
    pub stencil_set: String,

    /// Stencil within the set; the set's `default_stencil` when absent
    #[serde(default)]
    pub stencil: Option<String>,

    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Result of applying one or more stencils.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub cookbook: PathBuf,
    pub files: Vec<FileEvent>,
    pub manifest_updates: Vec<UpdateReport>,
}

impl BuildReport {
    /// Files written, in order, without repeats.
    pub fn written_files(&self) -> Vec<&Path> {
        let mut written: Vec<&Path> = Vec::new();
        for event in self.files.iter().filter(|e| e.is_written()) {
            if !written.contains(&event.path.as_path()) {
                written.push(&event.path);
            }
        }
        written
    }
}

/// Build a cookbook from a `fastfood.json` file.
///
/// Creates `<cookbooks_home>/<name>` when missing, then applies every
/// listed stencil in order.
pub fn build_cookbook(
    config_path: &Path,
    pack: &TemplatePack,
    cookbooks_home: &Path,
    force: bool,
) -> Result<BuildReport> {
    let config = BuildConfig::load(config_path)?;
    let cookbook = ensure_cookbook_dir(cookbooks_home, &config.name)?;

    let mut log = RunLog::new();
    let mut manifest_updates = Vec::new();
    for request in &config.stencils {
        let updates = apply_stencil(pack, &cookbook, &config.name, request, force, &mut log)
            .with_context(|| format!("failed to apply stencil set `{}`", request.stencil_set))?;
        manifest_updates.extend(updates);
    }

    Ok(BuildReport {
        cookbook,
        files: log.into_events(),
        manifest_updates,
    })
}

/// Apply one stencil to an existing cookbook.
pub fn generate(
    pack: &TemplatePack,
    cookbook_path: &Path,
    request: &StencilRequest,
    force: bool,
) -> Result<BuildReport> {
    let cookbook = CookBook::open(cookbook_path)?;
    let name = cookbook.name();

    let mut log = RunLog::new();
    let manifest_updates = apply_stencil(pack, cookbook.path(), &name, request, force, &mut log)?;

    Ok(BuildReport {
        cookbook: cookbook.path().to_path_buf(),
        files: log.into_events(),
        manifest_updates,
    })
}

/// Render a stencil into `cookbook_dir` and merge its requirements.
///
/// `cookbook_name` is used for templates when the cookbook has no
/// `metadata.rb` yet. The stencil option `force` has the same effect as
/// the `force` argument.
pub fn apply_stencil(
    pack: &TemplatePack,
    cookbook_dir: &Path,
    cookbook_name: &str,
    request: &StencilRequest,
    force: bool,
    log: &mut RunLog,
) -> Result<Vec<UpdateReport>> {
    let set = pack.load_stencil_set(&request.stencil_set)?;
    let stencil_name = set.select(request.stencil.as_deref())?;
    let stencil = set.stencil(stencil_name, &request.options)?;
    let force = force || stencil.force();
    info!("applying stencil {}::{}", set.name(), stencil.name);

    let context = template_context(cookbook_dir, cookbook_name, &stencil.options);
    let files = render_table(set.path(), &stencil.files, &context)?;
    let partials = render_table(set.path(), &stencil.partials, &context)?;

    for (target, content) in &files {
        log.write(&cookbook_dir.join(target), content, WriteMode::Write, force)?;
    }
    for (target, content) in &partials {
        log.write(&cookbook_dir.join(target), content, WriteMode::Append, force)?;
    }

    let metadata = Manifest::from_dependencies(&METADATA, &stencil.dependencies)?;
    let berks = Manifest::from_dependencies(&BERKSFILE, &stencil.berks_dependencies)?;
    debug!(
        "stencil requires {} metadata and {} Berksfile dependencies",
        metadata.dependency_names(METADATA.dependency_keyword).len(),
        berks.dependency_names(BERKSFILE.dependency_keyword).len()
    );

    Ok(vec![
        update_manifest(&cookbook_dir.join(METADATA.file_name), &METADATA, &metadata)?,
        update_manifest(&cookbook_dir.join(BERKSFILE.file_name), &BERKSFILE, &berks)?,
    ])
}

/// Render `target -> template` pairs; templates are relative to the set.
fn render_table(
    set_dir: &Path,
    table: &std::collections::BTreeMap<String, String>,
    context: &Value,
) -> Result<Vec<(String, String)>> {
    table
        .iter()
        .map(|(target, template)| {
            let content = templating::render_file(&set_dir.join(template), context)?;
            Ok((target.clone(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManifestError;
    use crate::ops::fastfood_new::{new_cookbook, NewOptions};
    use crate::ops::render::FileAction;
    use crate::test_support::PackFixture;
    use serde_json::json;
    use tempfile::TempDir;

    struct Setup {
        tmp: TempDir,
        pack: TemplatePack,
        home: PathBuf,
    }

    fn setup() -> Setup {
        let tmp = TempDir::new().unwrap();
        let pack = TemplatePack::open(&PackFixture::write(tmp.path())).unwrap();
        let home = tmp.path().join("cookbooks");
        std::fs::create_dir(&home).unwrap();
        Setup { tmp, pack, home }
    }

    fn new_web(s: &Setup) -> PathBuf {
        let opts = NewOptions {
            name: "web".into(),
            force: false,
        };
        new_cookbook(&s.pack, &s.home, &opts).unwrap().cookbook
    }

    fn request(set: &str, options: Value) -> StencilRequest {
        StencilRequest {
            stencil_set: set.into(),
            stencil: None,
            options: options.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_build_config_options() {
        let config: BuildConfig = serde_json::from_value(json!({
            "name": "web",
            "stencils": [
                {"stencil_set": "utility", "stencil": "deploy_guard", "name": "guard"},
                {"stencil_set": "newrelic"}
            ]
        }))
        .unwrap();

        assert_eq!(config.stencils[0].stencil.as_deref(), Some("deploy_guard"));
        assert_eq!(config.stencils[0].options["name"], "guard");
        assert!(!config.stencils[0].options.contains_key("stencil_set"));
        assert!(config.stencils[1].options.is_empty());
    }

    #[test]
    fn test_generate_renders_and_merges() {
        let s = setup();
        let cookbook = new_web(&s);

        let report = generate(&s.pack, &cookbook, &request("utility", json!({"name": "nginx"})), false)
            .unwrap();

        let recipe = std::fs::read_to_string(cookbook.join("recipes/nginx.rb")).unwrap();
        assert_eq!(recipe, "# web::nginx\nlog 'open for everyone'\n");
        let attrs = std::fs::read_to_string(cookbook.join("attributes/default.rb")).unwrap();
        assert_eq!(attrs, "default['web']['nginx'] = true\n");

        let book = CookBook::open(&cookbook).unwrap();
        let metadata = book.metadata().unwrap();
        assert!(metadata.has_dependency("depends", "sudo"));
        assert_eq!(metadata.dependency("depends", "users").unwrap()["constraint"], ">= 1.0");
        assert!(book.berksfile().unwrap().has_dependency("cookbook", "users"));
        assert_eq!(report.manifest_updates.len(), 2);
        assert!(report.manifest_updates.iter().all(|u| u.changed));
    }

    #[test]
    fn test_generate_twice_is_stable() {
        let s = setup();
        let cookbook = new_web(&s);
        let req = request("utility", json!({"name": "nginx"}));

        generate(&s.pack, &cookbook, &req, false).unwrap();
        let metadata = std::fs::read_to_string(cookbook.join("metadata.rb")).unwrap();
        let berksfile = std::fs::read_to_string(cookbook.join("Berksfile")).unwrap();

        let report = generate(&s.pack, &cookbook, &req, false).unwrap();
        assert!(report.written_files().is_empty());
        assert!(report.manifest_updates.iter().all(|u| !u.changed));
        assert_eq!(std::fs::read_to_string(cookbook.join("metadata.rb")).unwrap(), metadata);
        assert_eq!(std::fs::read_to_string(cookbook.join("Berksfile")).unwrap(), berksfile);
    }

    #[test]
    fn test_force_option_overwrites() {
        let s = setup();
        let cookbook = new_web(&s);
        std::fs::write(cookbook.join("recipes/newrelic.rb"), "custom\n").unwrap();

        let report = generate(&s.pack, &cookbook, &request("newrelic", json!({})), false).unwrap();
        assert_eq!(report.files[0].action, FileAction::SkippedExisting);

        let report =
            generate(&s.pack, &cookbook, &request("newrelic", json!({"force": true})), false)
                .unwrap();
        assert_eq!(report.files[0].action, FileAction::Overwritten);
        assert_eq!(
            std::fs::read_to_string(cookbook.join("recipes/newrelic.rb")).unwrap(),
            "include_recipe 'newrelic'\n"
        );
    }

    #[test]
    fn test_build_cookbook_from_config() {
        let s = setup();
        new_web(&s);
        let config = s.tmp.path().join("fastfood.json");
        std::fs::write(
            &config,
            json!({
                "name": "web",
                "stencils": [
                    {"stencil_set": "utility", "stencil": "deploy_guard"},
                    {"stencil_set": "utility", "name": "extra"},
                    {"stencil_set": "newrelic"}
                ]
            })
            .to_string(),
        )
        .unwrap();

        let report = build_cookbook(&config, &s.pack, &s.home, false).unwrap();
        let cookbook = s.home.join("web");
        assert_eq!(report.cookbook, cookbook);
        assert!(cookbook.join("recipes/deploy_guard.rb").is_file());
        assert!(cookbook.join("recipes/extra.rb").is_file());
        assert!(cookbook.join("recipes/newrelic.rb").is_file());

        // Partials from both utility stencils land in the same file.
        let attrs = std::fs::read_to_string(cookbook.join("attributes/default.rb")).unwrap();
        assert_eq!(
            attrs,
            "default['web']['default'] = true\ndefault['web']['extra'] = true\n"
        );

        let metadata = CookBook::open(&cookbook).unwrap().metadata().unwrap();
        for dep in ["apt", "cron", "sudo", "users", "newrelic"] {
            assert!(metadata.has_dependency("depends", dep), "missing {dep}");
        }
    }

    #[test]
    fn test_vocabulary_error_from_stencil() {
        let s = setup();
        let cookbook = new_web(&s);
        let berksfile = std::fs::read_to_string(cookbook.join("Berksfile")).unwrap();

        let err = generate(&s.pack, &cookbook, &request("broken", json!({})), false).unwrap_err();
        let manifest_err = err.downcast_ref::<ManifestError>().unwrap();
        assert!(manifest_err.is_vocabulary_error());
        assert_eq!(std::fs::read_to_string(cookbook.join("Berksfile")).unwrap(), berksfile);
    }

    #[test]
    fn test_generate_requires_cookbook() {
        let s = setup();
        let err = generate(&s.pack, &s.home.join("nope"), &request("utility", json!({})), false)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
