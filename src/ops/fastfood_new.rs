//! Implementation of `fastfood new`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Map;
use tracing::debug;

use crate::core::pack::TemplatePack;
use crate::ops::render::{ensure_cookbook_dir, template_context, FileEvent, RunLog, WriteMode};
use crate::templating;
use crate::util::fs;

/// Options for creating a new cookbook.
#[derive(Debug, Clone)]
pub struct NewOptions {
    /// Cookbook name
    pub name: String,

    /// Overwrite base files that already exist
    pub force: bool,
}

/// Result of `fastfood new`.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub cookbook: PathBuf,
    pub files: Vec<FileEvent>,
}

impl NewResult {
    /// Files actually written.
    pub fn written_files(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|e| e.is_written())
            .map(|e| e.path.as_path())
            .collect()
    }
}

/// Create `<cookbooks_home>/<name>` from the pack's base layout.
///
/// `cookbooks_home` must exist. Existing files are left alone unless
/// `force` is set.
pub fn new_cookbook(pack: &TemplatePack, cookbooks_home: &Path, opts: &NewOptions) -> Result<NewResult> {
    let cookbook = ensure_cookbook_dir(cookbooks_home, &opts.name)?;

    for dir in &pack.base().directories {
        debug!("creating dir {}", dir);
        fs::ensure_dir(&cookbook.join(dir))?;
    }

    let context = template_context(&cookbook, &opts.name, &Map::new());
    let templates: Vec<PathBuf> = pack
        .base()
        .files
        .iter()
        .map(|file| pack.base_template(file))
        .collect();
    let rendered = templating::render_templates(&templates, &context)?;

    let mut log = RunLog::new();
    for (file, (_, content)) in pack.base().files.iter().zip(rendered) {
        log.write(&cookbook.join(file), &content, WriteMode::Write, opts.force)?;
    }

    Ok(NewResult {
        cookbook,
        files: log.into_events(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cookbook::CookBook;
    use crate::ops::render::FileAction;
    use crate::test_support::PackFixture;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TemplatePack, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let pack = TemplatePack::open(&PackFixture::write(tmp.path())).unwrap();
        let home = tmp.path().join("cookbooks");
        std::fs::create_dir(&home).unwrap();
        (tmp, pack, home)
    }

    fn opts(name: &str, force: bool) -> NewOptions {
        NewOptions {
            name: name.to_string(),
            force,
        }
    }

    #[test]
    fn test_new_cookbook_writes_base_files() {
        let (_tmp, pack, home) = setup();
        let result = new_cookbook(&pack, &home, &opts("web", false)).unwrap();

        let mut written: Vec<String> = result
            .written_files()
            .iter()
            .map(|p| fs::display_relative(&result.cookbook, p))
            .collect();
        written.sort();
        assert_eq!(written, ["Berksfile", "README.md", "metadata.rb"]);
        assert!(result.cookbook.join("recipes").is_dir());
        assert!(result.cookbook.join("attributes").is_dir());

        let cookbook = CookBook::open(&result.cookbook).unwrap();
        assert_eq!(cookbook.name(), "web");
        assert!(cookbook.berksfile().unwrap().has_dependency("cookbook", "apt"));
    }

    #[test]
    fn test_new_cookbook_keeps_existing_files() {
        let (_tmp, pack, home) = setup();
        new_cookbook(&pack, &home, &opts("web", false)).unwrap();
        std::fs::write(home.join("web/README.md"), "mine\n").unwrap();

        let result = new_cookbook(&pack, &home, &opts("web", false)).unwrap();
        assert!(result
            .files
            .iter()
            .all(|e| e.action == FileAction::SkippedExisting));
        assert_eq!(std::fs::read_to_string(home.join("web/README.md")).unwrap(), "mine\n");

        let result = new_cookbook(&pack, &home, &opts("web", true)).unwrap();
        assert_eq!(result.written_files().len(), 3);
        assert!(std::fs::read_to_string(home.join("web/README.md"))
            .unwrap()
            .starts_with("# web"));
    }

    #[test]
    fn test_new_cookbook_requires_home() {
        let (tmp, pack, _home) = setup();
        let err = new_cookbook(&pack, &tmp.path().join("nowhere"), &opts("web", false)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
