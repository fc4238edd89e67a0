//! A cookbook directory on disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::dialect::{BERKSFILE, METADATA};
use crate::core::manifest::Manifest;
use crate::engine::ManifestError;
use crate::ops::manifest_update::{load_manifest, update_manifest, UpdateReport};
use crate::util::diagnostic::suggestions;

/// Handle to a cookbook directory.
///
/// Holds paths only. `metadata()` and `berksfile()` parse the file each
/// time they are called, so they always reflect what is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookBook {
    path: PathBuf,
    name: String,
}

impl CookBook {
    /// Open an existing cookbook. The directory and its `metadata.rb` must
    /// exist.
    pub fn open(path: &Path) -> Result<Self> {
        let path = crate::util::fs::normalize_path(path);
        if !path.is_dir() {
            bail!(
                "cookbook directory {} does not exist\nhelp: {}",
                path.display(),
                suggestions::NO_COOKBOOK
            );
        }

        let metadata = path.join(METADATA.file_name);
        if !metadata.is_file() {
            bail!("cookbook needs {}: {}", METADATA.file_name, metadata.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(CookBook { path, name })
    }

    /// Cookbook name: the `name` declared in `metadata.rb`, falling back to
    /// the directory name.
    pub fn name(&self) -> String {
        self.metadata()
            .ok()
            .and_then(|m| m.scalar("name").map(str::to_string))
            .unwrap_or_else(|| self.name.clone())
    }

    /// Directory name.
    pub fn dir_name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA.file_name)
    }

    pub fn berksfile_path(&self) -> PathBuf {
        self.path.join(BERKSFILE.file_name)
    }

    /// Parse `metadata.rb`.
    pub fn metadata(&self) -> Result<Manifest, ManifestError> {
        load_manifest(&self.metadata_path(), &METADATA)
    }

    /// Parse the `Berksfile`. Fails with `MissingFile` if there is none.
    pub fn berksfile(&self) -> Result<Manifest, ManifestError> {
        load_manifest(&self.berksfile_path(), &BERKSFILE)
    }

    /// Merge requirements into `metadata.rb`.
    pub fn merge_metadata(&self, incoming: &Manifest) -> Result<UpdateReport> {
        update_manifest(&self.metadata_path(), &METADATA, incoming)
    }

    /// Merge requirements into the `Berksfile`.
    pub fn merge_berksfile(&self, incoming: &Manifest) -> Result<UpdateReport> {
        update_manifest(&self.berksfile_path(), &BERKSFILE, incoming)
    }
}
