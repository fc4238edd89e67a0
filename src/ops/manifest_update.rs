//! Merging requirements into declaration files on disk.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::dialect::Dialect;
use crate::core::manifest::Manifest;
use crate::engine::{self, ManifestError};
use crate::util::fs;

/// What `update_manifest` did to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub path: PathBuf,

    /// Statements inserted, in file order.
    pub statements: Vec<String>,

    /// Names and list values that were already declared.
    pub skipped: Vec<String>,

    pub changed: bool,
}

impl UpdateReport {
    fn unchanged(path: &Path) -> Self {
        UpdateReport {
            path: path.to_path_buf(),
            statements: Vec::new(),
            skipped: Vec::new(),
            changed: false,
        }
    }
}

/// Read a declaration file.
///
/// Fails with `MissingFile` or `Unreadable` before any parsing happens.
pub fn read_declarations(path: &Path) -> Result<String, ManifestError> {
    if !path.is_file() {
        return Err(ManifestError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a declaration file.
pub fn load_manifest(path: &Path, dialect: &Dialect) -> Result<Manifest, ManifestError> {
    let text = read_declarations(path)?;
    Manifest::parse(&text, dialect).map_err(|e| e.with_path(path))
}

/// Merge `incoming` into the file at `path`.
///
/// The file is rewritten only when statements were inserted. An empty
/// `incoming` manifest leaves the file alone and does not require it to
/// exist.
pub fn update_manifest(
    path: &Path,
    dialect: &Dialect,
    incoming: &Manifest,
) -> Result<UpdateReport> {
    if incoming.is_empty() {
        debug!("nothing to merge into {}", path.display());
        return Ok(UpdateReport::unchanged(path));
    }

    let text = read_declarations(path)?;
    let update = engine::update_text(&text, dialect, incoming).map_err(|e| e.with_path(path))?;

    for name in &update.skipped {
        debug!("{}: `{}` already declared", path.display(), name);
    }

    if update.changed {
        fs::write_string(path, &update.content)?;
        info!(
            "merged {} statement(s) into {}",
            update.inserted.len(),
            path.display()
        );
    } else {
        debug!("{} is up to date", path.display());
    }

    Ok(UpdateReport {
        path: path.to_path_buf(),
        statements: update.inserted,
        skipped: update.skipped,
        changed: update.changed,
    })
}
