//! Writing rendered templates into a cookbook.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::core::cookbook::CookBook;
use crate::util::fs;

/// How rendered content lands in its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file.
    Write,
    /// Add to the end of the file.
    Append,
}

/// What happened to one target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Created,
    Overwritten,
    Appended,
    /// Target existed and overwriting was not allowed.
    SkippedExisting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEvent {
    pub path: PathBuf,
    pub action: FileAction,
}

impl FileEvent {
    pub fn is_written(&self) -> bool {
        self.action != FileAction::SkippedExisting
    }
}

/// Files touched during one `new`, `build` or `gen` run.
///
/// A file written earlier in the same run may be written again without
/// `force`.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    events: Vec<FileEvent>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[FileEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<FileEvent> {
        self.events
    }

    /// Whether `path` was written earlier in this run.
    pub fn wrote(&self, path: &Path) -> bool {
        self.events.iter().any(|e| e.is_written() && e.path == path)
    }

    /// Write `content` to `target` unless it already exists and neither
    /// `force` nor an earlier write in this run allows it.
    pub fn write(
        &mut self,
        target: &Path,
        content: &str,
        mode: WriteMode,
        force: bool,
    ) -> Result<&FileEvent> {
        let exists = target.is_file();
        let action = if !exists {
            match mode {
                WriteMode::Write => FileAction::Created,
                WriteMode::Append => FileAction::Appended,
            }
        } else if force || self.wrote(target) {
            if force {
                warn!("forcing overwrite of existing file {}", target.display());
            } else {
                warn!("previous stencil has already written {}", target.display());
            }
            match mode {
                WriteMode::Write => FileAction::Overwritten,
                WriteMode::Append => FileAction::Appended,
            }
        } else {
            info!("skipping existing file {}", target.display());
            FileAction::SkippedExisting
        };

        match action {
            FileAction::SkippedExisting => {}
            FileAction::Appended => fs::append_string(target, content)?,
            FileAction::Created | FileAction::Overwritten => fs::write_string(target, content)?,
        }
        if action != FileAction::SkippedExisting {
            info!("writing rendered file {}", target.display());
        }

        self.events.push(FileEvent {
            path: target.to_path_buf(),
            action,
        });
        Ok(&self.events[self.events.len() - 1])
    }
}

/// Build the variables templates see.
///
/// `cookbook` is the parsed `metadata.rb` when the cookbook has one, or
/// just `{ "name": fallback_name }` before any metadata exists. Either way
/// it carries the current `year`.
pub fn template_context(
    cookbook_dir: &Path,
    fallback_name: &str,
    options: &Map<String, Value>,
) -> Value {
    let mut cookbook = CookBook::open(cookbook_dir)
        .ok()
        .and_then(|book| book.metadata().ok())
        .map(|metadata| metadata.to_json())
        .unwrap_or_else(|| json!({ "name": fallback_name }));

    if let Value::Object(map) = &mut cookbook {
        map.entry("name")
            .or_insert_with(|| Value::String(fallback_name.to_string()));
        map.insert("year".into(), json!(chrono::Local::now().year()));
    }

    json!({ "cookbook": cookbook, "options": options })
}

/// Create `<home>/<name>` if needed. `home` must already exist.
pub fn ensure_cookbook_dir(home: &Path, name: &str) -> Result<PathBuf> {
    let home = fs::normalize_path(home);
    if !home.is_dir() {
        anyhow::bail!("target cookbook dir {} does not exist", home.display());
    }

    let dir = home.join(name);
    if dir.is_dir() {
        info!("skipping existing directory {}", dir.display());
    } else {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}
