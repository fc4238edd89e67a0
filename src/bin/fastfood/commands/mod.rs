//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::Result;

use fastfood::core::pack::TemplatePack;
use fastfood::ops::render::{FileAction, FileEvent};
use fastfood::ops::UpdateReport;
use fastfood::util::fs::display_relative;
use fastfood::util::{Settings, Shell, Status};

pub mod build;
pub mod completions;
pub mod gen;
pub mod inspect;
pub mod new;

/// Open the configured template pack.
pub fn open_pack(settings: &Settings) -> Result<TemplatePack> {
    Ok(TemplatePack::open(&settings.template_pack)?)
}

/// Resolve a cookbook argument.
///
/// A bare name (no path separator) that isn't a directory here is looked
/// up under the cookbooks directory. No argument means the current
/// directory.
pub fn resolve_cookbook(arg: Option<&Path>, settings: &Settings) -> PathBuf {
    match arg {
        None => PathBuf::from("."),
        Some(path) if path.is_dir() || path.components().count() > 1 => path.to_path_buf(),
        Some(name) => settings.cookbook_path.join(name),
    }
}

/// Print one status line per file event.
pub fn report_files(shell: &Shell, cookbook: &Path, files: &[FileEvent]) {
    for event in files {
        let path = display_relative(cookbook, &event.path);
        match event.action {
            FileAction::Created => shell.status(Status::Created, path),
            FileAction::Overwritten => shell.status(Status::Writing, path),
            FileAction::Appended => shell.status(Status::Appended, path),
            FileAction::SkippedExisting => {
                shell.status(Status::Skipped, format!("{} (already exists)", path))
            }
        }
    }
}

/// Print what each declaration file merge did.
pub fn report_updates(shell: &Shell, cookbook: &Path, updates: &[UpdateReport]) {
    for update in updates {
        let path = display_relative(cookbook, &update.path);
        if update.changed {
            shell.status(
                Status::Updated,
                format!("{} (+{})", path, update.statements.len()),
            );
            for statement in &update.statements {
                shell.verbose_status(Status::Info, statement.trim_end());
            }
        } else if !update.skipped.is_empty() {
            shell.status(Status::Fresh, path);
        }
        for name in &update.skipped {
            shell.verbose_status(Status::Skipped, format!("`{}` already declared", name));
        }
    }
}
