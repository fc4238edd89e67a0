//! Dependency manifest engine.
//!
//! Pipeline for one declaration file:
//! 1. `normalize` - drop blanks and comments
//! 2. `parser` - logical lines into a [`Manifest`]
//! 3. `merger` - statements the incoming manifest adds
//! 4. `splice` - statements back into the original raw lines
//!
//! Everything here is pure; reading and writing files is the caller's job
//! (see `ops::manifest_update`).

pub mod errors;
pub mod merger;
pub mod normalize;
pub mod parser;
pub mod splice;

pub use errors::{Location, ManifestError, Origin};
pub use merger::{merge, MergePlan};
pub use normalize::{normalize_lines, normalize_numbered, normalize_text};
pub use parser::{parse, parse_lines, LogicalLine};
pub use splice::{splice, RawFile, SpliceOutcome};

use crate::core::dialect::Dialect;
use crate::core::manifest::Manifest;

/// Outcome of merging requirements into one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUpdate {
    /// New file content (equal to the input when nothing changed).
    pub content: String,

    /// Statements inserted into the file.
    pub inserted: Vec<String>,

    /// Dependency names and list values already present.
    pub skipped: Vec<String>,

    pub changed: bool,
}

/// Run parse, merge and splice over `text`.
pub fn update_text(
    text: &str,
    dialect: &Dialect,
    incoming: &Manifest,
) -> Result<TextUpdate, ManifestError> {
    let current = parse(text, dialect)?;
    let plan = merge(dialect, &current, incoming);

    let original = RawFile::from_text(text);
    let outcome = splice(&original, &plan.statements);

    Ok(TextUpdate {
        content: if outcome.changed {
            outcome.lines.to_text()
        } else {
            text.to_string()
        },
        inserted: outcome.inserted,
        skipped: plan.skipped,
        changed: outcome.changed,
    })
}
