//! Manifest engine error types and diagnostics.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Where a declaration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Origin {
    /// Text handed to the parser directly.
    #[default]
    Input,
    /// Requirements built programmatically (stencil manifests).
    Requirements,
    /// A file on disk.
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Input => f.write_str("<input>"),
            Origin::Requirements => f.write_str("stencil requirements"),
            Origin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Position of an offending declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub origin: Origin,
    /// 1-based line number in the parsed text.
    pub line_number: Option<usize>,
    pub line: Option<String>,
}

impl Location {
    pub fn line(line_number: usize, line: impl Into<String>) -> Self {
        Location {
            origin: Origin::Input,
            line_number: Some(line_number),
            line: Some(line.into()),
        }
    }

    pub fn requirements() -> Self {
        Location {
            origin: Origin::Requirements,
            line_number: None,
            line: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        if let Some(n) = self.line_number {
            write!(f, ":{}", n)?;
        }
        if let Some(ref line) = self.line {
            write!(f, ": `{}`", line)?;
        }
        Ok(())
    }
}

/// Error raised while reading, parsing or building a manifest.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ManifestError {
    #[error("required file not found: {}", path.display())]
    #[diagnostic(code(fastfood::manifest::missing_file))]
    MissingFile { path: PathBuf },

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(fastfood::manifest::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown attribute `{attribute}` for {keyword} `{name}` at {location}")]
    #[diagnostic(code(fastfood::manifest::unknown_attribute))]
    UnknownAttribute {
        location: Location,
        keyword: String,
        name: String,
        attribute: String,
        allowed: &'static [&'static str],
    },

    #[error("malformed {keyword} declaration `{name}` at {location}: {reason}")]
    #[diagnostic(code(fastfood::manifest::malformed))]
    MalformedAttribute {
        location: Location,
        keyword: String,
        name: String,
        reason: String,
    },

    #[error("{keyword} `{name}`: expected {expected}, found {found}")]
    #[diagnostic(code(fastfood::manifest::shape))]
    Shape {
        keyword: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ManifestError {
    /// Attach the file path to a parse error raised from in-memory text.
    pub fn with_path(mut self, path: &Path) -> Self {
        match &mut self {
            ManifestError::UnknownAttribute { location, .. }
            | ManifestError::MalformedAttribute { location, .. } => {
                location.origin = Origin::File(path.to_path_buf());
            }
            _ => {}
        }
        self
    }

    /// Check if this error comes from the attribute vocabulary check.
    pub fn is_vocabulary_error(&self) -> bool {
        matches!(self, ManifestError::UnknownAttribute { .. })
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ManifestError::MissingFile { path } => {
                Diagnostic::error(format!("`{}` does not exist", path.display()))
                    .with_location(path)
                    .with_suggestion("Run `fastfood new <cookbook>` to create the cookbook skeleton")
            }
            ManifestError::Unreadable { path, source } => {
                Diagnostic::error(format!("could not read `{}`", path.display()))
                    .with_location(path)
                    .with_context(source.to_string())
            }
            ManifestError::UnknownAttribute {
                location,
                keyword,
                name,
                attribute,
                allowed,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "unknown attribute `{}` on {} `{}`",
                    attribute, keyword, name
                ))
                .with_context(location.to_string());

                if let Origin::File(ref path) = location.origin {
                    diag = diag.with_location(path);
                }

                if allowed.is_empty() {
                    diag = diag.with_suggestion(format!(
                        "`{}` lines only accept a name and a version constraint",
                        keyword
                    ));
                } else {
                    diag = diag.with_suggestion(format!(
                        "Use one of: {}",
                        allowed.join(", ")
                    ));
                }
                diag
            }
            ManifestError::MalformedAttribute {
                location,
                keyword,
                name,
                reason,
            } => Diagnostic::error(format!("malformed {} `{}`: {}", keyword, name, reason))
                .with_context(location.to_string())
                .with_suggestion("Write attributes as `key: 'value'`"),
            ManifestError::Shape {
                keyword,
                name,
                expected,
                found,
            } => Diagnostic::error(format!(
                "{} `{}` should be {}, not {}",
                keyword, name, expected, found
            ))
            .with_suggestion("Fix the stencil set manifest.json"),
        }
    }
}
