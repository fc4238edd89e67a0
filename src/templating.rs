//! Template rendering with Tera.
//!
//! Stencil templates are mostly Ruby, where `{{ }}` shows up in ordinary
//! code, so template packs mark variables with `|{ ... }|` instead. Those
//! markers are rewritten to Tera's `{{ ... }}` before compiling; templates
//! already using `{{ }}` render unchanged.
//!
//! Templates see two variables: `cookbook` (the parsed metadata plus
//! `year`) and `options` (the stencil's resolved options).

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

const OPEN: &str = "|{";
const CLOSE: &str = "}|";

/// Error while loading or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read template {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template context must be an object")]
    Context(#[source] tera::Error),

    #[error("error rendering template {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

/// Rewrite `|{ expr }|` markers to `{{ expr }}`.
///
/// A `|{` without a matching `}|` is left alone.
pub fn translate_delimiters(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str("{{");
        out.push_str(&after_open[..end]);
        out.push_str("}}");
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Render template text. `path` is only used in error messages.
pub fn render_str(path: &Path, source: &str, context: &Value) -> Result<String, TemplateError> {
    let ctx = TeraContext::from_serialize(context).map_err(TemplateError::Context)?;
    let source = translate_delimiters(source);

    Tera::one_off(&source, &ctx, false).map_err(|e| TemplateError::Render {
        path: path.to_path_buf(),
        message: error_chain(&e),
    })
}

/// Render one template file.
pub fn render_file(path: &Path, context: &Value) -> Result<String, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    render_str(path, &source, context)
}

/// Render several template files, returning `(path, rendered)` pairs in
/// input order. Stops at the first failure.
pub fn render_templates<P: AsRef<Path>>(
    paths: &[P],
    context: &Value,
) -> Result<Vec<(PathBuf, String)>, TemplateError> {
    paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            render_file(p, context).map(|content| (p.to_path_buf(), content))
        })
        .collect()
}

fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
