//! Declaration parsing.
//!
//! Each logical line is split into a keyword and the rest of the line, and
//! interpreted according to the dialect: bare keywords become flags, the
//! dependency keyword becomes an entry, list keywords append, and anything
//! else is a scalar. There is no grammar beyond that; lines the engine does
//! not understand still land somewhere harmless.

use crate::core::dialect::{Dialect, CONSTRAINT_KEY};
use crate::core::manifest::{Attributes, Manifest};
use crate::engine::errors::{Location, ManifestError};
use crate::engine::normalize::normalize_numbered;

/// One normalized line split at its first whitespace run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalLine<'a> {
    pub keyword: &'a str,
    pub rest: Option<&'a str>,
}

impl<'a> LogicalLine<'a> {
    pub fn split(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => {
                let rest = rest.trim_start();
                LogicalLine {
                    keyword,
                    rest: if rest.is_empty() { None } else { Some(rest) },
                }
            }
            None => LogicalLine {
                keyword: line,
                rest: None,
            },
        }
    }
}

/// Strip whitespace and Ruby string quoting from a scalar.
pub fn ruby_strip(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

/// Parse raw declaration text.
///
/// Error locations use line numbers in `text`.
pub fn parse(text: &str, dialect: &Dialect) -> Result<Manifest, ManifestError> {
    parse_numbered(normalize_numbered(text, dialect), dialect)
}

/// Parse already-normalized logical lines.
///
/// Error locations count positions in `lines`.
pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    dialect: &Dialect,
) -> Result<Manifest, ManifestError> {
    parse_numbered(
        lines.iter().enumerate().map(|(idx, line)| (idx + 1, line)),
        dialect,
    )
}

fn parse_numbered<I, S>(lines: I, dialect: &Dialect) -> Result<Manifest, ManifestError>
where
    I: IntoIterator<Item = (usize, S)>,
    S: AsRef<str>,
{
    let mut manifest = Manifest::new();

    for (line_number, raw) in lines {
        let raw = raw.as_ref();
        let logical = LogicalLine::split(raw);

        let Some(rest) = logical.rest else {
            manifest.flags.insert(logical.keyword.to_string());
            continue;
        };

        if dialect.is_dependency_keyword(logical.keyword) {
            let location = Location::line(line_number, raw);
            let (name, attrs) = parse_dependency(rest, dialect, &location)?;
            manifest
                .entries
                .entry(logical.keyword.to_string())
                .or_default()
                .insert(name, attrs);
        } else if dialect.is_list_keyword(logical.keyword) {
            manifest
                .lists
                .entry(logical.keyword.to_string())
                .or_default()
                .push(ruby_strip(rest));
        } else {
            manifest
                .scalars
                .insert(logical.keyword.to_string(), ruby_strip(rest));
        }
    }

    Ok(manifest)
}

/// Parse the part of a dependency line after its keyword.
fn parse_dependency(
    rest: &str,
    dialect: &Dialect,
    location: &Location,
) -> Result<(String, Attributes), ManifestError> {
    let mut tokens = rest.split(',');
    let name = ruby_strip(tokens.next().unwrap_or_default());
    if name.is_empty() {
        return Err(ManifestError::MalformedAttribute {
            location: location.clone(),
            keyword: dialect.dependency_keyword.to_string(),
            name,
            reason: "missing dependency name".to_string(),
        });
    }

    let tokens: Vec<&str> = tokens.collect();
    let attrs = parse_dependency_options(&name, &tokens, dialect, location)?;
    Ok((name, attrs))
}

/// Interpret the option tokens that follow a dependency name.
///
/// The first token is a version constraint unless it starts with a
/// vocabulary keyword; every other token must be `attribute: value` with the
/// attribute drawn from the dialect's vocabulary.
pub(crate) fn parse_dependency_options<S: AsRef<str>>(
    name: &str,
    tokens: &[S],
    dialect: &Dialect,
    location: &Location,
) -> Result<Attributes, ManifestError> {
    let mut attrs = Attributes::new();

    let mut tokens = tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !t.trim().is_empty())
        .peekable();

    if let Some(first) = tokens.peek() {
        let stripped = ruby_strip(first);
        if !dialect.starts_with_attribute(&stripped) {
            attrs.insert(CONSTRAINT_KEY.to_string(), stripped);
            tokens.next();
        }
    }

    for token in tokens {
        let Some((key, value)) = token.split_once(':') else {
            return Err(ManifestError::MalformedAttribute {
                location: location.clone(),
                keyword: dialect.dependency_keyword.to_string(),
                name: name.to_string(),
                reason: format!("expected `attribute: value`, found `{}`", token.trim()),
            });
        };

        let key = ruby_strip(key);
        if !dialect.is_attribute(&key) {
            return Err(ManifestError::UnknownAttribute {
                location: location.clone(),
                keyword: dialect.dependency_keyword.to_string(),
                name: name.to_string(),
                attribute: key,
                allowed: dialect.attributes,
            });
        }
        attrs.insert(key, ruby_strip(value));
    }

    Ok(attrs)
}
