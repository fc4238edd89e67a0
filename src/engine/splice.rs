//! Splicing new declarations into existing file text.
//!
//! New statements go right after the last existing line with the same
//! leading keyword, so `depends` lines stay with `depends` lines. Keywords
//! with no existing line are appended at the end of the file. Existing lines
//! are copied through byte for byte; the splicer only ever inserts.
//!
//! Keyword matching is a prefix heuristic on the trimmed line (keyword
//! followed by whitespace or end of line), not a grammar. That keeps it
//! working on hand-edited files the parser only partly understands.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

/// A file's lines exactly as stored, each with its own terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFile {
    lines: Vec<String>,
}

impl RawFile {
    /// Split text into lines, keeping line terminators.
    pub fn from_text(text: &str) -> Self {
        RawFile {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Build from lines that already carry their terminators.
    pub fn from_lines(lines: Vec<String>) -> Self {
        RawFile { lines }
    }

    /// Join the lines back into file content.
    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Result of a splice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOutcome {
    /// The new file lines.
    pub lines: RawFile,

    /// Statements that were actually inserted, in insertion order.
    pub inserted: Vec<String>,

    /// Whether `lines` differs from the original.
    pub changed: bool,
}

/// Where a group of statements goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Anchor {
    /// After the line with this original index.
    After(usize),
    EndOfFile,
}

/// Insert `statements` into `original`.
///
/// Statements are sorted and deduplicated first, and any statement whose
/// trimmed text already appears as a line of the file is dropped, which
/// makes repeated runs a no-op.
pub fn splice<S: AsRef<str>>(original: &RawFile, statements: &[S]) -> SpliceOutcome {
    let existing: BTreeSet<&str> = original.lines.iter().map(|l| l.trim()).collect();

    let pending: BTreeSet<&str> = statements
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .filter(|s| !existing.contains(s))
        .collect();

    if pending.is_empty() {
        return SpliceOutcome {
            lines: original.clone(),
            inserted: Vec::new(),
            changed: false,
        };
    }

    let anchors = resolve_anchors(original, pending.iter().map(|s| leading_keyword(s)));

    let mut by_anchor: BTreeMap<Anchor, Vec<&str>> = BTreeMap::new();
    for &statement in &pending {
        let anchor = anchors
            .get(leading_keyword(statement))
            .copied()
            .unwrap_or(Anchor::EndOfFile);
        by_anchor.entry(anchor).or_default().push(statement);
    }

    let mut lines = Vec::with_capacity(original.len() + pending.len() + 1);
    let mut inserted = Vec::with_capacity(pending.len());

    for (idx, line) in original.lines.iter().enumerate() {
        lines.push(line.clone());
        if let Some(group) = by_anchor.get(&Anchor::After(idx)) {
            insert_group(&mut lines, &mut inserted, group, terminator(line));
        }
    }
    if let Some(group) = by_anchor.get(&Anchor::EndOfFile) {
        let eol = original
            .lines
            .iter()
            .rev()
            .find(|l| l.ends_with('\n'))
            .map_or("\n", |l| terminator(l));
        insert_group(&mut lines, &mut inserted, group, eol);
    }

    SpliceOutcome {
        lines: RawFile::from_lines(lines),
        inserted,
        changed: true,
    }
}

/// Find the last line starting with each keyword, scanning backwards.
fn resolve_anchors<'a>(
    original: &RawFile,
    keywords: impl Iterator<Item = &'a str>,
) -> BTreeMap<&'a str, Anchor> {
    let mut unresolved: BTreeSet<&str> = keywords.collect();
    let mut anchors = BTreeMap::new();

    for (idx, line) in original.lines.iter().enumerate().rev() {
        if unresolved.is_empty() {
            break;
        }
        let trimmed = line.trim();
        if let Some(&keyword) = unresolved.iter().find(|k| starts_with_keyword(trimmed, k)) {
            debug!("anchoring `{}` statements after line {}", keyword, idx + 1);
            anchors.insert(keyword, Anchor::After(idx));
            unresolved.remove(keyword);
        }
    }

    for keyword in unresolved {
        debug!("no `{}` line found, appending at end of file", keyword);
        anchors.insert(keyword, Anchor::EndOfFile);
    }

    anchors
}

fn insert_group(lines: &mut Vec<String>, inserted: &mut Vec<String>, group: &[&str], eol: &str) {
    // Keep the previous line intact while still starting on a fresh line.
    if lines.last().is_some_and(|l| !l.ends_with('\n')) {
        lines.push(eol.to_string());
    }
    for statement in group {
        let line = format!("{}{}", statement, eol);
        lines.push(line.clone());
        inserted.push(line);
    }
}

/// The line ending new lines should copy from `line`.
fn terminator(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn leading_keyword(statement: &str) -> &str {
    statement.split_whitespace().next().unwrap_or_default()
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}
