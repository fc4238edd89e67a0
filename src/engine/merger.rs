//! Manifest merging.
//!
//! Compares an incoming manifest against the current one and renders every
//! missing dependency or list value as a declaration line. Dependencies are
//! matched by name only: a name already present is skipped even if the
//! incoming attributes differ. Scalars and flags are never merged.

use tracing::debug;

use crate::core::dialect::{Dialect, CONSTRAINT_KEY};
use crate::core::manifest::{Attributes, Manifest};

/// Statements to add to a file, plus what was already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Newline-terminated declaration lines.
    pub statements: Vec<String>,

    /// Dependency names and list values that were already declared.
    pub skipped: Vec<String>,
}

impl MergePlan {
    /// Check if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Compute the declarations `incoming` adds to `current`.
pub fn merge(dialect: &Dialect, current: &Manifest, incoming: &Manifest) -> MergePlan {
    let mut plan = MergePlan::default();

    let keyword = dialect.dependency_keyword;
    if let Some(deps) = incoming.entries_for(keyword) {
        for (name, attrs) in deps {
            if current.has_dependency(keyword, name) {
                debug!("{} `{}` already declared in {}", keyword, name, dialect);
                plan.skipped.push(name.clone());
                continue;
            }
            plan.statements
                .push(format_dependency(keyword, name, attrs));
        }
    }

    for &keyword in dialect.list_keywords {
        let existing = current.list(keyword);
        let mut seen: Vec<&str> = Vec::new();
        for value in incoming.list(keyword) {
            if existing.contains(value) || seen.contains(&value.as_str()) {
                debug!("{} `{}` already declared in {}", keyword, value, dialect);
                plan.skipped.push(value.clone());
                continue;
            }
            seen.push(value);
            plan.statements.push(format_list_item(keyword, value));
        }
    }

    plan
}

/// Render `keyword 'name'[, 'constraint'][, attr: 'value']*`.
pub fn format_dependency(keyword: &str, name: &str, attrs: &Attributes) -> String {
    let mut attrs = attrs.clone();
    let mut line = format!("{} '{}'", keyword, name);

    if let Some(constraint) = attrs.remove(CONSTRAINT_KEY) {
        line.push_str(&format!(", '{}'", constraint));
    }
    // BTreeMap iteration is sorted by attribute key.
    for (key, value) in &attrs {
        line.push_str(&format!(", {}: '{}'", key, value));
    }

    line.push('\n');
    line
}

/// Render `keyword 'value'`.
pub fn format_list_item(keyword: &str, value: &str) -> String {
    format!("{} '{}'\n", keyword, value)
}
