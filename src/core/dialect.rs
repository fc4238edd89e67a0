//! Declaration file dialects.
//!
//! `metadata.rb` and `Berksfile` share one parser and one formatter. They
//! differ only in the data below: which keyword introduces a dependency,
//! which keywords repeat, and which named attributes a dependency may carry.

use std::fmt;

/// Attribute key under which a positional version constraint is stored.
///
/// Never part of a dialect's attribute vocabulary.
pub const CONSTRAINT_KEY: &str = "constraint";

/// Descriptor for one line-oriented declaration syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Short name used in messages.
    pub name: &'static str,

    /// File name inside a cookbook directory.
    pub file_name: &'static str,

    /// Keyword whose lines declare a named dependency.
    pub dependency_keyword: &'static str,

    /// Keywords that may repeat with a single unnamed value each.
    pub list_keywords: &'static [&'static str],

    /// Closed vocabulary of named dependency attributes.
    pub attributes: &'static [&'static str],

    /// Marker that starts a comment line (after trimming).
    pub comment_marker: &'static str,

    /// Replace tab characters with spaces before trimming.
    pub expand_tabs: bool,
}

/// `metadata.rb`: `depends 'name'[, 'constraint']`.
pub const METADATA: Dialect = Dialect {
    name: "metadata",
    file_name: "metadata.rb",
    dependency_keyword: "depends",
    list_keywords: &["supports"],
    attributes: &[],
    comment_marker: "#",
    expand_tabs: true,
};

/// `Berksfile`: `cookbook 'name'[, 'constraint'][, git: '...']`.
pub const BERKSFILE: Dialect = Dialect {
    name: "Berksfile",
    file_name: "Berksfile",
    dependency_keyword: "cookbook",
    list_keywords: &["source"],
    attributes: &["branch", "git", "path", "ref", "revision", "tag"],
    comment_marker: "#",
    expand_tabs: false,
};

impl Dialect {
    /// Check whether `keyword` introduces dependency entries.
    pub fn is_dependency_keyword(&self, keyword: &str) -> bool {
        self.dependency_keyword == keyword
    }

    /// Check whether `keyword` is a repeatable list keyword.
    pub fn is_list_keyword(&self, keyword: &str) -> bool {
        self.list_keywords.contains(&keyword)
    }

    /// Check whether `attribute` belongs to the closed vocabulary.
    pub fn is_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(&attribute)
    }

    /// Check whether a token names an attribute rather than a constraint.
    ///
    /// Prefix match against the vocabulary, so `git:'x'` and `git: 'x'`
    /// both count.
    pub fn starts_with_attribute(&self, token: &str) -> bool {
        self.attributes.iter().any(|attr| token.starts_with(attr))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name)
    }
}
