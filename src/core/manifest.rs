//! The parsed form of a `metadata.rb` or `Berksfile`.
//!
//! A `Manifest` is a plain value. It is built fresh from text by the parser
//! or from stencil requirements by [`Manifest::from_requirements`], and is
//! never updated in place: merging produces text, and the caller re-parses
//! the rewritten file to see the result.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::dialect::{Dialect, CONSTRAINT_KEY};
use crate::engine::errors::{Location, ManifestError};
use crate::engine::parser::{self, parse_dependency_options};

/// Named attributes of one dependency (`git`, `path`, `constraint`, ...).
pub type Attributes = BTreeMap<String, String>;

/// Normalized key/value view of a declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Single-valued keywords; the last occurrence wins.
    pub scalars: BTreeMap<String, String>,

    /// Keywords that appeared without a value.
    pub flags: BTreeSet<String>,

    /// Repeatable keywords in file order.
    pub lists: BTreeMap<String, Vec<String>>,

    /// Dependency family: keyword -> name -> attributes.
    pub entries: BTreeMap<String, BTreeMap<String, Attributes>>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Manifest::default()
    }

    /// Parse declaration text in the given dialect.
    pub fn parse(text: &str, dialect: &Dialect) -> Result<Self, ManifestError> {
        parser::parse(text, dialect)
    }

    /// Build an incoming manifest from a requirements map.
    ///
    /// `value` maps keywords to values: the dependency keyword takes an
    /// object of `name -> spec` (see [`Manifest::from_dependencies`]), list
    /// keywords take an array of strings or a single string, and any other
    /// keyword takes a string scalar or `true` for a flag.
    pub fn from_requirements(dialect: &Dialect, value: &Value) -> Result<Self, ManifestError> {
        let Value::Object(map) = value else {
            return Err(shape_error("requirements", "<root>", "an object", value));
        };

        let mut manifest = Manifest::new();
        for (keyword, item) in map {
            if dialect.is_dependency_keyword(keyword) {
                let deps = dependencies_from_value(dialect, keyword, item)?;
                if !deps.is_empty() {
                    manifest.entries.insert(keyword.clone(), deps);
                }
            } else if dialect.is_list_keyword(keyword) {
                let values = list_from_value(keyword, item)?;
                if !values.is_empty() {
                    manifest.lists.insert(keyword.clone(), values);
                }
            } else {
                match item {
                    Value::String(s) => {
                        manifest.scalars.insert(keyword.clone(), s.clone());
                    }
                    Value::Bool(true) => {
                        manifest.flags.insert(keyword.clone());
                    }
                    other => {
                        return Err(shape_error(keyword, keyword, "a string or `true`", other))
                    }
                }
            }
        }

        Ok(manifest)
    }

    /// Build an incoming manifest from a bare `name -> spec` object.
    ///
    /// This is the shape stencil sets use for `dependencies` and
    /// `berks_dependencies`. Each spec is one of:
    /// - `null`: no attributes
    /// - `["~> 1.0", "git: url", ...]`: tokens as they would follow the name
    /// - `{"git": "url", "constraint": "~> 1.0"}`: attributes by key
    pub fn from_dependencies(dialect: &Dialect, value: &Value) -> Result<Self, ManifestError> {
        let mut manifest = Manifest::new();
        let deps = dependencies_from_value(dialect, dialect.dependency_keyword, value)?;
        if !deps.is_empty() {
            manifest
                .entries
                .insert(dialect.dependency_keyword.to_string(), deps);
        }
        Ok(manifest)
    }

    /// Check if the manifest declares nothing.
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
            && self.flags.is_empty()
            && self.lists.values().all(Vec::is_empty)
            && self.entries.values().all(BTreeMap::is_empty)
    }

    /// Get all dependencies declared with `keyword`.
    pub fn entries_for(&self, keyword: &str) -> Option<&BTreeMap<String, Attributes>> {
        self.entries.get(keyword)
    }

    /// Get the attributes of one dependency.
    pub fn dependency(&self, keyword: &str, name: &str) -> Option<&Attributes> {
        self.entries.get(keyword).and_then(|deps| deps.get(name))
    }

    /// Check whether a dependency name is declared.
    pub fn has_dependency(&self, keyword: &str, name: &str) -> bool {
        self.dependency(keyword, name).is_some()
    }

    /// Names declared with `keyword`, in sorted order.
    pub fn dependency_names(&self, keyword: &str) -> Vec<&str> {
        self.entries
            .get(keyword)
            .map(|deps| deps.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Get the values of a repeatable keyword.
    pub fn list(&self, keyword: &str) -> &[String] {
        self.lists.get(keyword).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get a scalar value.
    pub fn scalar(&self, keyword: &str) -> Option<&str> {
        self.scalars.get(keyword).map(String::as_str)
    }

    /// Check whether a bare directive is present.
    pub fn has_flag(&self, keyword: &str) -> bool {
        self.flags.contains(keyword)
    }

    /// Flatten into the nested-map view used by templates and `inspect`.
    ///
    /// Scalars become strings, flags `true`, lists arrays, and each
    /// dependency family an object of `name -> {attribute: value}`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.scalars {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        for flag in &self.flags {
            map.insert(flag.clone(), Value::Bool(true));
        }
        for (key, values) in &self.lists {
            map.insert(
                key.clone(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        for (keyword, deps) in &self.entries {
            let deps = deps
                .iter()
                .map(|(name, attrs)| {
                    let attrs = attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect::<Map<_, _>>();
                    (name.clone(), Value::Object(attrs))
                })
                .collect::<Map<_, _>>();
            map.insert(keyword.clone(), Value::Object(deps));
        }
        Value::Object(map)
    }
}

fn dependencies_from_value(
    dialect: &Dialect,
    keyword: &str,
    value: &Value,
) -> Result<BTreeMap<String, Attributes>, ManifestError> {
    let map = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(map) => map,
        other => return Err(shape_error(keyword, keyword, "an object of dependencies", other)),
    };

    let mut deps = BTreeMap::new();
    for (name, spec) in map {
        check_dependency_name(keyword, name)?;
        let attrs = match spec {
            Value::Null => Attributes::new(),
            Value::Array(items) => {
                let tokens = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.as_str()),
                        other => Err(shape_error(keyword, name, "an array of strings", other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                parse_dependency_options(name, &tokens, dialect, &Location::requirements())?
            }
            Value::Object(fields) => {
                let mut attrs = Attributes::new();
                for (attr, v) in fields {
                    let Value::String(v) = v else {
                        return Err(shape_error(keyword, name, "string attribute values", v));
                    };
                    if attr != CONSTRAINT_KEY && !dialect.is_attribute(attr) {
                        return Err(ManifestError::UnknownAttribute {
                            location: Location::requirements(),
                            keyword: keyword.to_string(),
                            name: name.clone(),
                            attribute: attr.clone(),
                            allowed: dialect.attributes,
                        });
                    }
                    attrs.insert(attr.clone(), parser::ruby_strip(v));
                }
                attrs
            }
            other => {
                return Err(shape_error(
                    keyword,
                    name,
                    "null, an array of options or an object of attributes",
                    other,
                ))
            }
        };
        deps.insert(name.clone(), attrs);
    }
    Ok(deps)
}

fn list_from_value(keyword: &str, value: &Value) -> Result<Vec<String>, ManifestError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![parser::ruby_strip(s)]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(parser::ruby_strip(s)),
                other => Err(shape_error(keyword, keyword, "an array of strings", other)),
            })
            .collect(),
        other => Err(shape_error(keyword, keyword, "an array of strings", other)),
    }
}

/// A name must survive being written as `keyword 'name'` and read back.
fn check_dependency_name(keyword: &str, name: &str) -> Result<(), ManifestError> {
    let found = if parser::ruby_strip(name).is_empty() {
        "an empty name"
    } else if name.contains(',') {
        "a comma"
    } else if name.contains(['\'', '"']) {
        "a quote"
    } else if name.trim() != name {
        "surrounding whitespace"
    } else {
        return Ok(());
    };
    Err(ManifestError::Shape {
        keyword: keyword.to_string(),
        name: name.to_string(),
        expected: "a plain dependency name",
        found,
    })
}

fn shape_error(keyword: &str, name: &str, expected: &'static str, found: &Value) -> ManifestError {
    ManifestError::Shape {
        keyword: keyword.to_string(),
        name: name.to_string(),
        expected,
        found: json_type(found),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dialect::{BERKSFILE, METADATA};
    use crate::test_support::fixtures::FIRST_BERKS;
    use serde_json::json;

    #[test]
    fn test_from_dependencies_object_form() {
        let incoming = Manifest::from_dependencies(
            &BERKSFILE,
            &json!({
                "apt": {},
                "cron": {"git": "git@github.com:rackspace-cookbooks/cron.git"}
            }),
        )
        .unwrap();

        assert_eq!(incoming.dependency_names("cookbook"), vec!["apt", "cron"]);
        assert_eq!(
            incoming.dependency("cookbook", "cron").unwrap()["git"],
            "git@github.com:rackspace-cookbooks/cron.git"
        );
    }

    #[test]
    fn test_from_dependencies_array_form() {
        let incoming = Manifest::from_dependencies(
            &BERKSFILE,
            &json!({"elasticsearch": ["~> 0.3", "git: 'git@github.com:racker/es.git'"]}),
        )
        .unwrap();

        let attrs = incoming.dependency("cookbook", "elasticsearch").unwrap();
        assert_eq!(attrs["constraint"], "~> 0.3");
        assert_eq!(attrs["git"], "git@github.com:racker/es.git");
    }

    #[test]
    fn test_from_dependencies_null_and_empty() {
        let incoming =
            Manifest::from_dependencies(&METADATA, &json!({"apt": null, "yum": []})).unwrap();
        assert!(incoming.dependency("depends", "apt").unwrap().is_empty());
        assert!(incoming.dependency("depends", "yum").unwrap().is_empty());

        let empty = Manifest::from_dependencies(&METADATA, &json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_shape_errors() {
        let err = Manifest::from_dependencies(&METADATA, &json!({"apt": "1.0"})).unwrap_err();
        match err {
            ManifestError::Shape {
                name, found, ..
            } => {
                assert_eq!(name, "apt");
                assert_eq!(found, "a string");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Manifest::from_dependencies(&METADATA, &json!({"apt": [1]})).unwrap_err();
        assert!(matches!(err, ManifestError::Shape { .. }));

        let err = Manifest::from_dependencies(&METADATA, &json!(["apt"])).unwrap_err();
        assert!(matches!(err, ManifestError::Shape { .. }));
    }

    #[test]
    fn test_unwritable_dependency_names_rejected() {
        for (name, found) in [
            ("", "an empty name"),
            ("  ", "an empty name"),
            ("a,b", "a comma"),
            ("o'brien", "a quote"),
            ("\"apt\"", "a quote"),
            (" apt", "surrounding whitespace"),
        ] {
            let mut deps = Map::new();
            deps.insert(name.to_string(), Value::Null);
            let err = Manifest::from_dependencies(&METADATA, &Value::Object(deps)).unwrap_err();
            match err {
                ManifestError::Shape {
                    name: got,
                    found: got_found,
                    ..
                } => {
                    assert_eq!(got, name);
                    assert_eq!(got_found, found, "for {name:?}");
                }
                other => panic!("unexpected error for {name:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_accepted_names_read_back() {
        let incoming = Manifest::from_dependencies(&METADATA, &json!({"": null, "cron": null}));
        assert!(incoming.is_err());

        let incoming = Manifest::from_dependencies(&METADATA, &json!({"cron": null})).unwrap();
        let first = crate::engine::update_text("name 'x'\ndepends 'apt'\n", &METADATA, &incoming)
            .unwrap();
        assert_eq!(first.content, "name 'x'\ndepends 'apt'\ndepends 'cron'\n");
        let second = crate::engine::update_text(&first.content, &METADATA, &incoming).unwrap();
        assert!(!second.changed);
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_requirements_vocabulary_enforced() {
        let err = Manifest::from_dependencies(&BERKSFILE, &json!({"cron": {"github": "x"}}))
            .unwrap_err();
        assert!(err.is_vocabulary_error());
    }

    #[test]
    fn test_from_requirements_all_kinds() {
        let manifest = Manifest::from_requirements(
            &BERKSFILE,
            &json!({
                "source": ["https://a", "https://b"],
                "metadata": true,
                "cookbook": {"apt": null}
            }),
        )
        .unwrap();

        assert_eq!(manifest.list("source"), ["https://a", "https://b"]);
        assert!(manifest.has_flag("metadata"));
        assert!(manifest.has_dependency("cookbook", "apt"));

        let single = Manifest::from_requirements(&BERKSFILE, &json!({"source": "https://a"}))
            .unwrap();
        assert_eq!(single.list("source"), ["https://a"]);
    }

    #[test]
    fn test_to_json_view() {
        let manifest = Manifest::parse(FIRST_BERKS, &BERKSFILE).unwrap();
        let view = manifest.to_json();

        assert_eq!(view["metadata"], json!(true));
        assert_eq!(view["source"], json!(["https://supermarket.getchef.com"]));
        assert_eq!(view["cookbook"]["apt"], json!({}));
        assert_eq!(view["cookbook"]["elasticsearch"]["constraint"], json!("~> 0.3"));
    }

    #[test]
    fn test_structural_equality() {
        let a = Manifest::from_dependencies(&METADATA, &json!({"apt": [">= 1.0"]})).unwrap();
        let b = Manifest::parse("depends 'apt', '>= 1.0'\n", &METADATA).unwrap();
        assert_eq!(a, b);
    }
}
