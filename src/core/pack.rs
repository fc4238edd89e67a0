//! Template packs and stencil sets.
//!
//! A template pack is a directory with a `manifest.json` that names the base
//! files every new cookbook gets and the stencil sets it ships:
//!
//! ```text
//! templatepack/
//!   manifest.json
//!   base/metadata.rb
//!   stencils/<set>/manifest.json
//!   stencils/<set>/templates/...
//! ```
//!
//! A stencil set manifest describes files, partials, options and
//! dependencies; its `stencils` table holds named variants that override
//! parts of the set-level document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Placeholder in target paths replaced by the `name` option.
pub const NAME_PLACEHOLDER: &str = "<NAME>";

const MANIFEST_FILE: &str = "manifest.json";

/// Error loading a template pack or resolving a stencil.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("template pack directory {} does not exist", path.display())]
    PackNotFound { path: PathBuf },

    #[error("template pack needs a manifest file: {}", path.display())]
    PackMissingManifest { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} requires `{key}`", path.display())]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("manifest value `{key}` in {} should be {expected}, not {found}", path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("stencil set `{name}` not listed in {} under stencil_sets", manifest.display())]
    StencilSetNotListed { name: String, manifest: PathBuf },

    #[error("stencil set directory {} does not exist", path.display())]
    StencilSetInvalidPath { name: String, path: PathBuf },

    #[error("stencil set `{name}` needs a manifest file: {}", path.display())]
    StencilSetMissingManifest { name: String, path: PathBuf },

    #[error("stencil `{stencil}` not declared in stencil set `{set}`")]
    StencilNotDeclared {
        set: String,
        stencil: String,
        declared: Vec<String>,
    },

    #[error("no stencil name specified within stencil set `{set}`")]
    NoStencilSelected { set: String },

    #[error("stencil `{stencil}` targets `{target}` but has no `name` option")]
    MissingNameOption { stencil: String, target: String },
}

impl PackError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PackError::PackNotFound { path } | PackError::PackMissingManifest { path } => {
                Diagnostic::error(self.to_string())
                    .with_location(path)
                    .with_suggestion(suggestions::NO_TEMPLATE_PACK)
            }
            PackError::StencilSetNotListed { manifest, .. } => {
                Diagnostic::error(self.to_string())
                    .with_location(manifest)
                    .with_suggestion(suggestions::STENCIL_SET_NOT_LISTED)
            }
            PackError::StencilNotDeclared { declared, .. } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !declared.is_empty() {
                    diag = diag.with_context(format!("declared stencils: {}", declared.join(", ")));
                }
                diag
            }
            PackError::MissingNameOption { .. } => Diagnostic::error(self.to_string())
                .with_suggestion("Pass the option on the command line, e.g. `name:web`"),
            _ => Diagnostic::error(self.to_string()),
        }
    }
}

/// Base layout from the pack manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseLayout {
    /// Files rendered into every new cookbook, from `<pack>/base/`.
    pub files: Vec<String>,
    /// Directories created in every new cookbook.
    pub directories: Vec<String>,
}

/// A template pack on disk.
#[derive(Debug, Clone)]
pub struct TemplatePack {
    path: PathBuf,
    manifest_path: PathBuf,
    base: BaseLayout,
    stencil_sets: Vec<String>,
}

impl TemplatePack {
    /// Open a template pack, validating its manifest.
    pub fn open(path: &Path) -> Result<Self, PackError> {
        let path = crate::util::fs::normalize_path(path);
        if !path.is_dir() {
            return Err(PackError::PackNotFound { path });
        }

        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(PackError::PackMissingManifest {
                path: manifest_path,
            });
        }

        let manifest = read_manifest(&manifest_path)?;
        require_integer(&manifest, &manifest_path, "api")?;

        let base = match manifest.get("base") {
            None => {
                return Err(PackError::MissingKey {
                    path: manifest_path,
                    key: "base",
                })
            }
            Some(value @ Value::Object(_)) => {
                BaseLayout::deserialize(value).map_err(|source| PackError::Json {
                    path: manifest_path.clone(),
                    source,
                })?
            }
            Some(other) => {
                return Err(PackError::InvalidValue {
                    path: manifest_path,
                    key: "base".into(),
                    expected: "an object",
                    found: json_type(other),
                })
            }
        };

        let stencil_sets = match manifest.get("stencil_sets") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(sets)) => {
                let mut names: Vec<String> = sets.keys().cloned().collect();
                names.sort();
                names
            }
            Some(other) => {
                return Err(PackError::InvalidValue {
                    path: manifest_path,
                    key: "stencil_sets".into(),
                    expected: "an object",
                    found: json_type(other),
                })
            }
        };

        Ok(TemplatePack {
            path,
            manifest_path,
            base,
            stencil_sets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn base(&self) -> &BaseLayout {
        &self.base
    }

    /// Location of a base file's template.
    pub fn base_template(&self, file: &str) -> PathBuf {
        self.path.join("base").join(file)
    }

    /// Names listed under `stencil_sets`, sorted.
    pub fn stencil_set_names(&self) -> &[String] {
        &self.stencil_sets
    }

    /// Load a stencil set listed in this pack.
    pub fn load_stencil_set(&self, name: &str) -> Result<StencilSet, PackError> {
        if !self.stencil_sets.iter().any(|s| s == name) {
            return Err(PackError::StencilSetNotListed {
                name: name.to_string(),
                manifest: self.manifest_path.clone(),
            });
        }

        StencilSet::open(name, &self.path.join("stencils").join(name))
    }
}

/// A stencil set: one directory under `<pack>/stencils`.
#[derive(Debug, Clone)]
pub struct StencilSet {
    name: String,
    path: PathBuf,
    manifest_path: PathBuf,
    default_stencil: String,
    document: Map<String, Value>,
}

impl StencilSet {
    /// Open a stencil set directory.
    pub fn open(name: &str, path: &Path) -> Result<Self, PackError> {
        if !path.is_dir() {
            return Err(PackError::StencilSetInvalidPath {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }

        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(PackError::StencilSetMissingManifest {
                name: name.to_string(),
                path: manifest_path,
            });
        }

        let document = read_manifest(&manifest_path)?;
        require_integer(&document, &manifest_path, "api")?;
        let default_stencil = match document.get("default_stencil") {
            None => {
                return Err(PackError::MissingKey {
                    path: manifest_path,
                    key: "default_stencil",
                })
            }
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(PackError::InvalidValue {
                    path: manifest_path,
                    key: "default_stencil".into(),
                    expected: "a string",
                    found: json_type(other),
                })
            }
        };

        Ok(StencilSet {
            name: name.to_string(),
            path: path.to_path_buf(),
            manifest_path,
            default_stencil,
            document,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_stencil(&self) -> &str {
        &self.default_stencil
    }

    /// Names declared under `stencils`.
    pub fn stencil_names(&self) -> Vec<String> {
        match self.document.get("stencils") {
            Some(Value::Object(stencils)) => stencils.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Pick the requested stencil, or the set's default.
    pub fn select<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str, PackError> {
        match requested.unwrap_or(self.default_stencil.as_str()) {
            "" => Err(PackError::NoStencilSelected {
                set: self.name.clone(),
            }),
            name => Ok(name),
        }
    }

    /// Resolve a stencil against user-supplied options.
    pub fn stencil(&self, name: &str, options: &Map<String, Value>) -> Result<Stencil, PackError> {
        let Some(overrides) = self
            .document
            .get("stencils")
            .and_then(Value::as_object)
            .and_then(|stencils| stencils.get(name))
        else {
            return Err(PackError::StencilNotDeclared {
                set: self.name.clone(),
                stencil: name.to_string(),
                declared: self.stencil_names(),
            });
        };

        let mut document = Value::Object(self.document.clone());
        if let Value::Object(map) = &mut document {
            map.remove("stencils");
            map.remove("default_stencil");
        }
        deep_update(&mut document, overrides);

        let mut resolved = options.clone();
        if let Some(declared) = document.get("options").and_then(Value::as_object) {
            for (option, data) in declared {
                if !resolved.contains_key(option) {
                    let default = data
                        .get("default")
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new()));
                    resolved.insert(option.clone(), default);
                }
            }
        }

        let files = self.path_table(&document, "files")?;
        let partials = self.path_table(&document, "partials")?;
        let name_option = resolved.get("name").and_then(option_string);

        let files = substitute_name(name, files, name_option.as_deref())?;
        let partials = substitute_name(name, partials, name_option.as_deref())?;

        Ok(Stencil {
            set: self.name.clone(),
            name: name.to_string(),
            options: resolved,
            files,
            partials,
            dependencies: document.get("dependencies").cloned().unwrap_or(Value::Null),
            berks_dependencies: document
                .get("berks_dependencies")
                .cloned()
                .unwrap_or(Value::Null),
        })
    }

    fn path_table(&self, document: &Value, key: &str) -> Result<BTreeMap<String, String>, PackError> {
        match document.get(key) {
            None | Some(Value::Null) => Ok(BTreeMap::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(target, template)| match template {
                    Value::String(t) => Ok((target.clone(), t.clone())),
                    other => Err(PackError::InvalidValue {
                        path: self.manifest_path.clone(),
                        key: format!("{}.{}", key, target),
                        expected: "a string",
                        found: json_type(other),
                    }),
                })
                .collect(),
            Some(other) => Err(PackError::InvalidValue {
                path: self.manifest_path.clone(),
                key: key.to_string(),
                expected: "an object",
                found: json_type(other),
            }),
        }
    }
}

/// A stencil resolved against its set and the user's options.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    pub set: String,
    pub name: String,
    /// User-supplied options plus declared defaults.
    pub options: Map<String, Value>,
    /// Target path (relative to the cookbook) to template path (relative to
    /// the stencil set).
    pub files: BTreeMap<String, String>,
    /// Same shape as `files`; rendered output is appended.
    pub partials: BTreeMap<String, String>,
    /// `metadata.rb` requirements.
    pub dependencies: Value,
    /// `Berksfile` requirements.
    pub berks_dependencies: Value,
}

impl Stencil {
    /// Whether the `force` option asks for overwriting existing files.
    pub fn force(&self) -> bool {
        match self.options.get("force") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "true" | "yes" | "1"),
            _ => false,
        }
    }
}

/// Merge `overrides` into `target`. Objects merge key by key; any other
/// value replaces what was there.
pub fn deep_update(target: &mut Value, overrides: &Value) {
    match (target, overrides) {
        (Value::Object(target), Value::Object(overrides)) => {
            for (key, value) in overrides {
                let nested = value.is_object() && target.get(key).is_some_and(Value::is_object);
                match target.get_mut(key) {
                    Some(existing) if nested => deep_update(existing, value),
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, overrides) => *target = overrides.clone(),
    }
}

fn substitute_name(
    stencil: &str,
    table: BTreeMap<String, String>,
    name: Option<&str>,
) -> Result<BTreeMap<String, String>, PackError> {
    table
        .into_iter()
        .map(|(target, template)| {
            if !target.contains(NAME_PLACEHOLDER) {
                return Ok((target, template));
            }
            match name {
                Some(name) => Ok((target.replace(NAME_PLACEHOLDER, name), template)),
                None => Err(PackError::MissingNameOption {
                    stencil: stencil.to_string(),
                    target,
                }),
            }
        })
        .collect()
}

fn option_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn read_manifest(path: &Path) -> Result<Map<String, Value>, PackError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| PackError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PackError::InvalidValue {
            path: path.to_path_buf(),
            key: "<root>".into(),
            expected: "an object",
            found: json_type(&other),
        }),
    }
}

fn require_integer(
    manifest: &Map<String, Value>,
    path: &Path,
    key: &'static str,
) -> Result<(), PackError> {
    match manifest.get(key) {
        None => Err(PackError::MissingKey {
            path: path.to_path_buf(),
            key,
        }),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
        Some(other) => Err(PackError::InvalidValue {
            path: path.to_path_buf(),
            key: key.to_string(),
            expected: "an integer",
            found: json_type(other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
