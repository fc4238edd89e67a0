//! Configuration file support for fastfood.
//!
//! Settings come from, highest precedence first:
//! 1. Command-line flags
//! 2. Environment (`FASTFOOD_TEMPLATE_PACK`, `FASTFOOD_COOKBOOK_PATH`)
//! 3. `~/.fastfood/config.toml`
//! 4. Defaults: `~/.fastfood` for the template pack, `~/cookbooks` for cookbooks
//!
//! Flags and environment are both handled by clap; this module covers the
//! last two layers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Template pack directory
    pub template_pack: Option<PathBuf>,

    /// Directory that holds cookbooks
    pub cookbook_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Load the global configuration file, if any.
    pub fn load_global() -> Self {
        match global_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }
}

/// Fully resolved locations used by commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub template_pack: PathBuf,
    pub cookbook_path: PathBuf,
}

impl Settings {
    /// Combine explicit values (flags or environment) with the config file.
    pub fn resolve(
        template_pack: Option<PathBuf>,
        cookbook_path: Option<PathBuf>,
        config: &Config,
    ) -> Result<Self> {
        let template_pack = match template_pack.or_else(|| config.template_pack.clone()) {
            Some(path) => path,
            None => global_config_dir()
                .context("could not determine home directory for the default template pack")?,
        };

        let cookbook_path = match cookbook_path.or_else(|| config.cookbook_path.clone()) {
            Some(path) => path,
            None => home_dir()
                .map(|home| home.join("cookbooks"))
                .context("could not determine home directory for the default cookbook path")?,
        };

        Ok(Settings {
            template_pack: crate::util::fs::normalize_path(&template_pack),
            cookbook_path: crate::util::fs::normalize_path(&cookbook_path),
        })
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf())
}

/// Get the global fastfood directory (~/.fastfood).
pub fn global_config_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".fastfood"))
}

/// Get the global config path (~/.fastfood/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".fastfood/config.toml");

        let config = Config {
            template_pack: Some(PathBuf::from("/packs/chef")),
            cookbook_path: None,
        };
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "template_pak = 3\n").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
        assert_eq!(
            Config::load_or_default(&tmp.path().join("missing.toml")),
            Config::default()
        );
    }

    #[test]
    fn test_resolve_precedence() {
        let config = Config {
            template_pack: Some(PathBuf::from("/from/config")),
            cookbook_path: Some(PathBuf::from("/config/cookbooks")),
        };

        let settings =
            Settings::resolve(Some(PathBuf::from("/from/flag")), None, &config).unwrap();
        assert_eq!(settings.template_pack, PathBuf::from("/from/flag"));
        assert_eq!(settings.cookbook_path, PathBuf::from("/config/cookbooks"));
    }
}
