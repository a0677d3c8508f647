//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! confrev has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Settings for one local checkout
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$CONFREV_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/confrev/config.toml`
//! 3. `~/.confrev/config.toml` (canonical write location)
//!
//! # Repo Config Location
//!
//! `.git/confrev/config.toml` under the checkout root.
//!
//! # Example
//!
//! ```no_run
//! use confrev::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/checkout"))).unwrap();
//! let config = result.config;
//!
//! println!("API: {}", config.api_base());
//! println!("Remote: {}", config.remote());
//! if let Some(repo) = config.forge_repo() {
//!     println!("Repository: {}", repo);
//! }
//! ```

pub mod schema;

pub use schema::{ForgeRepoConfig, GlobalConfig, LogConfig, RepoConfig, SecretsConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::{BranchName, RepoId};
use crate::forge::github::DEFAULT_API_BASE;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "CONFREV_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown config key '{key}' (valid keys: {valid})")]
    UnknownKey { key: String, valid: String },

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Which file a `config get|set` addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
    Repo,
}

impl ConfigScope {
    /// Scope that owns `key`, if any.
    pub fn for_key(key: &str) -> Option<Self> {
        if GlobalConfig::KEYS.contains(&key) {
            Some(ConfigScope::Global)
        } else if RepoConfig::KEYS.contains(&key) {
            Some(ConfigScope::Repo)
        } else {
            None
        }
    }
}

/// Merged configuration from all sources.
///
/// Accessor methods apply defaults. Global and repo keys do not overlap,
/// so precedence only matters relative to defaults and CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a checkout)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_root` is provided, also loads the checkout's repo config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(repo_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), repo_root)
    }

    /// Load from an explicit global file instead of searching for one.
    pub fn load_from(
        global_file: Option<&Path>,
        repo_root: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = match global_file {
            Some(path) if path.exists() => (read_config::<GlobalConfig>(path)?, Some(path.into())),
            _ => (GlobalConfig::default(), None),
        };

        let (repo, repo_path) = match repo_root {
            Some(root) => {
                let path = Self::repo_config_path(root);
                if path.exists() {
                    (Some(read_config::<RepoConfig>(&path)?), Some(path))
                } else {
                    (None, None)
                }
            }
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
            if let Some(fr) = &r.forge_repo {
                if fr.owner.is_some() != fr.repo.is_some() {
                    warnings.push(ConfigWarning {
                        message: "forge_repo needs both owner and repo; ignoring it".into(),
                        path: repo_path.clone().unwrap_or_default(),
                    });
                }
            }
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path,
            },
            warnings,
        })
    }

    /// The first global config file that exists, in search order.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("confrev/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".confrev/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical path for global config.
    ///
    /// `$CONFREV_CONFIG` when set, otherwise `~/.confrev/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".confrev/config.toml"))
    }

    /// Get the canonical path for repo config.
    pub fn repo_config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(".git/confrev/config.toml")
    }

    /// Write global config atomically to the canonical path.
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write global config atomically to `path`.
    pub fn write_global_to(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        write_config_atomic(path, config)
    }

    /// Write repo config atomically.
    pub fn write_repo(repo_root: &Path, config: &RepoConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::repo_config_path(repo_root);
        write_config_atomic(&path, config)?;
        Ok(path)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// REST API base URL.
    ///
    /// Defaults to the public GitHub API.
    pub fn api_base(&self) -> &str {
        self.global.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Get the secrets provider.
    ///
    /// Defaults to "file" if not configured.
    pub fn secrets_provider(&self) -> &str {
        self.global
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or("file")
    }

    /// Default log filter.
    ///
    /// Defaults to "warn" if not configured.
    pub fn log_level(&self) -> &str {
        self.global
            .log
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("warn")
    }

    /// Get the remote name.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.remote.as_deref())
            .unwrap_or("origin")
    }

    /// Branch to view when none is given.
    ///
    /// Defaults to `main`.
    pub fn branch(&self) -> BranchName {
        self.repo
            .as_ref()
            .and_then(|r| r.branch.as_deref())
            .and_then(|b| BranchName::new(b).ok())
            .unwrap_or_else(BranchName::main)
    }

    /// Explicitly configured hosted repository.
    ///
    /// `None` unless both owner and repo are set.
    pub fn forge_repo(&self) -> Option<RepoId> {
        let fr = self.repo.as_ref()?.forge_repo.as_ref()?;
        RepoId::new(fr.owner.clone()?, fr.repo.clone()?).ok()
    }

    /// Effective value of every known key, with defaults filled in.
    pub fn list(&self) -> Vec<(&'static str, String)> {
        let repo = self.repo.clone().unwrap_or_default();
        let mut entries = vec![
            ("api_base", self.api_base().to_string()),
            ("interactive", self.interactive().to_string()),
            ("secrets.provider", self.secrets_provider().to_string()),
            ("log.level", self.log_level().to_string()),
            ("remote", self.remote().to_string()),
            ("branch", self.branch().to_string()),
        ];
        for key in ["forge_repo.owner", "forge_repo.repo"] {
            if let Ok(Some(value)) = repo.get_key(key) {
                entries.push((key, value));
            }
        }
        entries
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a config file atomically (temp file in the same directory, then rename).
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let write_err = |e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_empty_defaults() {
        let result = Config::load_from(None, None).unwrap();
        let config = result.config;

        assert_eq!(config.api_base(), DEFAULT_API_BASE);
        assert!(config.interactive());
        assert_eq!(config.remote(), "origin");
        assert_eq!(config.branch(), BranchName::main());
        assert_eq!(config.secrets_provider(), "file");
        assert_eq!(config.log_level(), "warn");
        assert!(config.forge_repo().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            api_base = "https://ghe.example.com/api/v3"
            interactive = false
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(&config_path), None).unwrap().config;
        assert!(!config.interactive());
        assert_eq!(config.api_base(), "https://ghe.example.com/api/v3");
        assert_eq!(config.global_config_loaded_from(), Some(config_path.as_path()));
    }

    #[test]
    fn load_repo_config() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".git/confrev");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.toml"),
            r#"
            remote = "upstream"
            branch = "staging"

            [forge_repo]
            owner = "acme"
            repo = "service-config"
            "#,
        )
        .unwrap();

        let result = Config::load_from(None, Some(temp.path())).unwrap();
        let config = result.config;

        assert_eq!(config.remote(), "upstream");
        assert_eq!(config.branch().as_str(), "staging");
        assert_eq!(
            config.forge_repo().map(|r| r.to_string()).as_deref(),
            Some("acme/service-config")
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn partial_forge_repo_warns() {
        let temp = TempDir::new().unwrap();
        let config = RepoConfig {
            forge_repo: Some(ForgeRepoConfig {
                owner: Some("acme".into()),
                repo: None,
            }),
            ..Default::default()
        };
        Config::write_repo(temp.path(), &config).unwrap();

        let result = Config::load_from(None, Some(temp.path())).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.config.forge_repo().is_none());
    }

    #[test]
    fn write_repo_config_atomic() {
        let temp = TempDir::new().unwrap();
        let config = RepoConfig {
            branch: Some("develop".to_string()),
            ..Default::default()
        };

        let path = Config::write_repo(temp.path(), &config).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(None, Some(temp.path())).unwrap();
        assert_eq!(loaded.config.branch().as_str(), "develop");
    }

    #[test]
    fn write_global_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        let mut global = GlobalConfig::default();
        global.set_key("log.level", "debug").unwrap();

        Config::write_global_to(&path, &global).unwrap();
        let loaded = Config::load_from(Some(&path), None).unwrap().config;
        assert_eq!(loaded.log_level(), "debug");
    }

    #[test]
    fn invalid_branch_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".git/confrev");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "branch = \"invalid..name\"").unwrap();

        assert!(Config::load_from(None, Some(temp.path())).is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".git/confrev");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "trunk = \"main\"").unwrap();

        assert!(matches!(
            Config::load_from(None, Some(temp.path())),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn scope_for_key() {
        assert_eq!(ConfigScope::for_key("api_base"), Some(ConfigScope::Global));
        assert_eq!(ConfigScope::for_key("forge_repo.owner"), Some(ConfigScope::Repo));
        assert_eq!(ConfigScope::for_key("trunk"), None);
    }

    #[test]
    fn list_includes_defaults() {
        let config = Config::default();
        let keys: Vec<_> = config.list().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"api_base"));
        assert!(keys.contains(&"branch"));
        assert!(!keys.contains(&"forge_repo.owner"));
    }
}
