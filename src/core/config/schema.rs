//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$CONFREV_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/confrev/config.toml`
//! 3. `~/.confrev/config.toml` (canonical write location)
//!
//! # Repo Config
//!
//! Located at `.git/confrev/config.toml` inside a local checkout.
//!
//! # Keys
//!
//! Both scopes are addressable by dotted keys (`secrets.provider`,
//! `forge_repo.owner`) for `confrev config get|set`.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{BranchName, RepoId};

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// api_base = "https://api.github.com"
/// interactive = true
///
/// [secrets]
/// provider = "file"
///
/// [log]
/// level = "warn"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// REST API base URL of the hosting service
    pub api_base: Option<String>,

    /// Prompt for confirmation before mutations
    pub interactive: Option<bool>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,

    /// Diagnostic logging
    pub log: Option<LogConfig>,
}

impl GlobalConfig {
    /// Keys accepted by [`get_key`](Self::get_key) and [`set_key`](Self::set_key).
    pub const KEYS: &'static [&'static str] =
        &["api_base", "interactive", "secrets.provider", "log.level"];

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }
        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }

    /// Read a value by dotted key.
    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(match key {
            "api_base" => self.api_base.clone(),
            "interactive" => self.interactive.map(|b| b.to_string()),
            "secrets.provider" => self.secrets.as_ref().and_then(|s| s.provider.clone()),
            "log.level" => self.log.as_ref().and_then(|l| l.level.clone()),
            other => return Err(unknown_key(other, Self::KEYS)),
        })
    }

    /// Set a value by dotted key, validating the result.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "api_base" => self.api_base = Some(value.trim_end_matches('/').to_string()),
            "interactive" => self.interactive = Some(parse_bool(key, value)?),
            "secrets.provider" => {
                self.secrets.get_or_insert_with(Default::default).provider = Some(value.into())
            }
            "log.level" => self.log.get_or_insert_with(Default::default).level = Some(value.into()),
            other => return Err(unknown_key(other, Self::KEYS)),
        }
        self.validate()
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// remote = "origin"
/// branch = "staging"
///
/// [forge_repo]
/// owner = "acme"
/// repo = "service-config"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Remote whose URL identifies the hosted repository (default: "origin")
    pub remote: Option<String>,

    /// Branch viewed when none is given on the command line
    pub branch: Option<String>,

    /// Explicit hosted repository, overriding the remote URL
    pub forge_repo: Option<ForgeRepoConfig>,
}

impl RepoConfig {
    pub const KEYS: &'static [&'static str] =
        &["remote", "branch", "forge_repo.owner", "forge_repo.repo"];

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.branch {
            BranchName::new(branch)
                .map_err(|e| ConfigError::InvalidValue(format!("invalid branch: {}", e)))?;
        }

        if let Some(remote) = &self.remote {
            if remote.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "remote cannot be empty".to_string(),
                ));
            }
        }

        if let Some(ForgeRepoConfig {
            owner: Some(owner),
            repo: Some(repo),
        }) = &self.forge_repo
        {
            RepoId::new(owner.as_str(), repo.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("invalid forge_repo: {}", e)))?;
        }

        Ok(())
    }

    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let forge_repo = self.forge_repo.as_ref();
        Ok(match key {
            "remote" => self.remote.clone(),
            "branch" => self.branch.clone(),
            "forge_repo.owner" => forge_repo.and_then(|f| f.owner.clone()),
            "forge_repo.repo" => forge_repo.and_then(|f| f.repo.clone()),
            other => return Err(unknown_key(other, Self::KEYS)),
        })
    }

    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "remote" => self.remote = Some(value.into()),
            "branch" => self.branch = Some(value.into()),
            "forge_repo.owner" => {
                self.forge_repo.get_or_insert_with(Default::default).owner = Some(value.into())
            }
            "forge_repo.repo" => {
                self.forge_repo.get_or_insert_with(Default::default).repo = Some(value.into())
            }
            other => return Err(unknown_key(other, Self::KEYS)),
        }
        self.validate()
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use (only "file")
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Valid secret providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file"];

    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter level when `CONFREV_LOG` is unset
    pub level: Option<String>,
}

impl LogConfig {
    pub const VALID_LEVELS: &'static [&'static str] =
        &["error", "warn", "info", "debug", "trace", "off"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            if !Self::VALID_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log level '{}', must be one of: {}",
                    level,
                    Self::VALID_LEVELS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Forge-specific repository configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeRepoConfig {
    /// Owner or organization
    pub owner: Option<String>,

    /// Repository name
    pub repo: Option<String>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

fn unknown_key(key: &str, valid: &[&str]) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.to_string(),
        valid: valid.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_config_parse() {
        let toml = r#"
            api_base = "https://ghe.example.com/api/v3"
            interactive = false

            [secrets]
            provider = "file"

            [log]
            level = "debug"
        "#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.api_base.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(config.interactive, Some(false));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn repo_config_parse() {
        let toml = r#"
            remote = "upstream"
            branch = "staging"

            [forge_repo]
            owner = "acme"
            repo = "service-config"
        "#;

        let config: RepoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.branch.as_deref(), Some("staging"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_secrets_provider() {
        let config = GlobalConfig {
            secrets: Some(SecretsConfig {
                provider: Some("keychain".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_api_base() {
        let config = GlobalConfig {
            api_base: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_branch() {
        let config = RepoConfig {
            branch: Some("bad..name".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn set_and_get_dotted_keys() {
        let mut global = GlobalConfig::default();
        global.set_key("secrets.provider", "file").unwrap();
        global.set_key("interactive", "no").unwrap();
        assert_eq!(
            global.get_key("secrets.provider").unwrap().as_deref(),
            Some("file")
        );
        assert_eq!(global.get_key("interactive").unwrap().as_deref(), Some("false"));

        let mut repo = RepoConfig::default();
        repo.set_key("forge_repo.owner", "acme").unwrap();
        assert_eq!(
            repo.get_key("forge_repo.owner").unwrap().as_deref(),
            Some("acme")
        );
        assert_eq!(repo.get_key("forge_repo.repo").unwrap(), None);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut global = GlobalConfig::default();
        assert!(global.set_key("interactive", "maybe").is_err());
        assert!(global.set_key("log.level", "loud").is_err());
        assert!(matches!(
            global.get_key("trunk"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<RepoConfig, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());
    }
}
