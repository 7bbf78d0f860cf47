//! Configuration module for the TOML config file.
//!
//! Reads `config.toml` from the working directory (or the path named by
//! `HOOKSHOT_CONFIG`), falling back to the shipped `config_default.toml`
//! when the primary file does not exist.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Primary config file, relative to the working directory.
pub const CONFIG_PATH: &str = "config.toml";

/// Fallback used only when the primary file is absent.
pub const DEFAULT_CONFIG_PATH: &str = "config_default.toml";

/// Environment variable overriding [`CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "HOOKSHOT_CONFIG";

/// GitHub caps webhook payloads at 25 MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Receiver configuration. Built once at startup and never mutated.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Shared webhook secret. Empty disables signature checking.
    #[serde(default, alias = "Secret")]
    pub secret: String,

    /// Route the webhook is served on, e.g. `/github/webhook`
    #[serde(alias = "hook_url", alias = "hookurl", alias = "HookUrl")]
    pub hook_path: String,

    /// Port for the web server to listen on
    #[serde(alias = "Port")]
    pub port: u16,

    /// Largest request body accepted before the read fails
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("secret", &if self.secret.is_empty() { "" } else { "<redacted>" })
            .field("hook_path", &self.hook_path)
            .field("port", &self.port)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the primary path (honouring `HOOKSHOT_CONFIG`)
    /// with [`DEFAULT_CONFIG_PATH`] as fallback.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(primary_config_path(), DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `primary`, or from `fallback` if `primary`
    /// does not exist. Any other I/O or parse failure is returned as is; the
    /// fallback is never consulted to paper over a broken primary file.
    pub fn load_from(
        primary: impl AsRef<Path>,
        fallback: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let primary = primary.as_ref();
        let fallback = fallback.as_ref();

        let (path, contents) = match read_if_exists(primary)? {
            Some(contents) => (primary, contents),
            None => {
                warn!(
                    primary = %primary.display(),
                    fallback = %fallback.display(),
                    "config_primary_missing"
                );
                match read_if_exists(fallback)? {
                    Some(contents) => (fallback, contents),
                    None => {
                        return Err(ConfigError::NotFound {
                            primary: primary.to_path_buf(),
                            fallback: fallback.to_path_buf(),
                        })
                    }
                }
            }
        };

        let config: ServerConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!(path = %path.display(), "config_file_read");
        Ok(config)
    }

    /// Whether deliveries are checked against the shared secret.
    pub fn signature_verification_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.hook_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "hook_path must start with '/', got '{}'",
                self.hook_path
            )));
        }
        if self.hook_path.contains(|c| matches!(c, '*' | ':' | '{' | '}')) {
            return Err(ConfigError::Invalid(format!(
                "hook_path must be a literal path without captures or wildcards, got '{}'",
                self.hook_path
            )));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("max_body_bytes must be non-zero".into()));
        }
        Ok(())
    }
}

fn primary_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH))
}

fn read_if_exists(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
