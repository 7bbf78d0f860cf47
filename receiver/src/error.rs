//! Error kinds shared by the configuration loader and the webhook handler.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of every failure the receiver can report.
///
/// `ConfigLoadFailure` is fatal at startup. All other kinds are scoped to a
/// single request and answered with `403 Forbidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigLoadFailure,
    HeaderBindFailure,
    InvalidUserAgent,
    BodyReadFailure,
    MalformedSignatureHeader,
    SignatureMismatch,
}

impl ErrorKind {
    /// Stable snake_case name, used as a structured log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigLoadFailure => "config_load_failure",
            ErrorKind::HeaderBindFailure => "header_bind_failure",
            ErrorKind::InvalidUserAgent => "invalid_user_agent",
            ErrorKind::BodyReadFailure => "body_read_failure",
            ErrorKind::MalformedSignatureHeader => "malformed_signature_header",
            ErrorKind::SignatureMismatch => "signature_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to produce a usable [`ServerConfig`](crate::config::ServerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not open config file: neither {} nor {} exists", primary.display(), fallback.display())]
    NotFound { primary: PathBuf, fallback: PathBuf },

    #[error("could not read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not unmarshal config content from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ConfigLoadFailure
    }
}
