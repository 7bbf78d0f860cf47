//! Hookshot - minimal receiver for signed GitHub webhooks.
//!
//! This library provides the modules behind the `hookshot` binary:
//! - `config`: the TOML configuration file, with fallback to the shipped default
//! - `web`: the single webhook route and its HMAC-SHA256 signature check
//! - `util`: user agent recognition and payload rendering for the log
//!
//! ## Flow
//!
//! ```text
//! POST <hook_path> → bind headers → User-Agent check → verify signature → log → 200 / 403
//! ```

pub mod config;
pub mod error;
pub mod util;
pub mod web;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{ConfigError, ErrorKind};
pub use web::{build_router, verify_signature, AppState, SignatureError, Verified, WebhookError};
