//! Small helpers shared by the webhook handler.

pub mod pretty;
pub mod user_agent;

pub use pretty::pretty_payload;
pub use user_agent::{is_github_hookshot, GITHUB_USER_AGENT_PREFIX};
