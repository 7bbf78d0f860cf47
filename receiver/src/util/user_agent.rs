//! Recognising GitHub's webhook delivery agent.

/// Every GitHub webhook delivery carries a `User-Agent` starting with this.
pub const GITHUB_USER_AGENT_PREFIX: &str = "GitHub-Hookshot/";

/// Whether `user_agent` identifies GitHub's webhook sender.
pub fn is_github_hookshot(user_agent: &str) -> bool {
    user_agent.starts_with(GITHUB_USER_AGENT_PREFIX)
}
