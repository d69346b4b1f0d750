use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "wordfreq/0.1 (+https://github.com/wordfreq/wordfreq)";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout. `None` leaves the HTTP client's default (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub max_redirects: usize,
    /// Image fetches in flight at once; 1 fetches them strictly one after another.
    pub image_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            image_concurrency: 1,
        }
    }
}
