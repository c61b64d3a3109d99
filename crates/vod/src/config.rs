use std::time::Duration;

use reqwest::header::HeaderMap;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// Options shared by every manifest and segment fetch of a run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout. `None` leaves requests unbounded, so an
    /// unresponsive host blocks until the connection drops.
    pub timeout: Option<Duration>,

    /// Extra headers attached to every request.
    pub headers: HeaderMap,

    /// Verify TLS certificates. Turn off only for hosts with broken chains.
    pub verify_tls: bool,

    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            headers: HeaderMap::new(),
            verify_tls: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}
