use reqwest::StatusCode;

/// Host of the team-manager API.
pub const DEFAULT_BASE_DOMAIN: &str = "api.team-manager.gc.com";

/// User agent sent with every API request.
pub const USER_AGENT: &str = concat!("gcvod/", env!("CARGO_PKG_VERSION"));

/// The API signals success with exactly these statuses; anything else is an
/// [`ApiError::UnexpectedStatus`](crate::ApiError::UnexpectedStatus).
pub const SUCCESS_RESPONSE_CODES: [StatusCode; 3] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::NO_CONTENT,
];

pub const ENV_USERNAME: &str = "GC_USERNAME";
pub const ENV_PASSWORD: &str = "GC_PASSWORD";
pub const ENV_TOKEN: &str = "GC_TOKEN";

/// Account credentials for the team-manager API.
///
/// Only the token is attached to requests; username and password are carried
/// for completeness but the interactive auth exchange is not implemented.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl Credentials {
    /// Fills any missing field from the `GC_USERNAME`, `GC_PASSWORD` and
    /// `GC_TOKEN` environment variables.
    pub fn or_env(self) -> Self {
        Self {
            username: self.username.or_else(|| std::env::var(ENV_USERNAME).ok()),
            password: self.password.or_else(|| std::env::var(ENV_PASSWORD).ok()),
            token: self.token.or_else(|| std::env::var(ENV_TOKEN).ok()),
        }
    }
}
