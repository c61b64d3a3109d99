use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::config::{Credentials, DEFAULT_BASE_DOMAIN, SUCCESS_RESPONSE_CODES, USER_AGENT};
use crate::error::ApiError;
use crate::models::{PlaybackRendition, ScheduleEntry, Team};

/// Client for the team-manager API.
///
/// Holds one `reqwest::Client` for the whole session. Every request carries
/// the account token (when present) in the `gc-token` header, and any
/// response status outside [`SUCCESS_RESPONSE_CODES`] surfaces as
/// [`ApiError::UnexpectedStatus`].
pub struct GameChangerClient {
    base_url: String,
    credentials: Credentials,
    client_id: Uuid,
    http: Client,
}

impl GameChangerClient {
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_base_url(format!("https://{DEFAULT_BASE_DOMAIN}"), credentials)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        let client_id = Uuid::new_v4();
        debug!(%client_id, "created API client");

        Ok(Self {
            base_url: base_url.into(),
            credentials,
            client_id,
            http,
        })
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Teams the account is a member of.
    pub async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get_json("/me/teams").await
    }

    /// Full schedule of a team, games and otherwise.
    pub async fn team_schedule(&self, team_id: &str) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.get_json(&format!("/teams/{team_id}/schedule")).await
    }

    /// Video-stream asset listing for an event. The payload shape is not
    /// ours; callers only care whether the call succeeds.
    pub async fn video_stream_assets(
        &self,
        team_id: &str,
        event_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!(
            "/teams/{team_id}/schedule/events/{event_id}/video-stream/assets"
        ))
        .await
    }

    /// Playback info for an event: one entry per rendition, each with the CDN
    /// cookies and manifest URL needed to fetch it.
    pub async fn video_stream_playback(
        &self,
        team_id: &str,
        event_id: &str,
    ) -> Result<Vec<PlaybackRendition>, ApiError> {
        self.get_json(&format!(
            "/teams/{team_id}/schedule/events/{event_id}/video-stream/assets/playback"
        ))
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");

        let mut request = self.http.get(&url);
        if let Some(token) = &self.credentials.token {
            request = request.header("gc-token", token);
        }

        let response = request.send().await?;
        check_response_status(&response)?;
        Ok(response.json().await?)
    }
}

fn check_response_status(response: &Response) -> Result<(), ApiError> {
    ensure_expected_status(response.status(), response.url().as_str())
}

fn ensure_expected_status(status: StatusCode, url: &str) -> Result<(), ApiError> {
    if SUCCESS_RESPONSE_CODES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::UnexpectedStatus {
            status,
            url: url.to_string(),
        })
    }
}
