use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A team the authenticated account belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of a team's schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntry {
    pub event: Event,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub event_type: EventType,
    pub status: EventStatus,
    #[serde(default)]
    pub start: Option<EventStart>,
}

impl Event {
    /// A game that is still on the schedule and has a concrete start time.
    pub fn is_downloadable_game(&self) -> bool {
        self.event_type == EventType::Game
            && self.status == EventStatus::Scheduled
            && self.start.as_ref().is_some_and(|s| s.datetime.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Game,
    Practice,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Canceled,
    #[serde(other)]
    Other,
}

/// Start descriptor of an event. Events without a fixed start time omit
/// `datetime`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventStart {
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
}

/// One playable stream returned by the playback-info endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackRendition {
    /// CDN auth cookies that must accompany every manifest and segment fetch.
    pub cookies: HashMap<String, String>,
    /// Master manifest URL for this rendition.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_entry_without_start_datetime_deserializes() {
        let entry: ScheduleEntry = serde_json::from_str(
            r#"{"event": {"id": "ev1", "title": "vs. Hawks", "event_type": "game", "status": "scheduled", "start": {}}}"#,
        )
        .expect("entry should deserialize");

        assert_eq!(entry.event.id, "ev1");
        assert!(entry.event.start.as_ref().expect("start present").datetime.is_none());
        assert!(!entry.event.is_downloadable_game());
    }

    #[test]
    fn unknown_event_type_and_status_fall_back() {
        let event: Event = serde_json::from_str(
            r#"{"id": "ev2", "title": "Team photo", "event_type": "photo_day", "status": "postponed"}"#,
        )
        .expect("event should deserialize");

        assert_eq!(event.event_type, EventType::Other);
        assert_eq!(event.status, EventStatus::Other);
        assert!(!event.is_downloadable_game());
    }

    #[test]
    fn scheduled_game_with_datetime_is_downloadable() {
        let event: Event = serde_json::from_str(
            r#"{
                "id": "ev3",
                "title": "vs. Comets",
                "event_type": "game",
                "status": "scheduled",
                "start": {"datetime": "2025-05-04T22:30:00Z"}
            }"#,
        )
        .expect("event should deserialize");

        assert!(event.is_downloadable_game());
    }

    #[test]
    fn playback_rendition_carries_cookies_and_url() {
        let rendition: PlaybackRendition = serde_json::from_str(
            r#"{"cookies": {"CloudFront-Key-Pair-Id": "APK123", "CloudFront-Signature": "sig"}, "url": "https://cdn.example.com/v/master.m3u8"}"#,
        )
        .expect("rendition should deserialize");

        assert_eq!(rendition.cookies.len(), 2);
        assert_eq!(rendition.url, "https://cdn.example.com/v/master.m3u8");
    }
}
