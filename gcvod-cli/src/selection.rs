// Interactive team and game selection.

use anyhow::Context;
use chrono::Local;
use colored::Colorize;
use gamechanger_api::models::{Event, PlaybackRendition, ScheduleEntry, Team};
use gamechanger_api::{ApiError, GameChangerClient};
use inquire::Select;

/// Outcome of probing one event for downloadable video.
enum VideoAvailability {
    Available(Vec<PlaybackRendition>),
    Unavailable,
}

/// Keeps the schedule entries that are scheduled games with a start time,
/// in schedule order.
pub fn scheduled_games(schedule: Vec<ScheduleEntry>) -> Vec<Event> {
    schedule
        .into_iter()
        .map(|entry| entry.event)
        .filter(Event::is_downloadable_game)
        .collect()
}

pub fn pick_team(teams: &[Team]) -> anyhow::Result<&Team> {
    anyhow::ensure!(!teams.is_empty(), "this account has no teams");

    let labels: Vec<String> = teams.iter().map(|team| team.name.clone()).collect();
    let choice = Select::new("Select a team:", labels)
        .raw_prompt()
        .context("team selection aborted")?;
    Ok(&teams[choice.index])
}

/// Event-selection loop: prompt, probe the event for video, and re-prompt
/// while the chosen event has nothing downloadable. Transport failures end
/// the loop instead of re-prompting.
pub async fn pick_event_with_videos<'a>(
    api: &GameChangerClient,
    team_id: &str,
    games: &'a [Event],
) -> anyhow::Result<(&'a Event, Vec<PlaybackRendition>)> {
    loop {
        let labels: Vec<String> = games.iter().map(event_label).collect();
        let choice = Select::new("Select a game to download:", labels)
            .raw_prompt()
            .context("event selection aborted")?;
        let event = &games[choice.index];

        match check_event_videos(api, team_id, &event.id).await? {
            VideoAvailability::Available(renditions) => return Ok((event, renditions)),
            VideoAvailability::Unavailable => {
                println!(
                    "\n{}",
                    "No video streams for that event (or no permission to view them). Pick another."
                        .yellow()
                );
            }
        }
    }
}

/// Probes the two video endpoints for an event. A status outside the API
/// allow-list means "nothing to download here" and maps to `Unavailable`, as
/// does an empty rendition list; transport errors propagate.
async fn check_event_videos(
    api: &GameChangerClient,
    team_id: &str,
    event_id: &str,
) -> Result<VideoAvailability, ApiError> {
    if let Err(err) = api.video_stream_assets(team_id, event_id).await {
        return if err.is_unexpected_status() {
            Ok(VideoAvailability::Unavailable)
        } else {
            Err(err)
        };
    }

    match api.video_stream_playback(team_id, event_id).await {
        Ok(renditions) if renditions.is_empty() => Ok(VideoAvailability::Unavailable),
        Ok(renditions) => Ok(VideoAvailability::Available(renditions)),
        Err(err) if err.is_unexpected_status() => Ok(VideoAvailability::Unavailable),
        Err(err) => Err(err),
    }
}

fn event_label(event: &Event) -> String {
    match event.start.as_ref().and_then(|start| start.datetime) {
        Some(start) => format!(
            "{} {}",
            start.with_timezone(&Local).format("%Y-%m-%d %I:%M%p"),
            event.title
        ),
        None => event.title.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_fixture() -> Vec<ScheduleEntry> {
        serde_json::from_str(
            r#"[
                {"event": {"id": "g1", "title": "vs. Hawks", "event_type": "game", "status": "scheduled", "start": {"datetime": "2025-05-04T22:30:00Z"}}},
                {"event": {"id": "p1", "title": "Practice", "event_type": "practice", "status": "scheduled", "start": {"datetime": "2025-05-05T22:30:00Z"}}},
                {"event": {"id": "g2", "title": "vs. Comets", "event_type": "game", "status": "canceled", "start": {"datetime": "2025-05-06T22:30:00Z"}}},
                {"event": {"id": "g3", "title": "TBD scrimmage", "event_type": "game", "status": "scheduled", "start": {}}},
                {"event": {"id": "g4", "title": "vs. Royals", "event_type": "game", "status": "scheduled", "start": {"datetime": "2025-05-07T22:30:00Z"}}}
            ]"#,
        )
        .expect("fixture should deserialize")
    }

    #[test]
    fn only_scheduled_games_with_start_times_survive() {
        let games = scheduled_games(schedule_fixture());

        let ids: Vec<&str> = games.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, ["g1", "g4"], "order must follow the schedule");
    }

    #[test]
    fn label_falls_back_to_the_title_without_a_start_time() {
        let games = scheduled_games(schedule_fixture());
        let mut event = games[0].clone();
        event.start = None;

        assert_eq!(event_label(&event), "vs. Hawks");
    }
}
