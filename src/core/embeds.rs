//! Event embed builders for Discord responses
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Roster fields truncate instead of overflowing the field limit
//! - 1.0.0: Poll and status embeds

use chrono::{DateTime, Utc};
use serenity::builder::CreateEmbed;

use crate::core::response::{mention_field, FIELD_LIMIT};
use crate::core::EventPresentation;
use crate::features::events::model::{Event, Roster};

/// Accent color for every event embed
pub const EVENT_COLOR: u32 = 0x9B59B6;

/// "Saturday 14:00 UTC"
pub fn describe_event_time(starts_at: DateTime<Utc>) -> String {
    starts_at.format("%A %H:%M UTC").to_string()
}

pub fn accepted_heading(roster: &Roster, capacity: usize) -> String {
    format!("✅ Accepted ({}/{capacity})", roster.accepted.len())
}

pub fn declined_heading(roster: &Roster) -> String {
    format!("❌ Declined ({})", roster.declined.len())
}

/// The poll message: title, event time, and the two roster columns
pub fn poll_embed(
    presentation: &EventPresentation,
    starts_at: DateTime<Utc>,
    roster: &Roster,
    capacity: usize,
) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.title(&presentation.title);
    embed.description(describe_event_time(starts_at));
    embed.color(EVENT_COLOR);

    if let Some(footer) = &presentation.footer {
        embed.footer(|f| f.text(footer));
    }
    if let Some(url) = &presentation.image_url {
        embed.image(url);
    }

    embed.field(
        accepted_heading(roster, capacity),
        mention_field(&roster.accepted, FIELD_LIMIT),
        true,
    );
    embed.field(
        declined_heading(roster),
        mention_field(&roster.declined, FIELD_LIMIT),
        true,
    );
    embed
}

/// One line per active event, for the status listing
pub fn status_lines(events: &[Event], reminder_lead: std::time::Duration) -> String {
    events
        .iter()
        .map(|event| {
            let when = event
                .starts_at(reminder_lead)
                .map_or_else(|_| "time out of range".to_string(), describe_event_time);
            format!("🆔 `{}` - {when}", event.message_id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_embed(events: &[Event], reminder_lead: std::time::Duration) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.title("Active Events");
    embed.description(status_lines(events, reminder_lead));
    embed.color(EVENT_COLOR);
    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn saturday_14() -> DateTime<Utc> {
        // 2025-11-08 was a Saturday
        Utc.with_ymd_and_hms(2025, 11, 8, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_describe_event_time() {
        assert_eq!(describe_event_time(saturday_14()), "Saturday 14:00 UTC");
    }

    #[test]
    fn test_roster_headings() {
        let roster = Roster {
            accepted: vec![1, 2],
            declined: vec![3],
        };
        assert_eq!(accepted_heading(&roster, 30), "✅ Accepted (2/30)");
        assert_eq!(declined_heading(&roster), "❌ Declined (1)");
    }

    #[test]
    fn test_status_lines_use_event_start() {
        let reminder = saturday_14() - chrono::Duration::hours(1);
        let events = vec![Event::new(42, 7, reminder)];

        let lines = status_lines(&events, Duration::from_secs(3600));
        assert_eq!(lines, "🆔 `42` - Saturday 14:00 UTC");
    }

    #[test]
    fn test_status_lines_tolerate_unrepresentable_start() {
        let events = vec![
            Event::new(1, 7, DateTime::<Utc>::MAX_UTC),
            Event::new(42, 7, saturday_14() - chrono::Duration::hours(1)),
        ];

        let lines = status_lines(&events, Duration::from_secs(3600));
        assert_eq!(
            lines,
            "🆔 `1` - time out of range\n🆔 `42` - Saturday 14:00 UTC"
        );
    }

    #[test]
    fn test_poll_embed_builds_with_optional_parts() {
        let mut presentation = EventPresentation::default();
        let roster = Roster::default();
        let _embed = poll_embed(&presentation, saturday_14(), &roster, 30);

        presentation.footer = Some("Kingdom 3558".to_string());
        presentation.image_url = Some("https://example.com/banner.png".to_string());
        let _embed = poll_embed(&presentation, saturday_14(), &roster, 30);
    }
}
