//! # Event Poll Buttons
//!
//! Attend/decline controls attached to every event poll.

use serenity::builder::CreateComponents;
use serenity::model::application::component::ButtonStyle;

use super::model::SignupStatus;

/// Button IDs for routing
pub const ATTEND_BUTTON_ID: &str = "event_attend_btn";
pub const DECLINE_BUTTON_ID: &str = "event_decline_btn";

/// Create the single RSVP row shown under a poll
pub fn create_poll_buttons() -> CreateComponents {
    let mut components = CreateComponents::default();

    components.create_action_row(|row| {
        row.create_button(|btn| {
            btn.custom_id(ATTEND_BUTTON_ID)
                .label("Attend")
                .emoji('✅')
                .style(ButtonStyle::Success)
        })
        .create_button(|btn| {
            btn.custom_id(DECLINE_BUTTON_ID)
                .label("Decline")
                .emoji('❌')
                .style(ButtonStyle::Danger)
        })
    });

    components
}

/// Map a button custom_id to the status it requests
pub fn parse_rsvp_button(custom_id: &str) -> Option<SignupStatus> {
    match custom_id {
        ATTEND_BUTTON_ID => Some(SignupStatus::Accepted),
        DECLINE_BUTTON_ID => Some(SignupStatus::Declined),
        _ => None,
    }
}
