//! Event and signup records

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use super::error::EventError;

/// A scheduled reminder, keyed by the id of the poll message that announced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub message_id: u64,
    pub channel_id: u64,
    pub due_at: DateTime<Utc>,
    pub active: bool,
    /// Set when the reminder fires; cleanup runs once this passes
    pub cleanup_due_at: Option<DateTime<Utc>>,
    /// Discussion thread opened when the reminder fired
    pub thread_id: Option<u64>,
}

impl Event {
    pub fn new(message_id: u64, channel_id: u64, due_at: DateTime<Utc>) -> Self {
        Self {
            message_id,
            channel_id,
            due_at,
            active: true,
            cleanup_due_at: None,
            thread_id: None,
        }
    }

    /// When the event itself starts, given how far ahead the reminder fires
    pub fn starts_at(
        &self,
        reminder_lead: std::time::Duration,
    ) -> Result<DateTime<Utc>, EventError> {
        offset(self.due_at, reminder_lead)
    }
}

/// `at + by`, or `OutOfRange` past chrono's representable range
pub fn offset(at: DateTime<Utc>, by: std::time::Duration) -> Result<DateTime<Utc>, EventError> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|by| at.checked_add_signed(by))
        .ok_or_else(|| EventError::OutOfRange(format!("{at} + {by:?}")))
}

/// A user's response to an event poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignupStatus {
    Accepted,
    Declined,
}

impl SignupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupStatus::Accepted => "accepted",
            SignupStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for SignupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignupStatus {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(SignupStatus::Accepted),
            "declined" => Ok(SignupStatus::Declined),
            other => Err(EventError::Corrupt(format!("unknown signup status {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signup {
    pub user_id: u64,
    pub status: SignupStatus,
}

/// Accepted and declined user ids for one event, in signup order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub accepted: Vec<u64>,
    pub declined: Vec<u64>,
}

impl Roster {
    pub fn from_signups(signups: &[Signup]) -> Self {
        let (accepted, declined): (Vec<&Signup>, Vec<&Signup>) = signups
            .iter()
            .partition(|s| s.status == SignupStatus::Accepted);

        Self {
            accepted: accepted.into_iter().map(|s| s.user_id).collect(),
            declined: declined.into_iter().map(|s| s.user_id).collect(),
        }
    }
}

/// Timestamps are persisted as Unix milliseconds
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, EventError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| EventError::Corrupt(format!("timestamp out of range: {ms}")))
}
