//! Error taxonomy for the event engine

use thiserror::Error;

/// Errors surfaced by the stores and the RSVP protocol
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event {0} already exists")]
    DuplicateKey(u64),

    #[error("Event {event_id} is full ({capacity} accepted)")]
    CapacityExceeded { event_id: u64, capacity: usize },

    #[error("Event {0} not found")]
    UnknownEvent(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlite::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Timestamp arithmetic left the representable range
    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Failures reported by the chat platform
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The message, thread or channel no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Platform request failed: {0}")]
    Request(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound(_))
    }
}
