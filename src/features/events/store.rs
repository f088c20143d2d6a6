//! Store interfaces for events and signups
//!
//! Every method is atomic on its own: implementations serialize all calls
//! behind one lock, so composite steps (capacity check + upsert, signup +
//! event deletion) never interleave with other callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::EventError;
use super::model::{Event, Signup, SignupStatus};

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new active event; `DuplicateKey` if the id is taken
    async fn insert_event(&self, event: &Event) -> Result<(), EventError>;

    async fn get_event(&self, message_id: u64) -> Result<Option<Event>, EventError>;

    /// Active event with the earliest due time
    async fn next_due(&self) -> Result<Option<Event>, EventError>;

    /// All active events due at or before `now`, in no particular order
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventError>;

    /// Active events ordered by due time
    async fn list_active(&self) -> Result<Vec<Event>, EventError>;

    /// Flip an event to inactive and arm its cleanup.
    ///
    /// Returns `true` only for the call that performed the flip.
    async fn deactivate(
        &self,
        message_id: u64,
        thread_id: Option<u64>,
        cleanup_due_at: DateTime<Utc>,
    ) -> Result<bool, EventError>;

    /// Remove the event row; absent rows are not an error
    async fn delete_event(&self, message_id: u64) -> Result<(), EventError>;

    /// Remove every active event along with its signups
    async fn delete_all_active(&self) -> Result<Vec<Event>, EventError>;

    /// Earliest pending cleanup among inactive events
    async fn next_cleanup_due(&self) -> Result<Option<DateTime<Utc>>, EventError>;

    /// Inactive events whose cleanup is due at or before `now`
    async fn list_cleanup_due(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventError>;

    /// Delete an event's signups and row in one step.
    ///
    /// Returns whether the event row still existed.
    async fn purge_event(&self, message_id: u64) -> Result<bool, EventError>;
}

#[async_trait]
pub trait SignupStore: Send + Sync {
    async fn accepted_count(&self, message_id: u64) -> Result<usize, EventError>;

    /// Insert or overwrite a user's status for an event
    async fn upsert_signup(
        &self,
        message_id: u64,
        user_id: u64,
        status: SignupStatus,
    ) -> Result<(), EventError>;

    /// Signups for an event in first-response order
    async fn list_signups(&self, message_id: u64) -> Result<Vec<Signup>, EventError>;

    async fn delete_signups(&self, message_id: u64) -> Result<(), EventError>;

    /// Capacity-gated upsert followed by a read-back of all signups.
    ///
    /// Accepting is rejected with `CapacityExceeded` when the event already
    /// holds `capacity` accepted users, unless this user is one of them.
    async fn apply_rsvp(
        &self,
        message_id: u64,
        user_id: u64,
        status: SignupStatus,
        capacity: usize,
    ) -> Result<Vec<Signup>, EventError>;
}

/// Both stores behind one handle
pub trait ReminderStore: EventStore + SignupStore {}

impl<T: EventStore + SignupStore> ReminderStore for T {}
