//! RSVP mutation: capacity-gated status change plus a fresh roster

use log::debug;

use super::error::EventError;
use super::model::{Roster, SignupStatus};
use super::store::SignupStore;

/// Record `user_id`'s response and return the resulting roster.
///
/// Accepting a full event fails with `CapacityExceeded` without touching
/// stored state. Repeating the current status changes nothing.
pub async fn set_rsvp<S: SignupStore + ?Sized>(
    store: &S,
    message_id: u64,
    user_id: u64,
    status: SignupStatus,
    capacity: usize,
) -> Result<Roster, EventError> {
    let signups = store
        .apply_rsvp(message_id, user_id, status, capacity)
        .await?;
    let roster = Roster::from_signups(&signups);

    debug!(
        "RSVP {status} by {user_id} on {message_id}: {} accepted, {} declined",
        roster.accepted.len(),
        roster.declined.len()
    );
    Ok(roster)
}
