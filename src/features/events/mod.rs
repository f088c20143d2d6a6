//! # Events Feature
//!
//! Scheduled event polls with capacity-limited RSVPs, a reminder ping when
//! the event is about to start, and deferred cleanup afterwards.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod buttons;
pub mod cleanup;
pub mod due_loop;
pub mod engine;
pub mod error;
pub mod model;
pub mod platform;
pub mod rsvp;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use buttons::{create_poll_buttons, parse_rsvp_button, ATTEND_BUTTON_ID, DECLINE_BUTTON_ID};
pub use cleanup::CleanupScheduler;
pub use due_loop::{DueWorker, LoopTiming, WakeSignal};
pub use engine::EventEngine;
pub use error::{EventError, PlatformError};
pub use model::{Event, Roster, Signup, SignupStatus};
pub use platform::{ChatPlatform, PollState, SerenityPlatform};
pub use scheduler::ReminderScheduler;
pub use service::EventService;
pub use store::{EventStore, ReminderStore, SignupStore};
pub use timing::{next_occurrence, parse_weekday};

#[cfg(test)]
mod tests {
    use super::testing::{PlatformCall, RecordingPlatform};
    use super::*;
    use crate::core::{EventPresentation, SchedulerSettings};
    use crate::database::Database;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn settings(capacity: usize, retention: Duration) -> SchedulerSettings {
        SchedulerSettings {
            capacity,
            retention,
            idle_recheck: Duration::from_secs(60),
            fault_pause: Duration::from_millis(10),
            thread_name: "Pings".to_string(),
        }
    }

    #[tokio::test]
    async fn test_event_lifecycle_end_to_end() {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        let platform = Arc::new(RecordingPlatform::new());
        let engine = EventEngine::start(
            db.clone(),
            platform.clone(),
            settings(2, Duration::from_millis(1200)),
            EventPresentation::default(),
        );
        let service = engine.service();

        let due = Utc::now() + chrono::Duration::milliseconds(300);
        service.create_event(1, 10, due).await.unwrap();

        service.set_rsvp(1, 101, SignupStatus::Accepted).await.unwrap();
        let roster = service.set_rsvp(1, 102, SignupStatus::Accepted).await.unwrap();
        assert_eq!(roster.accepted, vec![101, 102]);
        let err = service.set_rsvp(1, 103, SignupStatus::Accepted).await.unwrap_err();
        assert!(matches!(err, EventError::CapacityExceeded { event_id: 1, capacity: 2 }));

        // Fired, not yet cleaned up
        sleep(Duration::from_millis(900)).await;
        let sent = platform.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("<@101>"));
        assert!(sent[0].1.contains("<@102>"));
        assert!(!sent[0].1.contains("<@103>"));
        let event = db.get_event(1).await.unwrap().unwrap();
        assert!(!event.active);
        assert!(service.list_active().await.unwrap().is_empty());

        // Retention elapsed
        sleep(Duration::from_millis(1600)).await;
        assert!(db.get_event(1).await.unwrap().is_none());
        assert!(db.list_signups(1).await.unwrap().is_empty());
        assert!(platform
            .calls()
            .contains(&PlatformCall::DeleteMessage { message_id: 1 }));

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_early_insert_preempts_armed_timer() {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        let platform = Arc::new(RecordingPlatform::new());
        let engine = EventEngine::start(
            db.clone(),
            platform.clone(),
            settings(5, Duration::from_secs(60)),
            EventPresentation::default(),
        );
        let service = engine.service();

        let far = Utc::now() + chrono::Duration::hours(1);
        service.create_event(1, 10, far).await.unwrap();
        sleep(Duration::from_millis(50)).await;

        let near = Utc::now() + chrono::Duration::milliseconds(100);
        service.create_event(2, 10, near).await.unwrap();
        sleep(Duration::from_millis(500)).await;

        assert!(!db.get_event(2).await.unwrap().unwrap().active);
        assert!(db.get_event(1).await.unwrap().unwrap().active);

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_restart_recovers_overdue_work() {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        let past = Utc::now() - chrono::Duration::minutes(5);

        // Fired before the restart, cleanup never ran
        db.insert_event(&Event::new(1, 10, past)).await.unwrap();
        db.deactivate(1, Some(77), past).await.unwrap();
        // Due while the process was down
        db.insert_event(&Event::new(2, 10, past)).await.unwrap();
        db.insert_event(&Event::new(3, 10, past)).await.unwrap();

        let platform = Arc::new(RecordingPlatform::new());
        platform.mark_failing(2);
        let engine = EventEngine::start(
            db.clone(),
            platform.clone(),
            settings(5, Duration::from_secs(60)),
            EventPresentation::default(),
        );
        sleep(Duration::from_millis(300)).await;

        assert!(db.get_event(1).await.unwrap().is_none());
        assert!(platform
            .calls()
            .contains(&PlatformCall::DeleteThread { thread_id: 77 }));

        // One event's platform failure does not hold back the other
        assert!(!db.get_event(2).await.unwrap().unwrap().active);
        assert!(!db.get_event(3).await.unwrap().unwrap().active);
        assert_eq!(platform.sent().len(), 1);

        engine.shutdown();
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_prior_cancel() {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        let platform = Arc::new(RecordingPlatform::new());
        let engine = EventEngine::start(
            db.clone(),
            platform.clone(),
            settings(5, Duration::from_millis(100)),
            EventPresentation::default(),
        );
        let service = engine.service();

        service
            .create_event(1, 10, Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();
        sleep(Duration::from_millis(50)).await;
        service.cancel_all().await.unwrap();
        sleep(Duration::from_millis(300)).await;

        assert!(db.get_event(1).await.unwrap().is_none());
        engine.shutdown();
    }
}
