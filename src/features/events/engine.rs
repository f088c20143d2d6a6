//! Wires the store, both timer queues and the service together

use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::cleanup::CleanupScheduler;
use super::due_loop::{run_due_loop, LoopTiming, WakeSignal};
use super::platform::ChatPlatform;
use super::scheduler::ReminderScheduler;
use super::service::EventService;
use super::store::ReminderStore;
use crate::core::{EventPresentation, SchedulerSettings};

/// Running reminder and cleanup loops plus the service that feeds them
pub struct EventEngine {
    service: EventService,
    tasks: Vec<JoinHandle<()>>,
}

impl EventEngine {
    /// Spawn both loops on the current runtime
    pub fn start(
        store: Arc<dyn ReminderStore>,
        platform: Arc<dyn ChatPlatform>,
        settings: SchedulerSettings,
        presentation: EventPresentation,
    ) -> Self {
        let timing = LoopTiming {
            idle_recheck: settings.idle_recheck,
            fault_pause: settings.fault_pause,
        };
        let reminder_wake = WakeSignal::new();
        let cleanup_wake = WakeSignal::new();

        let service = EventService::new(
            store.clone(),
            platform.clone(),
            reminder_wake.clone(),
            settings.capacity,
        );

        let reminders = Arc::new(ReminderScheduler::new(
            store.clone(),
            platform.clone(),
            settings,
            presentation,
            cleanup_wake.clone(),
        ));
        let cleanup = Arc::new(CleanupScheduler::new(store, platform));

        let tasks = vec![
            tokio::spawn(run_due_loop(reminders, reminder_wake, timing)),
            tokio::spawn(run_due_loop(cleanup, cleanup_wake, timing)),
        ];

        info!("🚀 Event engine started");
        Self { service, tasks }
    }

    pub fn service(&self) -> EventService {
        self.service.clone()
    }

    /// Stop both loops. In-flight cycles are dropped; every step they take
    /// is idempotent so the next start picks up where they left off.
    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
        info!("Event engine stopped");
    }
}
