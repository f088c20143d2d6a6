//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Carry the event service and poll presentation
//! - 1.0.0: Initial implementation with core shared state

use crate::core::EventPresentation;
use crate::features::events::EventService;

/// Shared context for all command and component handlers
#[derive(Clone)]
pub struct CommandContext {
    pub service: EventService,
    pub presentation: EventPresentation,
}

impl CommandContext {
    pub fn new(service: EventService, presentation: EventPresentation) -> Self {
        Self {
            service,
            presentation,
        }
    }

    pub fn capacity(&self) -> usize {
        self.service.capacity()
    }
}
