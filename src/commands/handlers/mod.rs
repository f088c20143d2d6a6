//! Per-command handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 3.0.0: EventCommandHandler (event, event_status, event_cancel_all)
//! - 1.0.0: Initial extraction from monolithic command_handler.rs

pub mod events;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![Arc::new(events::EventCommandHandler)]
}
