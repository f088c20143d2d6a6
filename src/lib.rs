// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// UI components
pub mod message_components;

// Infrastructure
pub mod database;

// Application layer
pub mod command_handler;
pub mod commands;

pub use core::Config;

pub use features::events::{
    ChatPlatform, Event, EventEngine, EventError, EventService, PlatformError, Roster,
    SerenityPlatform, SignupStatus,
};
