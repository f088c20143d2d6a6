//! # Core Module
//!
//! Configuration, embed builders and Discord formatting helpers.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add embeds module for poll and status rendering
//! - 1.0.0: Initial creation with config and response modules

pub mod config;
pub mod embeds;
pub mod response;

// Re-export commonly used items
pub use config::{Config, EventPresentation, SchedulerSettings};
pub use response::{chunk_words, mention, mention_field, FIELD_LIMIT, MESSAGE_LIMIT};
