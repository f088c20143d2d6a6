//! # Features
//!
//! - **events**: event polls, RSVPs, reminders and cleanup

pub mod events;
