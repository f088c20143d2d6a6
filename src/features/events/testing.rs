//! Recording [`ChatPlatform`] fake for scheduler and service tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::error::PlatformError;
use super::platform::{ChatPlatform, PollState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    FetchMessage { channel_id: u64, message_id: u64 },
    CreateThread { message_id: u64, name: String },
    SendMessage { destination: u64, text: String },
    DeleteMessage { message_id: u64 },
    DeleteThread { thread_id: u64 },
    EditView { message_id: u64, accepted: usize, declined: usize },
}

/// Records every call; messages listed in `missing` answer `NotFound` and
/// messages in `failing` answer `Request`.
#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    missing: Mutex<HashSet<u64>>,
    failing: Mutex<HashSet<u64>>,
    next_thread: AtomicU64,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            next_thread: AtomicU64::new(9_000),
            ..Self::default()
        }
    }

    pub fn mark_missing(&self, message_id: u64) {
        self.missing.lock().unwrap().insert(message_id);
    }

    pub fn mark_failing(&self, message_id: u64) {
        self.failing.lock().unwrap().insert(message_id);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Text of every message sent, in order
    pub fn sent(&self) -> Vec<(u64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::SendMessage { destination, text } => Some((destination, text)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, id: u64) -> Result<(), PlatformError> {
        if self.missing.lock().unwrap().contains(&id) {
            return Err(PlatformError::NotFound(format!("message {id}")));
        }
        if self.failing.lock().unwrap().contains(&id) {
            return Err(PlatformError::Request(format!("message {id}: 500")));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        self.record(PlatformCall::FetchMessage { channel_id, message_id });
        self.check(message_id)
    }

    async fn create_thread(
        &self,
        _channel_id: u64,
        message_id: u64,
        name: &str,
    ) -> Result<u64, PlatformError> {
        self.record(PlatformCall::CreateThread {
            message_id,
            name: name.to_string(),
        });
        self.check(message_id)?;
        Ok(self.next_thread.fetch_add(1, Ordering::SeqCst))
    }

    async fn send_message(&self, destination: u64, text: &str) -> Result<(), PlatformError> {
        self.record(PlatformCall::SendMessage {
            destination,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, _channel_id: u64, message_id: u64) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteMessage { message_id });
        self.check(message_id)
    }

    async fn delete_thread(&self, thread_id: u64) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteThread { thread_id });
        Ok(())
    }

    async fn edit_message_view(
        &self,
        _channel_id: u64,
        message_id: u64,
        poll: &PollState<'_>,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::EditView {
            message_id,
            accepted: poll.roster.accepted.len(),
            declined: poll.roster.declined.len(),
        });
        self.check(message_id)
    }
}
