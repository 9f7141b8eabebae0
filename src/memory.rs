use crate::alert::{AlertError, AlertSink};
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// A [`LogSink`] that keeps everything in process memory.
///
/// Useful for running the relay locally without cloud credentials and
/// for tests. Individual operations can be made to fail with
/// [`MemoryLogSink::fail_on`].
#[derive(Default)]
pub struct MemoryLogSink {
    state: Mutex<MemoryLogs>,
    fail_on: HashSet<SinkOp>,
}

#[derive(Default)]
struct MemoryLogs {
    groups: HashMap<String, u32>,
    streams: HashMap<(String, String), Vec<StoredEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkOp {
    EnsureGroup,
    EnsureStream,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub timestamp_ms: i64,
    pub message: String,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with [`SinkError::Backend`].
    pub fn fail_on(mut self, op: SinkOp) -> Self {
        self.fail_on.insert(op);
        self
    }

    /// Retention days the group was created with.
    pub fn retention(&self, group: &str) -> Option<u32> {
        self.lock().groups.get(group).copied()
    }

    pub fn has_stream(&self, group: &str, stream: &str) -> bool {
        self.lock()
            .streams
            .contains_key(&(group.to_string(), stream.to_string()))
    }

    pub fn entries(&self, group: &str, stream: &str) -> Vec<StoredEntry> {
        self.lock()
            .streams
            .get(&(group.to_string(), stream.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of entries across all streams.
    pub fn total_entries(&self) -> usize {
        self.lock().streams.values().map(Vec::len).sum()
    }

    fn check(&self, op: SinkOp) -> Result<(), SinkError> {
        if self.fail_on.contains(&op) {
            return Err(SinkError::Backend(format!("injected failure on {:?}", op)));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, MemoryLogs> {
        // Every mutation is a single insert or push, so a poisoned lock is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn ensure_group(&self, name: &str, retention_days: u32) -> Result<(), SinkError> {
        self.check(SinkOp::EnsureGroup)?;
        let mut state = self.lock();
        if state.groups.contains_key(name) {
            return Err(SinkError::AlreadyExists(name.to_string()));
        }
        state.groups.insert(name.to_string(), retention_days);
        Ok(())
    }

    async fn ensure_stream(&self, group: &str, stream: &str) -> Result<(), SinkError> {
        self.check(SinkOp::EnsureStream)?;
        let mut state = self.lock();
        if !state.groups.contains_key(group) {
            return Err(SinkError::Backend(format!("log group {} does not exist", group)));
        }
        let key = (group.to_string(), stream.to_string());
        if state.streams.contains_key(&key) {
            return Err(SinkError::AlreadyExists(format!("{}/{}", group, stream)));
        }
        state.streams.insert(key, Vec::new());
        Ok(())
    }

    async fn append(
        &self,
        group: &str,
        stream: &str,
        timestamp_ms: i64,
        message: &str,
    ) -> Result<(), SinkError> {
        self.check(SinkOp::Append)?;
        let mut state = self.lock();
        let entries = state
            .streams
            .get_mut(&(group.to_string(), stream.to_string()))
            .ok_or_else(|| {
                SinkError::Backend(format!("log stream {}/{} does not exist", group, stream))
            })?;
        entries.push(StoredEntry {
            timestamp_ms,
            message: message.to_string(),
        });
        Ok(())
    }
}

/// An alert published to a [`MemoryAlertSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAlert {
    pub topic: String,
    pub subject: String,
    pub body: String,
}

/// An [`AlertSink`] that records published alerts in memory.
#[derive(Default)]
pub struct MemoryAlertSink {
    published: Mutex<Vec<PublishedAlert>>,
    fail: bool,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every publish fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<PublishedAlert> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl AlertSink for MemoryAlertSink {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), AlertError> {
        if self.fail {
            return Err(AlertError::Publish("injected failure".to_string()));
        }
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(PublishedAlert {
                topic: topic.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}
