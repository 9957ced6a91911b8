//! In-app activity log
//!
//! A bounded, newest-first buffer of [`LogEntry`] values that the admin
//! "diagnose" view reads. Every entry is mirrored to `tracing`, and
//! subscribers are notified through a broadcast channel.
//!
//! There is no global instance: the server builds one at startup and
//! hands clones to every component, tests build their own.

use aurora_common::{LogEntry, LogLevel, MAX_LOG_ENTRIES, generate_short_id, local_time_string};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Change notification sent to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Added(LogEntry),
    Cleared,
}

/// Shared log buffer; clones share the same entries and subscribers
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    events: broadcast::Sender<LogEvent>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(MAX_LOG_ENTRIES)
    }
}

impl ActivityLog {
    pub fn new(max_entries: usize) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            max_entries,
            events,
        }
    }

    /// Create the process-wide log and record that it is running
    pub fn init(max_entries: usize) -> Self {
        let log = Self::new(max_entries);
        log.info("系统日志服务已启动");
        log
    }

    pub fn add(&self, level: LogLevel, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            id: generate_short_id(),
            time: local_time_string(),
            level,
            message: message.into(),
        };

        match level {
            LogLevel::Info => info!(target: "aurora::activity", "{}", entry.message),
            LogLevel::Warn => warn!(target: "aurora::activity", "{}", entry.message),
            LogLevel::Error => error!(target: "aurora::activity", "{}", entry.message),
        }

        if let Ok(mut entries) = self.entries.lock() {
            entries.push_front(entry.clone());
            entries.truncate(self.max_entries);
        }

        // No subscribers is fine
        let _ = self.events.send(LogEvent::Added(entry.clone()));
        entry
    }

    pub fn info(&self, message: impl Into<String>) -> LogEntry {
        self.add(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> LogEntry {
        self.add(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) -> LogEntry {
        self.add(LogLevel::Error, message)
    }

    /// Snapshot of all entries, newest first
    pub fn entries(&self) -> Vec<LogEntry> {
        if let Ok(entries) = self.entries.lock() {
            entries.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Entries at the given level, newest first
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }

    /// Drop every entry and notify subscribers
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
        let _ = self.events.send(LogEvent::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_capped() {
        let log = ActivityLog::new(3);
        for i in 0..5 {
            log.info(format!("entry {}", i));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "entry 4");
        assert_eq!(entries[2].message, "entry 2");
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = ActivityLog::default();
        let b = ActivityLog::default();
        a.error("boom");

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(a.entries_at(LogLevel::Error).len(), 1);

        // Clones share the buffer
        let a2 = a.clone();
        a2.warn("careful");
        assert_eq!(a.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let log = ActivityLog::default();
        let mut rx = log.subscribe();

        let entry = log.info("hello");
        assert_eq!(rx.recv().await.unwrap(), LogEvent::Added(entry));

        log.clear();
        assert_eq!(rx.recv().await.unwrap(), LogEvent::Cleared);
        assert!(log.is_empty());
    }

    #[test]
    fn test_init_records_startup() {
        let log = ActivityLog::init(MAX_LOG_ENTRIES);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].level, LogLevel::Info);
    }
}
