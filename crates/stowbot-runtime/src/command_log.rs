//! [`CommandLog`] – pending command queue plus executed-command history.
//!
//! Commands waiting to run sit in a FIFO queue; commands that ran are pushed
//! onto a LIFO history.  [`CommandLog::undo_last`] pops the history only.  It
//! does not move the robot back: reversing a move is the operator's job.
//!
//! # Example
//!
//! ```rust
//! use stowbot_runtime::command_log::CommandLog;
//!
//! let mut log = CommandLog::new();
//! log.enqueue("walk north 3");
//! log.enqueue("turn 90");
//!
//! assert_eq!(log.next().as_deref(), Some("walk north 3"));
//! log.record("walk north 3");
//! assert_eq!(log.queue_len(), 1);
//!
//! let undone = log.undo_last().expect("one entry in history");
//! assert_eq!(undone.command, "walk north 3");
//! assert_eq!(log.history_len(), 0);
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One executed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub command: String,
}

#[derive(Debug, Default)]
pub struct CommandLog {
    queue: VecDeque<String>,
    history: Vec<LogEntry>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `command` to the back of the pending queue.
    pub fn enqueue(&mut self, command: impl Into<String>) {
        self.queue.push_back(command.into());
    }

    /// Take the oldest pending command.
    pub fn next(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Record that `command` has run.
    pub fn record(&mut self, command: impl Into<String>) -> &LogEntry {
        self.history.push(LogEntry {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
            command: command.into(),
        });
        &self.history[self.history.len() - 1]
    }

    /// Pop the most recent history entry.
    pub fn undo_last(&mut self) -> Option<LogEntry> {
        self.history.pop()
    }

    /// Executed commands, oldest first.
    pub fn history(&self) -> &[LogEntry] {
        &self.history
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut log = CommandLog::new();
        log.enqueue("a");
        log.enqueue("b");
        log.enqueue("c");
        assert_eq!(log.next().as_deref(), Some("a"));
        assert_eq!(log.next().as_deref(), Some("b"));
        assert_eq!(log.queue_len(), 1);
    }

    #[test]
    fn history_is_lifo() {
        let mut log = CommandLog::new();
        log.record("first");
        log.record("second");
        assert_eq!(log.undo_last().map(|e| e.command), Some("second".to_string()));
        assert_eq!(log.undo_last().map(|e| e.command), Some("first".to_string()));
        assert!(log.undo_last().is_none());
    }

    #[test]
    fn clear_queue_keeps_history() {
        let mut log = CommandLog::new();
        log.enqueue("walk north 1");
        log.record("turn 45");
        log.clear_queue();
        assert_eq!(log.queue_len(), 0);
        assert!(log.next().is_none());
        assert_eq!(log.history_len(), 1);
    }

    #[test]
    fn entries_have_unique_ids() {
        let mut log = CommandLog::new();
        let a = log.record("x").id;
        let b = log.record("x").id;
        assert_ne!(a, b);
        assert_eq!(log.history()[0].command, "x");
    }

    #[test]
    fn entry_serialises_to_json() {
        let mut log = CommandLog::new();
        let entry = log.record("grasp 2").clone();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"command\":\"grasp 2\""));
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
