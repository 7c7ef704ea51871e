//! Working memory: the rolling buffer of recent log entries.
//!
//! The buffer is owned by the caller. Rendering only ever borrows it: a
//! [`WorkingMemoryRenderer`] receives a shared reference and returns nodes
//! to embed in the main context.

use crate::element::Node;
use crate::error::{Error, Result};
use crate::log::LogEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

// ── Data Structures ───────────────────────────────────────────────────────

/// A log entry as held in working memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(flatten)]
    pub entry: LogEntry,

    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,

    /// Whether the agent has already acted on this entry.
    #[serde(default)]
    pub processed: bool,
}

/// The agent's working-memory buffer, grouped by entry kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemory {
    #[serde(default)]
    pub inputs: Vec<LogRecord>,
    #[serde(default)]
    pub outputs: Vec<LogRecord>,
    #[serde(default)]
    pub thoughts: Vec<LogRecord>,
    #[serde(default)]
    pub calls: Vec<LogRecord>,
    #[serde(default)]
    pub results: Vec<LogRecord>,
}

// ── Implementation ────────────────────────────────────────────────────────

impl LogRecord {
    pub fn new(entry: LogEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            entry,
            timestamp,
            processed: false,
        }
    }

    pub fn processed(mut self) -> Self {
        self.processed = true;
        self
    }

    /// Decode a record arriving from outside the type system, checking the
    /// entry's discriminant first.
    pub fn from_value(mut value: serde_json::Value) -> Result<Self> {
        let Some(object) = value.as_object_mut() else {
            trace!("Rejected working-memory record that is not an object");
            return Err(Error::invalid_log_kind("<not an object>"));
        };
        let timestamp = object.remove("timestamp").unwrap_or(serde_json::Value::Null);
        let processed = object.remove("processed").unwrap_or(serde_json::Value::Bool(false));

        let entry = LogEntry::from_value(value)?;
        Ok(Self {
            entry,
            timestamp: serde_json::from_value(timestamp)?,
            processed: serde_json::from_value(processed)?,
        })
    }
}

impl WorkingMemory {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the list matching its kind.
    pub fn push(&mut self, record: LogRecord) {
        let list = match record.entry {
            LogEntry::Input(_) => &mut self.inputs,
            LogEntry::Output(_) => &mut self.outputs,
            LogEntry::Thought(_) => &mut self.thoughts,
            LogEntry::ActionCall(_) => &mut self.calls,
            LogEntry::ActionResult(_) => &mut self.results,
        };
        list.push(record);
    }

    /// All records in chronological order. Records sharing a timestamp keep
    /// the order inputs, outputs, thoughts, calls, results.
    pub fn logs(&self) -> Vec<&LogRecord> {
        let mut logs: Vec<&LogRecord> = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .chain(&self.thoughts)
            .chain(&self.calls)
            .chain(&self.results)
            .collect();
        logs.sort_by_key(|record| record.timestamp);
        logs
    }

    /// Mark every record as processed.
    pub fn mark_processed(&mut self) {
        for record in self
            .inputs
            .iter_mut()
            .chain(&mut self.outputs)
            .chain(&mut self.thoughts)
            .chain(&mut self.calls)
            .chain(&mut self.results)
        {
            record.processed = true;
        }
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.inputs.len()
            + self.outputs.len()
            + self.thoughts.len()
            + self.calls.len()
            + self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Rendering boundary ────────────────────────────────────────────────────

/// Arguments passed to a working-memory renderer.
#[derive(Debug, Clone, Copy)]
pub struct WorkingMemoryRequest<'a> {
    pub memory: &'a WorkingMemory,
    /// Include entries already marked processed.
    pub processed: bool,
    /// Keep at most this many of the most recent entries.
    pub size: Option<usize>,
}

/// Renders a working-memory buffer into nodes for the main context.
pub trait WorkingMemoryRenderer: Send + Sync {
    fn render(&self, request: &WorkingMemoryRequest<'_>) -> Result<Vec<Node>>;
}

impl<F> WorkingMemoryRenderer for F
where
    F: Fn(&WorkingMemoryRequest<'_>) -> Result<Vec<Node>> + Send + Sync,
{
    fn render(&self, request: &WorkingMemoryRequest<'_>) -> Result<Vec<Node>> {
        self(request)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
