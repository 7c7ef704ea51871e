//! Log entries: the agent's time-ordered interaction history.
//!
//! A [`LogEntry`] is a closed tagged union over the five kinds the prompt
//! document knows how to render. The `kind` field is the discriminant on
//! the wire.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Every log discriminant the formatter understands.
pub const LOG_KINDS: [&str; 5] = ["input", "output", "thought", "action_call", "action_result"];

/// An input or output reference: a typed payload with optional attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoRef {
    /// Declared type of the input/output (e.g. `"discord:message"`).
    #[serde(rename = "type")]
    pub kind: String,

    /// Extra attributes rendered on the element.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,

    /// Payload: a string or any structured value.
    pub data: serde_json::Value,

    /// Precomputed rendering, used verbatim when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// A reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub content: String,
}

/// An action invocation requested by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Unique call ID.
    pub id: String,
    /// Name of the invoked action.
    pub name: String,
    /// Call arguments.
    pub data: serde_json::Value,
}

/// The outcome of an action invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Name of the action that produced this result.
    pub name: String,
    /// The call ID this result answers.
    #[serde(rename = "callId")]
    pub call_id: String,
    /// Result payload.
    pub data: serde_json::Value,
    /// Precomputed rendering, used verbatim when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// One discrete record in the agent's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Input(IoRef),
    Output(IoRef),
    Thought(Thought),
    ActionCall(ActionCall),
    ActionResult(ActionResult),
}

impl LogEntry {
    /// The wire discriminant of this entry.
    pub fn kind(&self) -> &'static str {
        match self {
            LogEntry::Input(_) => "input",
            LogEntry::Output(_) => "output",
            LogEntry::Thought(_) => "thought",
            LogEntry::ActionCall(_) => "action_call",
            LogEntry::ActionResult(_) => "action_result",
        }
    }

    /// The precomputed rendering, if the entry carries a non-empty one.
    pub fn formatted(&self) -> Option<&str> {
        let formatted = match self {
            LogEntry::Input(io) | LogEntry::Output(io) => io.formatted.as_deref(),
            LogEntry::ActionResult(result) => result.formatted.as_deref(),
            LogEntry::Thought(_) | LogEntry::ActionCall(_) => None,
        };
        formatted.filter(|text| !text.is_empty())
    }

    /// Decode an entry arriving from outside the type system.
    ///
    /// The discriminant is checked before the payload: an unknown or missing
    /// `kind` is an [`Error::InvalidLogKind`], a known kind with a malformed
    /// payload is a serialization error.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let kind = match value.get("kind") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(other) => other.to_string(),
            None => "<missing>".to_string(),
        };
        if !LOG_KINDS.contains(&kind.as_str()) {
            trace!(kind = %kind, "Rejected log entry with unknown kind");
            return Err(Error::invalid_log_kind(kind));
        }
        Ok(serde_json::from_value(value)?)
    }

    // ── Convenience constructors ──

    pub fn input(kind: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        LogEntry::Input(IoRef::new(kind, data))
    }

    pub fn output(kind: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        LogEntry::Output(IoRef::new(kind, data))
    }

    pub fn thought(content: impl Into<String>) -> Self {
        LogEntry::Thought(Thought {
            content: content.into(),
        })
    }

    pub fn action_call(
        id: impl Into<String>,
        name: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        LogEntry::ActionCall(ActionCall {
            id: id.into(),
            name: name.into(),
            data,
        })
    }

    pub fn action_result(
        name: impl Into<String>,
        call_id: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        LogEntry::ActionResult(ActionResult {
            name: name.into(),
            call_id: call_id.into(),
            data,
            formatted: None,
        })
    }
}

impl IoRef {
    /// Create a reference with no params and no precomputed rendering.
    pub fn new(kind: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        Self {
            kind: kind.into(),
            params: IndexMap::new(),
            data: data.into(),
            formatted: None,
        }
    }

    /// Add a rendered attribute.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach a precomputed rendering.
    pub fn with_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.formatted = Some(formatted.into());
        self
    }
}
