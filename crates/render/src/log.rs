//! Log formatter: one element (or verbatim override) per log entry.
//!
//! | kind | tag | attributes | body |
//! |------|-----|------------|------|
//! | input | `msg` | params, then `role="user"` | value-formatted data |
//! | output | `output` | `type`, then params | value-formatted data |
//! | thought | `reasoning` | none | content |
//! | action_call | `action_call` | `id`, `name` | compact JSON |
//! | action_result | `action_result` | `name`, `callId` | compact JSON |
//!
//! A non-empty `formatted` string on an entry replaces the whole element.

use crate::value::format_value;
use contextloom_core::{Element, IoRef, LogEntry, Node, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Format a single log entry.
pub fn format_log_entry(entry: &LogEntry) -> Node {
    if let Some(formatted) = entry.formatted() {
        return Node::Text(formatted.to_string());
    }

    let element = match entry {
        LogEntry::Input(input) => Element::new("msg")
            .with_attrs(&input.params)
            .with_attr("role", "user")
            .with_text(format_value(&input.data)),
        LogEntry::Output(output) => Element::new("output")
            .with_attr("type", &output.kind)
            .with_attrs(&output.params)
            .with_text(format_value(&output.data)),
        LogEntry::Thought(thought) => Element::new("reasoning").with_text(&thought.content),
        LogEntry::ActionCall(call) => Element::new("action_call")
            .with_attr("id", &call.id)
            .with_attr("name", &call.name)
            .with_text(call.data.to_string()),
        LogEntry::ActionResult(result) => Element::new("action_result")
            .with_attr("name", &result.name)
            .with_attr("callId", &result.call_id)
            .with_text(result.data.to_string()),
    };
    Node::Element(element)
}

/// Decode and format an entry that arrived as untyped JSON.
pub fn format_log_value(value: serde_json::Value) -> Result<Node> {
    let entry = LogEntry::from_value(value)?;
    Ok(format_log_entry(&entry))
}

/// Format a whole log stream, newline-joined.
///
/// Any entry with an unknown kind aborts the render: no partial text is
/// returned.
pub fn format_log_values(values: impl IntoIterator<Item = serde_json::Value>) -> Result<String> {
    let nodes = values
        .into_iter()
        .map(format_log_value)
        .collect::<Result<Vec<_>>>()?;
    trace!(entries = nodes.len(), "Formatted log stream");
    Ok(contextloom_core::join_nodes(&nodes))
}

// ── Standalone references ─────────────────────────────────────────────────

/// Format an input reference as `<input name="…">`.
pub fn format_input(input: &IoRef) -> Element {
    format_reference("input", input)
}

/// Format an output reference as `<output name="…">`.
pub fn format_output(output: &IoRef) -> Element {
    format_reference("output", output)
}

fn format_reference(tag: &str, reference: &IoRef) -> Element {
    let body = match &reference.data {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Element::new(tag)
        .with_attr("name", &reference.kind)
        .with_attrs(&reference.params)
        .with_text(body)
}

/// A chat message between a user and the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Msg {
    User { user: String, content: String },
    Assistant { content: String },
}

/// Format a chat message as `<msg role="…">`.
pub fn format_msg(msg: &Msg) -> Element {
    match msg {
        Msg::User { user, content } => Element::new("msg")
            .with_attr("role", "user")
            .with_attr("user", user)
            .with_text(content),
        Msg::Assistant { content } => Element::new("msg")
            .with_attr("role", "assistant")
            .with_text(content),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
