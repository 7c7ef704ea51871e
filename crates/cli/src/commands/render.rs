//! `contextloom render`: Render a JSON state snapshot.
//!
//! Snapshot layout:
//!
//! ```json
//! {
//!   "main_context": "chan-1",
//!   "outputs": [{ "type": "reply", "required": true }],
//!   "actions": [{
//!     "name": "search",
//!     "schema": { "raw": { "fields": { "q": { "type": "string" } } } }
//!   }],
//!   "contexts": [{
//!     "id": "chan-1", "key": "general", "type": "channel",
//!     "description": "...", "instructions": ["..."], "content": "...",
//!     "max_working_memory_size": 10,
//!     "sub_contexts": []
//!   }],
//!   "working_memory": [{ "kind": "thought", "content": "...", "timestamp": "..." }],
//!   "logs": [{ "kind": "input", "type": "chat", "data": "hi" }]
//! }
//! ```
//!
//! Context fragments in a snapshot are static. Log entries and
//! working-memory records are decoded through the kind guard.

use contextloom_config::LoomConfig;
use contextloom_core::{
    ActionDecl, ContextDescriptor, ContextState, LogEntry, LogRecord, Node, OutputInterface, Text,
    WorkingMemory,
};
use contextloom_render::{Document, FormatOptions, Formatter};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub main_context: Option<String>,
    #[serde(default)]
    pub outputs: Vec<OutputInterface>,
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
    #[serde(default)]
    pub contexts: Vec<SnapshotContext>,
    #[serde(default)]
    pub working_memory: Vec<Value>,
    #[serde(default)]
    pub logs: Vec<Value>,
}

/// A context instance with static fragments.
#[derive(Debug, Deserialize)]
pub struct SnapshotContext {
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<Text>,
    #[serde(default)]
    pub instructions: Option<Text>,
    /// Body text; a list renders one line per item.
    #[serde(default)]
    pub content: Option<Text>,
    #[serde(default)]
    pub max_working_memory_size: Option<usize>,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub sub_contexts: Vec<SnapshotContext>,
}

impl SnapshotContext {
    /// Build the runtime state. Context IDs must be non-empty so that an
    /// absent main context never matches anything.
    fn into_state(self) -> Result<ContextState, String> {
        if self.id.is_empty() {
            return Err(format!("Context '{}' has an empty id", self.key));
        }

        let mut descriptor = ContextDescriptor::new(self.kind);
        if let Some(description) = self.description {
            descriptor = descriptor.with_description(description);
        }
        if let Some(instructions) = self.instructions {
            descriptor = descriptor.with_instructions(instructions);
        }
        if let Some(content) = self.content {
            let nodes = match content {
                Text::One(text) => vec![Node::Text(text)],
                Text::Lines(lines) => lines.into_iter().map(Node::Text).collect(),
            };
            descriptor = descriptor.with_render(nodes);
        }
        if let Some(size) = self.max_working_memory_size {
            descriptor = descriptor.with_max_working_memory_size(size);
        }

        let mut state =
            ContextState::new(self.id, self.key, Arc::new(descriptor)).with_args(self.args);
        for sub in self.sub_contexts {
            state = state.with_sub_context(sub.into_state()?);
        }
        Ok(state)
    }
}

pub fn run(
    config: &LoomConfig,
    snapshot_path: &Path,
    main_context: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(snapshot_path)
        .map_err(|e| format!("Failed to read snapshot {}: {e}", snapshot_path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;

    let document = render_snapshot(snapshot, main_context, format_options(config))?;
    println!("{document}");
    Ok(())
}

pub fn format_options(config: &LoomConfig) -> FormatOptions {
    FormatOptions {
        fallback_working_memory_size: config.render.fallback_working_memory_size,
        schema_root_names: config.render.schema_root_names,
    }
}

/// Render a snapshot into its prompt document. `main_context` takes
/// precedence over the snapshot's own main context ID.
pub fn render_snapshot(
    snapshot: Snapshot,
    main_context: Option<String>,
    options: FormatOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let main_context_id = main_context.or(snapshot.main_context);

    let roots: Vec<ContextState> = snapshot
        .contexts
        .into_iter()
        .map(SnapshotContext::into_state)
        .collect::<Result<_, _>>()?;
    let contexts: Vec<ContextState> = roots
        .iter()
        .flat_map(ContextState::walk)
        .cloned()
        .collect();

    let mut working_memory = WorkingMemory::new();
    for value in snapshot.working_memory {
        working_memory.push(LogRecord::from_value(value)?);
    }
    let logs = snapshot
        .logs
        .into_iter()
        .map(LogEntry::from_value)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        main_context = ?main_context_id,
        contexts = contexts.len(),
        working_memory = working_memory.len(),
        "Rendering snapshot"
    );

    let formatter = Formatter::new(options);
    let document = formatter.document(&Document {
        outputs: &snapshot.outputs,
        actions: &snapshot.actions,
        // Context ids are non-empty, so "" matches nothing.
        main_context_id: main_context_id.as_deref().unwrap_or_default(),
        contexts: &contexts,
        working_memory: &working_memory,
        logs: &logs,
    })?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "main_context": "chan",
            "outputs": [{ "type": "reply", "required": true }],
            "actions": [{
                "name": "search",
                "description": "web search",
                "schema": { "raw": { "fields": { "q": { "type": "string" } } } }
            }],
            "contexts": [{
                "id": "srv",
                "key": "guild",
                "type": "server",
                "description": "A server",
                "sub_contexts": [{
                    "id": "chan",
                    "key": "general",
                    "type": "channel",
                    "instructions": ["Be brief.", "Be kind."],
                    "content": "Topic: rust"
                }]
            }],
            "working_memory": [
                { "kind": "thought", "content": "second", "timestamp": "2024-01-01T00:00:02Z" },
                {
                    "kind": "thought",
                    "content": "first",
                    "timestamp": "2024-01-01T00:00:01Z",
                    "processed": true
                }
            ],
            "logs": [{
                "kind": "input",
                "type": "chat",
                "data": "hello",
                "params": { "user": "kim" }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn snapshot_renders_full_document() {
        let text = render_snapshot(snapshot(), None, FormatOptions::default()).unwrap();
        let expected_contexts = concat!(
            "<context type=\"server\" key=\"guild\"><description>A server</description></context>\n",
            "<context type=\"channel\" key=\"general\">\n",
            "<instructions>\nBe brief.\nBe kind.\n</instructions>\n",
            "Topic: rust\n",
            "<working-memory>\n<reasoning>first</reasoning>\n<reasoning>second</reasoning>\n</working-memory>\n",
            "</context>"
        );

        assert!(text.starts_with(
            "<output name=\"reply\" required=\"true\" />\n<action name=\"search\">"
        ));
        assert!(text.contains(expected_contexts));
        assert!(text.ends_with("<msg user=\"kim\" role=\"user\">hello</msg>"));
    }

    #[test]
    fn main_context_flag_overrides_snapshot() {
        let text =
            render_snapshot(snapshot(), Some("srv".into()), FormatOptions::default()).unwrap();
        assert!(text.contains("<description>A server</description>\n<working-memory>"));
    }

    #[test]
    fn no_main_context_renders_without_working_memory() {
        let mut snap = snapshot();
        snap.main_context = None;
        let text = render_snapshot(snap, None, FormatOptions::default()).unwrap();
        assert!(!text.contains("<working-memory>"));
    }

    #[test]
    fn empty_context_id_is_rejected() {
        let mut snap = snapshot();
        snap.main_context = None;
        snap.contexts[0].sub_contexts[0].id = String::new();
        let err = render_snapshot(snap, None, FormatOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Context 'general' has an empty id"));
    }

    #[test]
    fn fallback_size_comes_from_options() {
        let options = FormatOptions {
            fallback_working_memory_size: Some(1),
            ..FormatOptions::default()
        };
        let text = render_snapshot(snapshot(), None, options).unwrap();
        assert!(text.contains("<working-memory><reasoning>second</reasoning></working-memory>"));
    }

    #[test]
    fn unknown_log_kind_is_rejected() {
        let mut snap = snapshot();
        snap.logs.push(json!({ "kind": "telepathy", "data": "?" }));
        let err = render_snapshot(snap, None, FormatOptions::default()).unwrap_err();
        assert!(err.to_string().contains("invalid log entry"));
    }

    #[test]
    fn options_follow_config() {
        let mut config = LoomConfig::default();
        config.render.fallback_working_memory_size = Some(5);
        config.render.schema_root_names = false;
        let options = format_options(&config);
        assert_eq!(options.fallback_working_memory_size, Some(5));
        assert!(!options.schema_root_names);
    }
}
