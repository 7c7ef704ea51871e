//! Context tree: named units of agent state with their own prompt fragments.
//!
//! A [`ContextDescriptor`] declares how a context describes itself. Each of
//! its fragments is either static or computed from the live [`ContextState`]
//! at render time through a [`ContextView`].

use crate::element::{Content, Node};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ── Fragments ─────────────────────────────────────────────────────────────

/// Resolved description or instructions text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    One(String),
    Lines(Vec<String>),
}

impl Text {
    /// `true` when nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        match self {
            Text::One(text) => text.is_empty(),
            Text::Lines(lines) => lines.iter().all(String::is_empty),
        }
    }

    /// Convert into an element body; lines become a newline-joined sequence.
    pub fn into_content(self) -> Content {
        match self {
            Text::One(text) => Content::Text(text),
            Text::Lines(lines) => {
                Content::Nodes(lines.into_iter().map(|l| Some(Node::Text(l))).collect())
            }
        }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::One(text.to_string())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::One(text)
    }
}

impl From<Vec<String>> for Text {
    fn from(lines: Vec<String>) -> Self {
        Text::Lines(lines)
    }
}

/// Callback computing a fragment from the live context.
pub type ComputeFn<T> = Arc<dyn Fn(&ContextView<'_>) -> Result<T> + Send + Sync>;

/// A fragment that is either stored or computed on demand.
pub enum Fragment<T> {
    Static(T),
    Computed(ComputeFn<T>),
}

impl<T: Clone> Fragment<T> {
    /// Produce the fragment's value for `view`. Callback errors propagate
    /// unchanged.
    pub fn resolve(&self, view: &ContextView<'_>) -> Result<T> {
        match self {
            Fragment::Static(value) => Ok(value.clone()),
            Fragment::Computed(compute) => compute(view),
        }
    }
}

impl<T> Fragment<T> {
    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&ContextView<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Fragment::Computed(Arc::new(compute))
    }
}

impl<T: Clone> Clone for Fragment<T> {
    fn clone(&self) -> Self {
        match self {
            Fragment::Static(value) => Fragment::Static(value.clone()),
            Fragment::Computed(compute) => Fragment::Computed(Arc::clone(compute)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Fragment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Fragment::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

// ── Descriptor ────────────────────────────────────────────────────────────

/// How a context type describes itself to the model.
#[derive(Debug, Clone)]
pub struct ContextDescriptor {
    /// Declared type name, rendered as the `type` attribute.
    pub kind: String,
    pub description: Option<Fragment<Text>>,
    pub instructions: Option<Fragment<Text>>,
    /// Body content of the context element.
    pub render: Option<Fragment<Vec<Node>>>,
    /// Cap on working-memory entries when this is the main context.
    pub max_working_memory_size: Option<usize>,
}

impl ContextDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: None,
            instructions: None,
            render: None,
            max_working_memory_size: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<Text>) -> Self {
        self.description = Some(Fragment::Static(description.into()));
        self
    }

    pub fn with_description_fn<F>(mut self, compute: F) -> Self
    where
        F: Fn(&ContextView<'_>) -> Result<Text> + Send + Sync + 'static,
    {
        self.description = Some(Fragment::computed(compute));
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<Text>) -> Self {
        self.instructions = Some(Fragment::Static(instructions.into()));
        self
    }

    pub fn with_instructions_fn<F>(mut self, compute: F) -> Self
    where
        F: Fn(&ContextView<'_>) -> Result<Text> + Send + Sync + 'static,
    {
        self.instructions = Some(Fragment::computed(compute));
        self
    }

    pub fn with_render(mut self, nodes: Vec<Node>) -> Self {
        self.render = Some(Fragment::Static(nodes));
        self
    }

    pub fn with_render_fn<F>(mut self, compute: F) -> Self
    where
        F: Fn(&ContextView<'_>) -> Result<Vec<Node>> + Send + Sync + 'static,
    {
        self.render = Some(Fragment::computed(compute));
        self
    }

    pub fn with_max_working_memory_size(mut self, size: usize) -> Self {
        self.max_working_memory_size = Some(size);
        self
    }
}

// ── State ─────────────────────────────────────────────────────────────────

/// A live context instance: a node in the active context tree.
#[derive(Debug, Clone)]
pub struct ContextState {
    /// Unique instance ID, compared against the main context ID.
    pub id: String,
    /// Instance key, rendered as the `key` attribute.
    pub key: String,
    /// Shared descriptor of this context's type.
    pub context: Arc<ContextDescriptor>,
    pub args: Value,
    pub memory: Value,
    pub options: Value,
    pub settings: Value,
    pub sub_contexts: Vec<ContextState>,
}

/// Borrowed view of a [`ContextState`] handed to fragment callbacks.
#[derive(Debug, Clone, Copy)]
pub struct ContextView<'a> {
    pub id: &'a str,
    pub key: &'a str,
    pub args: &'a Value,
    pub options: &'a Value,
    pub context: &'a ContextDescriptor,
    pub memory: &'a Value,
    pub settings: &'a Value,
    pub sub_contexts: &'a [ContextState],
}

impl ContextState {
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        context: Arc<ContextDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            context,
            args: Value::Null,
            memory: Value::Null,
            options: Value::Null,
            settings: Value::Null,
            sub_contexts: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    pub fn with_memory(mut self, memory: Value) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sub_context(mut self, sub: ContextState) -> Self {
        self.sub_contexts.push(sub);
        self
    }

    /// The callback argument for this context.
    pub fn view(&self) -> ContextView<'_> {
        ContextView {
            id: &self.id,
            key: &self.key,
            args: &self.args,
            options: &self.options,
            context: &self.context,
            memory: &self.memory,
            settings: &self.settings,
            sub_contexts: &self.sub_contexts,
        }
    }

    /// Pre-order traversal: this context, then each sub-context tree.
    pub fn walk(&self) -> Vec<&ContextState> {
        let mut out = vec![self];
        for sub in &self.sub_contexts {
            out.extend(sub.walk());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn chat() -> Arc<ContextDescriptor> {
        Arc::new(
            ContextDescriptor::new("chat")
                .with_description_fn(|view| Ok(format!("chat {}", view.key).into())),
        )
    }

    #[test]
    fn static_fragment_resolves_to_stored_value() {
        let descriptor = ContextDescriptor::new("t").with_description("fixed");
        let ctx = ContextState::new("c1", "k", Arc::new(descriptor));
        let text = ctx.context.description.as_ref().unwrap().resolve(&ctx.view()).unwrap();
        assert_eq!(text, Text::One("fixed".into()));
    }

    #[test]
    fn computed_fragment_sees_context_fields() {
        let ctx = ContextState::new("c1", "room-7", chat()).with_args(json!({"room": 7}));
        let text = ctx.context.description.as_ref().unwrap().resolve(&ctx.view()).unwrap();
        assert_eq!(text, Text::One("chat room-7".into()));
    }

    #[test]
    fn computed_fragment_errors_propagate() {
        let descriptor = ContextDescriptor::new("t")
            .with_instructions_fn(|_| Err(Error::callback("no profile")));
        let ctx = ContextState::new("c1", "k", Arc::new(descriptor));
        let err = ctx.context.instructions.as_ref().unwrap().resolve(&ctx.view()).unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
    }

    #[test]
    fn walk_is_pre_order() {
        let leaf = ContextState::new("leaf", "l", chat());
        let mid = ContextState::new("mid", "m", chat()).with_sub_context(leaf);
        let root = ContextState::new("root", "r", chat())
            .with_sub_context(mid)
            .with_sub_context(ContextState::new("side", "s", chat()));
        let ids: Vec<&str> = root.walk().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "mid", "leaf", "side"]);
    }

    #[test]
    fn text_emptiness() {
        assert!(Text::One(String::new()).is_empty());
        assert!(Text::Lines(vec![String::new()]).is_empty());
        assert!(!Text::Lines(vec!["a".into()]).is_empty());
    }

    #[test]
    fn text_deserializes_untagged() {
        let one: Text = serde_json::from_value(json!("hello")).unwrap();
        let many: Text = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(one, Text::One("hello".into()));
        assert_eq!(many, Text::Lines(vec!["a".into(), "b".into()]));
    }
}
