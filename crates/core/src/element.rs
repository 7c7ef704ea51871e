//! Element model: the tagged tree between agent state and prompt text.
//!
//! An [`Element`] is a named node with ordered attributes and a body that is
//! either text, a single nested element, or a sequence of optional nodes.
//! Rendering is deterministic: attributes keep insertion order and nothing
//! time- or hash-dependent enters the output.
//!
//! # Layout
//!
//! | body after filtering | output |
//! |----------------------|--------|
//! | empty | `<tag attrs />` |
//! | single line | `<tag attrs>body</tag>` |
//! | multi-line | `<tag attrs>\nbody\n</tag>` |

use indexmap::IndexMap;
use std::fmt;

// ── Data Structures ───────────────────────────────────────────────────────

/// One item of a sequence body: raw text or a nested element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// The body of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    /// No body at all; renders self-closing.
    #[default]
    Empty,
    /// Text inserted verbatim.
    Text(String),
    /// A single nested element.
    Element(Box<Element>),
    /// An ordered sequence; `None` and empty-text items are dropped.
    Nodes(Vec<Option<Node>>),
}

/// A tagged, attributed node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// Attributes in insertion order.
    pub attributes: IndexMap<String, String>,
    /// Element body.
    pub content: Content,
}

// ── Construction ──────────────────────────────────────────────────────────

impl Element {
    /// Create an element with no attributes and no body.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            content: Content::Empty,
        }
    }

    /// Set an attribute. Re-setting an existing key keeps its position.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set several attributes in iteration order.
    pub fn with_attrs<K, V>(mut self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in attrs {
            self.attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Replace the body with verbatim text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    /// Replace the body with a single nested element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.content = Content::Element(Box::new(child));
        self
    }

    /// Replace the body with a sequence of optional nodes.
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Option<Node>>) -> Self {
        self.content = Content::Nodes(nodes.into_iter().collect());
        self
    }

    // ── Rendering ──

    /// Render this element (and its subtree) to canonical text.
    pub fn render(&self) -> String {
        let attrs: String = self
            .attributes
            .iter()
            .map(|(key, value)| format!(" {key}=\"{value}\""))
            .collect();
        let body = self.render_body();

        if body.is_empty() {
            format!("<{}{} />", self.tag, attrs)
        } else if body.contains('\n') {
            format!("<{tag}{attrs}>\n{body}\n</{tag}>", tag = self.tag)
        } else {
            format!("<{tag}{attrs}>{body}</{tag}>", tag = self.tag)
        }
    }

    fn render_body(&self) -> String {
        match &self.content {
            Content::Empty => String::new(),
            Content::Text(text) => text.clone(),
            Content::Element(child) => child.render(),
            Content::Nodes(nodes) => join_nodes(nodes.iter().flatten()),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Node {
    /// Render this node: text verbatim, elements through [`Element::render`].
    pub fn render(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element.render(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// Render nodes and join the non-empty results with a single newline.
pub fn join_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> String {
    nodes
        .into_iter()
        .map(Node::render)
        .filter(|rendered| !rendered.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ─────────────────────────────────────────────────────────────────
