//! Context tree formatter.
//!
//! Renders each supplied context as one top-level `<context>` element:
//!
//! 1. description and instructions, resolved from static or computed
//!    fragments, each wrapped in its own element
//! 2. the context's own render output
//! 3. for the main context only, a `<working-memory>` element
//!
//! Contexts are rendered in the order given; sub-contexts are expected in
//! that sequence already (see [`ContextState::walk`]). Each context's
//! callbacks still receive its own sub-context list.

use contextloom_core::{
    ContextState, Element, Node, Result, Text, WorkingMemory, WorkingMemoryRenderer,
    WorkingMemoryRequest,
};
use tracing::{debug, trace};

/// Resolved pieces of a single context element.
#[derive(Debug, Clone)]
pub struct ContextParts {
    /// Declared type name.
    pub kind: String,
    pub key: String,
    pub description: Option<Text>,
    pub instructions: Option<Text>,
    /// Body nodes following description and instructions.
    pub content: Vec<Node>,
}

/// Build a single `<context type="…" key="…">` element.
pub fn format_context(parts: ContextParts) -> Element {
    let ContextParts {
        kind,
        key,
        description,
        instructions,
        content,
    } = parts;

    let header = [
        wrap_text("description", description),
        wrap_text("instructions", instructions),
    ];
    Element::new("context")
        .with_attr("type", kind)
        .with_attr("key", key)
        .with_nodes(header.into_iter().chain(content.into_iter().map(Some)))
}

fn wrap_text(tag: &str, text: Option<Text>) -> Option<Node> {
    let text = text.filter(|text| !text.is_empty())?;
    let mut element = Element::new(tag);
    element.content = text.into_content();
    Some(element.into())
}

/// Format the supplied contexts, newline-joined.
///
/// Only the first context whose id equals `main_context_id` receives the
/// working-memory block, sized by that context's own cap. When no context
/// matches, working memory is left out.
pub fn format_contexts<'a>(
    main_context_id: &str,
    contexts: impl IntoIterator<Item = &'a ContextState>,
    working_memory: &WorkingMemory,
    renderer: &dyn WorkingMemoryRenderer,
) -> Result<String> {
    format_contexts_with(main_context_id, contexts, working_memory, renderer, None)
}

pub(crate) fn format_contexts_with<'a>(
    main_context_id: &str,
    contexts: impl IntoIterator<Item = &'a ContextState>,
    working_memory: &WorkingMemory,
    renderer: &dyn WorkingMemoryRenderer,
    fallback_size: Option<usize>,
) -> Result<String> {
    let mut injected = false;
    let mut rendered = Vec::new();

    for state in contexts {
        let view = state.view();
        let descriptor = &*state.context;

        let description = descriptor
            .description
            .as_ref()
            .map(|fragment| fragment.resolve(&view))
            .transpose()?;
        let instructions = descriptor
            .instructions
            .as_ref()
            .map(|fragment| fragment.resolve(&view))
            .transpose()?;
        let mut content = match &descriptor.render {
            Some(fragment) => fragment.resolve(&view)?,
            None => Vec::new(),
        };

        if !injected && state.id == main_context_id {
            let size = descriptor.max_working_memory_size.or(fallback_size);
            let nodes = renderer.render(&WorkingMemoryRequest {
                memory: working_memory,
                processed: true,
                size,
            })?;
            trace!(context = %state.id, entries = nodes.len(), "Injecting working memory");
            let block = Element::new("working-memory").with_nodes(nodes.into_iter().map(Some));
            content.push(block.into());
            injected = true;
        }

        let element = format_context(ContextParts {
            kind: descriptor.kind.clone(),
            key: state.key.clone(),
            description,
            instructions,
            content,
        });
        rendered.push(element.render());
    }

    if !injected {
        debug!(main_context_id, "No context matched the main context id; working memory omitted");
    }
    debug!(contexts = rendered.len(), "Formatted context tree");
    Ok(rendered.join("\n"))
}
