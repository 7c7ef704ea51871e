//! The `Formatter` facade: collaborators and options bound once, reused for
//! every prompt.

use crate::context::format_contexts_with;
use crate::interface::{format_action_with, format_output_interface_with};
use crate::log::format_log_entry;
use crate::working_memory::LogWorkingMemoryRenderer;
use contextloom_core::{
    ActionDecl, ContextState, Element, JsonSchemaConverter, LogEntry, OutputInterface, Result,
    SchemaConverter, WorkingMemory, WorkingMemoryRenderer,
};
use std::sync::Arc;
use tracing::debug;

/// Tunables for document rendering.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Working-memory cap for main contexts that declare none.
    pub fallback_working_memory_size: Option<usize>,
    /// Key interface schemas by their tag (`"attributes"`, `"schema"`).
    pub schema_root_names: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            fallback_working_memory_size: None,
            schema_root_names: true,
        }
    }
}

/// Everything composed into one prompt document.
///
/// `contexts` is the flattened traversal to render, in order.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub outputs: &'a [OutputInterface],
    pub actions: &'a [ActionDecl],
    pub main_context_id: &'a str,
    pub contexts: &'a [ContextState],
    pub working_memory: &'a WorkingMemory,
    pub logs: &'a [LogEntry],
}

/// Stateless prompt formatter. Create one and reuse it.
pub struct Formatter {
    converter: Arc<dyn SchemaConverter>,
    memory_renderer: Arc<dyn WorkingMemoryRenderer>,
    options: FormatOptions,
}

impl Formatter {
    /// Create a formatter with the JSON Schema converter and the log-based
    /// working-memory renderer.
    pub fn new(options: FormatOptions) -> Self {
        Self {
            converter: Arc::new(JsonSchemaConverter),
            memory_renderer: Arc::new(LogWorkingMemoryRenderer),
            options,
        }
    }

    /// Replace the schema converter.
    pub fn with_converter(mut self, converter: Arc<dyn SchemaConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Replace the working-memory renderer.
    pub fn with_memory_renderer(mut self, renderer: Arc<dyn WorkingMemoryRenderer>) -> Self {
        self.memory_renderer = renderer;
        self
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn output_interface(&self, decl: &OutputInterface) -> Result<Element> {
        format_output_interface_with(decl, self.converter.as_ref(), self.options.schema_root_names)
    }

    pub fn action(&self, decl: &ActionDecl) -> Result<Element> {
        format_action_with(decl, self.converter.as_ref(), self.options.schema_root_names)
    }

    pub fn contexts<'a>(
        &self,
        main_context_id: &str,
        contexts: impl IntoIterator<Item = &'a ContextState>,
        working_memory: &WorkingMemory,
    ) -> Result<String> {
        format_contexts_with(
            main_context_id,
            contexts,
            working_memory,
            self.memory_renderer.as_ref(),
            self.options.fallback_working_memory_size,
        )
    }

    /// Render a whole document: output interfaces, actions, contexts, then
    /// the log stream. Sections are siblings, newline-joined, with no root
    /// element. Any failure aborts the document.
    pub fn document(&self, doc: &Document<'_>) -> Result<String> {
        let mut sections = Vec::new();

        for output in doc.outputs {
            sections.push(self.output_interface(output)?.render());
        }
        for action in doc.actions {
            sections.push(self.action(action)?.render());
        }
        sections.push(self.contexts(doc.main_context_id, doc.contexts, doc.working_memory)?);
        sections.extend(doc.logs.iter().map(|entry| format_log_entry(entry).render()));

        sections.retain(|section| !section.is_empty());
        debug!(
            outputs = doc.outputs.len(),
            actions = doc.actions.len(),
            contexts = doc.contexts.len(),
            logs = doc.logs.len(),
            "Rendered prompt document"
        );
        Ok(sections.join("\n"))
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contextloom_core::{
        CanonicalSchema, ContextDescriptor, FieldShape, Node, RawShape, SchemaError,
        WorkingMemoryRequest,
    };
    use serde_json::json;

    struct FixedConverter;

    impl SchemaConverter for FixedConverter {
        fn convert(
            &self,
            _shape: &RawShape,
            root_name: Option<&str>,
        ) -> std::result::Result<CanonicalSchema, SchemaError> {
            Ok(CanonicalSchema(json!({ "root": root_name })))
        }
    }

    fn one_line(_: &WorkingMemoryRequest<'_>) -> Result<Vec<Node>> {
        Ok(vec![Node::from("memory")])
    }

    #[test]
    fn custom_converter_is_used() {
        let formatter = Formatter::default().with_converter(Arc::new(FixedConverter));
        let action =
            ActionDecl::new("search").with_schema(RawShape::fields([("q", FieldShape::string())]));
        assert_eq!(
            formatter.action(&action).unwrap().render(),
            r#"<action name="search"><schema>{"root":"schema"}</schema></action>"#
        );
    }

    #[test]
    fn schema_root_names_can_be_disabled() {
        let formatter = Formatter::new(FormatOptions {
            schema_root_names: false,
            ..FormatOptions::default()
        })
        .with_converter(Arc::new(FixedConverter));
        let output = OutputInterface::new("reply")
            .with_schema(RawShape::fields([("text", FieldShape::string())]));
        assert_eq!(
            formatter.output_interface(&output).unwrap().render(),
            r#"<output name="reply"><schema>{"root":null}</schema></output>"#
        );
    }

    #[test]
    fn document_orders_sections() {
        let formatter = Formatter::default().with_memory_renderer(Arc::new(one_line));
        let outputs = [OutputInterface::new("reply").required()];
        let actions = [ActionDecl::new("search").with_description("web search")];
        let contexts = [ContextState::new("main", "k", Arc::new(ContextDescriptor::new("chat")))];
        let logs = [LogEntry::thought("done")];
        let wm = WorkingMemory::new();

        let text = formatter
            .document(&Document {
                outputs: &outputs,
                actions: &actions,
                main_context_id: "main",
                contexts: &contexts,
                working_memory: &wm,
                logs: &logs,
            })
            .unwrap();
        assert_eq!(
            text,
            concat!(
                "<output name=\"reply\" required=\"true\" />\n",
                "<action name=\"search\"><description>web search</description></action>\n",
                "<context type=\"chat\" key=\"k\"><working-memory>memory</working-memory></context>\n",
                "<reasoning>done</reasoning>"
            )
        );
    }

    #[test]
    fn empty_document_is_empty() {
        let wm = WorkingMemory::new();
        let text = Formatter::default()
            .document(&Document {
                outputs: &[],
                actions: &[],
                main_context_id: "main",
                contexts: &[],
                working_memory: &wm,
                logs: &[],
            })
            .unwrap();
        assert_eq!(text, "");
    }
}
