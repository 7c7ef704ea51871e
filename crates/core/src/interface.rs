//! Static declarations of the agent's outputs and actions.
//!
//! These are described to the model once per prompt, independent of the
//! live log stream.

use crate::schema::SchemaShape;
use serde::{Deserialize, Serialize};

/// An output channel the agent may write to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputInterface {
    /// Output type, rendered as the `name` attribute.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Shape of the attributes accompanying the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<SchemaShape>,

    /// Shape of the output body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaShape>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,

    /// Whether the model must produce this output.
    #[serde(default)]
    pub required: bool,
}

/// An action the agent may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Shape of the call arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaShape>,
}

impl OutputInterface {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: None,
            instructions: None,
            attributes: None,
            schema: None,
            examples: None,
            required: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<SchemaShape>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<SchemaShape>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_examples<S: Into<String>>(mut self, examples: impl IntoIterator<Item = S>) -> Self {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl ActionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            instructions: None,
            schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<SchemaShape>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_interface_deserializes_with_defaults() {
        let decl: OutputInterface = serde_json::from_value(json!({
            "type": "reply",
            "description": "final answer"
        }))
        .unwrap();
        assert_eq!(decl.kind, "reply");
        assert!(!decl.required);
        assert!(decl.schema.is_none());
        assert!(decl.examples.is_none());
    }

    #[test]
    fn action_builder_sets_fields() {
        let action = ActionDecl::new("search")
            .with_description("web search")
            .with_instructions("use sparingly");
        assert_eq!(action.name, "search");
        assert_eq!(action.description.as_deref(), Some("web search"));
        assert!(action.schema.is_none());
    }
}
