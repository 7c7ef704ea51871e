//! Data-shape declarations and their canonical single-line encoding.
//!
//! A [`SchemaShape`] is decided by the caller: either an already-canonical
//! JSON Schema document, or a raw field mapping that a [`SchemaConverter`]
//! turns into one. Rendering always produces compact JSON so the text is
//! stable across runs.

use crate::error::{Result, SchemaError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// `$schema` marker emitted by [`JsonSchemaConverter`].
pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

// ── Shapes ────────────────────────────────────────────────────────────────

/// A data shape embedded in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaShape {
    /// Already canonical; rendered as-is.
    Canonical(CanonicalSchema),
    /// Needs conversion before rendering.
    Raw(RawShape),
}

/// A canonical declarative-type document (JSON Schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSchema(pub Value);

/// An unconverted shape: a field mapping or a single composable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawShape {
    Fields(IndexMap<String, FieldShape>),
    Shape(FieldShape),
}

/// One field of a raw shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldShape {
    #[serde(flatten)]
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional fields are left out of `required`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// The value type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Any,
    Array { items: Box<FieldShape> },
    Object { fields: IndexMap<String, FieldShape> },
    Enum { values: Vec<String> },
}

impl FieldShape {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            description: None,
            optional: false,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn array(items: FieldShape) -> Self {
        Self::new(FieldKind::Array {
            items: Box::new(items),
        })
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldShape)>) -> Self {
        Self::new(FieldKind::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn one_of<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(FieldKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Attach a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as not required.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl RawShape {
    /// Build a field mapping in declaration order.
    pub fn fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldShape)>) -> Self {
        RawShape::Fields(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<RawShape> for SchemaShape {
    fn from(raw: RawShape) -> Self {
        SchemaShape::Raw(raw)
    }
}

impl From<CanonicalSchema> for SchemaShape {
    fn from(canonical: CanonicalSchema) -> Self {
        SchemaShape::Canonical(canonical)
    }
}

// ── Conversion ────────────────────────────────────────────────────────────

/// Converts raw shapes into canonical form.
///
/// `root_name`, when given, keys the definition so several schemas can share
/// one document without colliding.
pub trait SchemaConverter: Send + Sync {
    fn convert(
        &self,
        shape: &RawShape,
        root_name: Option<&str>,
    ) -> std::result::Result<CanonicalSchema, SchemaError>;
}

/// Draft-07 JSON Schema converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaConverter;

impl SchemaConverter for JsonSchemaConverter {
    fn convert(
        &self,
        shape: &RawShape,
        root_name: Option<&str>,
    ) -> std::result::Result<CanonicalSchema, SchemaError> {
        let body = match shape {
            RawShape::Fields(fields) => object_schema("", fields)?,
            RawShape::Shape(field) => field_schema("", field)?,
        };

        let mut doc = match root_name {
            Some("") => return Err(SchemaError::EmptyRootName),
            Some(name) => {
                let mut definitions = Map::new();
                definitions.insert(name.to_string(), Value::Object(body));

                let mut doc = Map::new();
                doc.insert("$ref".into(), json!(format!("#/definitions/{name}")));
                doc.insert("definitions".into(), Value::Object(definitions));
                doc
            }
            None => body,
        };
        doc.insert("$schema".into(), json!(JSON_SCHEMA_DRAFT));

        Ok(CanonicalSchema(Value::Object(doc)))
    }
}

fn field_schema(
    path: &str,
    field: &FieldShape,
) -> std::result::Result<Map<String, Value>, SchemaError> {
    let mut schema = match &field.kind {
        FieldKind::String => type_only("string"),
        FieldKind::Number => type_only("number"),
        FieldKind::Integer => type_only("integer"),
        FieldKind::Boolean => type_only("boolean"),
        FieldKind::Any => Map::new(),
        FieldKind::Array { items } => {
            let mut schema = type_only("array");
            let items = field_schema(&format!("{path}[]"), items)?;
            schema.insert("items".into(), Value::Object(items));
            schema
        }
        FieldKind::Object { fields } => object_schema(path, fields)?,
        FieldKind::Enum { values } => {
            if values.is_empty() {
                return Err(SchemaError::EmptyEnum {
                    field: display_path(path),
                });
            }
            let mut schema = type_only("string");
            schema.insert("enum".into(), json!(values));
            schema
        }
    };

    if let Some(description) = &field.description {
        schema.insert("description".into(), json!(description));
    }
    Ok(schema)
}

fn object_schema(
    path: &str,
    fields: &IndexMap<String, FieldShape>,
) -> std::result::Result<Map<String, Value>, SchemaError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (name, field) in fields {
        let child_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{path}.{name}")
        };
        properties.insert(name.clone(), Value::Object(field_schema(&child_path, field)?));
        if !field.optional {
            required.push(json!(name));
        }
    }

    let mut schema = type_only("object");
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    Ok(schema)
}

fn type_only(name: &str) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), json!(name));
    schema
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".into()
    } else {
        path.to_string()
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────

/// Render a shape as a single line of canonical JSON.
///
/// Canonical shapes are emitted unchanged; raw shapes go through
/// `converter` first. Conversion failures propagate as-is.
pub fn render_schema(
    shape: &SchemaShape,
    root_name: Option<&str>,
    converter: &dyn SchemaConverter,
) -> Result<String> {
    let text = match shape {
        SchemaShape::Canonical(canonical) => serde_json::to_string(&canonical.0)?,
        SchemaShape::Raw(raw) => {
            let canonical = converter.convert(raw, root_name)?;
            serde_json::to_string(&canonical.0)?
        }
    };
    Ok(text)
}
