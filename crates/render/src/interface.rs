//! Interface formatters: static descriptions of outputs and actions.
//!
//! Each optional field maps to an `Option<Element>`; absent (or empty)
//! fields are dropped before assembly, so no empty tags are produced.

use contextloom_core::{
    ActionDecl, Element, Node, OutputInterface, Result, SchemaConverter, SchemaShape,
    render_schema,
};

/// Format an output interface declaration with keyed schemas.
pub fn format_output_interface(
    decl: &OutputInterface,
    converter: &dyn SchemaConverter,
) -> Result<Element> {
    format_output_interface_with(decl, converter, true)
}

/// Format an action declaration with a keyed schema.
pub fn format_action(decl: &ActionDecl, converter: &dyn SchemaConverter) -> Result<Element> {
    format_action_with(decl, converter, true)
}

pub(crate) fn format_output_interface_with(
    decl: &OutputInterface,
    converter: &dyn SchemaConverter,
    keyed: bool,
) -> Result<Element> {
    let mut element = Element::new("output").with_attr("name", &decl.kind);
    if decl.required {
        element = element.with_attr("required", "true");
    }

    let children = [
        text_child("description", decl.description.as_deref()),
        schema_child("attributes", decl.attributes.as_ref(), converter, keyed)?,
        schema_child("schema", decl.schema.as_ref(), converter, keyed)?,
        text_child("instructions", decl.instructions.as_deref()),
        decl.examples
            .as_ref()
            .filter(|examples| !examples.is_empty())
            .map(|examples| Element::new("examples").with_text(examples.join("\n"))),
    ];
    Ok(element.with_nodes(children.into_iter().map(|child| child.map(Node::from))))
}

pub(crate) fn format_action_with(
    decl: &ActionDecl,
    converter: &dyn SchemaConverter,
    keyed: bool,
) -> Result<Element> {
    let children = [
        text_child("description", decl.description.as_deref()),
        text_child("instructions", decl.instructions.as_deref()),
        schema_child("schema", decl.schema.as_ref(), converter, keyed)?,
    ];
    Ok(Element::new("action")
        .with_attr("name", &decl.name)
        .with_nodes(children.into_iter().map(|child| child.map(Node::from))))
}

fn text_child(tag: &str, text: Option<&str>) -> Option<Element> {
    text.filter(|text| !text.is_empty())
        .map(|text| Element::new(tag).with_text(text))
}

fn schema_child(
    tag: &str,
    shape: Option<&SchemaShape>,
    converter: &dyn SchemaConverter,
    keyed: bool,
) -> Result<Option<Element>> {
    let Some(shape) = shape else {
        return Ok(None);
    };
    let root_name = keyed.then_some(tag);
    let text = render_schema(shape, root_name, converter)?;
    Ok(Some(Element::new(tag).with_text(text)))
}
