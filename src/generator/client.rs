use std::fs;
use std::path::Path;

use askama::Template;
use indexmap::IndexMap;
use tracing::{debug, info};

use super::templates::{ClientTemplate, HandlerView, MethodView, NamespaceView};
use crate::error::GenerationError;
use crate::registry::{HandlerDescriptor, Registry};
use crate::typegen::{escape_property_name, to_pascal_case, TypeCompiler};

/// Render the TypeScript client for every handler in `registry`.
///
/// Handlers are visited in registration order, input before output, so the
/// same registration sequence always yields byte-identical text.
///
/// # Errors
///
/// A type cannot be compiled (see [`TypeCompiler::compile`]) or the template
/// fails to render.
pub fn generate(registry: &Registry) -> Result<String, GenerationError> {
    let mut compiler = TypeCompiler::new();
    let mut handlers = Vec::with_capacity(registry.len());
    let mut namespaces: IndexMap<&str, Vec<MethodView>> = IndexMap::new();

    for handler in registry.handlers() {
        let view = handler_view(&mut compiler, handler)?;
        namespaces
            .entry(handler.identity.namespace())
            .or_default()
            .push(method_view(handler, &view));
        handlers.push(view);
    }

    let definitions = compiler.into_definitions();
    debug!(
        handlers = handlers.len(),
        definitions = definitions.len(),
        namespaces = namespaces.len(),
        "rendering client"
    );

    let template = ClientTemplate {
        definitions,
        handlers,
        namespaces: namespaces
            .into_iter()
            .map(|(namespace, methods)| NamespaceView {
                property: escape_property_name(namespace),
                methods,
            })
            .collect(),
    };
    Ok(template.render()?)
}

/// Generate the client and write it to `path`.
///
/// Nothing is written unless generation succeeds.
///
/// # Errors
///
/// Generation fails or the file cannot be written.
pub fn write_client(registry: &Registry, path: &Path) -> Result<(), GenerationError> {
    let client = generate(registry)?;
    fs::write(path, client.as_bytes())?;
    info!(path = %path.display(), bytes = client.len(), "client written");
    Ok(())
}

fn handler_view(
    compiler: &mut TypeCompiler,
    handler: &HandlerDescriptor,
) -> Result<HandlerView, GenerationError> {
    let input = compiler.compile(&handler.input)?;
    let output = compiler.compile(&handler.output)?;
    Ok(HandlerView {
        prefix: alias_prefix(handler),
        input,
        output,
        has_input: !handler.input_is_empty,
    })
}

fn method_view(handler: &HandlerDescriptor, view: &HandlerView) -> MethodView {
    let key = handler.identity.key();
    MethodView {
        property: escape_property_name(handler.identity.name()),
        prefix: view.prefix.clone(),
        // A JSON string is a valid TypeScript string literal.
        path_literal: serde_json::Value::String(key).to_string(),
        has_input: view.has_input,
    }
}

fn alias_prefix(handler: &HandlerDescriptor) -> String {
    format!(
        "{}{}",
        identifier_pascal(handler.identity.namespace()),
        identifier_pascal(handler.identity.name())
    )
}

/// PascalCase a segment. Underscores and characters a type alias name cannot
/// hold both start a new word, so `get_playlists` becomes `GetPlaylists`.
fn identifier_pascal(segment: &str) -> String {
    segment
        .split(|c: char| !(c.is_alphanumeric() || c == '$'))
        .map(to_pascal_case)
        .collect()
}
