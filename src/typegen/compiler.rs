use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::naming::{escape_property_name, qualified_segments, scoped_type_name, type_name};
use crate::descriptor::{Field, FieldList, PrimitiveKind, SpecialWireKind, TypeDescriptor};
use crate::error::GenerationError;

/// Inline types nested deeper than this are taken to be self-referential.
const MAX_INLINE_DEPTH: usize = 32;

/// Compiles descriptors to TypeScript for a single generation run.
///
/// Create one per run and drop it afterwards; the named type table is never
/// shared between runs.
#[derive(Debug, Default)]
pub struct TypeCompiler {
    /// TypeScript name → `type Name = { ... }`, in completion order.
    definitions: IndexMap<String, String>,
    /// Qualified name (segments joined with `::`) → TypeScript name.
    names: HashMap<String, String>,
    /// TypeScript name → the qualified name it was given to.
    owners: HashMap<String, String>,
    /// Qualified names whose fields are being expanded right now.
    pub(super) processing: HashSet<String>,
    inline_depth: usize,
}

impl TypeCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a descriptor to a type token.
    ///
    /// The token is either the bare name of a definition stored in the table or
    /// an inline type expression.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::AnonymousType`] when an inline type refers
    /// back to itself.
    pub fn compile(&mut self, descriptor: &TypeDescriptor) -> Result<String, GenerationError> {
        Ok(match descriptor {
            TypeDescriptor::Primitive(kind) => primitive(*kind).to_string(),
            TypeDescriptor::SpecialWire(kind) => special_wire(*kind).to_string(),
            TypeDescriptor::Sequence(element) => {
                // The decoder may leave a collection as null, so never assume an array.
                format!("({}[] | null)", self.compile(element)?)
            }
            // Optionality belongs to the containing field, see `compile_field`.
            TypeDescriptor::Optional(inner) | TypeDescriptor::Wrapper(inner) => {
                self.compile(inner)?
            }
            TypeDescriptor::Named { name, fields } => self.compile_named(name, fields)?,
            TypeDescriptor::Anonymous(fields) => self.compile_inline(fields)?,
            TypeDescriptor::Unknown => "any".to_string(),
        })
    }

    /// Compile a named descriptor and return its full definition text.
    ///
    /// `Optional` and `Wrapper` are looked through. Anything that does not end
    /// in a named composite has no definition to return.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::AnonymousType`] when the descriptor has no
    /// derivable name.
    pub fn define(&mut self, descriptor: &TypeDescriptor) -> Result<String, GenerationError> {
        match descriptor {
            TypeDescriptor::Optional(inner) | TypeDescriptor::Wrapper(inner) => self.define(inner),
            TypeDescriptor::Named { name, .. } if !type_name(name).is_empty() => {
                let token = self.compile(descriptor)?;
                self.definitions
                    .get(&token)
                    .cloned()
                    .ok_or(GenerationError::AnonymousType { token })
            }
            other => Err(GenerationError::AnonymousType {
                token: self.compile(other)?,
            }),
        }
    }

    /// Rendered definition for a TypeScript type name.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    /// All definitions in first-seen order.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions
            .iter()
            .map(|(name, definition)| (name.as_str(), definition.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Consume the compiler, keeping the definition texts in output order.
    pub fn into_definitions(self) -> Vec<String> {
        self.definitions.into_values().collect()
    }

    fn compile_named(
        &mut self,
        qualified: &str,
        fields: &FieldList,
    ) -> Result<String, GenerationError> {
        let segments = qualified_segments(qualified);
        if segments.is_empty() {
            return self.compile_inline(fields);
        }
        let key = segments.join("::");
        let name = self.assign_name(&key, &segments);

        if self.processing.contains(&key) {
            trace!(type_name = %name, "cycle detected, referencing by name");
            return Ok(name);
        }
        if self.definitions.contains_key(&name) {
            return Ok(name);
        }

        self.processing.insert(key.clone());
        let members = self.compile_fields(&fields.resolve());
        self.processing.remove(&key);
        let members = members?;

        let definition = if members.is_empty() {
            format!("type {name} = {{}}")
        } else {
            let body: Vec<String> = members.iter().map(|m| format!("  {m}")).collect();
            format!("type {name} = {{\n{}\n}}", body.join("\n"))
        };
        debug!(type_name = %name, qualified, fields = members.len(), "compiled named type");
        self.definitions.entry(name.clone()).or_insert(definition);
        Ok(name)
    }

    /// TypeScript name for a qualified name, stable for the whole run.
    ///
    /// The shortest `module_Type` form is used unless another qualified name
    /// already holds it; then more module segments are prepended, and as a
    /// last resort a numeric suffix.
    fn assign_name(&mut self, key: &str, segments: &[&str]) -> String {
        if let Some(name) = self.names.get(key) {
            return name.clone();
        }

        let name = (0..segments.len())
            .filter_map(|extra| scoped_type_name(segments, extra))
            .find(|candidate| !self.owners.contains_key(candidate))
            .unwrap_or_else(|| {
                let base = segments.join("_");
                (2..)
                    .map(|n| format!("{base}_{n}"))
                    .find(|candidate| !self.owners.contains_key(candidate))
                    .unwrap_or(base)
            });
        if name != type_name(key) {
            warn!(qualified = key, type_name = %name, "type name already taken, using a longer name");
        }

        self.names.insert(key.to_string(), name.clone());
        self.owners.insert(name.clone(), key.to_string());
        name
    }

    fn compile_inline(&mut self, fields: &FieldList) -> Result<String, GenerationError> {
        if self.inline_depth >= MAX_INLINE_DEPTH {
            return Err(GenerationError::AnonymousType {
                token: format!("{{ ... }} nested {MAX_INLINE_DEPTH} levels deep"),
            });
        }
        self.inline_depth += 1;
        let members = self.compile_fields(&fields.resolve());
        self.inline_depth -= 1;

        let members = members?;
        Ok(if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", members.join("; "))
        })
    }

    fn compile_fields(&mut self, fields: &[Field]) -> Result<Vec<String>, GenerationError> {
        fields.iter().map(|field| self.compile_field(field)).collect()
    }

    fn compile_field(&mut self, field: &Field) -> Result<String, GenerationError> {
        let name = escape_property_name(&field.wire_name);
        let ty = self.compile(&field.ty)?;
        let marker = if field.is_optional() { "?" } else { "" };
        Ok(format!("{name}{marker}: {ty}"))
    }
}

fn primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "string",
        PrimitiveKind::Number => "number",
        PrimitiveKind::Boolean => "boolean",
    }
}

fn special_wire(kind: SpecialWireKind) -> &'static str {
    match kind {
        SpecialWireKind::Timestamp => "string",
    }
}
