//! # Typegen Module
//!
//! Compiles [`TypeDescriptor`](crate::TypeDescriptor) graphs into TypeScript
//! type text.
//!
//! ## Overview
//!
//! A [`TypeCompiler`] lives for exactly one generation run. It owns two pieces
//! of state:
//!
//! - the **named type table**: TypeScript name → rendered definition, in the
//!   order definitions were completed. This order is the output order, which is
//!   what makes regeneration byte-identical.
//! - the **processing set**: qualified names whose fields are currently being
//!   expanded. Meeting one of them again means the graph loops back on itself;
//!   the bare name is returned and the outer expansion finishes the definition.
//!
//! Named types are keyed by their full qualified name. The first type seen
//! gets the short `module_Type` name from [`type_name`]; a later, different
//! type that would render to the same name takes one more module segment
//! (`a::models::User` → `models_User`, then `b::models::User` →
//! `b_models_User`), so two Rust types never share a definition.
//!
//! Anonymous types have no name to stop a cycle with. An anonymous type that
//! contains itself fails with [`GenerationError::AnonymousType`](crate::GenerationError::AnonymousType).
//!
//! ## Mapping
//!
//! | Descriptor | TypeScript |
//! |---|---|
//! | `Primitive` | `string`, `number`, `boolean` |
//! | `SpecialWire(Timestamp)` | `string` |
//! | `Sequence(T)` | `(T[] \| null)` |
//! | `Optional(T)`, `Wrapper(T)` | `T`, field marked `?` |
//! | `Named` | bare name, definition stored in the table |
//! | `Anonymous` | inline `{ a: T; b?: U }` |
//! | `Unknown` | `any` |
//!
//! ## Example
//!
//! ```rust
//! use tsbridge::typegen::TypeCompiler;
//! use tsbridge::{Field, TypeDescriptor};
//!
//! let greeting = TypeDescriptor::named(
//!     "pkg.Greeting",
//!     vec![Field::new("name", TypeDescriptor::string())],
//! );
//!
//! let mut compiler = TypeCompiler::new();
//! assert_eq!(compiler.compile(&greeting)?, "pkg_Greeting");
//! assert_eq!(
//!     compiler.definition("pkg_Greeting"),
//!     Some("type pkg_Greeting = {\n  name: string\n}")
//! );
//! # Ok::<(), tsbridge::GenerationError>(())
//! ```

mod compiler;
mod naming;

pub use compiler::TypeCompiler;
pub use naming::{escape_property_name, to_pascal_case, type_name};
