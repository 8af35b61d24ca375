//! # Descriptor Module
//!
//! Language-neutral descriptions of the data shapes that flow through a handler.
//!
//! ## Overview
//!
//! Every handler input and output is described by a [`TypeDescriptor`] tree.
//! Descriptors are produced from Rust types through the [`Describe`] trait,
//! which is implemented here for the standard library, `chrono` date/time types
//! and `serde_json::Value`, and derived for user structs with
//! `#[derive(Describe)]`.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tsbridge::{Describe, TypeDescriptor};
//!
//! #[derive(Serialize, Deserialize, Describe)]
//! struct Greeting {
//!     name: String,
//!     #[serde(rename = "nickName")]
//!     nick_name: Option<String>,
//! }
//!
//! match Greeting::describe() {
//!     TypeDescriptor::Named { fields, .. } => assert_eq!(fields.resolve().len(), 2),
//!     other => panic!("unexpected descriptor {other:?}"),
//! }
//! ```
//!
//! ## Self-referential types
//!
//! A derived descriptor defers its field list ([`FieldList::Deferred`]) so that
//! `struct Node { children: Vec<Node> }` can be described without recursing
//! forever. Terminating the cycle is the job of the
//! [`TypeCompiler`](crate::typegen::TypeCompiler), not of the descriptor.
//!
//! ## Wrapper convention
//!
//! [`Choice<T>`] carries at most one value and is described as
//! [`TypeDescriptor::Wrapper`]. A struct made of several `Choice` fields models a
//! tagged union: at most one field is expected to be populated at runtime. The
//! convention is documented, never enforced.

mod choice;
mod core;
mod describe;

pub use choice::Choice;
pub use core::{Field, FieldList, PrimitiveKind, SpecialWireKind, TypeDescriptor};
pub use describe::{Describe, Empty};
pub use tsbridge_macros::Describe;
