//! # Registry Module
//!
//! Binds typed handlers to routes and remembers their type descriptors for
//! client generation.
//!
//! ## Overview
//!
//! A handler is any `Fn(&RequestContext, I) -> anyhow::Result<O>` where `I` is
//! deserializable and `O` serializable, both implementing
//! [`Describe`](crate::Describe). Registering it:
//!
//! 1. resolves its [`RouteIdentity`] (explicitly, or with [`route!`](crate::route)),
//! 2. builds the route `{mount_path}/{namespace}.{name}`,
//! 3. records a [`HandlerDescriptor`] under `namespace.name`,
//! 4. mounts a request adapter on the [`Router`](crate::router::Router).
//!
//! ## Request Adapter
//!
//! | Situation | Response |
//! |---|---|
//! | body does not decode into `I` | 400 `{"message": "<decoder text>"}` |
//! | handler returns `Err(e)` | observer called, then 400 `{"message": "<e>"}` |
//! | handler panics | 500 `{"message": "handler panicked"}` |
//! | handler returns `Ok(o)` | 200 with `o` as JSON |
//!
//! An empty body is treated as `{}`. Every response carries an
//! `x-request-id` header; an inbound ULID in that header is reused.
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tsbridge::router::MemoryRouter;
//! use tsbridge::{Describe, Registry, RequestContext, RouteIdentity};
//!
//! #[derive(Deserialize, Describe)]
//! struct Hello {
//!     name: String,
//! }
//!
//! #[derive(Serialize, Describe)]
//! struct Greeting {
//!     message: String,
//! }
//!
//! fn hello(_ctx: &RequestContext<'_>, input: Hello) -> anyhow::Result<Greeting> {
//!     Ok(Greeting { message: format!("Hello, {}!", input.name) })
//! }
//!
//! let mut router = MemoryRouter::new();
//! let mut registry = Registry::new();
//! let route = registry
//!     .register(&mut router, RouteIdentity::new("greeter", "hello")?, hello)?;
//! assert_eq!(route, "/greeter.hello");
//!
//! let resp = router.dispatch(&route, br#"{"name":"Ada"}"#).unwrap();
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.body["message"], "Hello, Ada!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod adapter;
mod context;
mod core;
mod identity;
#[cfg(test)]
mod tests;

pub use adapter::decode_body;
pub use context::{RequestContext, RequestId, REQUEST_ID_HEADER};
pub use core::{HandlerDescriptor, HandlerTypes, Registry};
pub use identity::RouteIdentity;
