//! # tsbridge
//!
//! **tsbridge** turns plain Rust functions into JSON-over-HTTP endpoints and
//! generates a fully typed TypeScript client for them.
//!
//! ## Overview
//!
//! A handler is an ordinary function from a deserializable input to a
//! serializable output:
//!
//! ```rust
//! # use serde::{Deserialize, Serialize};
//! # use tsbridge::{Describe, RequestContext};
//! #[derive(Deserialize, Describe)]
//! struct GetPlaylists {
//!     owner: String,
//! }
//!
//! #[derive(Serialize, Describe)]
//! struct Playlist {
//!     title: String,
//!     tracks: Vec<String>,
//! }
//!
//! fn get_playlists(_ctx: &RequestContext<'_>, input: GetPlaylists) -> anyhow::Result<Vec<Playlist>> {
//!     Ok(vec![Playlist { title: format!("{}'s mix", input.owner), tracks: vec![] }])
//! }
//! ```
//!
//! Registering it on a [`Registry`] mounts `POST /{namespace}.{name}` on a
//! [`Router`](router::Router) and records the input and output
//! [`TypeDescriptor`]s. The generator then compiles every descriptor into
//! TypeScript and renders a `createClient(baseUrl)` function whose methods
//! mirror the registered handlers: `client.playlists.get_playlists({ owner })`.
//!
//! ## Architecture
//!
//! - **[`descriptor`]** - the [`Describe`] trait, `#[derive(Describe)]`, [`Choice`]
//! - **[`typegen`]** - descriptor → TypeScript compiler with cycle handling
//! - **[`registry`]** - handler registration, route identities, request adapter
//! - **[`router`]** - the routing seam and an in-memory router
//! - **[`generator`]** - the client template
//! - **[`server`]** - a blocking HTTP server for a [`MemoryRouter`](router::MemoryRouter)
//! - **[`cli`]** - `generate` / `serve` / `inspect` for service binaries
//! - **[`config`]**, **[`logging`]** - configuration and tracing setup
//!
//! ```text
//! register ──► Registry ──► generator::generate ──► client.ts
//!     │
//!     └──► Router ──► HttpServer ◄── POST /ns.name
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tsbridge::router::MemoryRouter;
//! use tsbridge::{route, Registry};
//!
//! mod greeter {
//!     use serde::Deserialize;
//!     use tsbridge::{Describe, RequestContext};
//!
//!     #[derive(Deserialize, Describe)]
//!     pub struct Hello {
//!         pub name: String,
//!     }
//!
//!     pub fn hello(_ctx: &RequestContext<'_>, input: Hello) -> anyhow::Result<String> {
//!         Ok(format!("Hello, {}!", input.name))
//!     }
//! }
//!
//! let mut router = MemoryRouter::new();
//! let mut registry = Registry::new();
//! let route = registry.register(&mut router, route!(greeter::hello)?, greeter::hello)?;
//! assert_eq!(route, "/greeter.hello");
//!
//! let client = registry.generate_client()?;
//! assert!(client.contains("export type GreeterHelloInput = greeter_Hello"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

extern crate self as tsbridge;

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod logging;
pub mod registry;
pub mod router;
pub mod server;
pub mod typegen;

pub use config::{Config, ErrorObserver, ServerConfig};
pub use descriptor::{
    Choice, Describe, Empty, Field, FieldList, PrimitiveKind, SpecialWireKind, TypeDescriptor,
};
pub use error::{DecodeError, GenerationError, IdentityResolutionError, RegistryError};
pub use registry::{
    HandlerDescriptor, HandlerTypes, Registry, RequestContext, RequestId, RouteIdentity,
};

/// Resolve a [`RouteIdentity`] for a handler path at the call site.
///
/// The calling module's path and the stringified handler path are combined,
/// so `route!(hello)` inside `app::greeter` resolves to `greeter.hello` and
/// `route!(Server::greet)` to `greeter.Server_greet`. See
/// [`RouteIdentity::resolve`] for the exact rules.
///
/// Evaluates to `Result<RouteIdentity, IdentityResolutionError>`.
#[macro_export]
macro_rules! route {
    ($($handler:tt)+) => {
        $crate::RouteIdentity::resolve(
            ::std::module_path!(),
            ::std::stringify!($($handler)+),
        )
    };
}
