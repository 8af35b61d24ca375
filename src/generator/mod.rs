//! # Generator Module
//!
//! Renders a self-contained TypeScript client for everything in a
//! [`Registry`](crate::Registry).
//!
//! ## Output Layout
//!
//! The artifact is rendered from `templates/client.ts.txt` in a fixed order:
//!
//! 1. the `ApiError` / `ApiResponse<T>` envelope types
//! 2. every named type definition, in first-seen order
//! 3. per handler: `{Prefix}Input` (omitted for empty inputs),
//!    `{Prefix}Output` and `{Prefix}Handler` aliases, where `Prefix` is
//!    PascalCase(namespace) + PascalCase(name), so `users.get_by_id` gives
//!    `UsersGetByIdInput`
//! 4. the `ApiClient` interface, grouped by namespace
//! 5. `createClient(baseUrl, config?)`, which POSTs JSON to
//!    `${baseUrl}/${namespace}.${name}` and turns transport failures and
//!    non-2xx responses into `{ data: null, error }` values
//!
//! Given the same registration sequence the output is byte-identical, so the
//! generated file can be checked in and diffed.
//!
//! ```rust
//! use tsbridge::router::MemoryRouter;
//! use tsbridge::{Empty, Registry, RequestContext, RouteIdentity};
//!
//! let mut router = MemoryRouter::new();
//! let mut registry = Registry::new();
//! registry.register(
//!     &mut router,
//!     RouteIdentity::new("status", "ping")?,
//!     |_ctx: &RequestContext<'_>, _input: Empty| Ok("pong".to_string()),
//! )?;
//!
//! let client = tsbridge::generator::generate(&registry)?;
//! assert!(client.contains("export type StatusPingHandler = () => Promise<ApiResponse<StatusPingOutput>>"));
//! assert!(client.contains(r#"ping: () => doFetch("status.ping"),"#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod templates;

pub use client::{generate, write_client};
pub use templates::{ClientTemplate, HandlerView, MethodView, NamespaceView};
