//! # Router Module
//!
//! The seam between the handler registry and whatever serves HTTP.
//!
//! ## Overview
//!
//! The registry only needs one capability from a router: "call this function
//! for POST requests to this path". That capability is the [`Router`] trait.
//! A mounted [`RouteHandler`] receives a [`RouteRequest`] (path, headers, raw
//! body bytes) and returns a [`HandlerResponse`] (status + JSON body).
//!
//! Two routers ship with the crate:
//!
//! - [`MemoryRouter`] keeps the routes in memory and dispatches in-process.
//!   Tests use it directly, and it is what [`HttpServer`](crate::server::HttpServer)
//!   serves.
//! - Any other substrate can implement [`Router`] in a few lines.
//!
//! ```rust
//! use std::sync::Arc;
//! use tsbridge::router::{HandlerResponse, MemoryRouter, RouteRequest, Router};
//!
//! let mut router = MemoryRouter::new();
//! router.post(
//!     "/ping.Ping",
//!     Arc::new(|_req: RouteRequest<'_>| {
//!         HandlerResponse::json(200, serde_json::json!("pong"))
//!     }),
//! );
//!
//! let resp = router.dispatch("/ping.Ping", b"{}").expect("mounted");
//! assert_eq!(resp.status, 200);
//! ```

mod core;

pub use core::{HandlerResponse, MemoryRouter, RouteHandler, RouteRequest, Router};
