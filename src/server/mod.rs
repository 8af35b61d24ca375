//! # Server Module
//!
//! A small blocking HTTP server for the routes a [`Registry`](crate::Registry)
//! mounts on a [`MemoryRouter`](crate::router::MemoryRouter).
//!
//! ```rust,no_run
//! use tsbridge::router::MemoryRouter;
//! use tsbridge::server::HttpServer;
//!
//! let router = MemoryRouter::new();
//! let handle = HttpServer::new(router).with_workers(2).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! handle.stop();
//! # Ok::<(), std::io::Error>(())
//! ```

mod http_server;

pub use http_server::{HttpServer, ServerHandle};
