//! # CLI Module
//!
//! `generate`, `serve` and `inspect` subcommands for binaries built on
//! tsbridge.
//!
//! A binary parses [`Cli`] and hands it to [`run_cli`] together with a setup
//! closure that registers its handlers:
//!
//! ```rust,no_run
//! use clap::Parser;
//! use tsbridge::cli::{run_cli, Cli};
//!
//! fn main() -> anyhow::Result<()> {
//!     run_cli(Cli::parse(), |_registry, _router| {
//!         // registry.register(router, route!(greet)?, greet)?;
//!         Ok(())
//!     })
//! }
//! ```
//!
//! ## Commands
//!
//! - `generate --out <file> [--mount-path <prefix>]` writes the TypeScript client
//! - `serve [--config <yaml>] [--addr] [--workers] [--mount-path] [--client-out]`
//!   runs the HTTP server, optionally regenerating the client first
//! - `inspect [--handler <ns.name> | --define <ns.name>]` lists handlers or
//!   prints one handler's compiled types

mod commands;


pub use commands::{run_cli, run_cli_with_output, Cli, Commands};
