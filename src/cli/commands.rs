use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{Config, ServerConfig};
use crate::registry::Registry;
use crate::router::MemoryRouter;
use crate::server::HttpServer;
use crate::typegen::TypeCompiler;

/// Command-line interface for a tsbridge service
///
/// The binary supplies the handlers through the setup closure given to
/// [`run_cli`]; the CLI decides what to do with them.
#[derive(Parser, Debug)]
#[command(name = "tsbridge")]
#[command(about = "Typed JSON handlers with a generated TypeScript client", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Write the TypeScript client for the registered handlers
    Generate {
        /// Output file (e.g. web/src/api.ts)
        #[arg(short, long)]
        out: PathBuf,

        /// Path prefix the routes are mounted under
        #[arg(long)]
        mount_path: Option<String>,
    },
    /// Serve the registered handlers over HTTP
    Serve {
        /// YAML config file; environment and flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to bind (e.g. 127.0.0.1:8080)
        #[arg(long)]
        addr: Option<String>,

        /// Worker threads
        #[arg(long)]
        workers: Option<usize>,

        #[arg(long)]
        mount_path: Option<String>,

        /// Regenerate the client here before serving
        #[arg(long)]
        client_out: Option<PathBuf>,
    },
    /// List registered handlers, or show one handler's TypeScript types
    Inspect {
        /// `namespace.name` of the handler to show
        #[arg(long)]
        handler: Option<String>,

        /// Print the named definition of this handler's output
        #[arg(long, conflicts_with = "handler")]
        define: Option<String>,
    },
}

/// Execute a parsed command against the handlers `setup` registers.
///
/// # Errors
///
/// Registration, generation, config loading, or server startup failed.
pub fn run_cli<F>(cli: Cli, setup: F) -> Result<()>
where
    F: Fn(&mut Registry, &mut MemoryRouter) -> Result<()>,
{
    let stdout = io::stdout();
    run_cli_with_output(cli, setup, &mut stdout.lock())
}

/// [`run_cli`] with listing output sent to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run_cli_with_output<F, W>(cli: Cli, setup: F, out: &mut W) -> Result<()>
where
    F: Fn(&mut Registry, &mut MemoryRouter) -> Result<()>,
    W: Write,
{
    match cli.command {
        Commands::Generate { out: path, mount_path } => {
            let mut config = Config::new();
            if let Some(mount_path) = mount_path {
                config = config.with_mount_path(mount_path);
            }
            let (registry, _router) = build(config, &setup)?;
            registry
                .write_client(&path)
                .with_context(|| format!("failed to generate client at {}", path.display()))?;
            writeln!(
                out,
                "wrote client for {} handlers to {}",
                registry.len(),
                path.display()
            )?;
            Ok(())
        }
        Commands::Serve {
            config,
            addr,
            workers,
            mount_path,
            client_out,
        } => {
            let server_config = resolve_server_config(
                config.as_deref(),
                ServeOverrides {
                    addr,
                    workers,
                    mount_path,
                    client_out,
                },
            )?;
            let (registry, router) = build(server_config.registry_config(), &setup)?;
            if let Some(path) = &server_config.client_out {
                registry
                    .write_client(path)
                    .with_context(|| format!("failed to generate client at {}", path.display()))?;
            }

            let handle = HttpServer::from_config(router, &server_config)
                .start(server_config.addr.as_str())
                .with_context(|| format!("failed to bind {}", server_config.addr))?;
            info!(addr = %handle.addr(), handlers = registry.len(), "serving");
            handle
                .join()
                .map_err(|_| anyhow!("a server worker panicked"))
        }
        Commands::Inspect { handler, define } => {
            let (registry, _router) = build(Config::new(), &setup)?;
            match (handler, define) {
                (Some(key), _) => {
                    let types = registry
                        .describe_handler(&key)?
                        .ok_or_else(|| anyhow!("no handler registered as '{key}'"))?;
                    writeln!(out, "input: {}", types.input)?;
                    writeln!(out, "output: {}", types.output)?;
                    for definition in &types.definitions {
                        writeln!(out, "\n{definition}")?;
                    }
                }
                (None, Some(key)) => {
                    let handler = registry
                        .get(&key)
                        .ok_or_else(|| anyhow!("no handler registered as '{key}'"))?;
                    let definition = TypeCompiler::new().define(&handler.output)?;
                    writeln!(out, "{definition}")?;
                }
                (None, None) => {
                    for handler in registry.handlers() {
                        let params = if handler.input_is_empty { "()" } else { "(params)" };
                        writeln!(out, "POST {}\t{}{params}", handler.route, handler.identity)?;
                    }
                }
            }
            Ok(())
        }
    }
}

/// Flag values that override the config file and environment.
#[derive(Debug, Default)]
pub(crate) struct ServeOverrides {
    pub addr: Option<String>,
    pub workers: Option<usize>,
    pub mount_path: Option<String>,
    pub client_out: Option<PathBuf>,
}

/// File, then environment, then flags.
pub(crate) fn resolve_server_config(
    file: Option<&Path>,
    flags: ServeOverrides,
) -> Result<ServerConfig> {
    let mut config = match file {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_env();

    if let Some(addr) = flags.addr {
        config.addr = addr;
    }
    if let Some(workers) = flags.workers {
        config.workers = workers;
    }
    if let Some(mount_path) = flags.mount_path {
        config.mount_path = mount_path;
    }
    if let Some(client_out) = flags.client_out {
        config.client_out = Some(client_out);
    }
    Ok(config)
}

fn build<F>(config: Config, setup: &F) -> Result<(Registry, MemoryRouter)>
where
    F: Fn(&mut Registry, &mut MemoryRouter) -> Result<()>,
{
    let mut registry = Registry::with_config(config);
    let mut router = MemoryRouter::new();
    setup(&mut registry, &mut router).context("handler registration failed")?;
    Ok((registry, router))
}
