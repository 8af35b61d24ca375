//! # Configuration
//!
//! Two layers of configuration live here:
//!
//! - [`Config`] shapes the registry: where routes are mounted and who hears
//!   about business errors. It is built in code.
//! - [`ServerConfig`] shapes the `serve` command. It is resolved from a YAML
//!   file, then environment variables, then CLI flags, each layer overriding
//!   the one before.
//!
//! ## Environment Variables
//!
//! | Variable                  | Field            | Default        |
//! |---------------------------|------------------|----------------|
//! | `TSBRIDGE_ADDR`           | `addr`           | `0.0.0.0:8080` |
//! | `TSBRIDGE_WORKERS`        | `workers`        | `4`            |
//! | `TSBRIDGE_MAX_BODY_BYTES` | `max_body_bytes` | `1048576`      |
//! | `TSBRIDGE_MOUNT_PATH`     | `mount_path`     | `/`            |
//! | `TSBRIDGE_CLIENT_OUT`     | `client_out`     | unset          |
//!
//! Values that fail to parse are ignored with a warning.
//!
//! ## Example File
//!
//! ```yaml
//! addr: 127.0.0.1:9000
//! workers: 8
//! mount_path: /api
//! client_out: web/src/api.ts
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::registry::RouteIdentity;

/// Callback invoked with every business error a handler returns.
///
/// Runs synchronously on the request path, before the 400 response is built.
pub type ErrorObserver = Arc<dyn Fn(&RouteIdentity, &anyhow::Error) + Send + Sync>;

/// Registry configuration.
#[derive(Clone)]
pub struct Config {
    /// Path prefix routes are mounted under (default `/`)
    pub mount_path: String,
    pub on_error: Option<ErrorObserver>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount_path: "/".to_string(),
            on_error: None,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount routes under `mount_path`. An empty path means `/`.
    #[must_use]
    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        let mount_path = mount_path.into();
        self.mount_path = if mount_path.is_empty() {
            "/".to_string()
        } else {
            mount_path
        };
        self
    }

    #[must_use]
    pub fn with_error_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RouteIdentity, &anyhow::Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(observer));
        self
    }

    /// Route for an identity under this mount path.
    ///
    /// One trailing `/` is dropped from the mount path before joining, so both
    /// `/` and `/api/` behave as expected.
    #[must_use]
    pub fn route_for(&self, identity: &RouteIdentity) -> String {
        let prefix = self
            .mount_path
            .strip_suffix('/')
            .unwrap_or(&self.mount_path);
        format!("{prefix}/{identity}")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("mount_path", &self.mount_path)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Settings for the `serve` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub addr: String,
    /// Number of worker threads pulling requests
    pub workers: usize,
    /// Largest accepted request body; bigger bodies get 413
    pub max_body_bytes: usize,
    pub mount_path: String,
    /// Where to write the generated client before serving, if anywhere
    pub client_out: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            workers: 4,
            max_body_bytes: 1024 * 1024,
            mount_path: "/".to_string(),
            client_out: None,
        }
    }
}

impl ServerConfig {
    /// Load a YAML file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not valid YAML for this shape.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply `TSBRIDGE_*` overrides from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply `TSBRIDGE_*` overrides from an arbitrary lookup.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TSBRIDGE_ADDR") {
            self.addr = addr;
        }
        if let Some(workers) = parse_var(&lookup, "TSBRIDGE_WORKERS") {
            self.workers = workers;
        }
        if let Some(max) = parse_var(&lookup, "TSBRIDGE_MAX_BODY_BYTES") {
            self.max_body_bytes = max;
        }
        if let Some(mount_path) = lookup("TSBRIDGE_MOUNT_PATH") {
            self.mount_path = mount_path;
        }
        if let Some(out) = lookup("TSBRIDGE_CLIENT_OUT") {
            self.client_out = (!out.is_empty()).then(|| PathBuf::from(out));
        }
        self
    }

    /// Registry configuration matching this server's mount path.
    #[must_use]
    pub fn registry_config(&self) -> Config {
        Config::new().with_mount_path(self.mount_path.clone())
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, value = %raw, error = %err, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_route_for_mount_paths() {
        let id = RouteIdentity::new("pkg", "Foo").unwrap();
        assert_eq!(Config::new().route_for(&id), "/pkg.Foo");
        assert_eq!(
            Config::new().with_mount_path("/api").route_for(&id),
            "/api/pkg.Foo"
        );
        assert_eq!(
            Config::new().with_mount_path("/api/").route_for(&id),
            "/api/pkg.Foo"
        );
        assert_eq!(Config::new().with_mount_path("").route_for(&id), "/pkg.Foo");
    }

    #[test]
    fn test_debug_hides_observer() {
        let config = Config::new().with_error_observer(|_, _| {});
        let text = format!("{config:?}");
        assert!(text.contains("on_error: true"));
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_body_bytes, 1_048_576);
        assert_eq!(config.mount_path, "/");
        assert!(config.client_out.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::default().with_overrides(lookup(&[
            ("TSBRIDGE_ADDR", "127.0.0.1:9000"),
            ("TSBRIDGE_WORKERS", "2"),
            ("TSBRIDGE_MOUNT_PATH", "/rpc"),
            ("TSBRIDGE_CLIENT_OUT", "out/api.ts"),
        ]));
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.workers, 2);
        assert_eq!(config.mount_path, "/rpc");
        assert_eq!(config.client_out, Some(PathBuf::from("out/api.ts")));
    }

    #[test]
    fn test_unparsable_override_is_ignored() {
        let config = ServerConfig::default()
            .with_overrides(lookup(&[("TSBRIDGE_WORKERS", "many")]));
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workers: 8\nmount_path: /api").unwrap();
        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.mount_path, "/api");
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert_eq!(config.registry_config().mount_path, "/api");
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workers: [not a number").unwrap();
        let err = ServerConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
