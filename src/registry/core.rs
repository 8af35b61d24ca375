use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::adapter::typed_route;
use super::context::RequestContext;
use super::RouteIdentity;
use crate::config::Config;
use crate::descriptor::{Describe, TypeDescriptor};
use crate::error::{GenerationError, RegistryError};
use crate::generator;
use crate::router::Router;
use crate::typegen::TypeCompiler;

/// Everything the generator needs to know about one registered handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDescriptor {
    pub identity: RouteIdentity,
    /// Full mounted path, e.g. `/api/pkg.Foo`
    pub route: String,
    pub input: TypeDescriptor,
    pub output: TypeDescriptor,
    /// The input is a composite with no fields; the client method takes no
    /// arguments.
    pub input_is_empty: bool,
}

/// Compiled view of a handler's types, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerTypes {
    pub input: String,
    pub output: String,
    /// Every named definition reached from the input and output
    pub definitions: Vec<String>,
}

/// Registered handlers, keyed by `namespace.name`, in registration order.
///
/// The registry is an ordinary value: build one, register handlers on it
/// against a [`Router`], then hand it to the client generator.
#[derive(Debug, Default)]
pub struct Registry {
    handlers: IndexMap<String, HandlerDescriptor>,
    config: Config,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            handlers: IndexMap::new(),
            config,
        }
    }

    /// Register a typed handler and mount it on `router`.
    ///
    /// Returns the mounted route.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRoute`] when `namespace.name` is taken. The
    /// router is left untouched in that case.
    pub fn register<I, O, F>(
        &mut self,
        router: &mut dyn Router,
        identity: RouteIdentity,
        handler: F,
    ) -> Result<String, RegistryError>
    where
        I: DeserializeOwned + Describe + 'static,
        O: Serialize + Describe + 'static,
        F: Fn(&RequestContext<'_>, I) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        let key = identity.key();
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::DuplicateRoute { key });
        }

        let input = I::describe();
        let output = O::describe();
        let route = self.config.route_for(&identity);
        let input_is_empty = input.is_empty_composite();
        debug!(%key, %route, input_is_empty, "registering handler");

        router.post(
            &route,
            typed_route(identity.clone(), handler, self.config.on_error.clone()),
        );
        info!(%key, %route, "handler mounted");

        self.handlers.insert(
            key,
            HandlerDescriptor {
                identity,
                route: route.clone(),
                input,
                output,
                input_is_empty,
            },
        );
        Ok(route)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HandlerDescriptor> {
        self.handlers.get(key)
    }

    /// Handlers in registration order
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.handlers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile one handler's input and output on their own.
    ///
    /// Returns `Ok(None)` for an unknown key.
    ///
    /// # Errors
    ///
    /// One of the handler's types cannot be compiled.
    pub fn describe_handler(&self, key: &str) -> Result<Option<HandlerTypes>, GenerationError> {
        let Some(handler) = self.handlers.get(key) else {
            return Ok(None);
        };
        let mut compiler = TypeCompiler::new();
        let input = compiler.compile(&handler.input)?;
        let output = compiler.compile(&handler.output)?;
        Ok(Some(HandlerTypes {
            input,
            output,
            definitions: compiler.into_definitions(),
        }))
    }

    /// Render the TypeScript client for every registered handler.
    ///
    /// # Errors
    ///
    /// See [`generator::generate`].
    pub fn generate_client(&self) -> Result<String, GenerationError> {
        generator::generate(self)
    }

    /// Render the client and write it to `path`.
    ///
    /// # Errors
    ///
    /// See [`generator::write_client`].
    pub fn write_client(&self, path: &Path) -> Result<(), GenerationError> {
        generator::write_client(self, path)
    }
}
