//! Error types for registration, request decoding, and client generation.
//!
//! Registration and generation errors are fatal: they surface before the
//! process starts serving and before any artifact is written. Decode errors
//! and business errors only ever fail the request they belong to.

use std::fmt;
use std::io;

/// A handler identity that cannot be split into a namespace and a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResolutionError {
    /// Fewer than two path segments were left after cleaning.
    Unresolvable {
        /// The identity as it was given
        identity: String,
    },
    /// A namespace or name segment is empty or contains a separator.
    InvalidSegment {
        /// The offending segment
        segment: String,
    },
}

impl fmt::Display for IdentityResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityResolutionError::Unresolvable { identity } => {
                write!(
                    f,
                    "cannot resolve handler identity '{identity}' into a namespace and a name"
                )
            }
            IdentityResolutionError::InvalidSegment { segment } => {
                write!(
                    f,
                    "invalid route segment '{segment}': segments must be non-empty and \
                    contain no '.', '/' or whitespace"
                )
            }
        }
    }
}

impl std::error::Error for IdentityResolutionError {}

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Identity(IdentityResolutionError),
    /// A handler is already registered under `namespace.name`.
    DuplicateRoute {
        /// The colliding `namespace.name` key
        key: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Identity(err) => err.fmt(f),
            RegistryError::DuplicateRoute { key } => {
                write!(f, "a handler is already registered for '{key}'")
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Identity(err) => Some(err),
            RegistryError::DuplicateRoute { .. } => None,
        }
    }
}

impl From<IdentityResolutionError> for RegistryError {
    fn from(err: IdentityResolutionError) -> Self {
        RegistryError::Identity(err)
    }
}

/// A request body that does not decode into the handler's input type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// JSON path of the failing value (`.` for the document root)
    pub path: String,
    /// The decoder's message
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path == "." {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for DecodeError {}

/// Client generation failure. Nothing is written when one occurs.
#[derive(Debug)]
pub enum GenerationError {
    /// A type with no derivable name reached a place that needs a name.
    AnonymousType {
        /// The inline token the type compiled to
        token: String,
    },
    /// The client template failed to render.
    Render(String),
    /// Writing the artifact failed.
    Io(io::Error),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::AnonymousType { token } => {
                write!(f, "anonymous type has no name to define: {token}")
            }
            GenerationError::Render(message) => {
                write!(f, "failed to render client template: {message}")
            }
            GenerationError::Io(err) => write!(f, "failed to write client: {err}"),
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GenerationError {
    fn from(err: io::Error) -> Self {
        GenerationError::Io(err)
    }
}

impl From<askama::Error> for GenerationError {
    fn from(err: askama::Error) -> Self {
        GenerationError::Render(err.to_string())
    }
}
