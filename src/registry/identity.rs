use std::fmt;
use std::str::FromStr;

use crate::error::IdentityResolutionError;

/// The `(namespace, name)` pair a handler is known by.
///
/// It is both the network path (`/{namespace}.{name}`) and the generated
/// client's property path (`client.namespace.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteIdentity {
    namespace: String,
    name: String,
}

impl RouteIdentity {
    /// Build an identity from an explicit pair.
    ///
    /// # Errors
    ///
    /// Either part is empty or contains `.`, `/` or whitespace.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, IdentityResolutionError> {
        let namespace = namespace.into();
        let name = name.into();
        validate_segment(&namespace)?;
        validate_segment(&name)?;
        Ok(Self { namespace, name })
    }

    /// Resolve an identity from a module path and a handler path.
    ///
    /// This is what [`route!`](crate::route) calls with `module_path!()` and the
    /// stringified handler expression:
    ///
    /// - `&`, `*`, `(`, `)`, whitespace and `{{closure}}` markers are dropped;
    /// - `crate`, `self` and `super` are resolved against the module path;
    /// - trailing segments starting with an uppercase letter are types, so a
    ///   method `Server::greet` becomes the name `Server_greet`;
    /// - the segment right before the name is the namespace.
    ///
    /// ```rust
    /// use tsbridge::RouteIdentity;
    ///
    /// let id = RouteIdentity::resolve("app::greeter", "Server::greet").unwrap();
    /// assert_eq!(id.namespace(), "greeter");
    /// assert_eq!(id.name(), "Server_greet");
    /// ```
    ///
    /// # Errors
    ///
    /// Fewer than two segments remain, or no module segment precedes the name.
    pub fn resolve(module_path: &str, item_path: &str) -> Result<Self, IdentityResolutionError> {
        let unresolvable = || IdentityResolutionError::Unresolvable {
            identity: if module_path.is_empty() {
                item_path.to_string()
            } else {
                format!("{module_path}::{item_path}")
            },
        };

        let mut path = clean_segments(module_path);
        for segment in clean_segments(item_path) {
            match segment.as_str() {
                "crate" => path.truncate(1),
                "self" => {}
                "super" => {
                    path.pop();
                }
                _ => path.push(segment),
            }
        }

        if path.len() < 2 {
            return Err(unresolvable());
        }

        let mut start = path.len() - 1;
        while start > 0 && starts_uppercase(&path[start - 1]) {
            start -= 1;
        }
        if start == 0 {
            return Err(unresolvable());
        }

        let name = path[start..].join("_");
        let namespace = path.swap_remove(start - 1);
        Self::new(namespace, name)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key and client path: `namespace.name`
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for RouteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for RouteIdentity {
    type Err = IdentityResolutionError;

    /// Parse a `namespace.name` key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Err(IdentityResolutionError::Unresolvable {
                identity: s.to_string(),
            }),
        }
    }
}

fn validate_segment(segment: &str) -> Result<(), IdentityResolutionError> {
    let invalid = segment.is_empty()
        || segment
            .chars()
            .any(|c| c == '.' || c == '/' || c.is_whitespace());
    if invalid {
        return Err(IdentityResolutionError::InvalidSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

fn clean_segments(path: &str) -> Vec<String> {
    path.split("::")
        .flat_map(|part| part.split(['.', '/']))
        .filter(|segment| !segment.starts_with("{{"))
        .map(|segment| {
            segment
                .chars()
                .filter(|c| !matches!(c, '&' | '*' | '(' | ')') && !c.is_whitespace())
                .collect::<String>()
        })
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn starts_uppercase(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}
