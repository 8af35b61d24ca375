use std::fmt;
use std::str::FromStr;

use super::RouteIdentity;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request identifier (ULID).
///
/// Taken from an inbound `x-request-id` header when it holds a valid ULID,
/// generated otherwise, and echoed back on the response.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse the caller's id if it parses, otherwise mint a fresh one.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn as_ulid(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(Self)
    }
}

/// What a handler sees besides its decoded input.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub request_id: RequestId,
    /// Identity of the handler being invoked
    pub identity: &'a RouteIdentity,
    pub path: &'a str,
    pub headers: &'a [(String, String)],
}

impl RequestContext<'_> {
    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_reuses_valid_header() {
        let original = RequestId::new();
        let text = original.to_string();
        assert_eq!(RequestId::from_header_or_new(Some(&text)), original);
    }

    #[test]
    fn test_request_id_replaces_invalid_header() {
        let id = RequestId::from_header_or_new(Some("not-a-ulid"));
        assert_eq!(id.to_string().len(), 26);
        assert_ne!(RequestId::from_header_or_new(None), id);
    }

    #[test]
    fn test_context_header_lookup() {
        let identity = RouteIdentity::new("pkg", "Foo").unwrap();
        let headers = vec![("Authorization".to_string(), "Bearer t".to_string())];
        let ctx = RequestContext {
            request_id: RequestId::new(),
            identity: &identity,
            path: "/pkg.Foo",
            headers: &headers,
        };
        assert_eq!(ctx.header("authorization"), Some("Bearer t"));
        assert_eq!(ctx.header("x-missing"), None);
    }
}
