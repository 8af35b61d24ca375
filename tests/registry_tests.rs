#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end registration through `route!` and dispatch through the
//! in-memory router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tsbridge::config::Config;
use tsbridge::router::{MemoryRouter, RouteRequest};
use tsbridge::{
    route, Choice, Describe, Empty, IdentityResolutionError, Registry, RegistryError,
    RequestContext, RouteIdentity,
};

mod users {
    use super::*;

    #[derive(Debug, Deserialize, Describe)]
    #[serde(rename_all = "camelCase")]
    pub struct LoadUser {
        pub user_id: u64,
    }

    #[derive(Debug, Serialize, Describe)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub user_id: u64,
        pub display_name: String,
        pub tags: Vec<String>,
    }

    pub fn load(_ctx: &RequestContext<'_>, input: LoadUser) -> anyhow::Result<User> {
        Ok(User {
            user_id: input.user_id,
            display_name: format!("user-{}", input.user_id),
            tags: vec!["new".to_string()],
        })
    }

    pub struct Admin;

    impl Admin {
        pub fn purge(_ctx: &RequestContext<'_>, _input: Empty) -> anyhow::Result<u32> {
            Ok(0)
        }
    }

    pub mod billing {
        use super::super::*;

        #[derive(Debug, Deserialize, Serialize, Describe)]
        pub struct Method {
            pub card: Choice<String>,
            pub iban: Choice<String>,
        }

        pub fn set_method(_ctx: &RequestContext<'_>, input: Method) -> anyhow::Result<Method> {
            match (input.card.is_some(), input.iban.is_some()) {
                (true, false) | (false, true) => Ok(input),
                _ => anyhow::bail!("exactly one payment method must be set"),
            }
        }
    }
}

fn registered() -> (Registry, MemoryRouter) {
    let mut router = MemoryRouter::new();
    let mut registry = Registry::with_config(Config::new().with_mount_path("/api"));
    registry
        .register(&mut router, route!(users::load).unwrap(), users::load)
        .unwrap();
    registry
        .register(
            &mut router,
            route!(users::Admin::purge).unwrap(),
            users::Admin::purge,
        )
        .unwrap();
    registry
        .register(
            &mut router,
            route!(users::billing::set_method).unwrap(),
            users::billing::set_method,
        )
        .unwrap();
    (registry, router)
}

#[test]
fn test_route_macro_resolves_identities() {
    assert_eq!(
        route!(users::load).unwrap(),
        RouteIdentity::new("users", "load").unwrap()
    );
    assert_eq!(
        route!(users::Admin::purge).unwrap(),
        RouteIdentity::new("users", "Admin_purge").unwrap()
    );
    assert_eq!(
        route!(users::billing::set_method).unwrap().key(),
        "billing.set_method"
    );
}

#[test]
fn test_route_macro_uses_calling_module() {
    // A bare name takes the namespace of the module `route!` is expanded in.
    let identity = route!(local).unwrap();
    assert_eq!(identity.namespace(), "registry_tests");
    assert_eq!(identity.name(), "local");
}

#[test]
fn test_identity_resolution_errors() {
    assert!(matches!(
        RouteIdentity::resolve("", "handler"),
        Err(IdentityResolutionError::Unresolvable { .. })
    ));
    assert!(matches!(
        RouteIdentity::new("users", "has space"),
        Err(IdentityResolutionError::InvalidSegment { .. })
    ));
}

#[test]
fn test_routes_follow_registration() {
    let (registry, router) = registered();
    let routes: Vec<&str> = registry.handlers().map(|h| h.route.as_str()).collect();
    assert_eq!(
        routes,
        vec![
            "/api/users.load",
            "/api/users.Admin_purge",
            "/api/billing.set_method"
        ]
    );
    assert_eq!(router.paths().collect::<Vec<_>>(), routes);
}

#[test]
fn test_dispatch_round_trip() {
    let (_registry, router) = registered();
    let resp = router.dispatch("/api/users.load", br#"{"userId": 7}"#).unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.body,
        json!({ "userId": 7, "displayName": "user-7", "tags": ["new"] })
    );
}

#[test]
fn test_choice_fields_on_the_wire() {
    let (_registry, router) = registered();

    let resp = router
        .dispatch("/api/billing.set_method", br#"{"card": "4242"}"#)
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "card": "4242", "iban": null }));

    let resp = router
        .dispatch("/api/billing.set_method", br#"{"card": "4242", "iban": "DE00"}"#)
        .unwrap();
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.message(),
        Some("exactly one payment method must be set")
    );
}

#[test]
fn test_decode_error_names_the_field() {
    let (_registry, router) = registered();
    let resp = router
        .dispatch("/api/users.load", br#"{"userId": "seven"}"#)
        .unwrap();
    assert_eq!(resp.status, 400);
    assert!(resp.message().unwrap().starts_with("userId: invalid type"));
}

#[test]
fn test_duplicate_identity_from_other_module_path() {
    let (mut registry, mut router) = registered();
    let err = registry
        .register(
            &mut router,
            RouteIdentity::resolve("elsewhere::users", "load").unwrap(),
            users::load,
        )
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateRoute {
            key: "users.load".to_string()
        }
    );
    assert_eq!(router.len(), 3);
}

#[test]
fn test_observer_sees_business_errors_only() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut router = MemoryRouter::new();
    let mut registry = Registry::with_config(Config::new().with_error_observer(move |id, _| {
        assert_eq!(id.key(), "billing.set_method");
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    registry
        .register(
            &mut router,
            route!(users::billing::set_method).unwrap(),
            users::billing::set_method,
        )
        .unwrap();

    router.dispatch("/billing.set_method", b"{}").unwrap();
    router.dispatch("/billing.set_method", b"not json").unwrap();
    router
        .dispatch("/billing.set_method", br#"{"iban": "DE00"}"#)
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_request_headers_reach_the_context() {
    let mut router = MemoryRouter::new();
    let mut registry = Registry::new();
    registry
        .register(
            &mut router,
            RouteIdentity::new("meta", "agent").unwrap(),
            |ctx: &RequestContext<'_>, _input: Empty| {
                Ok(ctx.header("user-agent").unwrap_or("none").to_string())
            },
        )
        .unwrap();

    let headers = vec![("User-Agent".to_string(), "tests/1.0".to_string())];
    let resp = router
        .dispatch_request(RouteRequest::new("/meta.agent", &headers, b""))
        .unwrap();
    assert_eq!(resp.body, json!("tests/1.0"));
}
