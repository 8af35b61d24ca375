use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::*;
use crate::config::Config;
use crate::descriptor::{Describe, Empty, TypeDescriptor};
use crate::error::RegistryError;
use crate::router::{MemoryRouter, RouteRequest};

#[derive(Debug, Deserialize, Describe)]
struct Hello {
    name: String,
}

#[derive(Debug, Serialize, Describe)]
struct Greeting {
    message: String,
}

fn hello(_ctx: &RequestContext<'_>, input: Hello) -> anyhow::Result<Greeting> {
    if input.name.is_empty() {
        return Err(anyhow!("name must not be empty"));
    }
    Ok(Greeting {
        message: format!("Hello, {}!", input.name),
    })
}

fn id(namespace: &str, name: &str) -> RouteIdentity {
    RouteIdentity::new(namespace, name).unwrap()
}

fn setup(config: Config) -> (Registry, MemoryRouter) {
    (Registry::with_config(config), MemoryRouter::new())
}

#[test]
fn test_register_returns_route() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();
    assert_eq!(route, "/greeter.hello");
    assert!(router.handler("/greeter.hello").is_some());

    let descriptor = registry.get("greeter.hello").unwrap();
    assert_eq!(descriptor.route, "/greeter.hello");
    assert!(matches!(
        &descriptor.input,
        TypeDescriptor::Named { name, .. } if name.ends_with("tests::Hello")
    ));
    assert!(matches!(
        &descriptor.output,
        TypeDescriptor::Named { name, .. } if name.ends_with("tests::Greeting")
    ));
    assert!(!descriptor.input_is_empty);
}

#[test]
fn test_register_under_mount_path() {
    let (mut registry, mut router) = setup(Config::new().with_mount_path("/api/"));
    let route = registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();
    assert_eq!(route, "/api/greeter.hello");
    assert_eq!(router.paths().collect::<Vec<_>>(), vec!["/api/greeter.hello"]);
}

#[test]
fn test_duplicate_registration_fails_before_mounting() {
    let (mut registry, mut router) = setup(Config::new());
    registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();

    let mut other = MemoryRouter::new();
    let err = registry
        .register(&mut other, id("greeter", "hello"), hello)
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateRoute {
            key: "greeter.hello".to_string()
        }
    );
    assert!(other.is_empty());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_success_response() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();

    let resp = router.dispatch(&route, br#"{"name":"Ada"}"#).unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, serde_json::json!({ "message": "Hello, Ada!" }));
}

#[test]
fn test_decode_failure_is_400() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();

    let resp = router.dispatch(&route, b"{not json").unwrap();
    assert_eq!(resp.status, 400);
    assert!(resp.message().is_some());

    let resp = router.dispatch(&route, br#"{"name": 5}"#).unwrap();
    assert_eq!(resp.status, 400);
    assert!(resp.message().unwrap().starts_with("name: invalid type"));
}

#[test]
fn test_business_error_notifies_observer() {
    let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let config = Config::new().with_error_observer(move |identity, err| {
        sink.lock()
            .unwrap()
            .push((identity.key(), err.to_string()));
    });
    let (mut registry, mut router) = setup(config);
    let route = registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();

    let resp = router.dispatch(&route, br#"{"name":""}"#).unwrap();
    assert_eq!(resp.status, 400);
    assert_eq!(resp.message(), Some("name must not be empty"));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(
            "greeter.hello".to_string(),
            "name must not be empty".to_string()
        )]
    );
}

#[test]
fn test_observer_not_called_for_decode_errors() {
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&calls);
    let config = Config::new().with_error_observer(move |_, _| {
        *counter.lock().unwrap() += 1;
    });
    let (mut registry, mut router) = setup(config);
    let route = registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();

    let resp = router.dispatch(&route, b"[]").unwrap();
    assert_eq!(resp.status, 400);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn test_empty_input_accepts_empty_body() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(
            &mut router,
            id("status", "ping"),
            |_ctx: &RequestContext<'_>, _input: Empty| Ok("pong".to_string()),
        )
        .unwrap();

    assert!(registry.get("status.ping").unwrap().input_is_empty);
    let resp = router.dispatch(&route, b"").unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, serde_json::json!("pong"));
}

#[test]
fn test_empty_output_is_encoded() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(
            &mut router,
            id("status", "touch"),
            |_ctx: &RequestContext<'_>, _input: Empty| Ok(Empty {}),
        )
        .unwrap();

    let resp = router.dispatch(&route, b"{}").unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, serde_json::json!({}));
}

#[test]
fn test_panicking_handler_is_500() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(
            &mut router,
            id("status", "explode"),
            |_ctx: &RequestContext<'_>, _input: Empty| -> anyhow::Result<Empty> {
                panic!("kaboom")
            },
        )
        .unwrap();

    let resp = router.dispatch(&route, b"{}").unwrap();
    assert_eq!(resp.status, 500);
    assert_eq!(resp.message(), Some("handler panicked"));

    // The route keeps serving after a panic.
    let resp = router.dispatch(&route, b"{}").unwrap();
    assert_eq!(resp.status, 500);
}

#[test]
fn test_request_id_is_echoed() {
    let (mut registry, mut router) = setup(Config::new());
    let route = registry
        .register(
            &mut router,
            id("status", "whoami"),
            |ctx: &RequestContext<'_>, _input: Empty| Ok(ctx.request_id.to_string()),
        )
        .unwrap();

    let inbound = RequestId::new().to_string();
    let headers = vec![("X-Request-Id".to_string(), inbound.clone())];
    let resp = router
        .dispatch_request(RouteRequest::new(&route, &headers, b""))
        .unwrap();
    assert_eq!(resp.body, serde_json::json!(inbound));
    assert_eq!(resp.get_header(REQUEST_ID_HEADER), Some(inbound.as_str()));

    let resp = router.dispatch(&route, b"").unwrap();
    let generated = resp.get_header(REQUEST_ID_HEADER).unwrap();
    assert_ne!(generated, inbound);
    assert_eq!(resp.body, serde_json::json!(generated));
}

#[test]
fn test_context_exposes_identity_and_path() {
    let (mut registry, mut router) = setup(Config::new().with_mount_path("/rpc"));
    let route = registry
        .register(
            &mut router,
            id("meta", "where"),
            |ctx: &RequestContext<'_>, _input: Empty| {
                Ok(format!("{} at {}", ctx.identity, ctx.path))
            },
        )
        .unwrap();

    let resp = router.dispatch(&route, b"").unwrap();
    assert_eq!(resp.body, serde_json::json!("meta.where at /rpc/meta.where"));
}

#[test]
fn test_handlers_in_registration_order() {
    let (mut registry, mut router) = setup(Config::new());
    registry
        .register(&mut router, id("b", "second"), hello)
        .unwrap();
    registry
        .register(&mut router, id("a", "first"), hello)
        .unwrap();

    let keys: Vec<String> = registry.handlers().map(|h| h.identity.key()).collect();
    assert_eq!(keys, vec!["b.second", "a.first"]);
    assert!(registry.get("c.third").is_none());
}

#[test]
fn test_describe_handler() {
    let (mut registry, mut router) = setup(Config::new());
    registry
        .register(&mut router, id("greeter", "hello"), hello)
        .unwrap();

    let types = registry.describe_handler("greeter.hello").unwrap().unwrap();
    assert_eq!(types.input, "tests_Hello");
    assert_eq!(types.output, "tests_Greeting");
    assert_eq!(
        types.definitions,
        vec![
            "type tests_Hello = {\n  name: string\n}".to_string(),
            "type tests_Greeting = {\n  message: string\n}".to_string(),
        ]
    );
    assert!(registry.describe_handler("greeter.bye").unwrap().is_none());
}

#[test]
fn test_primitive_input_is_not_empty() {
    let (mut registry, mut router) = setup(Config::new());
    registry
        .register(
            &mut router,
            id("math", "double"),
            |_ctx: &RequestContext<'_>, n: i64| Ok(n * 2),
        )
        .unwrap();

    let descriptor = registry.get("math.double").unwrap();
    assert_eq!(descriptor.input, TypeDescriptor::number());
    assert!(!descriptor.input_is_empty);
    let resp = router.dispatch("/math.double", b"21").unwrap();
    assert_eq!(resp.body, serde_json::json!(42));
}
