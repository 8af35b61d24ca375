use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info_span, warn};

use super::context::{RequestContext, RequestId, REQUEST_ID_HEADER};
use super::RouteIdentity;
use crate::config::ErrorObserver;
use crate::error::DecodeError;
use crate::router::{HandlerResponse, RouteHandler, RouteRequest};

/// Decode a request body into a handler's input type.
///
/// An empty or whitespace-only body decodes as `{}`, so zero-field inputs
/// accept a bare POST. Failures below the document root carry the JSON path
/// of the offending value.
///
/// # Errors
///
/// The body is not valid JSON for `I`, or has trailing content.
pub fn decode_body<I: DeserializeOwned>(body: &[u8]) -> Result<I, DecodeError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };

    let mut de = serde_json::Deserializer::from_slice(body);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|err| DecodeError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })?;
    de.end().map_err(|err| DecodeError {
        path: ".".to_string(),
        message: err.to_string(),
    })?;
    Ok(value)
}

/// Wrap a typed handler into a route callback.
///
/// Per request:
///
/// 1. decode the body (400 on failure)
/// 2. call the handler, catching panics (500)
/// 3. business error: notify the observer, then 400 with the error text
/// 4. success: 200 with the encoded output (500 if encoding fails)
pub(crate) fn typed_route<I, O, F>(
    identity: RouteIdentity,
    handler: F,
    on_error: Option<ErrorObserver>,
) -> RouteHandler
where
    I: DeserializeOwned + 'static,
    O: Serialize + 'static,
    F: Fn(&RequestContext<'_>, I) -> anyhow::Result<O> + Send + Sync + 'static,
{
    let identity = Arc::new(identity);
    Arc::new(move |req: RouteRequest<'_>| {
        let request_id = RequestId::from_header_or_new(req.header(REQUEST_ID_HEADER));
        let span = info_span!("handler", route = %identity, %request_id);
        let _enter = span.enter();

        let ctx = RequestContext {
            request_id,
            identity: &identity,
            path: req.path,
            headers: req.headers,
        };
        let mut response = invoke(&ctx, &handler, on_error.as_ref(), req.body);
        response.set_header(REQUEST_ID_HEADER, request_id.to_string());
        response
    })
}

fn invoke<I, O, F>(
    ctx: &RequestContext<'_>,
    handler: &F,
    on_error: Option<&ErrorObserver>,
    body: &[u8],
) -> HandlerResponse
where
    I: DeserializeOwned,
    O: Serialize,
    F: Fn(&RequestContext<'_>, I) -> anyhow::Result<O>,
{
    let input: I = match decode_body(body) {
        Ok(input) => input,
        Err(err) => {
            warn!(path = %err.path, error = %err.message, "request body rejected");
            return HandlerResponse::error(400, &err.to_string());
        }
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(ctx, input)));

    match outcome {
        Ok(Ok(output)) => match serde_json::to_value(&output) {
            Ok(body) => {
                debug!("handler succeeded");
                HandlerResponse::json(200, body)
            }
            Err(err) => {
                error!(error = %err, "failed to encode handler output");
                HandlerResponse::error(500, &format!("failed to encode response: {err}"))
            }
        },
        Ok(Err(err)) => {
            if let Some(observer) = on_error {
                observer(ctx.identity, &err);
            }
            warn!(error = %err, "handler returned an error");
            HandlerResponse::error(400, &err.to_string())
        }
        Err(payload) => {
            error!(panic = %panic_message(payload.as_ref()), "handler panicked");
            HandlerResponse::error(500, "handler panicked")
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
