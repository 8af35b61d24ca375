use std::io::{self, Cursor, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tiny_http::{Header, Method, Request, Response};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::registry::{RequestId, REQUEST_ID_HEADER};
use crate::router::{HandlerResponse, MemoryRouter, RouteRequest};

/// Serves a [`MemoryRouter`] over HTTP/1.1.
///
/// A fixed pool of worker threads pulls requests off one shared listener.
/// Every response is JSON:
///
/// | Situation | Status |
/// |---|---|
/// | no route at the path | 404 |
/// | route exists, method is not POST | 405 |
/// | body over `max_body_bytes` | 413 |
/// | otherwise | whatever the route returns |
pub struct HttpServer {
    router: Arc<MemoryRouter>,
    workers: usize,
    max_body_bytes: usize,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it, or
/// joining the worker threads.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<tiny_http::Server>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the server is bound to (with the real port when started on `:0`)
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if no connection succeeds within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting requests and wait for every worker to finish.
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for _ in 0..self.workers.len() {
            self.server.unblock();
        }
        for worker in self.workers {
            if worker.join().is_err() {
                warn!("server worker panicked during shutdown");
            }
        }
        info!(addr = %self.addr, "server stopped");
    }

    /// Block until every worker exits.
    ///
    /// # Errors
    ///
    /// A worker thread panicked.
    pub fn join(self) -> thread::Result<()> {
        let mut result = Ok(());
        for worker in self.workers {
            if let Err(panic) = worker.join() {
                result = Err(panic);
            }
        }
        result
    }
}

impl HttpServer {
    #[must_use]
    pub fn new(router: MemoryRouter) -> Self {
        let defaults = ServerConfig::default();
        Self {
            router: Arc::new(router),
            workers: defaults.workers,
            max_body_bytes: defaults.max_body_bytes,
        }
    }

    /// Server for `router` using the worker count and body limit in `config`
    #[must_use]
    pub fn from_config(router: MemoryRouter, config: &ServerConfig) -> Self {
        Self::new(router)
            .with_workers(config.workers)
            .with_max_body_bytes(config.max_body_bytes)
    }

    /// Number of worker threads (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Bind `addr` and start the workers.
    ///
    /// # Errors
    ///
    /// The address is invalid or cannot be bound, or a worker thread cannot
    /// be spawned.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let server = tiny_http::Server::http(addr).map_err(|err| io::Error::other(err.to_string()))?;
        let addr = server.server_addr().to_ip().unwrap_or(addr);
        let server = Arc::new(server);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(self.workers);
        for index in 0..self.workers {
            let server = Arc::clone(&server);
            let router = Arc::clone(&self.router);
            let shutdown = Arc::clone(&shutdown);
            let max_body_bytes = self.max_body_bytes;
            let worker = thread::Builder::new()
                .name(format!("tsbridge-worker-{index}"))
                .spawn(move || worker_loop(&server, &router, &shutdown, max_body_bytes))?;
            workers.push(worker);
        }

        info!(
            %addr,
            workers = workers.len(),
            routes = self.router.len(),
            max_body_bytes = self.max_body_bytes,
            "server listening"
        );
        Ok(ServerHandle {
            addr,
            server,
            shutdown,
            workers,
        })
    }
}

fn worker_loop(
    server: &tiny_http::Server,
    router: &MemoryRouter,
    shutdown: &AtomicBool,
    max_body_bytes: usize,
) {
    loop {
        match server.recv() {
            Ok(request) => serve(router, max_body_bytes, request),
            Err(_) if shutdown.load(Ordering::SeqCst) => break,
            Err(err) => warn!(error = %err, "failed to receive request"),
        }
    }
}

fn serve(router: &MemoryRouter, max_body_bytes: usize, mut request: Request) {
    let started = Instant::now();
    let url = request.url().to_string();
    let path = url.split_once('?').map_or(url.as_str(), |(path, _)| path);
    let headers: Vec<(String, String)> = request
        .headers()
        .iter()
        .map(|header| (header.field.to_string(), header.value.to_string()))
        .collect();

    let mut response = route(router, max_body_bytes, &mut request, path, &headers);
    if response.get_header(REQUEST_ID_HEADER).is_none() {
        let inbound = RouteRequest::new(path, &headers, &[]).header(REQUEST_ID_HEADER);
        response.set_header(
            REQUEST_ID_HEADER,
            RequestId::from_header_or_new(inbound).to_string(),
        );
    }

    let status = response.status;
    debug!(
        method = %request.method(),
        path,
        status,
        elapsed_us = micros(started.elapsed()),
        "request served"
    );
    if let Err(err) = request.respond(into_http(response)) {
        debug!(error = %err, path, "client went away before the response was sent");
    }
}

fn route(
    router: &MemoryRouter,
    max_body_bytes: usize,
    request: &mut Request,
    path: &str,
    headers: &[(String, String)],
) -> HandlerResponse {
    if router.handler(path).is_none() {
        return HandlerResponse::error(404, &format!("no route for {path}"));
    }
    if *request.method() != Method::Post {
        let mut response = HandlerResponse::error(405, "method not allowed, use POST");
        response.set_header("Allow", "POST".to_string());
        return response;
    }
    if request.body_length().is_some_and(|len| len > max_body_bytes) {
        return payload_too_large(max_body_bytes);
    }

    let mut body = Vec::new();
    let limit = u64::try_from(max_body_bytes).unwrap_or(u64::MAX).saturating_add(1);
    if let Err(err) = request.as_reader().take(limit).read_to_end(&mut body) {
        return HandlerResponse::error(400, &format!("failed to read request body: {err}"));
    }
    if body.len() > max_body_bytes {
        return payload_too_large(max_body_bytes);
    }

    router
        .dispatch_request(RouteRequest::new(path, headers, &body))
        .unwrap_or_else(|| HandlerResponse::error(404, &format!("no route for {path}")))
}

/// Whole microseconds, saturating at `u64::MAX`.
fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

fn payload_too_large(max_body_bytes: usize) -> HandlerResponse {
    HandlerResponse::error(
        413,
        &format!("request body exceeds {max_body_bytes} bytes"),
    )
}

fn into_http(response: HandlerResponse) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::to_vec(&response.body).unwrap_or_else(|_| b"null".to_vec());
    let mut http = Response::from_data(body).with_status_code(response.status);
    let headers = std::iter::once(("Content-Type", "application/json"))
        .chain(response.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    for (name, value) in headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => http.add_header(header),
            Err(()) => warn!(name, "dropping response header that is not valid ASCII"),
        }
    }
    http
}
