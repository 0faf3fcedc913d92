// HTTP front end.
//
// Architecture: one background thread owns a `tiny_http::Server` and handles
// requests one at a time to completion. Poem generation is synchronous and
// each request gets its own generator, so there is no shared mutable state
// beyond the registry's record list. The loop polls with `recv_timeout` so
// it can notice the `keep_running` flag (cleared by `ServerHandle::stop`).
//
// Routes:
// - `HEAD` (any path): 200, empty body. Used by uptime checks.
// - `GET /?id=<id>&seed=<n>&chaos=1`: the poem page. A missing or empty id
//   picks a random municipality; an unparsable seed counts as absent.
// - anything else: 404 (unknown path) or 405 (other methods).

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use askama::Template;
use kommunpoet_corpus::Registry;
use kommunpoet_engine::Mode;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::page::PageView;

/// How long the loop waits for a request before rechecking `keep_running`.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Signal the server to stop and wait for it to shut down.
    pub fn stop(self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread {
            let _ = handle.join();
        }
    }
}

/// Start serving on a background thread. Returns a handle for stopping it
/// and the bound address (useful with port 0).
pub fn start_server(
    config: &ServerConfig,
    registry: Arc<Registry>,
) -> Result<(ServerHandle, SocketAddr), ServerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let server = Server::http(addr.as_str()).map_err(|err| ServerError::Bind {
        addr: addr.clone(),
        message: err.to_string(),
    })?;
    let local_addr = server.server_addr().to_ip().ok_or(ServerError::NoAddress)?;
    info!(%local_addr, "listening");

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = keep_running.clone();
    let thread = thread::spawn(move || {
        run_server(server, registry, keep_running_clone);
    });

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        local_addr,
    ))
}

/// Request loop. Runs until `keep_running` is set to false.
fn run_server(server: Server, registry: Arc<Registry>, keep_running: Arc<AtomicBool>) {
    while keep_running.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => handle_request(&registry, request),
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "listener failed");
                break;
            }
        }
    }
    info!("server stopped");
}

fn handle_request(registry: &Registry, request: Request) {
    let reply = route(registry, request.method(), request.url());
    debug!(
        method = %request.method(),
        url = request.url(),
        status = reply.status,
        "request"
    );
    if let Err(err) = request.respond(reply.into_response()) {
        warn!(error = %err, "could not send response");
    }
}

/// A response before it is handed to `tiny_http`.
#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let response = Response::from_string(self.body).with_status_code(self.status);
        match Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            Ok(header) => response.with_header(header),
            Err(()) => response,
        }
    }
}

/// Query parameters of the poem page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PoemQuery {
    pub id: Option<String>,
    pub seed: Option<u64>,
    pub chaos: bool,
}

impl PoemQuery {
    /// Parse a URL query string. The first occurrence of a key wins.
    pub fn parse(query: &str) -> Self {
        let mut id = None;
        let mut seed = None;
        let mut chaos = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "id" if id.is_none() => id = Some(value.into_owned()),
                "seed" if seed.is_none() => seed = Some(value.trim().parse::<u64>().ok()),
                "chaos" if chaos.is_none() => {
                    chaos = Some(matches!(value.as_ref(), "1" | "true" | "on"))
                }
                _ => {}
            }
        }
        Self {
            id: id.filter(|id| !id.is_empty()),
            seed: seed.flatten(),
            chaos: chaos.unwrap_or(false),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_flag(self.chaos)
    }
}

/// Produce the reply for a request.
pub fn route(registry: &Registry, method: &Method, url: &str) -> Reply {
    if *method == Method::Head {
        return Reply::text(200, "");
    }
    if *method != Method::Get {
        return Reply::text(405, "method not allowed");
    }
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    if path != "/" {
        return Reply::text(404, "not found");
    }

    let query = PoemQuery::parse(query);
    match registry.name_and_poem(query.id.as_deref(), query.mode(), query.seed) {
        Ok((name, poem)) => {
            let choices = registry.choices();
            let view = PageView::new(&choices, query.id.as_deref(), query.chaos, &name, &poem);
            match view.render() {
                Ok(html) => Reply::html(html),
                Err(err) => {
                    warn!(error = %err, "page template failed");
                    Reply::text(500, err.to_string())
                }
            }
        }
        Err(err) => {
            warn!(error = %err, id = ?query.id, "no poem");
            Reply::text(500, err.to_string())
        }
    }
}
