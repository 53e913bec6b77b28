//! HTTP server for the dashboard.
//!
//! Routes:
//!
//! - `GET /`: the dashboard as HTML
//! - `GET /api/stats`: the same data as JSON
//! - `GET /health`, `GET /healthz`: liveness check
//!
//! Every page view samples the host again; nothing is cached.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::page::{render_html, Dashboard};
use crate::sampler::HostProbe;
use crate::settings::{Settings, SettingsError};

/// Shared state behind every request.
#[derive(Debug)]
pub struct AppState {
    settings: Settings,
    tz: Tz,
    probe: Mutex<Box<dyn HostProbe>>,
}

impl AppState {
    /// Validate `settings` and wrap the probe for sharing across requests.
    pub fn new(settings: Settings, probe: impl HostProbe + 'static) -> Result<Self, SettingsError> {
        settings.validate()?;
        let tz = settings.tz()?;
        Ok(Self {
            settings,
            tz,
            probe: Mutex::new(Box::new(probe) as Box<dyn HostProbe>),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Take a fresh dashboard snapshot. Blocks for the CPU sample window.
    pub fn snapshot(&self) -> Dashboard {
        let now = Utc::now().with_timezone(&self.tz);
        let mut probe = self.probe.lock();
        Dashboard::collect(&mut **probe, &self.settings, now)
    }
}

/// Dashboard HTTP server.
#[derive(Debug, Clone)]
pub struct DashboardServer {
    state: Arc<AppState>,
}

impl DashboardServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Bind the configured address and serve until the runtime shuts down.
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self
            .state
            .settings
            .socket_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!("Serving dashboard on http://{}", addr);
        }

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = self.state.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let state = state.clone();
                    async move { handle_request(req, state, peer).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }

    /// Spawn the server on the current runtime.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                error!("Dashboard server error: {}", e);
            }
        })
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    debug!("{} {} from {}", req.method(), req.uri().path(), peer);
    Ok(route(req.method(), req.uri().path(), state).await)
}

/// Dispatch one request by method and path.
pub async fn route(method: &Method, path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let page = match path {
        "/health" | "/healthz" => {
            return respond(StatusCode::OK, "text/plain", "OK");
        }
        "/" => Page::Html,
        "/api/stats" => Page::Json,
        _ => return respond(StatusCode::NOT_FOUND, "text/plain", "Not Found"),
    };

    if *method != Method::GET {
        return respond(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method Not Allowed",
        );
    }

    // Sampling sleeps for the CPU window, keep it off the async workers.
    let dashboard = match tokio::task::spawn_blocking(move || state.snapshot()).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("Sampling task failed: {}", e);
            return respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain",
                "Internal Server Error",
            );
        }
    };

    match page {
        Page::Html => match render_html(&dashboard) {
            Ok(html) => respond(StatusCode::OK, "text/html; charset=utf-8", html),
            Err(e) => {
                error!("Failed to render dashboard: {}", e);
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "text/plain",
                    "Internal Server Error",
                )
            }
        },
        Page::Json => match serde_json::to_string(&dashboard) {
            Ok(json) => respond(StatusCode::OK, "application/json", json),
            Err(e) => {
                error!("Failed to serialize dashboard: {}", e);
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "text/plain",
                    "Internal Server Error",
                )
            }
        },
    }
}

enum Page {
    Html,
    Json,
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
