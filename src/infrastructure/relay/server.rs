//! Relay server adapter using axum
//!
//! Routes:
//!
//! ```text
//! POST /register    {"name": ...}       add or refresh the caller
//! GET  /timestamp                       server epoch as plain text
//! POST /clipboard   Data-Type + body    replace the stored payload
//! HEAD /clipboard                       Data-Attached, Data-Version, Data-Type
//! GET  /clipboard                       stored payload, 404 when empty
//! POST /shutdown                        graceful stop, loopback/own address only
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, info, warn};

use super::{DATA_ATTACHED, DATA_TYPE, DATA_VERSION};
use crate::application::ports::{HostError, RelayHost, ServerHandle};
use crate::domain::clipboard::{ClipboardFormat, Payload};
use crate::domain::config::DEFAULT_MAX_PAYLOAD;
use crate::domain::device::{sanitize_device_name, Device, DeviceRegistry};
use crate::domain::node::ServerEpoch;

/// Upper bound on any single request, large image uploads included
pub const SERVER_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `stop` waits for in-flight requests before aborting the task
pub const STOP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
struct Slot {
    payload: Option<Payload>,
    version: u64,
}

struct Shared {
    epoch: ServerEpoch,
    registry: DeviceRegistry,
    slot: Mutex<Slot>,
    trusted: Vec<IpAddr>,
    shutdown: watch::Sender<bool>,
}

impl Shared {
    fn is_trusted(&self, ip: IpAddr) -> bool {
        ip.is_loopback() || self.trusted.contains(&ip)
    }
}

#[derive(Clone)]
struct RelayState {
    shared: Arc<Shared>,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    name: String,
}

/// Starts relay servers bound on `bind_ip`
pub struct AxumRelayHost {
    bind_ip: IpAddr,
    own_ip: IpAddr,
    device_timeout: Duration,
    max_payload: usize,
}

impl AxumRelayHost {
    /// `own_ip` is the address peers see us on; requests from it (or from
    /// loopback) may call `/shutdown`.
    pub fn new(bind_ip: IpAddr, own_ip: IpAddr, device_timeout: Duration) -> Self {
        Self {
            bind_ip,
            own_ip,
            device_timeout,
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Set the request body limit in bytes
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }
}

/// Handle to a running axum relay server
pub struct AxumServerHandle {
    shared: Arc<Shared>,
    port: u16,
    task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl RelayHost for AxumRelayHost {
    type Handle = AxumServerHandle;

    async fn start(&self, port: u16) -> Result<AxumServerHandle, HostError> {
        let bind_err = |e: std::io::Error| HostError::BindFailed {
            port,
            message: e.to_string(),
        };

        let listener = TcpListener::bind(SocketAddr::new(self.bind_ip, port))
            .await
            .map_err(bind_err)?;
        let port = listener.local_addr().map_err(bind_err)?.port();

        let (shutdown, mut stop_requested) = watch::channel(false);
        let shared = Arc::new(Shared {
            epoch: ServerEpoch::now(),
            registry: DeviceRegistry::new(self.device_timeout),
            slot: Mutex::new(Slot::default()),
            trusted: vec![self.own_ip, self.bind_ip],
            shutdown,
        });

        let app = router(
            RelayState {
                shared: Arc::clone(&shared),
            },
            self.max_payload,
        );

        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            let result = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = stop_requested.wait_for(|stop| *stop).await;
            })
            .await;

            if let Err(e) = result {
                warn!(error = %e, "Relay server failed");
            }
            task_shared.registry.clear();
            debug!(port, "Relay server task finished");
        });

        info!(port, epoch = %shared.epoch, "Relay server listening");

        Ok(AxumServerHandle {
            shared,
            port,
            task: Mutex::new(Some(task)),
        })
    }
}

#[async_trait]
impl ServerHandle for AxumServerHandle {
    fn epoch(&self) -> ServerEpoch {
        self.shared.epoch
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn active_devices(&self) -> Vec<Device> {
        self.shared.registry.list_active()
    }

    fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    async fn stop(&self) {
        self.shared.shutdown.send_replace(true);

        let task = self.task.lock().take();
        if let Some(mut task) = task {
            if tokio::time::timeout(STOP_TIMEOUT, &mut task).await.is_err() {
                warn!(port = self.port, "Relay server did not stop in time, aborting");
                task.abort();
            }
        }
        self.shared.registry.clear();
    }
}

fn router(state: RelayState, max_payload: usize) -> Router {
    Router::new()
        .route("/register", post(handle_register))
        .route("/timestamp", get(handle_timestamp))
        .route(
            "/clipboard",
            get(handle_fetch).head(handle_probe).post(handle_store),
        )
        .route("/shutdown", post(handle_shutdown))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_payload))
        .layer(RequestBodyLimitLayer::new(max_payload))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            SERVER_REQUEST_TIMEOUT,
        ))
}

/// POST /register
///
/// Always succeeds. A body without a usable name registers the caller as
/// `Unknown_Device`.
async fn handle_register(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> impl IntoResponse {
    let requested = match serde_json::from_slice::<RegisterRequest>(&body) {
        Ok(request) => request.name,
        Err(e) => {
            debug!(address = %addr.ip(), error = %e, "Register body without a name");
            String::new()
        }
    };
    let name = sanitize_device_name(&requested);
    debug!(address = %addr.ip(), %name, "Device registered");
    state.shared.registry.add(addr.ip().to_canonical(), name);
    (StatusCode::OK, "OK")
}

/// GET /timestamp
async fn handle_timestamp(State(state): State<RelayState>) -> impl IntoResponse {
    state.shared.epoch.to_string()
}

/// HEAD /clipboard
async fn handle_probe(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    state.shared.registry.update_activity(addr.ip().to_canonical());

    let slot = state.shared.slot.lock();
    let mut headers = HeaderMap::new();
    match &slot.payload {
        Some(payload) => {
            headers.insert(DATA_ATTACHED, HeaderValue::from_static("True"));
            headers.insert(DATA_VERSION, HeaderValue::from(slot.version));
            headers.insert(DATA_TYPE, HeaderValue::from_static(payload.format().as_str()));
        }
        None => {
            headers.insert(DATA_ATTACHED, HeaderValue::from_static("False"));
        }
    }
    (StatusCode::OK, headers).into_response()
}

/// GET /clipboard
async fn handle_fetch(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    state.shared.registry.update_activity(addr.ip().to_canonical());

    let (payload, version) = {
        let slot = state.shared.slot.lock();
        match &slot.payload {
            Some(payload) => (payload.clone(), slot.version),
            None => return (StatusCode::NOT_FOUND, "No clipboard data").into_response(),
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(DATA_TYPE, HeaderValue::from_static(payload.format().as_str()));
    headers.insert(DATA_VERSION, HeaderValue::from(version));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(payload.format().mime_type()),
    );
    (StatusCode::OK, headers, payload.content().clone()).into_response()
}

/// POST /clipboard
async fn handle_store(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let format = match headers
        .get(DATA_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::parse::<ClipboardFormat>)
    {
        Some(Ok(format)) => format,
        Some(Err(e)) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        None => return (StatusCode::BAD_REQUEST, "Missing Data-Type header").into_response(),
    };

    if format == ClipboardFormat::Text && std::str::from_utf8(&body).is_err() {
        return (StatusCode::BAD_REQUEST, "Text payload is not valid UTF-8").into_response();
    }

    state.shared.registry.update_activity(addr.ip().to_canonical());

    let payload = Payload::new(body, format);
    let version = {
        let mut slot = state.shared.slot.lock();
        slot.version += 1;
        slot.payload = Some(payload);
        slot.version
    };
    debug!(address = %addr.ip(), version, %format, "Clipboard stored");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(DATA_VERSION, HeaderValue::from(version));
    (StatusCode::OK, response_headers, "OK").into_response()
}

/// POST /shutdown
async fn handle_shutdown(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let ip = addr.ip().to_canonical();
    if !state.shared.is_trusted(ip) {
        warn!(address = %ip, "Refused remote shutdown request");
        return (StatusCode::FORBIDDEN, "Shutdown only allowed from this host").into_response();
    }

    state.shared.shutdown.send_replace(true);
    info!("Relay server shutting down on request");
    (StatusCode::OK, "Server shutting down...").into_response()
}
