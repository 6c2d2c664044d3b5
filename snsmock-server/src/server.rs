//! HTTP listener and request routing.

use crate::adapter::{PublishHandler, WireResponse};
use crate::error::{http_status, ServerError};
use crate::query::{JsonError, MessageFilter, QueryApi, CONTENT_TYPE_JSON};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use snsmock_core::CaptureError;
use snsmock_store::CaptureStore;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub listen_addr: SocketAddr,
    /// URL path prefix of the verification API.
    pub verification_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5001".parse().unwrap(),
            verification_prefix: "/messages".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// Maps `(method, path)` onto the adapter and the query surface.
pub struct Router {
    adapter: PublishHandler,
    query: QueryApi,
    prefix: String,
    /// The prefix with a trailing slash, for by-id routes.
    child_prefix: String,
    stats: Arc<ServerStats>,
}

impl Router {
    /// Creates a router over `store` with the given verification prefix.
    pub fn new(store: Arc<CaptureStore>, prefix: String, stats: Arc<ServerStats>) -> Self {
        Self {
            adapter: PublishHandler::new(store.clone()),
            query: QueryApi::new(store),
            child_prefix: format!("{prefix}/"),
            prefix,
            stats,
        }
    }

    /// Routes one decoded request to a response.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        target_header: Option<&str>,
        body: &[u8],
    ) -> WireResponse {
        self.stats.requests_total.fetch_add(1, Ordering::Relaxed);

        let response = if *method == Method::POST && path == "/" {
            self.adapter.handle(target_header, body)
        } else if *method == Method::GET && (path == "/health" || path == "/healthz") {
            WireResponse {
                status: StatusCode::OK,
                content_type: "text/plain",
                body: b"OK".to_vec(),
            }
        } else if path == self.prefix || path.starts_with(&self.child_prefix) {
            self.dispatch_verification(method, path, query)
        } else {
            WireResponse {
                status: StatusCode::NOT_FOUND,
                content_type: "text/plain",
                body: b"Not Found".to_vec(),
            }
        };

        if response.status.is_client_error() || response.status.is_server_error() {
            self.stats.errors_total.fetch_add(1, Ordering::Relaxed);
        }
        response
    }

    fn dispatch_verification(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> WireResponse {
        if path == self.prefix {
            if *method == Method::GET {
                return self.list_messages(query);
            }
            if *method == Method::DELETE {
                self.query.clear();
                return WireResponse {
                    status: StatusCode::NO_CONTENT,
                    content_type: "",
                    body: Vec::new(),
                };
            }
            return json_error_response(&CaptureError::invalid_parameter("method"));
        }

        // Everything below the prefix is a by-id lookup.
        if *method != Method::GET {
            return json_error_response(&CaptureError::invalid_parameter("method"));
        }
        let id = &path[self.child_prefix.len()..];
        if id.is_empty() {
            return json_error_response(&CaptureError::invalid_parameter("id"));
        }
        match self.query.get_json(id) {
            Ok(body) => WireResponse {
                status: StatusCode::OK,
                content_type: CONTENT_TYPE_JSON,
                body,
            },
            Err(e) => json_error_response(&e),
        }
    }

    fn list_messages(&self, query: Option<&str>) -> WireResponse {
        let result = MessageFilter::from_query(query)
            .and_then(|filter| self.query.list_json(&filter));
        match result {
            Ok(body) => WireResponse {
                status: StatusCode::OK,
                content_type: CONTENT_TYPE_JSON,
                body,
            },
            Err(e) => json_error_response(&e),
        }
    }
}

/// Builds a JSON error body for the verification API. The SDK-facing XML
/// shape is handled by the adapter.
fn json_error_response(error: &CaptureError) -> WireResponse {
    WireResponse {
        status: http_status(error),
        content_type: CONTENT_TYPE_JSON,
        body: serde_json::to_vec(&JsonError::from(error)).unwrap_or_default(),
    }
}

/// HTTP server for snsmock.
pub struct Server {
    config: ServerConfig,
    router: Arc<Router>,
    stats: Arc<ServerStats>,
    shutdown: broadcast::Sender<()>,
    running: AtomicBool,
}

impl Server {
    /// Creates a new server capturing into `store`.
    pub fn new(config: ServerConfig, store: Arc<CaptureStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let stats = Arc::new(ServerStats::default());
        let router = Arc::new(Router::new(
            store,
            config.verification_prefix.clone(),
            stats.clone(),
        ));
        Self {
            config,
            router,
            stats,
            shutdown: shutdown_tx,
            running: AtomicBool::new(false),
        }
    }

    /// Runs the server until shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.running.store(true, Ordering::SeqCst);

        tracing::info!(
            "Mock publish endpoint listening on http://{}/ (verification API at {})",
            self.config.listen_addr,
            self.config.verification_prefix
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!("Client connected: {}", addr);

                            let router = self.router.clone();
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |req| {
                                    let router = router.clone();
                                    async move { handle_request(req, router).await }
                                });
                                if let Err(e) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::debug!("Connection {} error: {}", addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Server shutting down");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Initiates server shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Returns whether the server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}

/// Collects the body and hands the request to the router.
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    router: Arc<Router>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let target_header = parts
        .headers
        .get("X-Amz-Target")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = body.collect().await?.to_bytes();

    let result = router.dispatch(
        &parts.method,
        parts.uri.path(),
        parts.uri.query(),
        target_header.as_deref(),
        &body,
    );

    let mut builder = Response::builder().status(result.status);
    if !result.content_type.is_empty() {
        builder = builder.header("Content-Type", result.content_type);
    }
    Ok(builder.body(Full::new(Bytes::from(result.body))).unwrap())
}
