//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router catching every path and method
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Pick a backend per request through the pool
//! - Forward requests to the chosen backend

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderName, Request},
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{build_upstream_request, X_REQUEST_ID};
use crate::http::response;
use crate::load_balancer::BackendPool;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP-mode proxy engine.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server forwarding to `pool`.
    pub fn new(pool: Arc<BackendPool>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState { pool, client };
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        let request_id = req
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            request_id = %request_id,
                            method = %req.method(),
                            uri = %req.uri()
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(x_request_id)),
            )
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Selects a healthy backend and forwards the request once; no retries.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let backend = match state.pool.select() {
        Some(b) => b,
        None => {
            tracing::warn!(request_id = %request_id, "No healthy backends available");
            return response::service_unavailable();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        backend = %backend,
        "Forwarding request"
    );

    let upstream_request = match build_upstream_request(request, backend, peer) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Proxy error");
            return response::bad_gateway();
        }
    };

    match state.client.request(upstream_request).await {
        Ok(upstream_response) => response::from_upstream(upstream_response),
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Proxy error");
            response::bad_gateway()
        }
    }
}
