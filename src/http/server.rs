//! HTTP server glue around the dispatcher.
//!
//! # Responsibilities
//! - Mount the dispatch entry point as a catch-all axum route
//! - Adapt axum requests into `RequestContext` and back
//! - Wire up middleware (request ID, trace, timeout)
//! - Turn no-match into 404 via the continuation and engine errors into 500
//!
//! # Design Decisions
//! - The engine owns routing; axum only carries bytes in and out
//! - Graceful shutdown on Ctrl+C, like any long-running listener

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::{self, Next as MiddlewareNext},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::http::context::RequestContext;
use crate::observability::metrics;
use crate::routing::handler::Next;

/// HTTP front end serving one dispatcher.
pub struct DispatchServer {
    dispatcher: Arc<Dispatcher>,
    request_timeout: Duration,
}

impl DispatchServer {
    pub fn new(dispatcher: Arc<Dispatcher>, request_timeout: Duration) -> Self {
        Self {
            dispatcher,
            request_timeout,
        }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(&self) -> Router {
        Router::new()
            .route("/{*path}", any(serve_request))
            .route("/", any(serve_request))
            .with_state(self.dispatcher.clone())
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.build_router().into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the dispatcher.
async fn serve_request(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let hostname = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.split(':').next())
        .unwrap_or("")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Dispatching request"
    );

    let mut ctx = RequestContext::new(method.clone(), target, hostname);
    match dispatcher.dispatch(&mut ctx, Next::from_fn(not_found)).await {
        Ok(()) => {
            metrics::record_dispatch(method.as_str(), ctx.status.as_u16(), start);
            into_response(ctx)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Request handling failed");
            metrics::record_dispatch(method.as_str(), 500, start);
            (StatusCode::INTERNAL_SERVER_ERROR, "Request handling failed").into_response()
        }
    }
}

/// Continuation for unmatched requests.
fn not_found(ctx: &mut RequestContext) -> BoxFuture<'static, ()> {
    ctx.status = StatusCode::NOT_FOUND;
    ctx.content_type = None;
    ctx.set_text("No matching route");
    Box::pin(async {})
}

fn into_response(ctx: RequestContext) -> Response {
    let mut builder = Response::builder().status(ctx.status);
    if let Some(mime) = &ctx.content_type {
        builder = builder.header(header::CONTENT_TYPE, mime);
    }
    match builder.body(Body::from(ctx.body)) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Ensure every request carries an ID for correlation.
async fn request_id_middleware(mut request: Request<Body>, next: MiddlewareNext) -> Response {
    if !request.headers().contains_key("x-request-id") {
        let id = Uuid::new_v4().to_string();
        if let Ok(value) = header::HeaderValue::from_str(&id) {
            request.headers_mut().insert("x-request-id", value);
        }
    }
    next.run(request).await
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
