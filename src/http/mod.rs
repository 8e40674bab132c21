/// Streamable HTTP transport
///
/// Every request is independent. The only state shared between requests is the
/// tool invoker, whose registry is read-only and whose cache locks internally.

mod probe;
mod routes;

pub use probe::check_health;
pub use routes::{ToolRouteError, PROTOCOL_INFO_FEATURES, SERVER_DISPLAY_NAME};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::tools::ToolInvoker;
use crate::ServerError;

/// State handed to every route
#[derive(Clone)]
pub struct AppState {
    pub invoker: Arc<ToolInvoker>,
}

/// Build the HTTP router with all routes and middleware
pub fn router(invoker: Arc<ToolInvoker>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin)
        .expose_headers([header::TRANSFER_ENCODING]);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/protocol-info", get(routes::protocol_info))
        .route("/tools", get(routes::list_tools))
        .route("/tools/:tool_name", post(routes::call_tool))
        .route("/jsonrpc", post(routes::jsonrpc))
        .with_state(AppState { invoker })
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": {"code": "internal_error", "message": "Internal server error"}})),
    )
        .into_response()
}

/// Serve the router until Ctrl-C
pub async fn serve(host: &str, port: u16, invoker: Arc<ToolInvoker>) -> Result<(), ServerError> {
    let app = router(invoker);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Streamable HTTP transport listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down gracefully");
}
