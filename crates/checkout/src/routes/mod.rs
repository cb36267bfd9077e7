//! HTTP route handlers for the checkout API.
//!
//! # Route Structure
//!
//! ```text
//! GET     /health                   - Liveness check
//! POST    /api/create-draft-order   - Quote to draft order checkout link
//! OPTIONS /api/create-draft-order   - Empty 200 (answered by the CORS layer)
//! *       /api/create-draft-order   - 405 JSON error
//! ```

pub mod checkout;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::AppError;
use crate::state::AppState;

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health)).route(
        "/api/create-draft-order",
        post(checkout::create_draft_order).fallback(checkout::method_not_allowed),
    )
}

/// Build the complete application router with CORS and a JSON 404.
///
/// An empty `allowed_origins` list allows any origin. The CORS layer answers
/// every `OPTIONS` request with an empty 200 before routing.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    routes()
        .fallback(not_found)
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify or SMTP.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound
}
