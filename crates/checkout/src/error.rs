//! Unified error handling for the checkout API.
//!
//! Every failure is answered with a JSON body of the form
//! `{"success": false, "error": "...", "details": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::quote::ValidationError;
use crate::resolver::ResolveError;
use crate::shopify::ShopifyError;

/// Application-level error type for the checkout API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller input cannot produce an order.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Server credentials required for this request are absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A product handle could not be turned into a variant.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Draft order creation failed upstream.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Unsupported HTTP method on a known route.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Unknown route.
    #[error("Not found")]
    NotFound,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl AppError {
    /// HTTP status for this error.
    ///
    /// Upstream failures forward Shopify's own status, or 502 when the
    /// failure never produced one.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_)
            | Self::Resolve(ResolveError::NotFound(_))
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Resolve(ResolveError::Upstream(e)) | Self::Shopify(e) => upstream_status(e),
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            Self::Validation(e) => (e.to_string(), None),
            Self::Configuration(message) => (
                "Server configuration error".to_string(),
                Some(Value::String(message.clone())),
            ),
            Self::Resolve(ResolveError::NotFound(handle)) => (
                "Product variant not found".to_string(),
                Some(json!({ "handle": handle.as_str() })),
            ),
            Self::Resolve(ResolveError::Upstream(e)) => {
                ("Failed to look up product".to_string(), Some(e.details()))
            }
            Self::Shopify(e) => ("Failed to create draft order".to_string(), Some(e.details())),
            Self::MethodNotAllowed | Self::NotFound => (self.to_string(), None),
            Self::Internal(message) => (
                "Internal server error".to_string(),
                Some(Value::String(message.clone())),
            ),
        };

        ErrorBody {
            success: false,
            error,
            details,
        }
    }
}

fn upstream_status(error: &ShopifyError) -> StatusCode {
    error
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() || matches!(self, Self::Shopify(_) | Self::Resolve(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Checkout request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Checkout request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
