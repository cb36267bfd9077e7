//! Shopify Admin API collaborators.
//!
//! The pipeline talks to Shopify through two narrow traits so handlers and
//! tests can swap the real client for an in-memory stub:
//!
//! - [`CatalogLookup`] - product handle to title + first variant (GraphQL)
//! - [`DraftOrderApi`] - draft order creation (REST `draft_orders.json`)
//!
//! [`AdminClient`] implements both against a real store.
//!
//! # Example
//!
//! ```rust,ignore
//! use quote_checkout::shopify::{AdminClient, CatalogLookup};
//!
//! let client = AdminClient::new(&config.shopify)?;
//! let product = client.lookup_product(&handle).await?;
//! ```

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use async_trait::async_trait;
use quote_checkout_core::ProductHandle;
use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("Shopify returned HTTP {status}")]
    Status {
        /// Status code returned by Shopify.
        status: u16,
        /// Error payload returned by Shopify (its `errors` field when present).
        details: serde_json::Value,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The access token could not be used as a header value.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),
}

impl ShopifyError {
    /// HTTP status Shopify answered with, if the failure carried one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error detail suitable for passing through to the caller.
    #[must_use]
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Status { details, .. } => details.clone(),
            Self::GraphQL(errors) => serde_json::Value::Array(
                errors
                    .iter()
                    .map(|e| serde_json::Value::String(e.message.clone()))
                    .collect(),
            ),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Product catalog lookups by handle.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Fetch the product title and first variant id for a handle.
    ///
    /// Returns `Ok(None)` when no product has this handle.
    async fn lookup_product(
        &self,
        handle: &ProductHandle,
    ) -> Result<Option<CatalogLookupResult>, ShopifyError>;
}

/// Draft order creation.
#[async_trait]
pub trait DraftOrderApi: Send + Sync {
    /// Create a draft order and return the record Shopify assigned.
    async fn create_draft_order(
        &self,
        payload: &DraftOrderPayload,
    ) -> Result<DraftOrder, ShopifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_formatting() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError {
                message: "Field not found".to_string(),
            },
            GraphQLError {
                message: "Access denied".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "GraphQL errors: Field not found; Access denied");
        assert_eq!(
            err.details(),
            serde_json::json!(["Field not found", "Access denied"])
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_status_error_passes_details_through() {
        let err = ShopifyError::Status {
            status: 422,
            details: serde_json::json!({"line_items": ["is invalid"]}),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.details()["line_items"][0], "is invalid");
        assert_eq!(err.to_string(), "Shopify returned HTTP 422");
    }
}
