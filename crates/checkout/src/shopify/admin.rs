//! Shopify Admin API client.
//!
//! Catalog lookups go through the GraphQL endpoint; draft orders are created
//! through the REST endpoint so Shopify's status code and `errors` payload
//! can be forwarded to the caller unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use quote_checkout_core::ProductHandle;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::config::ShopifyAdminConfig;

use super::{
    CatalogLookup, CatalogLookupResult, DraftOrder, DraftOrderApi, DraftOrderPayload,
    GraphQLError, ShopifyError,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const PRODUCT_BY_HANDLE_QUERY: &str = r"
query ProductByHandle($handle: String!) {
  productByIdentifier(identifier: { handle: $handle }) {
    title
    variants(first: 1) {
      nodes {
        id
      }
    }
  }
}
";

/// Shopify Admin API client.
///
/// Cheaply cloneable; the underlying `reqwest::Client` carries the access
/// token as a default header.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    graphql_endpoint: String,
    draft_orders_endpoint: String,
}

/// GraphQL request body.
#[derive(Debug, Serialize)]
struct GraphQLRequest<'a, V> {
    query: &'a str,
    variables: V,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ProductByHandleVariables<'a> {
    handle: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductByHandleData {
    product_by_identifier: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    title: String,
    variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
struct VariantConnection {
    nodes: Vec<VariantNode>,
}

#[derive(Debug, Deserialize)]
struct VariantNode {
    id: String,
}

#[derive(Debug, Serialize)]
struct DraftOrderRequest<'a> {
    draft_order: &'a DraftOrderPayload,
}

#[derive(Debug, Deserialize)]
struct DraftOrderResponse {
    draft_order: DraftOrder,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let base = format!("https://{}/admin/api/{}", config.store, config.api_version);
        Self::with_base_url(&base, config.access_token.expose_secret())
    }

    /// Create a client against an explicit API base URL
    /// (`https://{store}/admin/api/{version}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or
    /// the HTTP client fails to build.
    pub fn with_base_url(base_url: &str, access_token: &str) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(access_token)
            .map_err(|e| ShopifyError::InvalidToken(e.to_string()))?;
        token.set_sensitive(true);
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base = base_url.trim_end_matches('/');
        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                graphql_endpoint: format!("{base}/graphql.json"),
                draft_orders_endpoint: format!("{base}/draft_orders.json"),
            }),
        })
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL query and decode its `data` field.
    async fn execute<V: Serialize + Send + Sync, T: DeserializeOwned>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.graphql_endpoint)
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        decode_graphql_response(status.as_u16(), &text)
    }
}

#[async_trait]
impl CatalogLookup for AdminClient {
    #[instrument(skip(self, handle), fields(handle = %handle))]
    async fn lookup_product(
        &self,
        handle: &ProductHandle,
    ) -> Result<Option<CatalogLookupResult>, ShopifyError> {
        let data: ProductByHandleData = self
            .execute(
                PRODUCT_BY_HANDLE_QUERY,
                ProductByHandleVariables {
                    handle: handle.as_str(),
                },
            )
            .await?;

        Ok(data.product_by_identifier.map(|product| CatalogLookupResult {
            title: product.title,
            first_variant_id: product.variants.nodes.into_iter().next().map(|v| v.id),
        }))
    }
}

#[async_trait]
impl DraftOrderApi for AdminClient {
    #[instrument(skip_all, fields(line_items = payload.line_items.len()))]
    async fn create_draft_order(
        &self,
        payload: &DraftOrderPayload,
    ) -> Result<DraftOrder, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.draft_orders_endpoint)
            .json(&DraftOrderRequest {
                draft_order: payload,
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        decode_draft_order_response(status.as_u16(), &text)
    }
}

// =============================================================================
// Response decoding
// =============================================================================

/// Turn a non-success body into the detail payload forwarded to callers.
///
/// Shopify REST errors arrive as `{"errors": ...}`; the inner value is passed
/// through. Non-JSON bodies are forwarded as a string.
fn error_details(text: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(mut body)) => body
            .remove("errors")
            .unwrap_or(serde_json::Value::Object(body)),
        Ok(other) => other,
        Err(_) => serde_json::Value::String(text.chars().take(500).collect()),
    }
}

fn decode_graphql_response<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, ShopifyError> {
    if !(200..300).contains(&status) {
        tracing::error!(
            status,
            body = %text.chars().take(500).collect::<String>(),
            "Shopify GraphQL returned non-success status"
        );
        return Err(ShopifyError::Status {
            status,
            details: error_details(text),
        });
    }

    let response: GraphQLResponse<T> = serde_json::from_str(text).inspect_err(|e| {
        tracing::error!(error = %e, "Failed to parse Shopify GraphQL response");
    })?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        tracing::debug!(errors = ?errors, "GraphQL errors in response");
        return Err(ShopifyError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError { message: e.message })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        ShopifyError::GraphQL(vec![GraphQLError {
            message: "No data in response".to_string(),
        }])
    })
}

fn decode_draft_order_response(status: u16, text: &str) -> Result<DraftOrder, ShopifyError> {
    if !(200..300).contains(&status) {
        tracing::warn!(
            status,
            body = %text.chars().take(500).collect::<String>(),
            "Shopify rejected draft order"
        );
        return Err(ShopifyError::Status {
            status,
            details: error_details(text),
        });
    }

    let response: DraftOrderResponse = serde_json::from_str(text)?;
    Ok(response.draft_order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_product_found() {
        let body = r#"{"data":{"productByIdentifier":{"title":"Mesh Panel","variants":{"nodes":[{"id":"gid://shopify/ProductVariant/101"},{"id":"gid://shopify/ProductVariant/102"}]}}}}"#;
        let data: ProductByHandleData = decode_graphql_response(200, body).unwrap();
        let product = data.product_by_identifier.unwrap();
        assert_eq!(product.title, "Mesh Panel");
        assert_eq!(
            product.variants.nodes.first().unwrap().id,
            "gid://shopify/ProductVariant/101"
        );
    }

    #[test]
    fn test_decode_product_missing() {
        let body = r#"{"data":{"productByIdentifier":null}}"#;
        let data: ProductByHandleData = decode_graphql_response(200, body).unwrap();
        assert!(data.product_by_identifier.is_none());
    }

    #[test]
    fn test_decode_graphql_errors() {
        let body = r#"{"data":null,"errors":[{"message":"Throttled"}]}"#;
        let err = decode_graphql_response::<ProductByHandleData>(200, body).unwrap_err();
        assert!(matches!(err, ShopifyError::GraphQL(ref e) if e[0].message == "Throttled"));
    }

    #[test]
    fn test_decode_graphql_http_failure() {
        let body = r#"{"errors":"[API] Invalid API key or access token"}"#;
        let err = decode_graphql_response::<ProductByHandleData>(401, body).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.details(),
            serde_json::json!("[API] Invalid API key or access token")
        );
    }

    #[test]
    fn test_decode_draft_order_success() {
        let body = r##"{"draft_order":{"id":5501,"name":"#D3","invoice_url":"https://shop.example/1/invoices/x","total_price":"81.00"}}"##;
        let order = decode_draft_order_response(201, body).unwrap();
        assert_eq!(order.id.get(), 5501);
        assert_eq!(order.invoice_url, "https://shop.example/1/invoices/x");
        assert_eq!(order.total_price, "81.00");
    }

    #[test]
    fn test_decode_draft_order_unprocessable() {
        let body = r#"{"errors":{"line_items":["is invalid"]}}"#;
        let err = decode_draft_order_response(422, body).unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.details(),
            serde_json::json!({"line_items": ["is invalid"]})
        );
    }

    #[test]
    fn test_error_details_non_json() {
        assert_eq!(
            error_details("Bad Gateway"),
            serde_json::Value::String("Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_new_rejects_unusable_token() {
        let result = AdminClient::with_base_url("https://shop.example/admin/api/2025-01", "bad\ntoken");
        assert!(matches!(result, Err(ShopifyError::InvalidToken(_))));
    }
}
