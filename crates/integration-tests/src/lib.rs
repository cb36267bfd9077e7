//! Integration test harness for Quote Checkout.
//!
//! Serves the real router on an ephemeral port with in-memory Shopify and
//! SMTP collaborators, so tests drive it over HTTP exactly as the calculator
//! widget does.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quote-checkout-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use quote_checkout::services::{EmailError, NotificationPayload, NotificationSender};
use quote_checkout::shopify::{
    CatalogLookup, CatalogLookupResult, DraftOrder, DraftOrderApi, DraftOrderPayload, ShopifyError,
};
use quote_checkout::state::{AppState, Commerce};
use quote_checkout_core::ProductHandle;
use serde_json::{Value, json};
use tokio::sync::mpsc;

/// Invoice URL returned by [`StubDraftOrders`].
pub const INVOICE_URL: &str = "https://quotes-test.myshopify.com/1/invoices/abc123";

// ============================================================================
// Catalog
// ============================================================================

/// In-memory catalog that counts lookups per handle.
#[derive(Default)]
pub struct StubCatalog {
    products: HashMap<String, CatalogLookupResult>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubCatalog {
    /// Add a product whose first variant has the given numeric id.
    #[must_use]
    pub fn with_product(mut self, handle: &str, title: &str, variant_id: u64) -> Self {
        self.products.insert(
            handle.to_string(),
            CatalogLookupResult {
                title: title.to_string(),
                first_variant_id: Some(format!("gid://shopify/ProductVariant/{variant_id}")),
            },
        );
        self
    }

    /// Lookups issued for one handle.
    pub fn calls_for(&self, handle: &str) -> usize {
        self.lock_calls().get(handle).copied().unwrap_or(0)
    }

    /// Lookups issued in total.
    pub fn total_calls(&self) -> usize {
        self.lock_calls().values().sum()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogLookup for StubCatalog {
    async fn lookup_product(
        &self,
        handle: &ProductHandle,
    ) -> Result<Option<CatalogLookupResult>, ShopifyError> {
        *self
            .lock_calls()
            .entry(handle.as_str().to_string())
            .or_default() += 1;
        Ok(self.products.get(handle.as_str()).cloned())
    }
}

// ============================================================================
// Draft orders
// ============================================================================

/// Draft order API that records payloads and answers with a fixed order,
/// or with a fixed upstream failure.
#[derive(Default)]
pub struct StubDraftOrders {
    calls: AtomicUsize,
    payloads: Mutex<Vec<Value>>,
    failure: Option<(u16, Value)>,
}

impl StubDraftOrders {
    /// Reject every creation with this status and `errors` payload.
    #[must_use]
    pub fn failing(status: u16, details: Value) -> Self {
        Self {
            failure: Some((status, details)),
            ..Self::default()
        }
    }

    /// Creation calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Serialized payloads received, oldest first.
    pub fn payloads(&self) -> Vec<Value> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DraftOrderApi for StubDraftOrders {
    async fn create_draft_order(
        &self,
        payload: &DraftOrderPayload,
    ) -> Result<DraftOrder, ShopifyError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(serde_json::to_value(payload)?);

        if let Some((status, details)) = &self.failure {
            return Err(ShopifyError::Status {
                status: *status,
                details: details.clone(),
            });
        }

        Ok(serde_json::from_value(json!({
            "id": 9_000 + n,
            "name": format!("#D{n}"),
            "invoice_url": INVOICE_URL,
            "total_price": "81.00",
        }))?)
    }
}

// ============================================================================
// Mail
// ============================================================================

/// Mailer that forwards every notification to a channel.
pub struct ChannelMailer {
    tx: mpsc::UnboundedSender<NotificationPayload>,
}

impl ChannelMailer {
    /// Create a mailer and the receiving end of its outbox.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationPayload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotificationSender for ChannelMailer {
    async fn send(&self, notification: &NotificationPayload) -> Result<(), EmailError> {
        self.tx
            .send(notification.clone())
            .map_err(|e| EmailError::InvalidAddress(e.to_string()))
    }
}

// ============================================================================
// Server
// ============================================================================

/// A running checkout server and the stubs behind it.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub catalog: Arc<StubCatalog>,
    pub draft_orders: Arc<StubDraftOrders>,
}

impl TestApp {
    /// URL of the checkout endpoint.
    #[must_use]
    pub fn checkout_url(&self) -> String {
        format!("{}/api/create-draft-order", self.base_url)
    }

    /// POST a JSON quote and return the status and JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn post_quote(&self, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .post(self.checkout_url())
            .json(body)
            .send()
            .await
            .expect("Failed to send quote");
        let status = resp.status();
        let json = resp.json().await.expect("Response is not JSON");
        (status, json)
    }
}

/// Serve the router with the given collaborators on an ephemeral port.
///
/// `None` for `draft_orders` starts the server without Shopify
/// credentials.
///
/// # Panics
///
/// Panics if the listener cannot bind.
pub async fn spawn_app(
    catalog: StubCatalog,
    draft_orders: Option<StubDraftOrders>,
    mailer: Option<ChannelMailer>,
) -> TestApp {
    let catalog = Arc::new(catalog);
    let draft_orders = draft_orders.map(Arc::new);

    let commerce = draft_orders.as_ref().map(|orders| {
        Commerce::new(
            Arc::clone(&catalog) as Arc<dyn CatalogLookup>,
            Arc::clone(orders) as Arc<dyn DraftOrderApi>,
        )
    });
    let notifier = mailer.map(|m| Arc::new(m) as Arc<dyn NotificationSender>);
    let state = AppState::from_parts(commerce, notifier);

    let app = quote_checkout::routes::router(state, &[]);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        catalog,
        draft_orders: draft_orders.unwrap_or_default(),
    }
}
