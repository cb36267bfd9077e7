//! Internal staff notification for newly created draft orders.
//!
//! Composition reuses the [`VariantResolver`] cache, so real-products orders
//! incur no extra catalog calls. Delivery runs on a detached task; failures
//! are logged and reported to Sentry but never reach the HTTP response.

use std::sync::Arc;

use askama::Template;
use quote_checkout_core::EmailAddress;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{Instrument, info_span};

use crate::quote::{OrderMode, ValidatedQuote};
use crate::resolver::{ResolveError, VariantResolver};
use crate::shopify::DraftOrder;

use super::email::{EmailError, NotificationSender};

/// Shipping validity shown when the quote does not carry one.
pub const DEFAULT_SHIPPING_VALIDITY_HOURS: f64 = 72.0;

const LEGACY_ITEM_LINE: &str = "Custom quote (single line item, see calculator data below)";
const NOT_PROVIDED: &str = "Not provided";

/// Errors that abort a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Re-resolving an ordered handle failed.
    #[error("Failed to list ordered items: {0}")]
    Resolve(#[from] ResolveError),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Delivery failed.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Lowercased, deduplicated, never empty.
    pub recipients: Vec<EmailAddress>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Values shared by the HTML and text renditions.
struct OrderSummary {
    order_name: String,
    checkout_url: String,
    calculator_type: String,
    mode: &'static str,
    shipping_note: String,
    customer: String,
    account_manager: String,
    item_lines: Vec<String>,
    calculator_data: String,
}

#[derive(Template)]
#[template(path = "email/order_notification.html")]
struct OrderNotificationHtml<'a> {
    summary: &'a OrderSummary,
}

#[derive(Template)]
#[template(path = "email/order_notification.txt")]
struct OrderNotificationText<'a> {
    summary: &'a OrderSummary,
}

/// Union of `notify_emails` and the account manager's address.
///
/// Invalid entries are dropped, the rest are lowercased and deduplicated
/// keeping first-seen order.
#[must_use]
pub fn collect_recipients(
    notify_emails: &[String],
    account_manager_email: Option<&str>,
) -> Vec<EmailAddress> {
    let mut recipients: Vec<EmailAddress> = Vec::new();
    for candidate in notify_emails
        .iter()
        .map(String::as_str)
        .chain(account_manager_email)
    {
        if let Ok(address) = EmailAddress::parse(candidate)
            && !recipients.contains(&address)
        {
            recipients.push(address);
        }
    }
    recipients
}

/// Build the staff notification for a created order.
///
/// Returns `Ok(None)` when there is nobody to notify.
///
/// # Errors
///
/// Returns an error if an ordered handle no longer resolves or a template
/// fails to render.
pub async fn compose(
    quote: &ValidatedQuote,
    order: &DraftOrder,
    resolver: &VariantResolver,
) -> Result<Option<NotificationPayload>, NotificationError> {
    let recipients = collect_recipients(&quote.notify_emails, quote.account_manager_email.as_deref());
    if recipients.is_empty() {
        return Ok(None);
    }

    let item_lines = match &quote.mode {
        OrderMode::LegacyQuote { .. } => vec![LEGACY_ITEM_LINE.to_string()],
        OrderMode::RealProducts { items } => {
            let mut lines = Vec::with_capacity(items.len());
            for item in items {
                let variant = resolver.resolve(&item.handle).await?;
                lines.push(format!(
                    "{} ({}) \u{2014} Qty: {}",
                    variant.title, item.handle, item.quantity
                ));
            }
            lines
        }
    };

    let calculator_type = quote
        .calculator_type
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    let hours = quote
        .shipping_validity_hours
        .unwrap_or(DEFAULT_SHIPPING_VALIDITY_HOURS);

    let summary = OrderSummary {
        order_name: order.name.clone(),
        checkout_url: order.invoice_url.clone(),
        mode: quote.mode.label(),
        shipping_note: format!("Shipping quote is valid for {hours} hours from order creation."),
        customer: identity(quote.customer_name.as_deref(), quote.customer_email.as_deref()),
        account_manager: identity(
            quote.account_manager_name.as_deref(),
            quote.account_manager_email.as_deref(),
        ),
        item_lines,
        calculator_data: serde_json::to_string_pretty(&quote.calculator_data)
            .unwrap_or_default(),
        calculator_type,
    };

    Ok(Some(NotificationPayload {
        recipients,
        subject: format!(
            "New {} calculator order: {}",
            summary.calculator_type, summary.order_name
        ),
        html: OrderNotificationHtml { summary: &summary }.render()?,
        text: OrderNotificationText { summary: &summary }.render()?,
    }))
}

/// Compose and send on a detached task.
///
/// The returned handle may be dropped; the task logs its own outcome.
pub fn spawn_notification(
    quote: ValidatedQuote,
    order: DraftOrder,
    resolver: VariantResolver,
    sender: Arc<dyn NotificationSender>,
) -> JoinHandle<()> {
    let span = info_span!("notification", order = %order.name);
    tokio::spawn(
        async move {
            match notify(&quote, &order, &resolver, sender.as_ref()).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!("No notification recipients"),
                Err(err) => {
                    tracing::error!(error = %err, "Order notification failed");
                    sentry::capture_error(&err);
                }
            }
        }
        .instrument(span),
    )
}

async fn notify(
    quote: &ValidatedQuote,
    order: &DraftOrder,
    resolver: &VariantResolver,
    sender: &dyn NotificationSender,
) -> Result<bool, NotificationError> {
    let Some(payload) = compose(quote, order, resolver).await? else {
        return Ok(false);
    };
    sender.send(&payload).await?;
    Ok(true)
}

fn identity(name: Option<&str>, email: Option<&str>) -> String {
    match (name, email) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(value), None) | (None, Some(value)) => value.to_string(),
        (None, None) => NOT_PROVIDED.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::quote::QuoteRequest;
    use crate::resolver::VariantCache;
    use crate::resolver::tests::StubCatalog;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<NotificationPayload>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        async fn send(&self, notification: &NotificationPayload) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::InvalidAddress("relay refused".to_string()));
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn validated(body: Value) -> ValidatedQuote {
        serde_json::from_value::<QuoteRequest>(body)
            .unwrap()
            .validate()
            .unwrap()
    }

    fn order() -> DraftOrder {
        serde_json::from_value(json!({
            "id": 42,
            "name": "#D42",
            "invoice_url": "https://shop.example/invoices/42",
            "total_price": "81.00"
        }))
        .unwrap()
    }

    fn resolver(catalog: Arc<StubCatalog>) -> VariantResolver {
        VariantResolver::new(catalog, VariantCache::new())
    }

    #[test]
    fn test_recipients_are_lowercased_deduplicated_and_valid() {
        let notify = vec!["A@x.com".to_string(), "a@x.com".to_string(), "bad".to_string()];
        let recipients = collect_recipients(&notify, Some("b@x.com"));
        let as_str: Vec<&str> = recipients.iter().map(EmailAddress::as_str).collect();
        assert_eq!(as_str, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_account_manager_already_listed() {
        let notify = vec!["AM@x.com".to_string()];
        assert_eq!(collect_recipients(&notify, Some("am@x.com")).len(), 1);
    }

    #[tokio::test]
    async fn test_no_recipients_composes_nothing() {
        let quote = validated(json!({"totalPrice": 10, "notifyEmails": ["nope"]}));
        let composed = compose(&quote, &order(), &resolver(Arc::new(StubCatalog::default())))
            .await
            .unwrap();
        assert!(composed.is_none());
    }

    #[tokio::test]
    async fn test_legacy_notification_content() {
        let quote = validated(json!({
            "calculatorType": "mesh",
            "totalPrice": 1250,
            "customerName": "Dana Reyes",
            "accountManagerName": "Sam",
            "accountManagerEmail": "sam@x.com",
            "calculatorData": {"squareFeet": 400}
        }));
        let payload = compose(&quote, &order(), &resolver(Arc::new(StubCatalog::default())))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload.subject, "New mesh calculator order: #D42");
        assert!(payload.text.contains("https://shop.example/invoices/42"));
        assert!(payload.text.contains(LEGACY_ITEM_LINE));
        assert!(payload.text.contains("valid for 72 hours"));
        assert!(payload.text.contains("Dana Reyes"));
        assert!(payload.text.contains("Sam <sam@x.com>"));
        assert!(payload.text.contains("\"squareFeet\": 400"));
        assert!(payload.html.contains("https://shop.example/invoices/42"));
        assert!(payload.html.contains("Sam &#60;sam@x.com&#62;"));
        assert!(!payload.html.contains("<sam@x.com>"));
    }

    #[tokio::test]
    async fn test_real_products_listing_reuses_cache() {
        let catalog = Arc::new(StubCatalog::default().with_product(
            "mesh",
            "Mesh Panel",
            Some("gid://shopify/ProductVariant/11"),
        ));
        let resolver = resolver(catalog.clone());
        resolver
            .resolve(&quote_checkout_core::ProductHandle::parse("mesh").unwrap())
            .await
            .unwrap();

        let quote = validated(json!({
            "items": [{"handle": "mesh", "quantity": 2.7}],
            "notifyEmails": ["ops@x.com"],
            "shippingValidityHours": 24
        }));
        let payload = compose(&quote, &order(), &resolver).await.unwrap().unwrap();

        assert!(payload.text.contains("Mesh Panel (mesh) \u{2014} Qty: 3"));
        assert!(payload.text.contains("valid for 24 hours"));
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_spawned_notification_is_sent() {
        let sender = Arc::new(RecordingSender::default());
        let quote = validated(json!({"totalPrice": 10, "notifyEmails": "ops@x.com"}));

        spawn_notification(
            quote,
            order(),
            resolver(Arc::new(StubCatalog::default())),
            sender.clone(),
        )
        .await
        .unwrap();

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients[0].as_str(), "ops@x.com");
    }

    #[tokio::test]
    async fn test_spawned_notification_swallows_failures() {
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..RecordingSender::default()
        });
        let quote = validated(json!({"totalPrice": 10, "notifyEmails": ["ops@x.com"]}));

        let outcome = spawn_notification(
            quote,
            order(),
            resolver(Arc::new(StubCatalog::default())),
            sender.clone(),
        )
        .await;

        assert!(outcome.is_ok());
        assert!(sender.sent.lock().unwrap().is_empty());
    }
}
