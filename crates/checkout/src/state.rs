//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::CheckoutConfig;
use crate::resolver::{VariantCache, VariantResolver};
use crate::services::{EmailError, NotificationSender, SmtpMailer};
use crate::shopify::{AdminClient, CatalogLookup, DraftOrderApi, ShopifyError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Shopify client: {0}")]
    Shopify(#[from] ShopifyError),
    #[error("SMTP mailer: {0}")]
    Email(#[from] EmailError),
}

/// Shopify collaborators, present only when credentials are configured.
#[derive(Clone)]
pub struct Commerce {
    pub resolver: VariantResolver,
    pub draft_orders: Arc<dyn DraftOrderApi>,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Missing Shopify credentials
/// do not prevent startup; order requests then fail with a configuration
/// error.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    commerce: Option<Commerce>,
    notifier: Option<Arc<dyn NotificationSender>>,
}

impl AppState {
    /// Create the state from configuration, building real collaborators.
    ///
    /// The variant cache is created here and lives as long as the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client or SMTP mailer cannot be built.
    pub fn new(config: &CheckoutConfig) -> Result<Self, StateError> {
        let commerce = match &config.shopify {
            Some(shopify) => {
                let client = AdminClient::new(shopify)?;
                Some(Commerce {
                    resolver: VariantResolver::new(Arc::new(client.clone()), VariantCache::new()),
                    draft_orders: Arc::new(client),
                })
            }
            None => {
                tracing::warn!(
                    "SHOPIFY_STORE / SHOPIFY_ADMIN_ACCESS_TOKEN not set; draft orders are disabled"
                );
                None
            }
        };

        let notifier = match &config.email {
            Some(email) => Some(Arc::new(SmtpMailer::new(email)?) as Arc<dyn NotificationSender>),
            None => {
                tracing::info!("SMTP not configured; order notifications are disabled");
                None
            }
        };

        Ok(Self::from_parts(commerce, notifier))
    }

    /// Create the state from already-built collaborators.
    #[must_use]
    pub fn from_parts(
        commerce: Option<Commerce>,
        notifier: Option<Arc<dyn NotificationSender>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner { commerce, notifier }),
        }
    }

    /// Shopify collaborators, if configured.
    #[must_use]
    pub fn commerce(&self) -> Option<&Commerce> {
        self.inner.commerce.as_ref()
    }

    /// Notification sender, if configured.
    #[must_use]
    pub fn notifier(&self) -> Option<&Arc<dyn NotificationSender>> {
        self.inner.notifier.as_ref()
    }
}

impl Commerce {
    /// Bundle a catalog and order API behind a fresh variant cache.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogLookup>, draft_orders: Arc<dyn DraftOrderApi>) -> Self {
        Self {
            resolver: VariantResolver::new(catalog, VariantCache::new()),
            draft_orders,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::ShopifyAdminConfig;

    fn config(shopify: Option<ShopifyAdminConfig>) -> CheckoutConfig {
        CheckoutConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            shopify,
            email: None,
            allowed_origins: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_state_without_shopify_has_no_commerce() {
        let state = AppState::new(&config(None)).unwrap();
        assert!(state.commerce().is_none());
        assert!(state.notifier().is_none());
    }

    #[test]
    fn test_state_with_shopify_builds_commerce() {
        let state = AppState::new(&config(Some(ShopifyAdminConfig {
            store: "quotes-test.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_0123456789abcdef"),
        })))
        .unwrap();
        assert!(state.commerce().is_some());
    }
}
