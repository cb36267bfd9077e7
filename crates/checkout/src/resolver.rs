//! Product handle to variant resolution.
//!
//! [`VariantResolver`] turns a handle into a [`ResolvedVariant`] using the
//! catalog collaborator, memoizing results in a [`VariantCache`].
//!
//! # Caching
//!
//! The cache is owned by whoever builds the resolver (normally `AppState`)
//! and lives as long as the process. Entries have no TTL and are never
//! invalidated: a handle's first variant is treated as static. Concurrent
//! misses for the same handle may both reach the catalog and both insert;
//! the values are identical, so last write wins. Correctness never depends
//! on an entry being present, only latency does.

use std::sync::Arc;

use moka::future::Cache;
use quote_checkout_core::{ProductHandle, VariantId};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::shopify::{CatalogLookup, ShopifyError};

/// A handle resolved to a purchasable variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub handle: ProductHandle,
    pub title: String,
    pub variant_id: VariantId,
}

/// Errors that can occur while resolving a handle.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No product with this handle, or the product has no usable variant.
    #[error("Product not found or has no purchasable variant: {0}")]
    NotFound(ProductHandle),

    /// The catalog lookup itself failed.
    #[error("Catalog lookup failed: {0}")]
    Upstream(#[from] ShopifyError),
}

/// Process-wide handle to variant store.
///
/// Cloning shares the same underlying entries.
#[derive(Clone)]
pub struct VariantCache {
    entries: Cache<ProductHandle, ResolvedVariant>,
}

impl VariantCache {
    /// Create an empty, unbounded cache with no expiry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Look up a previously resolved handle.
    pub async fn get(&self, handle: &ProductHandle) -> Option<ResolvedVariant> {
        self.entries.get(handle).await
    }

    /// Store a resolution, replacing any existing entry for the handle.
    pub async fn insert(&self, variant: ResolvedVariant) {
        self.entries.insert(variant.handle.clone(), variant).await;
    }
}

impl Default for VariantCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves handles through the catalog, consulting the cache first.
#[derive(Clone)]
pub struct VariantResolver {
    catalog: Arc<dyn CatalogLookup>,
    cache: VariantCache,
}

impl VariantResolver {
    /// Create a resolver over a catalog collaborator and a shared cache.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogLookup>, cache: VariantCache) -> Self {
        Self { catalog, cache }
    }

    /// Resolve a handle to its first variant.
    ///
    /// Cache hits make no catalog call. On a miss exactly one lookup is
    /// issued and a successful result is stored under the trimmed handle.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if the product is missing, has no
    /// variants, or its first variant id is not a positive integer.
    /// Returns [`ResolveError::Upstream`] if the lookup call fails.
    #[instrument(skip(self, handle), fields(handle = %handle))]
    pub async fn resolve(&self, handle: &ProductHandle) -> Result<ResolvedVariant, ResolveError> {
        if let Some(hit) = self.cache.get(handle).await {
            debug!("variant cache hit");
            return Ok(hit);
        }

        let product = self
            .catalog
            .lookup_product(handle)
            .await?
            .ok_or_else(|| ResolveError::NotFound(handle.clone()))?;

        let variant_id = product
            .first_variant_id
            .as_deref()
            .and_then(|gid| VariantId::parse(gid).ok())
            .ok_or_else(|| ResolveError::NotFound(handle.clone()))?;

        let resolved = ResolvedVariant {
            handle: handle.clone(),
            title: product.title,
            variant_id,
        };

        self.cache.insert(resolved.clone()).await;
        debug!(variant_id = %resolved.variant_id, "variant resolved");

        Ok(resolved)
    }
}
