//! Newtype IDs for Shopify's numeric resource identifiers.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different resource types.

/// Errors that can occur when parsing a resource ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is not a positive integer or a GID ending in one.
    #[error("expected a positive integer id, got {0:?}")]
    Invalid(String),
}

/// Macro to define a type-safe Shopify ID wrapper.
///
/// Creates a newtype wrapper around `NonZeroU64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]` (zero is rejected)
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `new()` returning `None` for zero, `get()` for the raw value
/// - `parse()` accepting either `"123"` or `"gid://shopify/Resource/123"`
///
/// # Example
///
/// ```rust
/// # use quote_checkout_core::define_id;
/// define_id!(LocationId);
///
/// let id = LocationId::parse("gid://shopify/Location/42").unwrap();
/// assert_eq!(id.get(), 42);
/// assert!(LocationId::new(0).is_none());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::core::num::NonZeroU64);

        impl $name {
            /// Create an ID, returning `None` for zero.
            #[must_use]
            pub const fn new(id: u64) -> Option<Self> {
                match ::core::num::NonZeroU64::new(id) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }

            /// Get the underlying numeric value.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0.get()
            }

            /// Parse a bare number or a Shopify GID.
            ///
            /// # Errors
            ///
            /// Returns an error unless the final path segment is a positive
            /// integer.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let tail = s.trim().rsplit('/').next().unwrap_or_default();
                tail.parse::<u64>()
                    .ok()
                    .and_then(Self::new)
                    .ok_or_else(|| $crate::types::id::IdError::Invalid(s.to_owned()))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0.get()
            }
        }
    };
}

define_id!(VariantId);
define_id!(DraftOrderId);
