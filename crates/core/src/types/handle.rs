//! Product handle type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductHandle`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The handle is empty after trimming.
    #[error("product handle cannot be empty")]
    Empty,
}

/// A trimmed, non-empty Shopify product handle (e.g. `"mesh-panel"`).
///
/// The trimmed form is also the variant cache key, so `" mesh "` and
/// `"mesh"` resolve through the same cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ProductHandle(String);

impl ProductHandle {
    /// Parse a handle, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::Empty`] if nothing remains after trimming.
    pub fn parse(s: &str) -> Result<Self, HandleError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(HandleError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductHandle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductHandle> for String {
    fn from(handle: ProductHandle) -> Self {
        handle.0
    }
}

impl AsRef<str> for ProductHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
