//! Core types for the quote checkout service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod handle;
pub mod id;
pub mod money;

pub use email::{EmailAddress, EmailError};
pub use handle::{HandleError, ProductHandle};
pub use id::*;
pub use money::{Money, MoneyError};
