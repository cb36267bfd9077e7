//! Quote Checkout Core - Shared domain types.
//!
//! This crate provides the value types used by the checkout service:
//! - `checkout` - HTTP service that turns calculator quotes into draft orders
//! - `integration-tests` - End-to-end tests against the service router
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no clocks.
//! Every type validates on construction so the service can rely on the
//! invariants once a value exists.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for handles, variant IDs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
