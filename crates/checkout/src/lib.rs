//! Quote checkout library.
//!
//! Turns a priced quote from an on-site calculator into a Shopify draft
//! order and returns its hosted checkout link.
//!
//! # Pipeline
//!
//! 1. [`quote::request`] validates the payload and decides the order mode
//! 2. [`resolver`] maps product handles to variants through a shared cache
//! 3. [`quote::line_items`] and [`quote::draft_order`] build the payload
//! 4. [`shopify`] creates the draft order
//! 5. [`services::notification`] emails staff on a detached task
//!
//! # Security
//!
//! This crate holds a Shopify Admin API token with draft order write
//! access. Keep it out of logs; configuration types redact it in `Debug`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod quote;
pub mod resolver;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
