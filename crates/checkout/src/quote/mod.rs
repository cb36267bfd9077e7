//! Quote to draft order pipeline stages.
//!
//! - [`request`]: parse and validate the calculator payload
//! - [`properties`]: label and value formatting for annotations
//! - [`line_items`]: line items for either order mode
//! - [`draft_order`]: the final creation payload

pub mod draft_order;
pub mod line_items;
pub mod properties;
pub mod request;

pub use draft_order::assemble;
pub use request::{OrderItem, OrderMode, QuoteRequest, ValidatedQuote, ValidationError};
