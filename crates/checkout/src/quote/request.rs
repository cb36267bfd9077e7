//! Inbound quote payload and its validation.
//!
//! The calculator widget is loosely typed: prices and quantities may arrive
//! as numbers or numeric strings, and optional fields may be blank. Parsing
//! into [`QuoteRequest`] accepts all of that; [`QuoteRequest::validate`]
//! then produces a [`ValidatedQuote`] whose [`OrderMode`] is decided once
//! and never re-derived.

use quote_checkout_core::{Money, MoneyError, ProductHandle};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Currency used when the request does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Caller input that cannot produce an order.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The body is not a JSON object of the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Quote mode without a price.
    #[error("totalPrice is required when no items are provided")]
    MissingTotalPrice,

    /// Quote mode with a price that is not a positive finite number.
    #[error("totalPrice must be a positive number: {0}")]
    InvalidTotalPrice(String),

    /// Items mode where every item was filtered out.
    #[error("No valid items provided: each item needs a handle and a quantity greater than zero")]
    NoValidItems,
}

/// Raw quote payload as posted by the calculator widget.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub calculator_type: Option<String>,
    #[serde(default)]
    pub calculator_data: Value,
    #[serde(default)]
    pub total_price: Value,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub account_manager_name: Option<String>,
    pub account_manager_email: Option<String>,
    #[serde(default)]
    pub notify_emails: Value,
    #[serde(default)]
    pub items: Value,
    #[serde(default)]
    pub shipping_validity_hours: Value,
}

/// One requested product line, as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestedItem {
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub quantity: Value,
}

/// A requested line that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub handle: ProductHandle,
    /// Rounded to the nearest whole unit, at least 1.
    pub quantity: u32,
}

impl OrderItem {
    /// Keep an item only if its handle is non-blank and its quantity is a
    /// finite number greater than zero.
    #[must_use]
    pub fn from_requested(item: &RequestedItem) -> Option<Self> {
        let handle = ProductHandle::parse(item.handle.as_deref()?).ok()?;
        let quantity = number_from(&item.quantity).filter(|q| q.is_finite() && *q > 0.0)?;

        Some(Self {
            handle,
            quantity: round_quantity(quantity),
        })
    }
}

/// How the order is billed. Decided once during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderMode {
    /// One synthetic line carrying the calculator's total.
    LegacyQuote { total_price: Money },
    /// One line per resolved catalog variant.
    RealProducts { items: Vec<OrderItem> },
}

impl OrderMode {
    /// Tag suffix identifying the mode to Shopify staff.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::LegacyQuote { .. } => "legacy-quote",
            Self::RealProducts { .. } => "real-products",
        }
    }

    /// Human-readable mode name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LegacyQuote { .. } => "Quote (single custom line item)",
            Self::RealProducts { .. } => "Real products",
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuote {
    pub calculator_type: Option<String>,
    pub calculator_data: Map<String, Value>,
    pub currency: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub account_manager_name: Option<String>,
    pub account_manager_email: Option<String>,
    pub notify_emails: Vec<String>,
    pub shipping_validity_hours: Option<f64>,
    pub mode: OrderMode,
}

impl QuoteRequest {
    /// Decide the order mode and check the inputs that mode needs.
    ///
    /// A non-empty `items` array selects real-products mode regardless of
    /// `totalPrice`; anything else is a legacy quote.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoValidItems`] when `items` is non-empty
    /// but nothing survives filtering, and [`ValidationError::MissingTotalPrice`]
    /// or [`ValidationError::InvalidTotalPrice`] for a legacy quote without a
    /// positive finite price.
    pub fn validate(self) -> Result<ValidatedQuote, ValidationError> {
        let mode = match self.items.as_array().filter(|items| !items.is_empty()) {
            Some(raw_items) => {
                let items = filter_items(raw_items);
                if items.is_empty() {
                    return Err(ValidationError::NoValidItems);
                }
                OrderMode::RealProducts { items }
            }
            None => OrderMode::LegacyQuote {
                total_price: parse_total_price(&self.total_price)?,
            },
        };

        let calculator_data = match self.calculator_data {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(ValidatedQuote {
            calculator_type: non_blank(self.calculator_type),
            calculator_data,
            currency: non_blank(self.currency)
                .map_or_else(|| DEFAULT_CURRENCY.to_string(), |c| c.to_uppercase()),
            customer_email: non_blank(self.customer_email),
            customer_name: non_blank(self.customer_name),
            account_manager_name: non_blank(self.account_manager_name),
            account_manager_email: non_blank(self.account_manager_email),
            notify_emails: string_list(&self.notify_emails),
            shipping_validity_hours: number_from(&self.shipping_validity_hours)
                .filter(|h| h.is_finite() && *h > 0.0),
            mode,
        })
    }
}

/// Drop items with a blank handle or a non-positive quantity, keeping order.
#[must_use]
pub fn filter_items(raw_items: &[Value]) -> Vec<OrderItem> {
    raw_items
        .iter()
        .filter_map(|raw| serde_json::from_value::<RequestedItem>(raw.clone()).ok())
        .filter_map(|item| OrderItem::from_requested(&item))
        .collect()
}

fn parse_total_price(value: &Value) -> Result<Money, ValidationError> {
    if value.is_null() {
        return Err(ValidationError::MissingTotalPrice);
    }

    let amount = number_from(value)
        .ok_or_else(|| ValidationError::InvalidTotalPrice(value.to_string()))?;

    Money::from_f64(amount)
        .map_err(|e: MoneyError| ValidationError::InvalidTotalPrice(e.to_string()))
}

/// Read a number sent either as a JSON number or a numeric string.
fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range first
fn round_quantity(quantity: f64) -> u32 {
    quantity.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Accept `["a@x.com", ...]` or a single comma-separated string.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Value::String(s) => s.split(',').map(String::from).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(body: Value) -> QuoteRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_legacy_mode_with_price() {
        let quote = parse(json!({"calculatorType": "mesh", "totalPrice": 1250}))
            .validate()
            .unwrap();
        assert_eq!(
            quote.mode,
            OrderMode::LegacyQuote {
                total_price: Money::from_f64(1250.0).unwrap()
            }
        );
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn test_numeric_string_price_is_accepted() {
        let quote = parse(json!({"totalPrice": " 99.5 "})).validate().unwrap();
        assert_eq!(quote.mode.tag(), "legacy-quote");
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = parse(json!({"totalPrice": -5})).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTotalPrice(_)));
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let err = parse(json!({"totalPrice": "abc"})).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTotalPrice(_)));
    }

    #[test]
    fn test_missing_price_without_items() {
        assert_eq!(
            parse(json!({"items": []})).validate().unwrap_err(),
            ValidationError::MissingTotalPrice
        );
        assert_eq!(
            parse(json!({})).validate().unwrap_err(),
            ValidationError::MissingTotalPrice
        );
    }

    #[test]
    fn test_items_select_real_products_even_with_price() {
        let quote = parse(json!({
            "totalPrice": 10,
            "items": [{"handle": "mesh", "quantity": 2}]
        }))
        .validate()
        .unwrap();
        assert_eq!(quote.mode.tag(), "real-products");
    }

    #[test]
    fn test_all_items_filtered_is_rejected() {
        let err = parse(json!({
            "totalPrice": 10,
            "items": [
                {"handle": "   ", "quantity": 1},
                {"handle": "mesh", "quantity": 0},
                {"handle": "mesh", "quantity": -2},
                {"quantity": 1},
                "not-an-object"
            ]
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::NoValidItems);
    }

    #[test]
    fn test_items_are_filtered_trimmed_and_rounded_in_order() {
        let quote = parse(json!({
            "items": [
                {"handle": " binder ", "quantity": "4"},
                {"handle": "", "quantity": 3},
                {"handle": "mesh", "quantity": 2.7},
                {"handle": "clip", "quantity": 0.2}
            ]
        }))
        .validate()
        .unwrap();

        let OrderMode::RealProducts { items } = quote.mode else {
            panic!("expected real-products mode");
        };
        let summary: Vec<(&str, u32)> = items
            .iter()
            .map(|i| (i.handle.as_str(), i.quantity))
            .collect();
        assert_eq!(summary, vec![("binder", 4), ("mesh", 3), ("clip", 1)]);
    }

    #[test]
    fn test_optional_fields_are_normalized() {
        let quote = parse(json!({
            "totalPrice": 5,
            "currency": "cad",
            "customerEmail": "  ",
            "customerName": " Dana Reyes ",
            "notifyEmails": "ops@x.com, sales@x.com",
            "shippingValidityHours": "48",
            "calculatorData": ["not", "an", "object"]
        }))
        .validate()
        .unwrap();

        assert_eq!(quote.currency, "CAD");
        assert_eq!(quote.customer_email, None);
        assert_eq!(quote.customer_name.as_deref(), Some("Dana Reyes"));
        assert_eq!(quote.notify_emails.len(), 2);
        assert_eq!(quote.shipping_validity_hours, Some(48.0));
        assert!(quote.calculator_data.is_empty());
    }

    #[test]
    fn test_non_positive_shipping_hours_are_ignored() {
        let quote = parse(json!({"totalPrice": 5, "shippingValidityHours": 0}))
            .validate()
            .unwrap();
        assert_eq!(quote.shipping_validity_hours, None);
    }
}
