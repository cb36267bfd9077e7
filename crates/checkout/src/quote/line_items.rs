//! Line item construction for both order modes.

use chrono::{DateTime, SecondsFormat, Utc};
use quote_checkout_core::Money;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::resolver::{ResolveError, VariantResolver};
use crate::shopify::{CustomLineItem, LineItem, LineItemProperty};

use super::properties::data_properties;
use super::request::{OrderItem, OrderMode, ValidatedQuote};

/// Build the line items for a validated quote.
///
/// # Errors
///
/// Propagates [`ResolveError`] from real-products resolution.
pub async fn build(
    quote: &ValidatedQuote,
    resolver: &VariantResolver,
    quoted_at: DateTime<Utc>,
) -> Result<Vec<LineItem>, ResolveError> {
    match &quote.mode {
        OrderMode::LegacyQuote { total_price } => Ok(vec![build_legacy(
            quote.calculator_type.as_deref(),
            &quote.calculator_data,
            *total_price,
            quoted_at,
        )]),
        OrderMode::RealProducts { items } => build_from_items(items, resolver).await,
    }
}

/// The single custom line item of a legacy quote.
#[must_use]
pub fn build_legacy(
    calculator_type: Option<&str>,
    calculator_data: &Map<String, Value>,
    total_price: Money,
    quoted_at: DateTime<Utc>,
) -> LineItem {
    let kind = calculator_type.unwrap_or("Calculator");

    let mut properties = Vec::with_capacity(calculator_data.len() + 2);
    properties.push(LineItemProperty::new("Calculator Type", kind));
    properties.extend(data_properties(calculator_data));
    properties.push(LineItemProperty::new(
        "Quote Date",
        quoted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    ));

    LineItem::Custom(CustomLineItem {
        title: format!("{kind} Quote Order"),
        price: total_price,
        quantity: 1,
        requires_shipping: false,
        taxable: true,
        properties,
    })
}

/// One variant line per item, resolved one at a time in input order.
///
/// # Errors
///
/// Stops at the first handle that fails to resolve.
#[instrument(skip_all, fields(items = items.len()))]
pub async fn build_from_items(
    items: &[OrderItem],
    resolver: &VariantResolver,
) -> Result<Vec<LineItem>, ResolveError> {
    let mut line_items = Vec::with_capacity(items.len());
    for item in items {
        let variant = resolver.resolve(&item.handle).await?;
        line_items.push(LineItem::Variant {
            variant_id: variant.variant_id,
            quantity: item.quantity,
        });
    }
    Ok(line_items)
}
