//! Request and response shapes exchanged with the Shopify Admin API.
//!
//! Draft order types serialize to the REST `draft_orders.json` body
//! (snake_case). Response types decode only the fields the pipeline reads.

use quote_checkout_core::{DraftOrderId, Money, VariantId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// Result of looking up a product by handle.
///
/// `first_variant_id` is the raw GID (`gid://shopify/ProductVariant/<n>`);
/// it is `None` when the product has no variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLookupResult {
    /// Product title.
    pub title: String,
    /// GID of the first variant, if any.
    pub first_variant_id: Option<String>,
}

// =============================================================================
// Draft orders
// =============================================================================

/// A `name`/`value` pair attached to a custom line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemProperty {
    pub name: String,
    pub value: String,
}

impl LineItemProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A `name`/`value` pair attached to the draft order itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: String,
}

impl NoteAttribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One line on a draft order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LineItem {
    /// A real catalog variant.
    Variant {
        variant_id: VariantId,
        quantity: u32,
    },
    /// A synthetic priced item with no inventory linkage.
    Custom(CustomLineItem),
}

/// A custom (non-catalog) line item carrying the quoted price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomLineItem {
    pub title: String,
    pub price: Money,
    pub quantity: u32,
    pub requires_shipping: bool,
    pub taxable: bool,
    pub properties: Vec<LineItemProperty>,
}

/// Body of a draft order creation request (the value under `draft_order`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftOrderPayload {
    pub currency: String,
    /// Comma-separated tag list.
    pub tags: String,
    pub note: String,
    pub note_attributes: Vec<NoteAttribute>,
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub use_customer_default_address: bool,
}

/// Draft order record returned by Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftOrder {
    pub id: DraftOrderId,
    /// Shop-assigned display name, e.g. `"#D12"`.
    pub name: String,
    /// Hosted checkout page for this draft order.
    pub invoice_url: String,
    /// Order total as a decimal string.
    pub total_price: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_line_item_shape() {
        let item = LineItem::Variant {
            variant_id: VariantId::new(77).unwrap(),
            quantity: 3,
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({"variant_id": 77, "quantity": 3})
        );
    }

    #[test]
    fn test_custom_line_item_shape() {
        let item = LineItem::Custom(CustomLineItem {
            title: "Mesh Quote Order".to_string(),
            price: Money::from_f64(10.5).unwrap(),
            quantity: 1,
            requires_shipping: false,
            taxable: true,
            properties: vec![LineItemProperty::new("Calculator Type", "mesh")],
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["price"], "10.50");
        assert_eq!(json["requires_shipping"], false);
        assert_eq!(json["properties"][0]["name"], "Calculator Type");
    }

    #[test]
    fn test_payload_omits_missing_email() {
        let payload = DraftOrderPayload {
            currency: "USD".to_string(),
            tags: "calculator-order".to_string(),
            note: String::new(),
            note_attributes: Vec::new(),
            line_items: Vec::new(),
            email: None,
            use_customer_default_address: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["use_customer_default_address"], true);
    }

    #[test]
    fn test_draft_order_decodes_extra_fields() {
        let order: DraftOrder = serde_json::from_value(serde_json::json!({
            "id": 1_099_511_627_776_u64,
            "name": "#D7",
            "invoice_url": "https://shop.example/invoices/abc",
            "total_price": "1250.00",
            "status": "open"
        }))
        .unwrap();
        assert_eq!(order.id.get(), 1_099_511_627_776);
        assert_eq!(order.name, "#D7");
    }
}
