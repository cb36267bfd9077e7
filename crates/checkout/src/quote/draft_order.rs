//! Draft order payload assembly.

use crate::shopify::{DraftOrderPayload, LineItem, NoteAttribute};

use super::request::ValidatedQuote;

const NOTE_HEADER: &str = "Order created from quote calculator";

/// Combine a validated quote and its line items into a creation payload.
#[must_use]
pub fn assemble(quote: &ValidatedQuote, line_items: Vec<LineItem>) -> DraftOrderPayload {
    DraftOrderPayload {
        currency: quote.currency.clone(),
        tags: tags(quote),
        note: note(quote),
        note_attributes: note_attributes(quote),
        line_items,
        email: quote.customer_email.clone(),
        use_customer_default_address: true,
    }
}

fn tags(quote: &ValidatedQuote) -> String {
    format!(
        "calculator-order,calculator-{},{}",
        quote.calculator_type.as_deref().unwrap_or("unknown"),
        quote.mode.tag()
    )
}

fn note(quote: &ValidatedQuote) -> String {
    let data = serde_json::to_string_pretty(&quote.calculator_data).unwrap_or_default();
    format!(
        "{NOTE_HEADER}\nCalculator: {}\nMode: {}\n\nCalculator Data:\n{data}",
        quote.calculator_type.as_deref().unwrap_or("unknown"),
        quote.mode.label(),
    )
}

fn note_attributes(quote: &ValidatedQuote) -> Vec<NoteAttribute> {
    let hours = quote.shipping_validity_hours.map(|h| h.to_string());

    [
        ("Customer Name", quote.customer_name.clone()),
        ("Account Manager", quote.account_manager_name.clone()),
        ("Account Manager Email", quote.account_manager_email.clone()),
        ("Shipping Validity (hours)", hours),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| NoteAttribute::new(name, v)))
    .collect()
}
