//! Calculator data to human-readable order annotations.

use serde_json::{Map, Value};

use crate::shopify::LineItemProperty;

/// Calculator data keys that never become line item properties.
pub const RESERVED_KEYS: &[&str] = &["timestamp", "calculator"];

/// Turn a camelCase or snake_case key into Title Case words.
///
/// ```
/// use quote_checkout::quote::properties::format_label;
///
/// assert_eq!(format_label("binderKits"), "Binder Kits");
/// assert_eq!(format_label("total_cost"), "Total Cost");
/// assert_eq!(format_label(""), "");
/// ```
#[must_use]
pub fn format_label(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        match c {
            '_' => spaced.push(' '),
            c if c.is_ascii_uppercase() => {
                spaced.push(' ');
                spaced.push(c);
            }
            c => spaced.push(c),
        }
    }

    let mut label = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.trim().chars() {
        if c.is_whitespace() {
            at_word_start = true;
            label.push(c);
        } else if at_word_start {
            at_word_start = false;
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
    }
    label
}

/// Stringify a calculator value for display.
///
/// Strings are shown verbatim; everything else uses its compact JSON text,
/// so nested objects are flattened into a single line.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One property per non-reserved calculator data entry, in key order.
pub fn data_properties(data: &Map<String, Value>) -> impl Iterator<Item = LineItemProperty> + '_ {
    data.iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| LineItemProperty::new(format_label(key), format_value(value)))
}
