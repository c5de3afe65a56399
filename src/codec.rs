// JSON (de)serialization of the todo collection

use crate::models::TodoItem;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Serialize the collection as a JSON array, preserving order
pub fn encode(items: &[TodoItem]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

/// Parse a stored collection, never failing
///
/// A value that is not a JSON array yields an empty collection. Elements that
/// don't decode, have blank text, or repeat an earlier id are skipped with a
/// warning, so the result always satisfies the collection invariants.
pub fn decode(raw: &str) -> Vec<TodoItem> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = ?e, "Failed to parse stored todos, starting empty");
            return Vec::new();
        }
    };

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            warn!(kind = json_kind(&other), "Stored todos are not a JSON array, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(elements.len());

    for (index, element) in elements.into_iter().enumerate() {
        let item: TodoItem = match serde_json::from_value(element) {
            Ok(item) => item,
            Err(e) => {
                warn!(index, error = ?e, "Failed to decode todo, skipping");
                continue;
            }
        };

        if item.text.trim().is_empty() {
            warn!(index, id = item.id, "Todo has empty text, skipping");
            continue;
        }

        if !seen.insert(item.id) {
            warn!(index, id = item.id, "Duplicate todo id, skipping");
            continue;
        }

        items.push(item);
    }

    debug!(count = items.len(), "Decoded stored todos");
    items
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
