//! Typed, total parsers for serialized enum lists
//!
//! Catalog rows and historical records store list columns as JSON text
//! (`["ACNE", "redness"]`). These parsers never fail: text that is not a JSON
//! array yields an empty set, and individual entries that do not name a known
//! value are dropped.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use crate::types::{ConcernKind, IngredientId, SKIN_TYPE_MAX, SKIN_TYPE_MIN};

/// Decode a JSON array, or nothing
fn json_array(raw: &str, column: &'static str) -> Vec<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Value>>(trimmed) {
        Ok(values) => values,
        Err(e) => {
            debug!(column, error = %e, "Unparseable list column, treating as empty");
            Vec::new()
        }
    }
}

/// Parse a serialized concern list into the closed concern set
pub fn parse_concern_list(raw: &str) -> BTreeSet<ConcernKind> {
    json_array(raw, "concerns")
        .iter()
        .filter_map(|value| {
            let parsed = value.as_str().and_then(ConcernKind::parse_name);
            if parsed.is_none() {
                debug!(entry = %value, "Dropping unknown concern entry");
            }
            parsed
        })
        .collect()
}

/// Parse a serialized ingredient list; blank names are dropped
pub fn parse_ingredient_list(raw: &str) -> BTreeSet<IngredientId> {
    json_array(raw, "ingredients")
        .iter()
        .filter_map(|value| match value.as_str() {
            Some(name) if !name.trim().is_empty() => Some(IngredientId::new(name)),
            _ => {
                debug!(entry = %value, "Dropping non-text ingredient entry");
                None
            }
        })
        .collect()
}

/// Parse a serialized skin type list
///
/// Accepts integers or numeric strings; values outside 1-6 are dropped.
pub fn parse_skin_type_list(raw: &str) -> BTreeSet<u8> {
    json_array(raw, "skin_types")
        .iter()
        .filter_map(|value| {
            let number = match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            let in_range = number
                .and_then(|n| u8::try_from(n).ok())
                .filter(|n| (SKIN_TYPE_MIN..=SKIN_TYPE_MAX).contains(n));
            if in_range.is_none() {
                debug!(entry = %value, "Dropping invalid skin type entry");
            }
            in_range
        })
        .collect()
}
