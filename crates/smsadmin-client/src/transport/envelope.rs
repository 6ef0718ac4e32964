//! Response-envelope normalization.
//!
//! Listing endpoints on the gateway answer in more than one shape: a bare
//! array, a Spring-style page `{content, totalPages, totalElements,
//! number}`, or a `{data: […]}` wrapper. All of them are mapped into one
//! canonical [`Page`]; unknown shapes degrade to an empty page with a
//! logged warning, and a single malformed element is skipped rather than
//! failing the whole listing.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use smsadmin_core::types::Page;

/// Normalize any known listing shape into a [`Page`].
pub fn normalize_page<T: DeserializeOwned>(value: Value) -> Page<T> {
    match value {
        Value::Array(items) => Page::from_items(parse_items(items)),
        Value::Object(mut obj) => {
            if let Some(Value::Array(items)) = obj.remove("content") {
                let mut page = Page::from_items(parse_items(items));
                page.total_pages = obj
                    .get("totalPages")
                    .and_then(Value::as_u64)
                    .unwrap_or(1) as u32;
                page.total_elements = obj
                    .get("totalElements")
                    .and_then(Value::as_u64)
                    .unwrap_or(page.content.len() as u64);
                page.number = obj.get("number").and_then(Value::as_u64).unwrap_or(0) as u32;
                page
            } else if let Some(Value::Array(items)) = obj.remove("data") {
                Page::from_items(parse_items(items))
            } else {
                warn!("Unknown listing envelope shape; treating as empty");
                Page::empty()
            }
        }
        other => {
            warn!(shape = ?other, "Non-list response where a listing was expected");
            Page::empty()
        }
    }
}

/// Parse elements one by one so a single bad record cannot break a list.
fn parse_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "Skipping malformed list element");
                None
            }
        })
        .collect()
}
