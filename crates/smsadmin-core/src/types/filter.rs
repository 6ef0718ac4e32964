//! Page-local substring search.
//!
//! Listing views filter the currently loaded page with a case-insensitive
//! substring match across a fixed field set. The filter runs before any
//! local slicing so the two compose predictably, but it deliberately does
//! **not** span server-side pages; widening it to a global search would
//! change observable behavior.

/// Types that expose a fixed set of searchable field values.
pub trait Searchable {
    /// The field values a query is matched against.
    fn search_fields(&self) -> Vec<String>;
}

/// Filter `items` down to those with at least one field containing `query`,
/// case-insensitively. An empty or whitespace query matches everything.
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
