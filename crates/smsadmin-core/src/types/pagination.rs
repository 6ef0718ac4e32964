//! Pagination types matching the gateway's paginated envelope.

use serde::{Deserialize, Serialize};

/// Default page size requested from listing endpoints.
const DEFAULT_PAGE_SIZE: u32 = 10;
/// Maximum page size the gateway accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for a paginated listing request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page number (0-based, as the gateway counts).
    #[serde(default)]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub size: u32,
}

impl PageQuery {
    /// Create a new page query, clamping the size to the gateway limit.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a paginated gateway listing.
///
/// Mirrors the wire envelope `{content, totalPages, totalElements, number}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page.
    pub content: Vec<T>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total_elements: u64,
    /// Current page number (0-based).
    #[serde(default)]
    pub number: u32,
}

impl<T> Page<T> {
    /// Create an empty page.
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: 0,
        }
    }

    /// Wrap a bare list as a single page (for endpoints that return an
    /// unwrapped array).
    pub fn from_items(content: Vec<T>) -> Self {
        let total_elements = content.len() as u64;
        Self {
            content,
            total_pages: 1,
            total_elements,
            number: 0,
        }
    }

    /// Whether this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
