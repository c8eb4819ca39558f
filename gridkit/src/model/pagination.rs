//! Pagination configuration.

use serde::Serialize;

/// Pagination UI configuration handed to the rendering primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Current page, 1-based.
    pub current: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Total rows across all pages.
    pub total: usize,
    /// Whether the page size changer is shown.
    pub show_size_changer: bool,
    /// Page sizes offered by the size changer.
    pub page_size_options: Vec<usize>,
    /// Whether the "N items" summary is shown.
    pub show_total: bool,
    /// Whether the quick page jumper is shown.
    pub show_quick_jumper: bool,
}

impl PaginationConfig {
    /// Bare `{current, page_size, total}` config with every UI extra off.
    pub fn minimal(current: usize, page_size: usize, total: usize) -> Self {
        Self {
            current: current.max(1),
            page_size: page_size.max(1),
            total,
            show_size_changer: false,
            page_size_options: Vec::new(),
            show_total: false,
            show_quick_jumper: false,
        }
    }

    /// Number of pages, at least 1.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Zero-based index of the first row on the current page.
    pub fn offset(&self) -> usize {
        (self.current.max(1) - 1).saturating_mul(self.page_size)
    }
}

/// Values the renderer falls back to when pagination building fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationFallback {
    /// Current page, 1-based.
    pub current: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Total rows.
    pub total: usize,
}

impl PaginationFallback {
    /// Create fallback values.
    pub fn new(current: usize, page_size: usize, total: usize) -> Self {
        Self {
            current,
            page_size,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(PaginationConfig::minimal(1, 10, 0).page_count(), 1);
        assert_eq!(PaginationConfig::minimal(1, 10, 10).page_count(), 1);
        assert_eq!(PaginationConfig::minimal(1, 10, 11).page_count(), 2);
    }

    #[test]
    fn test_minimal_clamps_zero_values() {
        let config = PaginationConfig::minimal(0, 0, 5);
        assert_eq!(config.current, 1);
        assert_eq!(config.page_size, 1);
        assert_eq!(config.offset(), 0);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        assert_eq!(PaginationConfig::minimal(3, 20, 100).offset(), 40);
        assert_eq!(PaginationConfig::minimal(usize::MAX, 20, 100).offset(), usize::MAX);
    }
}
