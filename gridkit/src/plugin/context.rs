//! Shared per-table state.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::model::{Filters, PropMap};

/// Snapshot of the state plugins share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    /// Current page, 1-based.
    pub current: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Total rows reported by the last successful load.
    pub total: usize,
    /// Active, normalised filters.
    pub filters: Filters,
    /// Column widths keyed by column key.
    pub column_widths: BTreeMap<String, u32>,
    /// Whether a load is in flight.
    pub loading: bool,
}

/// Handle to the shared state of one table.
///
/// Cloning is cheap; all clones see the same state. The change router is the
/// only writer of pagination and filter state. Plugins read through the
/// getters and may use the `set_*` helpers only for their own concern.
#[derive(Debug, Clone)]
pub struct PluginContext {
    table_id: Arc<str>,
    props: Arc<PropMap>,
    inner: Arc<RwLock<TableState>>,
}

impl PluginContext {
    /// Create a context for `table_id` starting on page 1.
    pub fn new(table_id: impl Into<String>, page_size: usize) -> Self {
        let table_id: String = table_id.into();
        Self {
            table_id: table_id.into(),
            props: Arc::new(PropMap::new()),
            inner: Arc::new(RwLock::new(TableState {
                current: 1,
                page_size: page_size.max(1),
                ..Default::default()
            })),
        }
    }

    /// Attach the table's user-supplied props (read-only for plugins).
    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = Arc::new(props);
        self
    }

    /// The table identifier.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// The table's user-supplied props.
    pub fn props(&self) -> &PropMap {
        &self.props
    }

    fn read<R>(&self, f: impl FnOnce(&TableState) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut TableState)) {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    /// Clone of the full state.
    pub fn state(&self) -> TableState {
        self.read(TableState::clone)
    }

    /// Current page.
    pub fn current(&self) -> usize {
        self.read(|s| s.current)
    }

    /// Page size.
    pub fn page_size(&self) -> usize {
        self.read(|s| s.page_size)
    }

    /// Total rows.
    pub fn total(&self) -> usize {
        self.read(|s| s.total)
    }

    /// Active filters.
    pub fn filters(&self) -> Filters {
        self.read(|s| s.filters.clone())
    }

    /// Width of one column, if known.
    pub fn column_width(&self, key: &str) -> Option<u32> {
        self.read(|s| s.column_widths.get(key).copied())
    }

    /// All known column widths.
    pub fn column_widths(&self) -> BTreeMap<String, u32> {
        self.read(|s| s.column_widths.clone())
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.read(|s| s.loading)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Set the current page (clamped to at least 1).
    pub fn set_current(&self, current: usize) {
        self.write(|s| s.current = current.max(1));
    }

    /// Set the page size (clamped to at least 1).
    pub fn set_page_size(&self, page_size: usize) {
        self.write(|s| s.page_size = page_size.max(1));
    }

    /// Set the total row count.
    pub fn set_total(&self, total: usize) {
        self.write(|s| s.total = total);
    }

    /// Replace the active filters.
    pub fn set_filters(&self, filters: Filters) {
        self.write(|s| s.filters = filters);
    }

    /// Record a column width.
    pub fn set_column_width(&self, key: impl Into<String>, width: u32) {
        let key = key.into();
        self.write(|s| {
            s.column_widths.insert(key, width);
        });
    }

    /// Replace all column widths.
    pub fn set_column_widths(&self, widths: BTreeMap<String, u32>) {
        self.write(|s| s.column_widths = widths);
    }

    /// Mark a load as started or finished.
    pub fn set_loading(&self, loading: bool) {
        self.write(|s| s.loading = loading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let cx = PluginContext::new("accounts", 20);
        let other = cx.clone();
        other.set_current(3);
        other.set_column_width("name", 12);

        assert_eq!(cx.current(), 3);
        assert_eq!(cx.page_size(), 20);
        assert_eq!(cx.column_width("name"), Some(12));
        assert_eq!(cx.table_id(), "accounts");
    }

    #[test]
    fn test_setters_clamp() {
        let cx = PluginContext::new("t", 0);
        cx.set_current(0);
        assert_eq!(cx.current(), 1);
        assert_eq!(cx.page_size(), 1);
    }
}
