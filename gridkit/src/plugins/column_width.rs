//! Column width persistence plugin.
//!
//! Widths chosen by the user are kept in the shared context while the table
//! is mounted and checkpointed into a [`WidthStore`] so a remounted table
//! comes back with the same layout. The store is a seam; the crate only ships
//! an in-memory implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use log::debug;
use serde_json::{Value, json};

use crate::error::PluginError;
use crate::model::{Column, PropMap};
use crate::plugin::{
    CapabilityCall, CapabilityOutput, PluginContext, TableEvent, TablePlugin, names,
};

/// Widths below this are clamped up.
pub const MIN_COLUMN_WIDTH: u32 = 4;

/// Backing store for persisted column widths, keyed by table id.
pub trait WidthStore: Send + Sync {
    /// Widths saved for `table_id`.
    fn load(&self, table_id: &str) -> BTreeMap<String, u32>;

    /// Replace the widths saved for `table_id`.
    fn save(&self, table_id: &str, widths: &BTreeMap<String, u32>);
}

/// Process-local width store.
#[derive(Debug, Default)]
pub struct MemoryWidthStore {
    tables: RwLock<HashMap<String, BTreeMap<String, u32>>>,
}

impl MemoryWidthStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WidthStore for MemoryWidthStore {
    fn load(&self, table_id: &str) -> BTreeMap<String, u32> {
        self.tables
            .read()
            .ok()
            .and_then(|tables| tables.get(table_id).cloned())
            .unwrap_or_default()
    }

    fn save(&self, table_id: &str, widths: &BTreeMap<String, u32>) {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(table_id.to_string(), widths.clone());
        }
    }
}

/// Applies and persists user-chosen column widths.
pub struct ColumnWidthPlugin {
    store: Arc<dyn WidthStore>,
    min_width: u32,
}

impl ColumnWidthPlugin {
    /// Plugin persisting to `store`.
    pub fn new(store: Arc<dyn WidthStore>) -> Self {
        Self {
            store,
            min_width: MIN_COLUMN_WIDTH,
        }
    }

    /// Plugin with a private in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryWidthStore::new()))
    }

    /// Override the minimum width.
    pub fn min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    /// Record a user resize: context first, then the store.
    pub fn resize(&self, cx: &PluginContext, key: &str, width: u32) {
        let width = width.max(self.min_width);
        cx.set_column_width(key, width);
        self.checkpoint(cx);
    }

    /// Forget every width for this table.
    pub fn reset(&self, cx: &PluginContext) {
        cx.set_column_widths(BTreeMap::new());
        self.store.save(cx.table_id(), &BTreeMap::new());
    }

    fn checkpoint(&self, cx: &PluginContext) {
        self.store.save(cx.table_id(), &cx.column_widths());
    }

    /// Stored widths overlaid with the live context widths.
    fn effective_widths(&self, cx: &PluginContext) -> BTreeMap<String, u32> {
        let mut widths = self.store.load(cx.table_id());
        widths.extend(cx.column_widths());
        widths
    }

    fn apply(&self, columns: &[Column], cx: &PluginContext) -> Vec<Column> {
        let widths = self.effective_widths(cx);
        columns
            .iter()
            .cloned()
            .map(|mut column| {
                if let Some(width) = widths.get(&column.key) {
                    column.width = Some((*width).max(self.min_width));
                }
                column
            })
            .collect()
    }

    fn scroll_props(&self, cx: &PluginContext) -> Option<PropMap> {
        let widths = self.effective_widths(cx);
        if widths.is_empty() {
            return None;
        }
        let total: u32 = widths.values().sum();
        let mut props = PropMap::new();
        props.insert("scroll".to_string(), json!({ "x": total }));
        props.insert("tableLayout".to_string(), Value::from("fixed"));
        Some(props)
    }
}

impl TablePlugin for ColumnWidthPlugin {
    fn name(&self) -> &str {
        names::COLUMN_WIDTH
    }

    fn invoke(
        &self,
        call: CapabilityCall<'_>,
        cx: &PluginContext,
    ) -> Result<Option<CapabilityOutput>, PluginError> {
        let output = match call {
            CapabilityCall::ApplyPersistentWidths { columns } => {
                Some(CapabilityOutput::Columns(self.apply(columns, cx)))
            }
            CapabilityCall::TableProps => self.scroll_props(cx).map(CapabilityOutput::Props),
            _ => None,
        };
        Ok(output)
    }

    fn on_event(&self, event: &TableEvent, cx: &PluginContext) -> Result<(), PluginError> {
        if let TableEvent::PageChange(change) = event {
            debug!(
                "Column widths checkpointed for '{}' on page {}",
                cx.table_id(),
                change.current
            );
            self.checkpoint(cx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaginationChange;

    #[test]
    fn test_resize_is_clamped_and_applied() {
        let plugin = ColumnWidthPlugin::in_memory();
        let cx = PluginContext::new("accounts", 10);
        plugin.resize(&cx, "name", 1);

        let columns = vec![Column::new("name", "Name"), Column::new("age", "Age")];
        let out = plugin.apply(&columns, &cx);
        assert_eq!(out[0].width, Some(MIN_COLUMN_WIDTH));
        assert_eq!(out[1].width, None);
    }

    #[test]
    fn test_store_survives_remount() {
        let store: Arc<dyn WidthStore> = Arc::new(MemoryWidthStore::new());
        let plugin = ColumnWidthPlugin::new(store.clone());
        let cx = PluginContext::new("bots", 10);
        cx.set_column_width("name", 30);
        plugin
            .on_event(&TableEvent::PageChange(PaginationChange::new(2, 10)), &cx)
            .unwrap();

        let remounted = PluginContext::new("bots", 10);
        let props = ColumnWidthPlugin::new(store).scroll_props(&remounted).unwrap();
        assert_eq!(props["scroll"], json!({ "x": 30 }));
    }

    #[test]
    fn test_no_widths_contributes_nothing() {
        let plugin = ColumnWidthPlugin::in_memory();
        let cx = PluginContext::new("t", 10);
        assert!(plugin.scroll_props(&cx).is_none());
    }
}
