//! Sorting plugin.
//!
//! Sort state lives entirely inside this plugin. The change router forwards
//! the sorter payload untouched; the plugin stores it and decorates columns
//! with the matching sort indicator.

use std::sync::{Arc, RwLock};

use log::debug;

use crate::error::PluginError;
use crate::model::{Sorter, SorterInfo};
use crate::plugin::{
    CapabilityCall, CapabilityOutput, PluginContext, TableEvent, TablePlugin, names,
};

type SortCallback = Arc<dyn Fn(&SorterInfo) + Send + Sync>;

/// Owns the sort state of one table.
#[derive(Default)]
pub struct SortingPlugin {
    sorter: RwLock<SorterInfo>,
    on_change: Option<SortCallback>,
}

impl SortingPlugin {
    /// Plugin with no initial sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugin starting from `initial`.
    pub fn with_initial(initial: SorterInfo) -> Self {
        Self {
            sorter: RwLock::new(initial),
            on_change: None,
        }
    }

    /// Call `f` after every sort change.
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&SorterInfo) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// The stored sorter payload.
    pub fn sorter(&self) -> SorterInfo {
        self.sorter
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Active sorters, in priority order, for request parameters.
    pub fn active_sorters(&self) -> Vec<Sorter> {
        self.sorter().active()
    }
}

impl TablePlugin for SortingPlugin {
    fn name(&self) -> &str {
        names::SORTING
    }

    fn invoke(
        &self,
        call: CapabilityCall<'_>,
        _cx: &PluginContext,
    ) -> Result<Option<CapabilityOutput>, PluginError> {
        let CapabilityCall::ProcessColumns { columns } = call else {
            return Ok(None);
        };
        let sorter = self.sorter();
        let columns = columns
            .iter()
            .cloned()
            .map(|mut column| {
                column.sort_order = if column.sortable {
                    sorter.order_of(&column.key)
                } else {
                    None
                };
                column
            })
            .collect();
        Ok(Some(CapabilityOutput::Columns(columns)))
    }

    fn on_event(&self, event: &TableEvent, _cx: &PluginContext) -> Result<(), PluginError> {
        let TableEvent::SorterChange(info) = event else {
            return Ok(());
        };
        debug!("Sort changed: {:?}", info);
        match self.sorter.write() {
            Ok(mut guard) => *guard = info.clone(),
            Err(_) => return Err(PluginError::new("sort state poisoned")),
        }
        if let Some(callback) = &self.on_change {
            callback(info);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, SortOrder};

    #[test]
    fn test_sort_event_decorates_sortable_columns_only() {
        let plugin = SortingPlugin::new();
        let cx = PluginContext::new("t", 10);
        plugin
            .on_event(&TableEvent::SorterChange(SorterInfo::Single(Sorter::desc("age"))), &cx)
            .unwrap();

        let columns = vec![
            Column::new("name", "Name"),
            Column::new("age", "Age").sortable(),
        ];
        let Some(CapabilityOutput::Columns(out)) = plugin
            .invoke(CapabilityCall::ProcessColumns { columns: &columns }, &cx)
            .unwrap()
        else {
            panic!("expected columns");
        };
        assert_eq!(out[0].sort_order, None);
        assert_eq!(out[1].sort_order, Some(SortOrder::Descend));
    }
}
