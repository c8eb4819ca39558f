//! Filter plugin.

use std::sync::Arc;

use log::debug;

use crate::error::PluginError;
use crate::model::{FilterConfig, Filters};
use crate::plugin::{
    CapabilityCall, CapabilityOutput, PluginContext, TableEvent, TablePlugin, names,
};

type FilterCallback = Arc<dyn Fn(&Filters) + Send + Sync>;

/// Reflects the active filters on filterable columns.
#[derive(Default)]
pub struct FilterPlugin {
    on_change: Option<FilterCallback>,
}

impl FilterPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `f` after every filter change.
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&Filters) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }
}

impl TablePlugin for FilterPlugin {
    fn name(&self) -> &str {
        names::FILTER
    }

    fn invoke(
        &self,
        call: CapabilityCall<'_>,
        cx: &PluginContext,
    ) -> Result<Option<CapabilityOutput>, PluginError> {
        let CapabilityCall::ProcessColumns { columns } = call else {
            return Ok(None);
        };
        let filters = cx.filters();
        let columns = columns
            .iter()
            .cloned()
            .map(|mut column| {
                if column.filterable {
                    if column.filter_config.is_none() {
                        column.filter_config = Some(FilterConfig::default());
                    }
                    column.filtered_value = filters
                        .get(column.field())
                        .or_else(|| filters.get(&column.key))
                        .cloned();
                }
                column
            })
            .collect();
        Ok(Some(CapabilityOutput::Columns(columns)))
    }

    fn on_event(&self, event: &TableEvent, _cx: &PluginContext) -> Result<(), PluginError> {
        if let TableEvent::FilterChange(filters) = event {
            debug!("Filters changed: {} active", filters.len());
            if let Some(callback) = &self.on_change {
                callback(filters);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Column, FilterKind};

    #[test]
    fn test_filterable_columns_receive_context_filters() {
        let plugin = FilterPlugin::new();
        let cx = PluginContext::new("t", 10);
        let mut filters = Filters::new();
        filters.insert("status".into(), vec![json!("active")]);
        cx.set_filters(filters);

        let mut status = Column::new("status", "Status");
        status.filterable = true;
        let columns = vec![status, Column::new("name", "Name")];

        let Some(CapabilityOutput::Columns(out)) = plugin
            .invoke(CapabilityCall::ProcessColumns { columns: &columns }, &cx)
            .unwrap()
        else {
            panic!("expected columns");
        };
        assert_eq!(out[0].filtered_value, Some(vec![json!("active")]));
        assert_eq!(out[0].filter_config.as_ref().unwrap().kind, FilterKind::Input);
        assert_eq!(out[1].filtered_value, None);
    }
}
