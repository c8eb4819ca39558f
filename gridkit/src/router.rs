//! Change-event routing.
//!
//! All user-driven table interactions enter through [`ChangeRouter::handle`].
//! Pagination and filter state are written here, before any plugin hears
//! about the change; sort state is left entirely to the sorting plugin.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::model::{
    ChangeAction, ChangeEvent, ChangeExtra, ChangeHandler, FilterInput, Filters,
    PaginationChange, SorterInfo,
};
use crate::plugin::{PluginContext, PluginManager, TableEvent, names};

/// Drop every filter value that is not an array.
pub fn normalize_filters(input: &FilterInput) -> Filters {
    input
        .iter()
        .filter_map(|(field, value)| match value {
            Value::Array(values) => Some((field.clone(), values.clone())),
            _ => None,
        })
        .collect()
}

/// Single entry point for table change events.
#[derive(Debug, Clone)]
pub struct ChangeRouter {
    plugins: Arc<PluginManager>,
    context: PluginContext,
}

impl ChangeRouter {
    /// Router over one table's plugins and context.
    pub fn new(plugins: Arc<PluginManager>, context: PluginContext) -> Self {
        Self { plugins, context }
    }

    /// The context this router writes.
    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// Route one change. Exactly one of the sort, paginate and filter paths
    /// runs, selected by `extra.action`.
    pub fn handle(
        &self,
        pagination: PaginationChange,
        sorter: SorterInfo,
        filters: FilterInput,
        extra: ChangeExtra,
    ) {
        debug!("Table '{}' change: {:?}", self.context.table_id(), extra.action);
        match extra.action {
            ChangeAction::Sort => {
                self.plugins
                    .fire(names::SORTING, &TableEvent::SorterChange(sorter), &self.context);
            }
            ChangeAction::Paginate => {
                self.context.set_current(pagination.current);
                self.context.set_page_size(pagination.page_size);

                let event = TableEvent::PageChange(PaginationChange::new(
                    self.context.current(),
                    self.context.page_size(),
                ));
                self.plugins.fire(names::PAGINATION, &event, &self.context);
                self.plugins.fire(names::COLUMN_WIDTH, &event, &self.context);
            }
            ChangeAction::Filter => {
                let normalized = normalize_filters(&filters);
                self.context.set_filters(normalized.clone());
                self.context.set_current(1);

                self.plugins
                    .fire(names::FILTER, &TableEvent::FilterChange(normalized), &self.context);
            }
        }
    }

    /// Route a complete change event.
    pub fn dispatch(&self, event: ChangeEvent) {
        self.handle(event.pagination, event.sorter, event.filters, event.extra);
    }

    /// Wrap this router as a change handler for the rendering primitive.
    pub fn handler(self: &Arc<Self>) -> ChangeHandler {
        let router = Arc::clone(self);
        Arc::new(move |event| router.dispatch(event))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_drops_non_arrays() {
        let mut input = FilterInput::new();
        input.insert("status".into(), json!(["on"]));
        input.insert("name".into(), json!("ann"));
        input.insert("cleared".into(), Value::Null);

        let filters = normalize_filters(&input);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters["status"], vec![json!("on")]);
    }
}
