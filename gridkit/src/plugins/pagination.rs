//! Pagination plugin.

use std::sync::Arc;

use log::debug;

use crate::error::PluginError;
use crate::model::PaginationChange;
use crate::plugin::{
    CapabilityCall, CapabilityOutput, PluginContext, TableEvent, TablePlugin, names,
};

type PageCallback = Arc<dyn Fn(PaginationChange) + Send + Sync>;

/// Adds pagination UI extras and observes page changes.
///
/// Page state itself is written by the change router; this plugin only
/// shapes how the pager looks and notifies interested hosts.
pub struct PaginationPlugin {
    page_size_options: Vec<usize>,
    show_size_changer: bool,
    show_quick_jumper: bool,
    show_total: bool,
    on_change: Option<PageCallback>,
}

impl PaginationPlugin {
    /// Plugin offering the given page sizes.
    pub fn new(page_size_options: Vec<usize>) -> Self {
        Self {
            page_size_options,
            show_size_changer: true,
            show_quick_jumper: false,
            show_total: true,
            on_change: None,
        }
    }

    /// Show or hide the page size changer.
    pub fn size_changer(mut self, show: bool) -> Self {
        self.show_size_changer = show;
        self
    }

    /// Show or hide the quick jumper.
    pub fn quick_jumper(mut self, show: bool) -> Self {
        self.show_quick_jumper = show;
        self
    }

    /// Show or hide the total summary.
    pub fn show_total(mut self, show: bool) -> Self {
        self.show_total = show;
        self
    }

    /// Call `f` after every page change.
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(PaginationChange) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }
}

impl TablePlugin for PaginationPlugin {
    fn name(&self) -> &str {
        names::PAGINATION
    }

    fn invoke(
        &self,
        call: CapabilityCall<'_>,
        _cx: &PluginContext,
    ) -> Result<Option<CapabilityOutput>, PluginError> {
        let CapabilityCall::EnhancePagination { base } = call else {
            return Ok(None);
        };
        let mut config = base.clone();
        config.show_size_changer = self.show_size_changer;
        config.show_quick_jumper = self.show_quick_jumper;
        config.show_total = self.show_total;
        if !self.page_size_options.is_empty() {
            config.page_size_options = self.page_size_options.clone();
            if !config.page_size_options.contains(&config.page_size) {
                config.page_size_options.push(config.page_size);
                config.page_size_options.sort_unstable();
            }
        }
        Ok(Some(CapabilityOutput::Pagination(config)))
    }

    fn on_event(&self, event: &TableEvent, _cx: &PluginContext) -> Result<(), PluginError> {
        if let TableEvent::PageChange(change) = event {
            debug!("Page changed: {} (size {})", change.current, change.page_size);
            if let Some(callback) = &self.on_change {
                callback(*change);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaginationConfig;

    #[test]
    fn test_enhance_adds_current_size_to_options() {
        let plugin = PaginationPlugin::new(vec![10, 20]).quick_jumper(true);
        let cx = PluginContext::new("t", 15);
        let base = PaginationConfig::minimal(2, 15, 90);

        let Some(CapabilityOutput::Pagination(config)) = plugin
            .invoke(CapabilityCall::EnhancePagination { base: &base }, &cx)
            .unwrap()
        else {
            panic!("expected pagination");
        };
        assert_eq!(config.page_size_options, vec![10, 15, 20]);
        assert!(config.show_quick_jumper);
        assert_eq!(config.current, 2);
    }
}
