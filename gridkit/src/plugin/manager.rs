//! Per-table plugin registry and dispatcher.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, warn};
use serde_json::json;

use super::{
    CapabilityCall, CapabilityOutput, PluginContext, TableEvent, TablePlugin, names,
};
use crate::diagnostics::{Diagnostic, SharedSink, default_sink, panic_message, report_quietly};
use crate::model::{Column, PaginationConfig, PropMap};

const COMPONENT: &str = "PluginManager";

/// Registry of the plugins attached to one table.
///
/// Every dispatch is infallible from the caller's point of view: a missing
/// plugin, a capability the plugin does not provide, a handler returning an
/// error, and a handler that panics all come back as `None`.
pub struct PluginManager {
    plugins: Vec<Arc<dyn TablePlugin>>,
    sink: SharedSink,
}

impl PluginManager {
    /// Create an empty manager reporting to the `log` facade.
    pub fn new() -> Self {
        Self::with_sink(default_sink())
    }

    /// Create an empty manager reporting to `sink`.
    pub fn with_sink(sink: SharedSink) -> Self {
        Self {
            plugins: Vec::new(),
            sink,
        }
    }

    /// Register a plugin. A plugin with the same name is replaced.
    pub fn register<P: TablePlugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.register_arc(Arc::new(plugin))
    }

    /// Register a shared plugin. A plugin with the same name is replaced.
    pub fn register_arc(&mut self, plugin: Arc<dyn TablePlugin>) -> &mut Self {
        let name = plugin.name().to_string();
        if let Some(slot) = self.plugins.iter_mut().find(|p| p.name() == name) {
            warn!("Plugin '{}' registered twice; replacing previous instance", name);
            *slot = plugin;
        } else {
            debug!("Plugin '{}' registered", name);
            self.plugins.push(plugin);
        }
        self
    }

    /// Look up a plugin by name.
    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn TablePlugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Names of registered plugins, in registration order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// The sink failures are reported to.
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Invoke a capability on the named plugin.
    pub fn use_capability(
        &self,
        plugin_name: &str,
        call: CapabilityCall<'_>,
        cx: &PluginContext,
    ) -> Option<CapabilityOutput> {
        let plugin = self.get_plugin(plugin_name)?;
        let capability = call.capability();

        match catch_unwind(AssertUnwindSafe(|| plugin.invoke(call, cx))) {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                self.report(plugin_name, capability.as_str(), format!("capability failed: {err}"));
                None
            }
            Err(panic) => {
                self.report(
                    plugin_name,
                    capability.as_str(),
                    format!("capability panicked: {}", panic_message(panic.as_ref())),
                );
                None
            }
        }
    }

    /// Fire a table event at the named plugin.
    ///
    /// Returns `true` if the plugin exists and handled the event without
    /// failing.
    pub fn fire(&self, plugin_name: &str, event: &TableEvent, cx: &PluginContext) -> bool {
        let Some(plugin) = self.get_plugin(plugin_name) else {
            return false;
        };
        let kind = event.kind();

        match catch_unwind(AssertUnwindSafe(|| plugin.on_event(event, cx))) {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                self.report(plugin_name, kind.as_str(), format!("event handler failed: {err}"));
                false
            }
            Err(panic) => {
                self.report(
                    plugin_name,
                    kind.as_str(),
                    format!("event handler panicked: {}", panic_message(panic.as_ref())),
                );
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Typed helpers
    // -------------------------------------------------------------------------

    /// Persisted width overrides from the column width plugin.
    pub fn apply_persistent_widths(
        &self,
        columns: &[Column],
        cx: &PluginContext,
    ) -> Option<Vec<Column>> {
        match self.use_capability(
            names::COLUMN_WIDTH,
            CapabilityCall::ApplyPersistentWidths { columns },
            cx,
        )? {
            CapabilityOutput::Columns(columns) => Some(columns),
            other => self.mismatch(names::COLUMN_WIDTH, &other),
        }
    }

    /// Column post-processing by the named plugin.
    pub fn process_columns(
        &self,
        plugin_name: &str,
        columns: &[Column],
        cx: &PluginContext,
    ) -> Option<Vec<Column>> {
        match self.use_capability(plugin_name, CapabilityCall::ProcessColumns { columns }, cx)? {
            CapabilityOutput::Columns(columns) => Some(columns),
            other => self.mismatch(plugin_name, &other),
        }
    }

    /// Pagination overrides from the pagination plugin.
    pub fn enhance_pagination(
        &self,
        base: &PaginationConfig,
        cx: &PluginContext,
    ) -> Option<PaginationConfig> {
        match self.use_capability(
            names::PAGINATION,
            CapabilityCall::EnhancePagination { base },
            cx,
        )? {
            CapabilityOutput::Pagination(config) => Some(config),
            other => self.mismatch(names::PAGINATION, &other),
        }
    }

    /// Table properties contributed by the named plugin.
    pub fn plugin_table_props(&self, plugin_name: &str, cx: &PluginContext) -> Option<PropMap> {
        match self.use_capability(plugin_name, CapabilityCall::TableProps, cx)? {
            CapabilityOutput::Props(props) => Some(props),
            other => self.mismatch(plugin_name, &other),
        }
    }

    fn mismatch<T>(&self, plugin_name: &str, output: &CapabilityOutput) -> Option<T> {
        let variant = match output {
            CapabilityOutput::Columns(_) => "Columns",
            CapabilityOutput::Pagination(_) => "Pagination",
            CapabilityOutput::Props(_) => "Props",
        };
        self.report(plugin_name, "output", format!("unexpected output variant {variant}"));
        None
    }

    fn report(&self, plugin_name: &str, source: &'static str, message: String) {
        report_quietly(
            self.sink.as_ref(),
            Diagnostic::warn(COMPONENT, source, message).with_data(json!({ "plugin": plugin_name })),
        );
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.plugin_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::error::PluginError;

    struct Failing;

    impl TablePlugin for Failing {
        fn name(&self) -> &str {
            names::PAGINATION
        }

        fn invoke(
            &self,
            _call: CapabilityCall<'_>,
            _cx: &PluginContext,
        ) -> Result<Option<CapabilityOutput>, PluginError> {
            Err(PluginError::new("no pagination today"))
        }
    }

    struct Panicking;

    impl TablePlugin for Panicking {
        fn name(&self) -> &str {
            names::SORTING
        }

        fn on_event(&self, _event: &TableEvent, _cx: &PluginContext) -> Result<(), PluginError> {
            panic!("sorter exploded");
        }
    }

    #[test]
    fn test_handler_error_is_absorbed_and_reported() {
        let sink = MemorySink::new();
        let mut plugins = PluginManager::with_sink(Arc::new(sink.clone()));
        plugins.register(Failing);
        let cx = PluginContext::new("t", 10);

        let base = PaginationConfig::minimal(1, 10, 0);
        assert!(plugins.enhance_pagination(&base, &cx).is_none());
        assert!(sink.contains("no pagination today"));
    }

    #[test]
    fn test_event_panic_is_absorbed() {
        let sink = MemorySink::new();
        let mut plugins = PluginManager::with_sink(Arc::new(sink.clone()));
        plugins.register(Panicking);
        let cx = PluginContext::new("t", 10);

        let delivered = plugins.fire(
            names::SORTING,
            &TableEvent::SorterChange(Default::default()),
            &cx,
        );
        assert!(!delivered);
        assert!(sink.contains("sorter exploded"));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut plugins = PluginManager::new();
        plugins.register(Failing).register(Failing);
        assert_eq!(plugins.len(), 1);
    }
}
