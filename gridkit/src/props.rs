//! Table property building.
//!
//! Rendering properties come from three layers, merged key by key with later
//! layers winning:
//!
//! 1. framework defaults ([`default_props`]),
//! 2. the user's props ([`TablePropsSource`], resolved once),
//! 3. props contributed by the column width plugin.
//!
//! `scroll` is the exception: its axes are merged across all three layers so
//! fixed columns and persisted widths can each add a constraint.
//!
//! Every stage falls back instead of failing: pagination to the caller's bare
//! values, columns to the unprocessed list, and the whole prop set to an empty
//! map.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::TableConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, panic_message};
use crate::model::{Column, PaginationConfig, PaginationFallback, PropMap};
use crate::plugin::{PluginContext, PluginManager, names};

const COMPONENT: &str = "PropsBuilder";

/// Loading state handed to dynamic user props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingState {
    /// Whether data is loading.
    pub loading: bool,
}

type DynamicProps = dyn Fn(LoadingState) -> PropMap + Send + Sync;

/// User-supplied table props: a literal map or a function of the loading
/// state.
#[derive(Clone)]
pub enum TablePropsSource {
    /// Literal props.
    Static(PropMap),
    /// Props computed from the loading state.
    Dynamic(Arc<DynamicProps>),
}

impl TablePropsSource {
    /// Props computed by `f`.
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(LoadingState) -> PropMap + Send + Sync + 'static,
    {
        TablePropsSource::Dynamic(Arc::new(f))
    }

    /// Resolve into a plain map. Dynamic sources are invoked exactly once.
    pub fn resolve(&self, state: LoadingState) -> PropMap {
        match self {
            TablePropsSource::Static(props) => props.clone(),
            TablePropsSource::Dynamic(f) => f(state),
        }
    }
}

impl Default for TablePropsSource {
    fn default() -> Self {
        TablePropsSource::Static(PropMap::new())
    }
}

impl From<PropMap> for TablePropsSource {
    fn from(props: PropMap) -> Self {
        TablePropsSource::Static(props)
    }
}

impl fmt::Debug for TablePropsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TablePropsSource::Static(props) => f.debug_tuple("Static").field(props).finish(),
            TablePropsSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Framework defaults, the lowest-priority layer.
pub fn default_props(config: &TableConfig) -> PropMap {
    let mut props = PropMap::new();
    props.insert("size".to_string(), Value::from("middle"));
    props.insert("bordered".to_string(), Value::from(false));
    props.insert("tableLayout".to_string(), Value::from("auto"));
    props.insert("scroll".to_string(), json!({ "x": config.scroll_x }));
    props
}

/// Merge three prop layers; `scroll` axes are merged across layers.
pub fn merge_props(defaults: &PropMap, user: &PropMap, plugin: &PropMap) -> PropMap {
    let mut merged = defaults.clone();
    merged.extend(user.clone());
    merged.extend(plugin.clone());

    let mut scroll = PropMap::new();
    for layer in [defaults, user, plugin] {
        if let Some(Value::Object(axes)) = layer.get("scroll") {
            scroll.extend(axes.clone());
        }
    }
    if !scroll.is_empty() {
        merged.insert("scroll".to_string(), Value::Object(scroll));
    }
    merged
}

/// Inputs of one table-prop build.
pub struct BuildInput<'a> {
    /// User props.
    pub user_props: &'a TablePropsSource,
    /// Whether data is loading.
    pub is_loading: bool,
    /// Whether the host shows its own loader instead of the table's.
    pub use_custom_loader: bool,
}

/// Builds the merged property set for one render pass.
pub struct PropsBuilder<'a> {
    plugins: &'a PluginManager,
    context: &'a PluginContext,
    config: &'a TableConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> PropsBuilder<'a> {
    /// Create a builder over one table's plugins and context.
    pub fn new(
        plugins: &'a PluginManager,
        context: &'a PluginContext,
        config: &'a TableConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            plugins,
            context,
            config,
            sink,
        }
    }

    /// Merge defaults, user props and plugin props. Falls back to an empty
    /// map if any layer panics.
    ///
    /// A panic raised by the sink while reporting a fallback here escapes to
    /// the renderer's outer catch.
    pub fn build(&self, input: BuildInput<'_>) -> PropMap {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let defaults = default_props(self.config);
            let user = input.user_props.resolve(LoadingState {
                loading: input.is_loading,
            });
            let plugin = self
                .plugins
                .plugin_table_props(names::COLUMN_WIDTH, self.context)
                .unwrap_or_default();
            let mut merged = merge_props(&defaults, &user, &plugin);
            if input.use_custom_loader {
                merged.insert("customLoading".to_string(), Value::from(input.is_loading));
            }
            merged
        }));

        result.unwrap_or_else(|panic| {
            self.sink.report(Diagnostic::error(
                COMPONENT,
                "build_table_props",
                format!("table props fell back to empty: {}", panic_message(panic.as_ref())),
            ));
            PropMap::new()
        })
    }

    /// Pagination config from context state, enhanced by the pagination
    /// plugin. Falls back to the bare caller values on panic.
    pub fn build_pagination(&self, fallback: PaginationFallback) -> PaginationConfig {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let total = match self.context.total() {
                0 => fallback.total,
                total => total,
            };
            let mut base =
                PaginationConfig::minimal(self.context.current(), self.context.page_size(), total);
            base.page_size_options = self.config.page_size_options.clone();
            self.plugins
                .enhance_pagination(&base, self.context)
                .unwrap_or(base)
        }));

        result.unwrap_or_else(|panic| {
            self.sink.report(
                Diagnostic::warn(
                    COMPONENT,
                    "build_pagination",
                    format!("pagination fell back to caller values: {}", panic_message(panic.as_ref())),
                )
                .with_data(json!({
                    "current": fallback.current,
                    "pageSize": fallback.page_size,
                    "total": fallback.total,
                })),
            );
            PaginationConfig::minimal(fallback.current, fallback.page_size, fallback.total)
        })
    }

    /// Apply persisted widths, then sorting and filter decoration. Falls back
    /// to `base` unchanged on panic.
    pub fn process_columns(&self, base: &[Column]) -> Vec<Column> {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut columns = self
                .plugins
                .apply_persistent_widths(base, self.context)
                .unwrap_or_else(|| base.to_vec());
            for plugin in [names::SORTING, names::FILTER] {
                if let Some(processed) = self.plugins.process_columns(plugin, &columns, self.context) {
                    columns = processed;
                }
            }
            columns
        }));

        result.unwrap_or_else(|panic| {
            self.sink.report(Diagnostic::warn(
                COMPONENT,
                "process_columns",
                format!("columns fell back to base list: {}", panic_message(panic.as_ref())),
            ));
            base.to_vec()
        })
    }
}
