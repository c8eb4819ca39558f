//! Table renderer.
//!
//! Each render pass runs `BuildSteps → ProcessColumns → BuildFinalProps →
//! Render`. The first two stages fall back to degraded values on failure.
//! A failure while painting, or anything that escapes preparation, becomes a
//! visible [`ErrorPanel`] instead of a panic.

mod primitive;
mod text;

pub use primitive::*;
pub use text::*;

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::{Value, json};

use crate::config::TableConfig;
use crate::diagnostics::{Diagnostic, SharedSink, default_sink, panic_message, report_quietly};
use crate::model::{ChangeHandler, Column, PaginationFallback, RowSelection};
use crate::plugin::{PluginContext, PluginManager};
use crate::props::{BuildInput, PropsBuilder, TablePropsSource};
use crate::router::ChangeRouter;
use crate::row_key::{KEY_FIELD, RowKey, normalize_keys};

const COMPONENT: &str = "TableRenderer";

/// Stage of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Row keys, pagination and table props.
    BuildSteps,
    /// Plugin column processing.
    ProcessColumns,
    /// Assembly of renderer-owned props.
    BuildFinalProps,
    /// Painting by the rendering primitive.
    Render,
    /// Anything before painting that escaped its stage fallback.
    Initialization,
}

/// Inline error shown in place of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    /// Stage that failed.
    pub stage: RenderStage,
    /// Panel title.
    pub title: String,
    /// Failure message.
    pub message: String,
}

impl fmt::Display for ErrorPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.title.chars().count().max(self.message.chars().count()) + 2;
        let rule = "─".repeat(width);
        writeln!(f, "┌{rule}┐")?;
        writeln!(f, "│ {:<w$} │", self.title, w = width - 2)?;
        writeln!(f, "│ {:<w$} │", self.message, w = width - 2)?;
        write!(f, "└{rule}┘")
    }
}

/// Outcome of a render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<V> {
    /// The primitive's view.
    Table(V),
    /// A contained failure.
    Error(ErrorPanel),
}

impl<V> Rendered<V> {
    /// Returns `true` for an error panel.
    pub fn is_error(&self) -> bool {
        matches!(self, Rendered::Error(_))
    }

    /// The view, if rendering succeeded.
    pub fn as_table(&self) -> Option<&V> {
        match self {
            Rendered::Table(view) => Some(view),
            Rendered::Error(_) => None,
        }
    }

    /// The error panel, if rendering failed.
    pub fn as_error(&self) -> Option<&ErrorPanel> {
        match self {
            Rendered::Error(panel) => Some(panel),
            Rendered::Table(_) => None,
        }
    }
}

/// Pagination setting of one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// No pager.
    Disabled,
    /// Pager built from context, falling back to these values.
    Enabled(PaginationFallback),
}

/// Everything one render pass needs from the host.
#[derive(Clone)]
pub struct RenderRequest {
    /// Base columns.
    pub columns: Vec<Column>,
    /// Raw data; anything but an array renders as empty.
    pub data: Value,
    /// How to derive row keys.
    pub row_key: Option<RowKey>,
    /// Whether data is loading.
    pub loading: bool,
    /// Whether the host shows its own loader.
    pub use_custom_loader: bool,
    /// Pagination setting.
    pub pagination: PaginationMode,
    /// User props.
    pub table_props: TablePropsSource,
    /// Row selection, if enabled.
    pub row_selection: Option<RowSelection>,
    /// Host callback run after the router has handled a change.
    pub on_change: Option<ChangeHandler>,
    /// Empty-table text; the config's text when `None`.
    pub no_data: Option<String>,
}

impl RenderRequest {
    /// Request for `columns` over `data` with everything else off.
    pub fn new(columns: Vec<Column>, data: Value) -> Self {
        Self {
            columns,
            data,
            row_key: None,
            loading: false,
            use_custom_loader: false,
            pagination: PaginationMode::Disabled,
            table_props: TablePropsSource::default(),
            row_selection: None,
            on_change: None,
            no_data: None,
        }
    }

    /// Set the row key.
    pub fn row_key(mut self, row_key: impl Into<RowKey>) -> Self {
        self.row_key = Some(row_key.into());
        self
    }

    /// Enable pagination with fallback values.
    pub fn paginate(mut self, fallback: PaginationFallback) -> Self {
        self.pagination = PaginationMode::Enabled(fallback);
        self
    }

    /// Set the loading flag.
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Set the user props.
    pub fn table_props(mut self, props: impl Into<TablePropsSource>) -> Self {
        self.table_props = props.into();
        self
    }
}

/// Orchestrates one table's render passes.
pub struct TableRenderer<P> {
    primitive: P,
    plugins: Arc<PluginManager>,
    context: PluginContext,
    router: Arc<ChangeRouter>,
    config: TableConfig,
    sink: SharedSink,
}

impl<P: RenderPrimitive> TableRenderer<P> {
    /// Renderer over `primitive` with the given plugins and context.
    pub fn new(primitive: P, plugins: Arc<PluginManager>, context: PluginContext) -> Self {
        let router = Arc::new(ChangeRouter::new(Arc::clone(&plugins), context.clone()));
        Self {
            primitive,
            plugins,
            context,
            router,
            config: TableConfig::default(),
            sink: default_sink(),
        }
    }

    /// Use `config` instead of the defaults.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Report fallbacks to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// The change router wired into every render.
    pub fn router(&self) -> &Arc<ChangeRouter> {
        &self.router
    }

    /// The shared context.
    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// The plugin manager.
    pub fn plugins(&self) -> &Arc<PluginManager> {
        &self.plugins
    }

    /// The rendering primitive.
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Run one render pass. Never panics.
    pub fn render(&self, request: &RenderRequest) -> Rendered<P::View> {
        let props = match catch_unwind(AssertUnwindSafe(|| self.prepare(request))) {
            Ok(props) => props,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                report_quietly(
                    self.sink.as_ref(),
                    Diagnostic::error(
                        COMPONENT,
                        "initialization",
                        format!("table preparation failed: {message}"),
                    ),
                );
                return Rendered::Error(ErrorPanel {
                    stage: RenderStage::Initialization,
                    title: self.config.init_error_title.clone(),
                    message,
                });
            }
        };

        let painted = catch_unwind(AssertUnwindSafe(|| self.primitive.render(&props)));
        let message = match painted {
            Ok(Ok(view)) => return Rendered::Table(view),
            Ok(Err(err)) => err.message,
            Err(panic) => panic_message(panic.as_ref()),
        };
        report_quietly(
            self.sink.as_ref(),
            Diagnostic::error(COMPONENT, "render", format!("render failed: {message}"))
                .with_data(json!({ "table": self.context.table_id() })),
        );
        Rendered::Error(ErrorPanel {
            stage: RenderStage::Render,
            title: self.config.render_error_title.clone(),
            message,
        })
    }

    fn prepare(&self, request: &RenderRequest) -> FinalTableProps {
        let builder = PropsBuilder::new(&self.plugins, &self.context, &self.config, self.sink.as_ref());

        // BuildSteps
        let data = normalize_keys(&request.data, request.row_key.as_ref());
        let pagination = match request.pagination {
            PaginationMode::Disabled => None,
            PaginationMode::Enabled(fallback) => Some(builder.build_pagination(fallback)),
        };
        let extra = builder.build(BuildInput {
            user_props: &request.table_props,
            is_loading: request.loading,
            use_custom_loader: request.use_custom_loader,
        });

        // ProcessColumns
        let columns = builder.process_columns(&request.columns);

        // BuildFinalProps
        FinalTableProps {
            columns,
            data,
            row_key: KEY_FIELD.to_string(),
            loading: request.loading && !request.use_custom_loader,
            pagination,
            no_data_element: request
                .no_data
                .clone()
                .unwrap_or_else(|| self.config.empty_text.clone()),
            on_change: Some(self.change_handler(request.on_change.clone())),
            row_selection: request.row_selection.clone(),
            extra,
        }
    }

    fn change_handler(&self, host: Option<ChangeHandler>) -> ChangeHandler {
        let router = Arc::clone(&self.router);
        Arc::new(move |event| {
            router.dispatch(event.clone());
            if let Some(host) = &host {
                host(event);
            }
        })
    }
}

impl<P> fmt::Debug for TableRenderer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRenderer")
            .field("plugins", &self.plugins)
            .field("context", &self.context)
            .finish()
    }
}
