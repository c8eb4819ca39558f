//! Mounted schema table.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use super::{
    Action, ActionPlacement, SearchField, TableSchema, ValidationResult, generate_search_fields,
    search_values_to_filters, validate_schema,
};
use crate::config::TableConfig;
use crate::data::{DataLoader, Debouncer, Fetch, RequestParams};
use crate::diagnostics::{SharedSink, default_sink};
use crate::error::RequestError;
use crate::model::{
    ChangeEvent, FilterInput, PaginationChange, PaginationFallback, Record, RowSelection,
};
use crate::plugin::{PluginContext, PluginManager};
use crate::plugins::{
    ColumnWidthPlugin, FilterPlugin, PaginationPlugin, SortingPlugin, WidthStore,
};
use crate::props::TablePropsSource;
use crate::renderer::{PaginationMode, RenderPrimitive, RenderRequest, Rendered, TableRenderer};

/// Collaborators and settings for [`SchemaTable::mount`].
#[derive(Default)]
pub struct MountOptions {
    /// Engine configuration.
    pub config: TableConfig,
    /// Resolves `remote` sources.
    pub fetch: Option<Arc<dyn Fetch>>,
    /// Diagnostic sink; the `log` facade when `None`.
    pub sink: Option<SharedSink>,
    /// Column width store; a private in-memory store when `None`.
    pub width_store: Option<Arc<dyn WidthStore>>,
}

/// A schema mounted onto a plugin manager, context, router, data loader and
/// renderer.
///
/// Interactions (`handle_change`, `search`, `reload`) route state changes
/// first and then load. Overlapping loads are not coordinated; see
/// [`DataLoader`].
pub struct SchemaTable<P> {
    schema: TableSchema,
    renderer: TableRenderer<P>,
    loader: DataLoader,
    sorting: Option<Arc<SortingPlugin>>,
    column_width: Option<Arc<ColumnWidthPlugin>>,
    debouncer: Debouncer,
    keyword: RwLock<Option<String>>,
    selection: RwLock<Option<RowSelection>>,
    search_fields: Vec<SearchField>,
    validation: ValidationResult,
}

impl<P: RenderPrimitive> SchemaTable<P> {
    /// Mount with default options.
    pub fn new(table_id: impl Into<String>, schema: TableSchema, primitive: P) -> Self {
        Self::mount(table_id, schema, primitive, MountOptions::default())
    }

    /// Mount `schema`, registering the plugins its features ask for.
    pub fn mount(
        table_id: impl Into<String>,
        schema: TableSchema,
        primitive: P,
        options: MountOptions,
    ) -> Self {
        let MountOptions {
            config,
            fetch,
            sink,
            width_store,
        } = options;
        let sink = sink.unwrap_or_else(default_sink);

        let validation = validate_schema(&schema);
        if !validation.valid {
            warn!(
                "Mounting invalid schema: {}",
                validation
                    .errors_only()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            );
        }

        let features = &schema.features;
        let page_size = features
            .pagination()
            .and_then(|p| p.page_size)
            .unwrap_or(config.default_page_size);
        let context = PluginContext::new(table_id, page_size).with_props(schema.style.clone());

        let mut manager = PluginManager::with_sink(Arc::clone(&sink));
        let sorting = features.sorting().then(|| Arc::new(SortingPlugin::new()));
        if let Some(plugin) = &sorting {
            manager.register_arc(plugin.clone());
        }
        if let Some(pagination) = features.pagination() {
            let options = pagination
                .page_size_options
                .clone()
                .unwrap_or_else(|| config.page_size_options.clone());
            manager.register(
                PaginationPlugin::new(options)
                    .size_changer(pagination.show_size_changer)
                    .quick_jumper(pagination.show_quick_jumper)
                    .show_total(pagination.show_total),
            );
        }
        manager.register(FilterPlugin::new());
        let column_width = (features.column_settings == Some(true)).then(|| {
            Arc::new(match width_store {
                Some(store) => ColumnWidthPlugin::new(store),
                None => ColumnWidthPlugin::in_memory(),
            })
        });
        if let Some(plugin) = &column_width {
            manager.register_arc(plugin.clone());
        }

        let delay = features
            .search()
            .and_then(|s| s.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or(config.search_debounce);

        let mut loader = DataLoader::new(schema.source(fetch.as_ref()))
            .with_row_key(schema.row_key.clone())
            .with_sink(Arc::clone(&sink));
        loader.set_error_callback(schema.events.on_error.clone());
        loader.set_load_callback(schema.events.on_load.clone());

        let renderer = TableRenderer::new(primitive, Arc::new(manager), context)
            .with_config(config)
            .with_sink(sink);

        debug!(
            "Mounted table '{}' with plugins {:?}",
            renderer.context().table_id(),
            renderer.plugins().plugin_names()
        );

        Self {
            search_fields: generate_search_fields(&schema.columns),
            selection: RwLock::new(schema.features.row_selection.clone()),
            schema,
            renderer,
            loader,
            sorting,
            column_width,
            debouncer: Debouncer::new(delay),
            keyword: RwLock::new(None),
            validation,
        }
    }

    /// The mounted schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Validation findings from mount time.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Search form fields of the filterable columns.
    pub fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    /// The shared table context.
    pub fn context(&self) -> &PluginContext {
        self.renderer.context()
    }

    /// The data loader.
    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// The renderer.
    pub fn renderer(&self) -> &TableRenderer<P> {
        &self.renderer
    }

    /// Current search keyword.
    pub fn keyword(&self) -> Option<String> {
        self.keyword
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Request parameters for the current state.
    pub fn request_params(&self) -> RequestParams {
        let cx = self.context();
        RequestParams {
            current: cx.current(),
            page_size: if self.schema.features.pagination().is_some() {
                cx.page_size()
            } else {
                0
            },
            filters: cx.filters(),
            sorter: self
                .sorting
                .as_ref()
                .map(|plugin| plugin.active_sorters())
                .unwrap_or_default(),
            keyword: self.keyword(),
            filter_kinds: self
                .schema
                .columns
                .iter()
                .filter(|column| column.filterable)
                .map(|column| {
                    let kind = column.filter_config.as_ref().map(|c| c.kind).unwrap_or_default();
                    (column.field().to_string(), kind)
                })
                .collect(),
        }
    }

    /// Load the current page.
    pub async fn reload(&self) -> Result<(), RequestError> {
        let params = self.request_params();
        self.context().set_loading(true);
        let result = self.loader.load(params).await;
        self.context().set_total(self.loader.total());
        self.context().set_loading(self.loader.is_loading());
        result
    }

    /// Route a change from the rendering primitive, then reload.
    pub async fn handle_change(&self, event: ChangeEvent) -> Result<(), RequestError> {
        self.renderer.router().dispatch(event);
        self.reload().await
    }

    /// Debounced keyword search. Returns `None` when a newer search took
    /// over before the quiet period ended.
    pub async fn search(&self, keyword: impl Into<String>) -> Option<Result<(), RequestError>> {
        let keyword = keyword.into();
        self.debouncer
            .run(|| async move {
                let keyword = Some(keyword.trim().to_string()).filter(|k| !k.is_empty());
                match self.keyword.write() {
                    Ok(mut guard) => *guard = keyword,
                    Err(poisoned) => *poisoned.into_inner() = keyword,
                }
                self.refilter(self.current_filter_input()).await
            })
            .await
    }

    /// Apply search form values keyed by column key, then reload.
    pub async fn submit_search_form(&self, values: &FilterInput) -> Result<(), RequestError> {
        let filters = search_values_to_filters(&self.search_fields, values);
        self.refilter(filters).await
    }

    fn current_filter_input(&self) -> FilterInput {
        self.context()
            .filters()
            .into_iter()
            .map(|(field, values)| (field, Value::Array(values)))
            .collect()
    }

    async fn refilter(&self, filters: FilterInput) -> Result<(), RequestError> {
        let pagination = PaginationChange::new(1, self.context().page_size());
        self.handle_change(ChangeEvent::filter(pagination, filters)).await
    }

    /// Toggle selection of a row. Returns `false` when selection is off.
    pub fn toggle_selection(&self, key: Value) -> bool {
        let mut guard = match self.selection.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_mut() {
            Some(selection) => {
                selection.toggle(key);
                true
            }
            None => false,
        }
    }

    /// Current row selection.
    pub fn selection(&self) -> Option<RowSelection> {
        self.selection
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Resize a column. Returns `false` when column settings are off.
    pub fn resize_column(&self, key: &str, width: u32) -> bool {
        match &self.column_width {
            Some(plugin) => {
                plugin.resize(self.context(), key, width);
                true
            }
            None => false,
        }
    }

    /// Actions for the given placement.
    pub fn actions(&self, placement: ActionPlacement) -> impl Iterator<Item = &Action> {
        self.schema
            .actions
            .iter()
            .filter(move |action| action.placement == placement)
    }

    /// Run the action `key`. Returns `false` if it does not exist or has no
    /// handler.
    pub fn trigger_action(&self, key: &str, record: Option<&Record>) -> bool {
        self.schema
            .actions
            .iter()
            .find(|action| action.key == key)
            .is_some_and(|action| action.trigger(record))
    }

    /// Render request for the current state.
    pub fn render_request(&self) -> RenderRequest {
        let data = Value::Array(self.loader.records().into_iter().map(Value::Object).collect());
        let pagination = match self.schema.features.pagination() {
            Some(_) => PaginationMode::Enabled(PaginationFallback::new(
                self.context().current(),
                self.context().page_size(),
                self.loader.total(),
            )),
            None => PaginationMode::Disabled,
        };

        RenderRequest {
            row_key: self.schema.row_key.clone(),
            loading: self.loader.is_loading(),
            pagination,
            table_props: self.user_props(),
            row_selection: self.selection(),
            ..RenderRequest::new(self.schema.columns.clone(), data)
        }
    }

    /// Render the current state.
    pub fn view(&self) -> Rendered<P::View> {
        self.renderer.render(&self.render_request())
    }

    /// Style props, overlaid with the schema's table props.
    fn user_props(&self) -> TablePropsSource {
        let style = self.schema.style.clone();
        match self.schema.table_props.clone() {
            None => TablePropsSource::Static(style),
            Some(extra) => TablePropsSource::dynamic(move |state| {
                let mut props = style.clone();
                props.extend(extra.resolve(state));
                props
            }),
        }
    }
}

impl<P> std::fmt::Debug for SchemaTable<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaTable")
            .field("schema", &self.schema)
            .field("loader", &self.loader)
            .field("validation", &self.validation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Column, FilterConfig, FilterKind, SelectionMode, Sorter, SorterInfo};
    use crate::renderer::TextPrimitive;
    use crate::schema::{PaginationFeature, TableSchemaBuilder};

    fn rows() -> Vec<Record> {
        (1..=5)
            .map(|i| {
                json!({ "id": i, "name": format!("bot-{i}"), "status": if i % 2 == 0 { "on" } else { "off" } })
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    fn table() -> SchemaTable<TextPrimitive> {
        let schema = TableSchemaBuilder::new()
            .add_column(Column::new("name", "Name").sortable())
            .add_column(Column::new("status", "Status").filter(FilterConfig::default()))
            .enable_pagination(PaginationFeature::with_page_size(2))
            .enable_row_selection(SelectionMode::Single)
            .set_data_source(rows())
            .build();
        SchemaTable::new("bots", schema, TextPrimitive::new())
    }

    #[tokio::test]
    async fn test_reload_pages_static_rows() {
        let table = table();
        table.reload().await.unwrap();

        assert_eq!(table.loader().records().len(), 2);
        assert_eq!(table.context().total(), 5);
        let view = table.view();
        assert!(view.as_table().unwrap().contains("Page 1 of 3"));
    }

    #[tokio::test]
    async fn test_sort_and_filter_flow_into_params() {
        let table = table();
        table
            .handle_change(ChangeEvent::sort(
                PaginationChange::new(1, 2),
                SorterInfo::Single(Sorter::desc("name")),
            ))
            .await
            .unwrap();
        assert_eq!(table.loader().records()[0]["name"], json!("bot-5"));

        let mut values = FilterInput::new();
        values.insert("status".into(), json!("on"));
        table.submit_search_form(&values).await.unwrap();

        let params = table.request_params();
        assert_eq!(params.current, 1);
        assert_eq!(params.filters["status"], vec![json!("on")]);
        assert_eq!(table.context().total(), 2);
    }

    #[tokio::test]
    async fn test_selection_toggles() {
        let table = table();
        assert!(table.toggle_selection(json!(1)));
        assert!(table.toggle_selection(json!(2)));
        assert_eq!(table.selection().unwrap().selected_keys, vec![json!(2)]);
        assert!(!table.resize_column("name", 10));
    }

    #[tokio::test]
    async fn test_number_range_form_filters_static_rows() {
        let scores: Vec<Record> = [10, 20, 30, 40, 50]
            .into_iter()
            .filter_map(|score| json!({ "id": score, "score": score }).as_object().cloned())
            .collect();
        let schema = TableSchemaBuilder::new()
            .add_column(
                Column::new("score", "Score").filter(FilterConfig::new(FilterKind::NumberRange)),
            )
            .set_data_source(scores)
            .build();
        let table = SchemaTable::new("scores", schema, TextPrimitive::new());

        let mut values = FilterInput::new();
        values.insert("score".into(), json!([15, 45]));
        table.submit_search_form(&values).await.unwrap();

        let matched: Vec<_> = table.loader().records().iter().map(|r| r["score"].clone()).collect();
        assert_eq!(matched, vec![json!(20), json!(30), json!(40)]);
    }

    #[tokio::test]
    async fn test_page_past_the_end_loads_empty_page() {
        let table = table();
        table.reload().await.unwrap();

        table
            .handle_change(ChangeEvent::paginate(usize::MAX, 20))
            .await
            .unwrap();

        assert!(table.loader().records().is_empty());
        assert!(table.loader().message().is_none());
        assert_eq!(table.context().total(), 5);
        assert!(!table.view().is_error());
    }
}
