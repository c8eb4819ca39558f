//! Table configuration

use std::time::Duration;

use serde_json::Value;

/// Per-table engine configuration.
///
/// Passed explicitly to each table; there is no process-wide default.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridkit::TableConfig;
///
/// let config = TableConfig::default()
///     .with_page_size(20)
///     .with_search_debounce(Duration::from_millis(150));
/// assert_eq!(config.default_page_size, 20);
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Page size used before the user picks one.
    ///
    /// Default: 10
    pub default_page_size: usize,

    /// Page sizes offered by the pagination size changer.
    ///
    /// Default: `[10, 20, 50, 100]`
    pub page_size_options: Vec<usize>,

    /// Text shown when the table has no rows.
    ///
    /// Default: `"No data"`
    pub empty_text: String,

    /// Horizontal scroll constraint contributed by the framework defaults.
    ///
    /// Default: `"max-content"`
    pub scroll_x: Value,

    /// Quiet period before a search keyword triggers a reload.
    ///
    /// Default: 300ms
    pub search_debounce: Duration,

    /// Title of the panel shown when painting the table fails.
    pub render_error_title: String,

    /// Title of the panel shown when preparing the table fails.
    pub init_error_title: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 20, 50, 100],
            empty_text: "No data".to_string(),
            scroll_x: Value::from("max-content"),
            search_debounce: Duration::from_millis(300),
            render_error_title: "Table render failed".to_string(),
            init_error_title: "Table initialization failed".to_string(),
        }
    }
}

impl TableConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Sets the page sizes offered by the size changer.
    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    /// Sets the empty-table text.
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// Sets the default horizontal scroll constraint.
    pub fn with_scroll_x(mut self, scroll_x: impl Into<Value>) -> Self {
        self.scroll_x = scroll_x.into();
        self
    }

    /// Sets the search debounce window.
    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }
}
