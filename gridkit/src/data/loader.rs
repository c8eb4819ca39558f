//! Data loading for schema tables.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};

use futures::FutureExt;
use log::{debug, warn};
use serde_json::json;

use super::{DataSource, RequestParams};
use crate::diagnostics::{Diagnostic, SharedSink, default_sink, panic_message, report_quietly};
use crate::error::RequestError;
use crate::model::Record;
use crate::row_key::{RowKey, normalize_records};

const COMPONENT: &str = "DataLoader";

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Soft failure.
    Warning,
    /// Hard failure.
    Error,
}

/// Message the host should show to the user (toast, banner, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    /// Severity.
    pub level: MessageLevel,
    /// Text.
    pub text: String,
}

/// Loader state visible to the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderState {
    /// Rows of the last successful load, keyed.
    pub records: Vec<Record>,
    /// Total of the last successful load.
    pub total: usize,
    /// Whether a load is in flight.
    pub loading: bool,
    /// Latest user-visible message.
    pub message: Option<UserMessage>,
    /// Number of successful loads.
    pub loads: u64,
}

/// Callback run on every hard load failure.
pub type ErrorCallback = Arc<dyn Fn(&RequestError) + Send + Sync>;
/// Callback run after every successful load with the rows and total.
pub type LoadCallback = Arc<dyn Fn(&[Record], usize) + Send + Sync>;

/// Loads pages from a [`DataSource`] into shared state.
///
/// Overlapping loads are not coordinated: whichever response resolves last
/// overwrites the state, even if it belongs to an older request. In-flight
/// loads are never cancelled.
#[derive(Clone)]
pub struct DataLoader {
    source: Option<Arc<DataSource>>,
    row_key: Option<RowKey>,
    state: Arc<RwLock<LoaderState>>,
    on_error: Option<ErrorCallback>,
    on_load: Option<LoadCallback>,
    sink: SharedSink,
}

impl DataLoader {
    /// Loader over `source`; `None` means nothing is configured.
    pub fn new(source: Option<DataSource>) -> Self {
        Self {
            source: source.map(Arc::new),
            row_key: None,
            state: Arc::new(RwLock::new(LoaderState::default())),
            on_error: None,
            on_load: None,
            sink: default_sink(),
        }
    }

    /// Normalise loaded rows with `row_key`.
    pub fn with_row_key(mut self, row_key: Option<RowKey>) -> Self {
        self.row_key = row_key;
        self
    }

    /// Call `f` on every hard failure.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Call `f` after every successful load with the rows and total.
    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Record], usize) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(f));
        self
    }

    /// Report failures to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) fn set_error_callback(&mut self, callback: Option<ErrorCallback>) {
        self.on_error = callback;
    }

    pub(crate) fn set_load_callback(&mut self, callback: Option<LoadCallback>) {
        self.on_load = callback;
    }

    /// Whether a source is configured.
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Snapshot of the loader state.
    pub fn state(&self) -> LoaderState {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Rows of the last successful load.
    pub fn records(&self) -> Vec<Record> {
        self.state().records
    }

    /// Total of the last successful load.
    pub fn total(&self) -> usize {
        self.state().total
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Latest user-visible message.
    pub fn message(&self) -> Option<UserMessage> {
        self.state().message
    }

    fn update(&self, f: impl FnOnce(&mut LoaderState)) {
        match self.state.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Load one page.
    ///
    /// A response with `success: Some(false)` keeps the previous rows and
    /// returns `Ok`. An error (or a panicking source) keeps the previous
    /// rows, runs the error callback, records a message, and is returned.
    pub async fn load(&self, params: RequestParams) -> Result<(), RequestError> {
        let Some(source) = self.source.clone() else {
            return Err(RequestError::NoSource);
        };

        debug!(
            "Loading page {} (size {}, {} filters)",
            params.current,
            params.page_size,
            params.filters.len()
        );
        self.update(|s| s.loading = true);

        let outcome = match AssertUnwindSafe(source.fetch(&params)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(RequestError::failed(format!(
                "request panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        match outcome {
            Ok(response) if response.success == Some(false) => {
                let text = response
                    .message
                    .unwrap_or_else(|| "Failed to load data".to_string());
                warn!("Soft load failure: {}", text);
                self.update(|s| {
                    s.loading = false;
                    s.message = Some(UserMessage {
                        level: MessageLevel::Warning,
                        text,
                    });
                });
                Ok(())
            }
            Ok(response) => {
                let total = response.total.unwrap_or(response.data.len());
                let records = normalize_records(response.data, self.row_key.as_ref());
                if let Some(callback) = &self.on_load {
                    callback(&records, total);
                }
                self.update(|s| {
                    s.records = records;
                    s.total = total;
                    s.loading = false;
                    s.message = None;
                    s.loads += 1;
                });
                Ok(())
            }
            Err(err) => {
                report_quietly(
                    self.sink.as_ref(),
                    Diagnostic::error(COMPONENT, "load", err.to_string())
                        .with_data(json!({ "current": params.current })),
                );
                self.update(|s| {
                    s.loading = false;
                    s.message = Some(UserMessage {
                        level: MessageLevel::Error,
                        text: err.to_string(),
                    });
                });
                if let Some(callback) = &self.on_error {
                    callback(&err);
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for DataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("source", &self.source)
            .field("row_key", &self.row_key)
            .field("state", &self.state())
            .finish()
    }
}
