//! Diagnostic reporting for engine fallback paths.
//!
//! Every place where the engine swallows a failure and continues with a
//! degraded value reports a [`Diagnostic`] to a [`DiagnosticSink`]. Sinks are
//! fire-and-forget: they never influence control flow, and a missing or
//! broken sink does not change what the table renders.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

/// One report from a fallback path.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity of the report.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload (offending key, plugin name, ...).
    pub data: Option<Value>,
    /// Operation that produced the report (e.g. `"build_pagination"`).
    pub source: &'static str,
    /// Component that produced the report (e.g. `"PropsBuilder"`).
    pub component: &'static str,
}

impl Diagnostic {
    /// Create a new diagnostic at the given level.
    pub fn new(
        level: Level,
        component: &'static str,
        source: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            data: None,
            source,
            component,
        }
    }

    /// Create a warning diagnostic.
    pub fn warn(component: &'static str, source: &'static str, message: impl Into<String>) -> Self {
        Self::new(Level::Warn, component, source, message)
    }

    /// Create an error diagnostic.
    pub fn error(component: &'static str, source: &'static str, message: impl Into<String>) -> Self {
        Self::new(Level::Error, component, source, message)
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Receiver for diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic. Must not panic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic.data {
            Some(data) => log::log!(
                diagnostic.level,
                "[{}::{}] {} {}",
                diagnostic.component,
                diagnostic.source,
                diagnostic.message,
                data
            ),
            None => log::log!(
                diagnostic.level,
                "[{}::{}] {}",
                diagnostic.component,
                diagnostic.source,
                diagnostic.message
            ),
        }
    }
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory so hosts and tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded diagnostics.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Returns `true` if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|d| d.message.contains(needle))
    }

    /// Returns `true` if anything was reported by `component`.
    pub fn has_component(&self, component: &str) -> bool {
        self.entries().iter().any(|d| d.component == component)
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(diagnostic);
        }
    }
}

/// Default sink used when a host does not supply one.
pub fn default_sink() -> SharedSink {
    Arc::new(LogSink)
}

/// Report `diagnostic`, swallowing a panic raised by the sink itself.
///
/// Used on the last line of defence, where nothing above would catch it.
pub fn report_quietly(sink: &dyn DiagnosticSink, diagnostic: Diagnostic) {
    if catch_unwind(AssertUnwindSafe(|| sink.report(diagnostic))).is_err() {
        log::error!("diagnostic sink panicked while reporting");
    }
}

/// Extract a human-readable message from a panic payload.
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
