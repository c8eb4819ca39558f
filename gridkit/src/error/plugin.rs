//! Plugin error types

/// Error returned by a plugin capability or event handler.
///
/// The plugin manager never propagates this to callers; it is logged and the
/// call site falls back to a neutral value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PluginError {
    /// Error message.
    pub message: String,
}

impl PluginError {
    /// Create a new plugin error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for PluginError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for PluginError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
