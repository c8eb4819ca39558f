//! Data request error types

/// Errors that can occur while loading table data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// No static data, request function, or remote source is configured.
    #[error("No data source configured")]
    NoSource,

    /// The request function rejected.
    #[error("Request failed: {0}")]
    Failed(String),

    /// The remote fetch collaborator failed.
    #[error("Fetch {url} failed: {message}")]
    Fetch {
        /// URL that was fetched.
        url: String,
        /// Error message.
        message: String,
    },

    /// The response could not be turned into `{data, total}`.
    #[error("Response transform failed: {0}")]
    Transform(String),
}

impl RequestError {
    /// Creates a new request failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Creates a new fetch failure for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}
