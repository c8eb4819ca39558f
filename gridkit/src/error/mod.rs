//! Error types

mod plugin;
mod render;
mod request;

pub use plugin::*;
pub use render::*;
pub use request::*;

/// Top-level error type for the engine.
///
/// Most engine paths degrade to fallbacks instead of returning errors; this
/// type is what surfaces at the few boundaries that do return `Result`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GridError {
    /// A plugin capability or event handler failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The rendering primitive or a cell renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Loading data from the configured source failed.
    #[error(transparent)]
    Request(#[from] RequestError),
}
