//! Data sources, loading, and input debouncing.

mod debounce;
mod loader;
mod source;

pub use debounce::*;
pub use loader::*;
pub use source::*;
