//! Built-in plugins for the four cross-cutting table concerns.

mod column_width;
mod filter;
mod pagination;
mod sorting;

pub use column_width::*;
pub use filter::*;
pub use pagination::*;
pub use sorting::*;
