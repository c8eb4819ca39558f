//! Table rendering engine
//!
//! Turns a declarative description of columns, data source and features into
//! a resilient, stateful table. Independent plugins (sorting, pagination,
//! filtering, column widths) contribute behaviour through a per-table
//! [`plugin::PluginManager`]; the [`renderer::TableRenderer`] contains every
//! failure so that one broken plugin or column never takes the page down.

pub mod data;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod plugin;
pub mod plugins;
pub mod props;
pub mod renderer;
pub mod router;
pub mod row_key;
pub mod schema;

mod config;

pub use config::*;
pub use error::GridError;
pub use renderer::{Rendered, TableRenderer};
pub use schema::{SchemaTable, TableSchema, TableSchemaBuilder};
