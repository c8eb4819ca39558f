//! Plugin contract and per-table plugin manager.
//!
//! A plugin owns one cross-cutting table concern (sorting, pagination,
//! filtering, column widths). Plugins never talk to each other: they read the
//! shared [`PluginContext`], answer [`CapabilityCall`]s with derived values,
//! and react to [`TableEvent`]s fired by the change router.
//!
//! # Example
//!
//! ```
//! use gridkit::plugin::{CapabilityCall, CapabilityOutput, PluginContext, PluginManager, TablePlugin};
//! use gridkit::error::PluginError;
//!
//! struct Uppercase;
//!
//! impl TablePlugin for Uppercase {
//!     fn name(&self) -> &str {
//!         "uppercase"
//!     }
//!
//!     fn invoke(
//!         &self,
//!         call: CapabilityCall<'_>,
//!         _cx: &PluginContext,
//!     ) -> Result<Option<CapabilityOutput>, PluginError> {
//!         let CapabilityCall::ProcessColumns { columns } = call else {
//!             return Ok(None);
//!         };
//!         let columns = columns
//!             .iter()
//!             .cloned()
//!             .map(|mut c| {
//!                 c.title = c.title.to_uppercase();
//!                 c
//!             })
//!             .collect();
//!         Ok(Some(CapabilityOutput::Columns(columns)))
//!     }
//! }
//!
//! let mut plugins = PluginManager::new();
//! plugins.register(Uppercase);
//! assert!(plugins.get_plugin("uppercase").is_some());
//! ```

mod capability;
mod context;
mod manager;

pub use capability::*;
pub use context::*;
pub use manager::*;

use crate::error::PluginError;

/// Names of the built-in plugins the engine dispatches to.
pub mod names {
    /// Sorting plugin.
    pub const SORTING: &str = "sorting";
    /// Pagination plugin.
    pub const PAGINATION: &str = "pagination";
    /// Filter plugin.
    pub const FILTER: &str = "filter";
    /// Column width persistence plugin.
    pub const COLUMN_WIDTH: &str = "column_width";
}

/// A unit of optional table behaviour.
///
/// Both methods default to "not supported"; a plugin implements only the
/// capabilities and events it cares about.
pub trait TablePlugin: Send + Sync {
    /// Unique name within one plugin manager.
    fn name(&self) -> &str;

    /// Answer a capability call. `Ok(None)` means the capability is not
    /// provided by this plugin.
    fn invoke(
        &self,
        _call: CapabilityCall<'_>,
        _cx: &PluginContext,
    ) -> Result<Option<CapabilityOutput>, PluginError> {
        Ok(None)
    }

    /// React to a table event fired by the change router.
    fn on_event(&self, _event: &TableEvent, _cx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }
}
