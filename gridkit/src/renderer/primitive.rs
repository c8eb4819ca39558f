//! Rendering primitive seam.

use std::fmt;

use crate::error::RenderError;
use crate::model::{ChangeHandler, Column, PaginationConfig, PropMap, Record, RowSelection};

/// The complete property set handed to a [`RenderPrimitive`].
///
/// Everything except `extra` is owned by the renderer and cannot be
/// overridden by user or plugin props.
#[derive(Clone)]
pub struct FinalTableProps {
    /// Processed columns.
    pub columns: Vec<Column>,
    /// Keyed records of the current page.
    pub data: Vec<Record>,
    /// Field every record carries its key in.
    pub row_key: String,
    /// Whether to show the table's own loading state.
    pub loading: bool,
    /// Pagination config, `None` when pagination is disabled.
    pub pagination: Option<PaginationConfig>,
    /// Content shown when `data` is empty.
    pub no_data_element: String,
    /// Change callback wired to the change router.
    pub on_change: Option<ChangeHandler>,
    /// Row selection, if enabled.
    pub row_selection: Option<RowSelection>,
    /// Merged default, user and plugin props.
    pub extra: PropMap,
}

impl fmt::Debug for FinalTableProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalTableProps")
            .field("columns", &self.columns)
            .field("data", &self.data.len())
            .field("row_key", &self.row_key)
            .field("loading", &self.loading)
            .field("pagination", &self.pagination)
            .field("no_data_element", &self.no_data_element)
            .field("on_change", &self.on_change.is_some())
            .field("row_selection", &self.row_selection)
            .field("extra", &self.extra)
            .finish()
    }
}

/// The widget that actually paints a table.
///
/// The engine never looks inside the produced view. Implementations may
/// return an error or panic; both are contained by the renderer.
pub trait RenderPrimitive {
    /// What a successful render produces.
    type View;

    /// Paint `props`.
    fn render(&self, props: &FinalTableProps) -> Result<Self::View, RenderError>;
}
