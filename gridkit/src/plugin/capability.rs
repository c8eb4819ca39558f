//! Closed set of plugin capabilities and table events.

use crate::model::{Column, Filters, PaginationChange, PaginationConfig, PropMap, SorterInfo};

/// Capabilities a plugin may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Column width overrides from persisted widths.
    ApplyPersistentWidths,
    /// Column decoration (sort indicators, filter state, renderers).
    ProcessColumns,
    /// Pagination UI overrides.
    EnhancePagination,
    /// Extra table properties merged over user properties.
    TableProps,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Capability; 4] = [
        Capability::ApplyPersistentWidths,
        Capability::ProcessColumns,
        Capability::EnhancePagination,
        Capability::TableProps,
    ];

    /// Stable name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::ApplyPersistentWidths => "APPLY_PERSISTENT_WIDTHS",
            Capability::ProcessColumns => "PROCESS_COLUMNS",
            Capability::EnhancePagination => "ENHANCE_PAGINATION",
            Capability::TableProps => "TABLE_PROPS",
        }
    }
}

/// A capability invocation with its arguments.
#[derive(Debug, Clone, Copy)]
pub enum CapabilityCall<'a> {
    /// Apply persisted widths to `columns`.
    ApplyPersistentWidths {
        /// Columns to decorate.
        columns: &'a [Column],
    },
    /// Post-process `columns`.
    ProcessColumns {
        /// Columns to decorate.
        columns: &'a [Column],
    },
    /// Enhance the base pagination config.
    EnhancePagination {
        /// Config built from context state.
        base: &'a PaginationConfig,
    },
    /// Contribute table properties.
    TableProps,
}

impl CapabilityCall<'_> {
    /// The capability this call targets.
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityCall::ApplyPersistentWidths { .. } => Capability::ApplyPersistentWidths,
            CapabilityCall::ProcessColumns { .. } => Capability::ProcessColumns,
            CapabilityCall::EnhancePagination { .. } => Capability::EnhancePagination,
            CapabilityCall::TableProps => Capability::TableProps,
        }
    }
}

/// Result of a capability call.
#[derive(Debug, Clone)]
pub enum CapabilityOutput {
    /// Replacement column list.
    Columns(Vec<Column>),
    /// Replacement pagination config.
    Pagination(PaginationConfig),
    /// Properties to merge.
    Props(PropMap),
}

/// Kinds of table events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableEventKind {
    /// Sort changed.
    SorterChange,
    /// Page or page size changed.
    PageChange,
    /// Filters changed.
    FilterChange,
}

impl TableEventKind {
    /// Stable name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            TableEventKind::SorterChange => "ON_SORTER_CHANGE",
            TableEventKind::PageChange => "ON_PAGE_CHANGE",
            TableEventKind::FilterChange => "ON_FILTER_CHANGE",
        }
    }
}

/// An event fired to a plugin by the change router.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// Sort changed; the payload is passed through uninterpreted.
    SorterChange(SorterInfo),
    /// Page changed; context already holds the new values.
    PageChange(PaginationChange),
    /// Filters changed; context already holds the normalised filters.
    FilterChange(Filters),
}

impl TableEvent {
    /// The event kind.
    pub fn kind(&self) -> TableEventKind {
        match self {
            TableEvent::SorterChange(_) => TableEventKind::SorterChange,
            TableEvent::PageChange(_) => TableEventKind::PageChange,
            TableEvent::FilterChange(_) => TableEventKind::FilterChange,
        }
    }
}
