//! User-driven table change payloads.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Ascending.
    Ascend,
    /// Descending.
    Descend,
}

impl SortOrder {
    /// Header indicator glyph.
    pub fn indicator(self) -> &'static str {
        match self {
            SortOrder::Ascend => "▲",
            SortOrder::Descend => "▼",
        }
    }

    /// The other direction.
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascend => SortOrder::Descend,
            SortOrder::Descend => SortOrder::Ascend,
        }
    }
}

/// Sort state of one column. `order: None` means the column was unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorter {
    /// Column key.
    pub field: String,
    /// Sort direction, `None` when cleared.
    pub order: Option<SortOrder>,
}

impl Sorter {
    /// Create a sorter for `field`.
    pub fn new(field: impl Into<String>, order: Option<SortOrder>) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Ascending sorter.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Some(SortOrder::Ascend))
    }

    /// Descending sorter.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Some(SortOrder::Descend))
    }
}

/// Sorter payload of a change event: nothing, one column, or several.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SorterInfo {
    /// No sort information.
    #[default]
    None,
    /// Single-column sort.
    Single(Sorter),
    /// Multi-column sort, in priority order.
    Multiple(Vec<Sorter>),
}

impl SorterInfo {
    /// Sorters that carry a direction, in priority order.
    pub fn active(&self) -> Vec<Sorter> {
        match self {
            SorterInfo::None => Vec::new(),
            SorterInfo::Single(s) => s.order.map(|_| s.clone()).into_iter().collect(),
            SorterInfo::Multiple(list) => list.iter().filter(|s| s.order.is_some()).cloned().collect(),
        }
    }

    /// Direction applied to the column `field`, if any.
    pub fn order_of(&self, field: &str) -> Option<SortOrder> {
        self.active()
            .into_iter()
            .find(|s| s.field == field)
            .and_then(|s| s.order)
    }
}

/// Normalised active filters: field → accepted values.
pub type Filters = BTreeMap<String, Vec<Value>>;

/// Raw filter payload as delivered by the rendering primitive.
pub type FilterInput = BTreeMap<String, Value>;

/// Pagination payload of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationChange {
    /// Requested page, 1-based.
    pub current: usize,
    /// Requested page size.
    pub page_size: usize,
}

impl PaginationChange {
    /// Create a pagination payload.
    pub fn new(current: usize, page_size: usize) -> Self {
        Self { current, page_size }
    }
}

/// Which interaction produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Page or page size changed.
    Paginate,
    /// Sort changed.
    Sort,
    /// Column filters changed.
    Filter,
}

/// Discriminator payload of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeExtra {
    /// The interaction that produced the event.
    pub action: ChangeAction,
}

/// A complete change event, as emitted by the rendering primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Pagination payload.
    pub pagination: PaginationChange,
    /// Sorter payload.
    pub sorter: SorterInfo,
    /// Filter payload.
    pub filters: FilterInput,
    /// Discriminator.
    pub extra: ChangeExtra,
}

impl ChangeEvent {
    /// Page change event.
    pub fn paginate(current: usize, page_size: usize) -> Self {
        Self {
            pagination: PaginationChange::new(current, page_size),
            sorter: SorterInfo::None,
            filters: FilterInput::new(),
            extra: ChangeExtra {
                action: ChangeAction::Paginate,
            },
        }
    }

    /// Sort change event.
    pub fn sort(pagination: PaginationChange, sorter: SorterInfo) -> Self {
        Self {
            pagination,
            sorter,
            filters: FilterInput::new(),
            extra: ChangeExtra {
                action: ChangeAction::Sort,
            },
        }
    }

    /// Filter change event.
    pub fn filter(pagination: PaginationChange, filters: FilterInput) -> Self {
        Self {
            pagination,
            sorter: SorterInfo::None,
            filters,
            extra: ChangeExtra {
                action: ChangeAction::Filter,
            },
        }
    }
}

/// Callback receiving change events from the rendering primitive.
pub type ChangeHandler = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_sorters_skip_cleared() {
        let info = SorterInfo::Multiple(vec![
            Sorter::asc("name"),
            Sorter::new("age", None),
            Sorter::desc("created_at"),
        ]);
        let active = info.active();
        assert_eq!(active.len(), 2);
        assert_eq!(info.order_of("created_at"), Some(SortOrder::Descend));
        assert_eq!(info.order_of("age"), None);
    }

    #[test]
    fn test_single_cleared_sorter_is_inactive() {
        let info = SorterInfo::Single(Sorter::new("name", None));
        assert!(info.active().is_empty());
    }
}
