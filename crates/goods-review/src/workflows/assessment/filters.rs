//! Line item predicates shared by the suggestion tool and reporting queries.

use super::domain::{Good, LineItem};
use crate::workflows::report_summary::Classification;

/// Controlled on the line, or unknown on the line and controlled on the good.
pub fn is_controlled(item: &LineItem, good: Option<&Good>) -> bool {
    match item.is_good_controlled {
        Some(controlled) => controlled,
        None => good.is_some_and(|good| good.is_good_controlled == Some(true)),
    }
}

/// Controlled, classified only by legacy free text.
pub fn is_unpopulated_controlled(item: &LineItem, good: Option<&Good>) -> bool {
    is_controlled(item, good)
        && matches!(item.classification, Some(Classification::Legacy { .. }))
}

/// Controlled, with a structured subject.
pub fn is_populated_controlled(item: &LineItem, good: Option<&Good>) -> bool {
    is_controlled(item, good)
        && matches!(
            item.classification,
            Some(Classification::Single { .. } | Classification::Multiple { .. })
        )
}
