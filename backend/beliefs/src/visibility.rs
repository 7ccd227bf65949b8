use std::collections::BTreeMap;

use crate::matcher::is_visible;
use crate::types::{BeliefSet, PaneFilters};

/// Pane id -> visible.
pub type VisibilityMap = BTreeMap<String, bool>;

/// Decide visibility for every pane against one belief set.
pub fn apply_beliefs(filters: &BTreeMap<String, PaneFilters>, beliefs: &BeliefSet) -> VisibilityMap {
    filters
        .iter()
        .map(|(pane, f)| (pane.clone(), is_visible(f.held.as_ref(), f.withheld.as_ref(), beliefs)))
        .collect()
}
