//! Held/withheld predicate evaluation.
//!
//! A pane is visible when its held filter is satisfied and its withheld
//! filter is not triggered. Both are pure functions of the filter and the
//! current belief set.

use tracing::debug;

use crate::types::{Belief, BeliefFilter, BeliefSet, FilterValue};

/// Whether a held belief satisfies one required value.
///
/// `"*"` accepts any verb; otherwise the verb or the object must equal it.
pub fn matches_belief(belief: &Belief, value: &str) -> bool {
    value == "*" || belief.verb == value || belief.object.as_deref() == Some(value)
}

fn slug_satisfied(slug: &str, required: &FilterValue, beliefs: &BeliefSet) -> bool {
    let Some(belief) = beliefs.get(slug) else {
        return false;
    };
    required.values().into_iter().any(|v| matches_belief(belief, v))
}

/// Every named slug must be satisfied; slugs listed under `MATCH-ACROSS`
/// form one group of which any one suffices. An absent or empty filter is
/// satisfied.
pub fn reveal_satisfied(filter: Option<&BeliefFilter>, beliefs: &BeliefSet) -> bool {
    let Some(filter) = filter.filter(|f| !f.is_empty()) else {
        return true;
    };
    let across = filter.match_across();

    let mut group_seen = false;
    let mut group_met = false;
    for (slug, required) in filter.predicates() {
        let met = slug_satisfied(slug, required, beliefs);
        if across.contains(&slug) {
            group_seen = true;
            group_met |= met;
        } else if !met {
            debug!(slug, "[Beliefs] Held predicate not satisfied");
            return false;
        }
    }
    !group_seen || group_met
}

/// Any satisfied slug suppresses the pane. An absent or empty filter never
/// applies.
pub fn withhold_triggered(filter: Option<&BeliefFilter>, beliefs: &BeliefSet) -> bool {
    let Some(filter) = filter else {
        return false;
    };
    filter
        .predicates()
        .any(|(slug, required)| slug_satisfied(slug, required, beliefs))
}

pub fn is_visible(held: Option<&BeliefFilter>, withheld: Option<&BeliefFilter>, beliefs: &BeliefSet) -> bool {
    reveal_satisfied(held, beliefs) && !withhold_triggered(withheld, beliefs)
}
