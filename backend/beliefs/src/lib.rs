//! Belief-driven pane visibility.
//!
//! Visitors accumulate beliefs (`slug -> verb/object`) by interacting with
//! widgets. Panes carry held and withheld predicate maps over those beliefs;
//! this crate decides which panes are visible and drives the rendered panes
//! as the belief set changes.

pub mod driver;
pub mod matcher;
pub mod store;
pub mod types;
pub mod visibility;

pub use driver::{watch_pane, DriverTiming, PaneSurface, VisibilityDriver, COLLAPSED_STYLE, VISIBLE_STYLE};
pub use matcher::{is_visible, matches_belief, reveal_satisfied, withhold_triggered};
pub use store::BeliefStore;
pub use types::{
    belief_set, decode, Belief, BeliefFilter, BeliefSet, FilterValue, PaneFilters, LINKED_BELIEFS, MATCH_ACROSS,
};
pub use visibility::{apply_beliefs, VisibilityMap};
