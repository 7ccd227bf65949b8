/// Beliefs and the predicate maps that gate pane visibility.
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tractstack_core::EngineError;

/// Reserved held-filter key: slugs listed here are OR-ed as one group.
pub const MATCH_ACROSS: &str = "MATCH-ACROSS";
/// Reserved held-filter key: slugs cleared along with the held slugs on "go back".
pub const LINKED_BELIEFS: &str = "LINKED-BELIEFS";

// ---------------------------------------------------------------------------
// Beliefs
// ---------------------------------------------------------------------------

/// A belief the visitor holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Belief {
    pub slug: String,
    pub verb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl Belief {
    pub fn new(slug: impl Into<String>, verb: impl Into<String>) -> Self {
        Self { slug: slug.into(), verb: verb.into(), object: None }
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }
}

/// The live belief set, keyed by slug.
pub type BeliefSet = BTreeMap<String, Belief>;

/// Build a belief set; a later belief for the same slug replaces an earlier one.
pub fn belief_set(beliefs: impl IntoIterator<Item = Belief>) -> BeliefSet {
    beliefs.into_iter().map(|b| (b.slug.clone(), b)).collect()
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Required value(s) for one slug. A list is satisfied by any of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Any(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::One(v) => vec![v.as_str()],
            FilterValue::Any(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// A held or withheld predicate map: belief slug -> required value(s).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeliefFilter(pub BTreeMap<String, FilterValue>);

impl BeliefFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slug: impl Into<String>, value: FilterValue) -> Self {
        self.0.insert(slug.into(), value);
        self
    }

    /// Entries that name beliefs, excluding reserved keys.
    pub fn predicates(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != MATCH_ACROSS && k.as_str() != LINKED_BELIEFS)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// True when the filter names no beliefs.
    pub fn is_empty(&self) -> bool {
        self.predicates().next().is_none()
    }

    fn reserved(&self, key: &str) -> Vec<&str> {
        self.0.get(key).map(FilterValue::values).unwrap_or_default()
    }

    pub fn match_across(&self) -> Vec<&str> {
        self.reserved(MATCH_ACROSS)
    }

    pub fn linked_beliefs(&self) -> Vec<&str> {
        self.reserved(LINKED_BELIEFS)
    }
}

/// Both predicate maps for one pane.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneFilters {
    #[serde(default, rename = "heldBeliefs", skip_serializing_if = "Option::is_none")]
    pub held: Option<BeliefFilter>,
    #[serde(default, rename = "withheldBeliefs", skip_serializing_if = "Option::is_none")]
    pub withheld: Option<BeliefFilter>,
}

impl PaneFilters {
    pub fn new(held: Option<BeliefFilter>, withheld: Option<BeliefFilter>) -> Self {
        Self { held, withheld }
    }
}

/// Decode belief-side JSON input (a belief list, a filter or a pane map).
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, EngineError> {
    serde_json::from_str(raw).map_err(|e| EngineError::InvalidBeliefs(e.to_string()))
}
