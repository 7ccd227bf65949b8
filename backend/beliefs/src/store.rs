//! The authoritative belief set, with change subscriptions.
//!
//! One `BeliefStore` owns the visitor's beliefs. Readers subscribe with
//! [`BeliefStore::subscribe`] and recompute whatever they derive on change.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};
use tractstack_core::{verbs, EventKind, EventStream};

use crate::types::{Belief, BeliefFilter, BeliefSet};

#[derive(Clone)]
pub struct BeliefStore {
    tx: Arc<watch::Sender<BeliefSet>>,
}

impl Default for BeliefStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BeliefStore {
    pub fn new() -> Self {
        Self::with_beliefs(BeliefSet::new())
    }

    pub fn with_beliefs(beliefs: BeliefSet) -> Self {
        let (tx, _rx) = watch::channel(beliefs);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<BeliefSet> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> BeliefSet {
        self.tx.borrow().clone()
    }

    pub fn get(&self, slug: &str) -> Option<Belief> {
        self.tx.borrow().get(slug).cloned()
    }

    /// Hold a belief, replacing any belief with the same slug.
    pub fn set(&self, belief: Belief) -> EventStream {
        let event = EventStream::belief(belief.slug.clone(), belief.verb.clone(), belief.object.clone());
        debug!(slug = %belief.slug, verb = %belief.verb, "[Beliefs] Set");
        self.tx.send_modify(|set| {
            set.insert(belief.slug.clone(), belief);
        });
        event
    }

    /// Drop a belief. Returns the UNSET event when the slug was held.
    pub fn unset(&self, slug: &str) -> Option<EventStream> {
        let removed = self.tx.send_if_modified(|set| set.remove(slug).is_some());
        removed.then(|| unset_event(slug))
    }

    /// Apply a belief event from the event stream. Non-belief events are
    /// ignored. Returns whether the set changed.
    pub fn apply_event(&self, event: &EventStream) -> bool {
        if event.kind != EventKind::Belief {
            return false;
        }
        if event.is_unset() {
            return self.unset(&event.id).is_some();
        }
        let belief = Belief {
            slug: event.id.clone(),
            verb: event.verb.clone(),
            object: event.object.clone(),
        };
        self.tx.send_if_modified(|set| {
            if set.get(&belief.slug) == Some(&belief) {
                return false;
            }
            set.insert(belief.slug.clone(), belief);
            true
        })
    }

    /// Clear every slug a held filter names, plus its linked beliefs.
    ///
    /// Returns one UNSET event per cleared slug, in filter order with linked
    /// beliefs last.
    pub fn go_back(&self, held: &BeliefFilter) -> Vec<EventStream> {
        let mut slugs: Vec<&str> = held.predicates().map(|(slug, _)| slug).collect();
        for linked in held.linked_beliefs() {
            if !slugs.contains(&linked) {
                slugs.push(linked);
            }
        }
        if slugs.is_empty() {
            return Vec::new();
        }

        self.tx.send_if_modified(|set| {
            let before = set.len();
            set.retain(|slug, _| !slugs.contains(&slug.as_str()));
            set.len() != before
        });
        info!(count = slugs.len(), "[Beliefs] Go back cleared beliefs");
        slugs.into_iter().map(unset_event).collect()
    }
}

fn unset_event(slug: &str) -> EventStream {
    EventStream::belief(slug, verbs::UNSET, Some("true".to_string()))
}
