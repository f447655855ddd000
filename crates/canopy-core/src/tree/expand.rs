use crate::{
    filter::Filter,
    record::{DataSet, RecordId},
    tree::{ancestor_chain, closure::matched_ids},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// ExpansionState
///
/// Which tree nodes are open. The set is derived (seeded) when the filter
/// set transitions between empty and non-empty, and otherwise left under
/// direct user control via explicit toggles.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExpansionState {
    expanded: BTreeSet<RecordId>,
    seeded_with_filters: Option<bool>,
}

impl ExpansionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self, id: &RecordId) -> bool {
        self.expanded.contains(id)
    }

    #[must_use]
    pub const fn ids(&self) -> &BTreeSet<RecordId> {
        &self.expanded
    }

    /// True when the filter set has crossed the empty/non-empty boundary
    /// since the last seed (or was never seeded).
    #[must_use]
    pub fn needs_reseed(&self, filters_active: bool) -> bool {
        self.seeded_with_filters != Some(filters_active)
    }

    /// Replace the open set from a derived seed.
    pub fn reseed(&mut self, filters_active: bool, ids: BTreeSet<RecordId>) {
        self.expanded = ids;
        self.seeded_with_filters = Some(filters_active);
    }

    /// Explicit user expand/collapse of a single node.
    pub fn toggle(&mut self, id: &RecordId, expanded: bool) {
        if expanded {
            self.expanded.insert(id.clone());
        } else {
            self.expanded.remove(id);
        }
    }

    /// Drop all open nodes and forget the seed origin, forcing the next
    /// refresh to reseed.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.seeded_with_filters = None;
    }
}

/// Default open set with no filters active: the ancestors of every
/// already-selected record, plus each selected record that itself has
/// children.
#[must_use]
pub fn seed_from_selection(data: &DataSet, selected: &[RecordId]) -> BTreeSet<RecordId> {
    let mut out = BTreeSet::new();

    for id in selected {
        let Some(record) = data.get(id) else { continue };
        let Ok(chain) = ancestor_chain(data, record) else {
            continue;
        };

        out.extend(chain.iter().map(|ancestor| ancestor.id.clone()));
        if data.has_children(id) {
            out.insert(id.clone());
        }
    }

    out
}

/// Open set while a search is active: every match and its ancestors,
/// restricted to nodes that actually have children to reveal.
#[must_use]
pub fn seed_from_matches(data: &DataSet, filters: &[Filter]) -> BTreeSet<RecordId> {
    let mut out = BTreeSet::new();

    for id in matched_ids(data, filters) {
        let Some(record) = data.get(&id) else { continue };
        let Ok(chain) = ancestor_chain(data, record) else {
            continue;
        };

        out.extend(chain.iter().map(|ancestor| ancestor.id.clone()));
        out.insert(id);
    }

    out.retain(|id| data.has_children(id));
    out
}
