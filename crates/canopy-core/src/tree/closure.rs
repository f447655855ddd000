use crate::{
    filter::Filter,
    record::{DataSet, RecordId},
    tree::{ancestor_chain, descendants},
};
use std::collections::{BTreeSet, HashSet};

///
/// ResolvedTree
///
/// The minimal node set that must be visible under a filter set: direct
/// matches, their full ancestor chains, and their full descendant
/// subtrees, de-duplicated by identity and kept in working-set order.
/// With no filters active the full record set passes through untouched.
///

#[derive(Clone, Debug, Default)]
pub struct ResolvedTree {
    visible: Vec<RecordId>,
    visible_set: HashSet<RecordId>,
    search_hits: BTreeSet<RecordId>,
    pass_through: bool,
}

impl ResolvedTree {
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.visible_set.contains(id)
    }

    /// Records matched directly by the filter set, tagged for highlighting.
    #[must_use]
    pub fn is_search_hit(&self, id: &RecordId) -> bool {
        self.search_hits.contains(id)
    }

    #[must_use]
    pub const fn search_hits(&self) -> &BTreeSet<RecordId> {
        &self.search_hits
    }

    /// True when no filters were active and no closure ran.
    #[must_use]
    pub const fn is_pass_through(&self) -> bool {
        self.pass_through
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordId> {
        self.visible.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResolvedTree {
    type Item = &'a RecordId;
    type IntoIter = std::slice::Iter<'a, RecordId>;

    fn into_iter(self) -> Self::IntoIter {
        self.visible.iter()
    }
}

/// Ids of the records matching every filter in the set, in working-set
/// order. Matching is AND across distinct filters.
#[must_use]
pub fn matched_ids(data: &DataSet, filters: &[Filter]) -> Vec<RecordId> {
    data.iter()
        .filter(|record| filters.iter().all(|filter| filter.matches(record)))
        .map(|record| record.id.clone())
        .collect()
}

/// Resolve the visible node set for `data` under `filters`.
///
/// Matched records whose ancestor chain cannot be fully resolved are
/// dropped from the closure; a broken link never aborts the computation.
#[must_use]
pub fn resolve(data: &DataSet, filters: &[Filter]) -> ResolvedTree {
    if filters.is_empty() {
        let visible: Vec<RecordId> = data.iter().map(|record| record.id.clone()).collect();
        let visible_set = visible.iter().cloned().collect();

        return ResolvedTree {
            visible,
            visible_set,
            search_hits: BTreeSet::new(),
            pass_through: true,
        };
    }

    let matched = matched_ids(data, filters);
    let mut visible_set: HashSet<RecordId> = HashSet::new();
    let mut search_hits = BTreeSet::new();

    for id in &matched {
        let Some(record) = data.get(id) else { continue };
        let Ok(chain) = ancestor_chain(data, record) else {
            continue;
        };

        search_hits.insert(id.clone());
        visible_set.insert(id.clone());
        visible_set.extend(chain.iter().map(|ancestor| ancestor.id.clone()));
        visible_set.extend(descendants(data, id));
    }

    let visible = data
        .iter()
        .filter(|record| visible_set.contains(&record.id))
        .map(|record| record.id.clone())
        .collect();

    ResolvedTree {
        visible,
        visible_set,
        search_hits,
        pass_through: false,
    }
}
