use crate::{
    filter::Filter,
    record::{DataSet, Record},
    tree::{descendants, matched_ids, resolve},
};
use proptest::prelude::*;

/// Well-formed forest: each record may pick any earlier record as its
/// parent, so every parent link resolves and levels are consistent.
fn arb_forest() -> impl Strategy<Value = DataSet> {
    prop::collection::vec(("[a-d]{1,4}", any::<bool>()), 1..24).prop_map(|specs| {
        let mut records: Vec<Record> = Vec::with_capacity(specs.len());

        for (idx, (name, attach)) in specs.into_iter().enumerate() {
            let record = if attach && idx > 0 {
                let parent = &records[idx / 2];
                let level = parent.level_or_root() + 1;
                Record::new(idx.to_string()).at_level(level, Some(parent.id.clone()))
            } else {
                Record::new(idx.to_string()).at_level(1, None)
            };

            records.push(record.with_field("name", name));
        }

        DataSet::new(records)
    })
}

fn arb_filters() -> impl Strategy<Value = Vec<Filter>> {
    prop::collection::vec("[a-d]{1,2}", 1..3).prop_map(|needles| {
        needles
            .into_iter()
            .map(|needle| Filter::contains("name", needle))
            .collect()
    })
}

proptest! {
    #[test]
    fn empty_filter_set_is_identity(data in arb_forest()) {
        let resolved = resolve(&data, &[]);

        prop_assert!(resolved.is_pass_through());
        prop_assert_eq!(resolved.len(), data.len());
        for record in &data {
            prop_assert!(resolved.contains(&record.id));
        }
    }

    #[test]
    fn closure_contains_every_match(data in arb_forest(), filters in arb_filters()) {
        let resolved = resolve(&data, &filters);

        for id in matched_ids(&data, &filters) {
            prop_assert!(resolved.contains(&id));
            prop_assert!(resolved.is_search_hit(&id));
        }
    }

    #[test]
    fn closure_is_ancestor_closed(data in arb_forest(), filters in arb_filters()) {
        let resolved = resolve(&data, &filters);

        for id in &resolved {
            let record = data.get(id).unwrap();
            if let Some(parent) = &record.parent_id {
                prop_assert!(
                    resolved.contains(parent),
                    "visible record {} has hidden parent {}",
                    record.id,
                    parent
                );
            }
        }
    }

    #[test]
    fn closure_is_descendant_closed(data in arb_forest(), filters in arb_filters()) {
        let resolved = resolve(&data, &filters);

        for hit in resolved.search_hits() {
            for id in descendants(&data, hit) {
                prop_assert!(
                    resolved.contains(&id),
                    "descendant {} of match {} is hidden",
                    id,
                    hit
                );
            }
        }
    }

    #[test]
    fn resolve_is_idempotent_over_visible_subset(data in arb_forest(), filters in arb_filters()) {
        let resolved = resolve(&data, &filters);
        let subset: DataSet = data
            .iter()
            .filter(|record| resolved.contains(&record.id))
            .cloned()
            .collect();
        let again = resolve(&subset, &filters);

        // every original hit is still a hit in its own closure
        for hit in resolved.search_hits() {
            prop_assert!(again.contains(hit));
        }
    }
}
