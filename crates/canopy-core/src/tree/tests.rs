use crate::{
    filter::Filter,
    record::{DataSet, Record, RecordId},
    tree::{
        ExpansionState, ancestor_chain, descendants, level_rows, resolve, seed_from_matches,
        seed_from_selection,
    },
};

fn id(s: &str) -> RecordId {
    RecordId::from(s)
}

/// Department tree used across the suite:
///   1 (Company)
///   ├── 2 (Platform)
///   │   └── 4 (Engineering)
///   └── 3 (Sales)
fn departments() -> DataSet {
    DataSet::new(vec![
        Record::new("1").at_level(1, None).with_field("name", "Company"),
        Record::new("2")
            .at_level(2, Some("1".into()))
            .with_field("name", "Platform"),
        Record::new("3")
            .at_level(2, Some("1".into()))
            .with_field("name", "Sales"),
        Record::new("4")
            .at_level(3, Some("2".into()))
            .with_field("name", "Engineering"),
    ])
}

#[test]
fn empty_filter_set_passes_through() {
    let data = departments();
    let resolved = resolve(&data, &[]);

    assert!(resolved.is_pass_through());
    assert_eq!(resolved.len(), data.len());
    assert!(resolved.search_hits().is_empty());
}

#[test]
fn match_pulls_in_ancestors_and_excludes_siblings() {
    let data = departments();
    let resolved = resolve(&data, &[Filter::contains("name", "Eng")]);

    let visible: Vec<&str> = resolved.iter().map(RecordId::as_str).collect();
    assert_eq!(visible, vec!["1", "2", "4"]);
    assert!(resolved.is_search_hit(&id("4")));
    assert!(!resolved.is_search_hit(&id("1")));
    assert!(!resolved.contains(&id("3")), "sibling of an ancestor is excluded");
}

#[test]
fn match_pulls_in_descendants() {
    let data = departments();
    let resolved = resolve(&data, &[Filter::contains("name", "Platform")]);

    let visible: Vec<&str> = resolved.iter().map(RecordId::as_str).collect();
    assert_eq!(visible, vec!["1", "2", "4"], "ancestor 1, match 2, descendant 4");
}

#[test]
fn multiple_filters_combine_with_and() {
    let data = DataSet::new(vec![
        Record::new("1")
            .at_level(1, None)
            .with_field("name", "Engineering")
            .with_field("region", "EU"),
        Record::new("2")
            .at_level(1, None)
            .with_field("name", "Engineering")
            .with_field("region", "US"),
    ]);

    let filters = [
        Filter::contains("name", "eng"),
        Filter::contains("region", "eu"),
    ];
    let resolved = resolve(&data, &filters);

    assert!(resolved.contains(&id("1")));
    assert!(!resolved.contains(&id("2")));
}

#[test]
fn orphan_match_degrades_to_noop() {
    let data = DataSet::new(vec![
        Record::new("1").at_level(1, None).with_field("name", "root"),
        Record::new("9")
            .at_level(2, Some("missing".into()))
            .with_field("name", "orphan"),
    ]);

    let resolved = resolve(&data, &[Filter::contains("name", "orphan")]);
    assert!(resolved.is_empty(), "orphans are excluded from closures");

    let resolved = resolve(&data, &[Filter::contains("name", "root")]);
    assert!(resolved.contains(&id("1")));
    assert!(!resolved.contains(&id("9")));
}

#[test]
fn ancestor_chain_walks_to_root() {
    let data = departments();
    let record = data.get(&id("4")).unwrap();
    let chain: Vec<&str> = ancestor_chain(&data, record)
        .unwrap()
        .iter()
        .map(|r| r.id.as_str())
        .collect();

    assert_eq!(chain, vec!["2", "1"]);
}

#[test]
fn ancestor_chain_detects_cycles() {
    let data = DataSet::new(vec![
        Record::new("a").at_level(2, Some("b".into())),
        Record::new("b").at_level(2, Some("a".into())),
    ]);

    let record = data.get(&id("a")).unwrap();
    assert!(ancestor_chain(&data, record).is_err());
}

#[test]
fn descendants_expand_breadth_first() {
    let data = departments();
    let ids = descendants(&data, &id("1"));
    let below_root: Vec<&str> = ids.iter().map(RecordId::as_str).collect();

    assert_eq!(below_root, vec!["2", "3", "4"]);
    assert!(descendants(&data, &id("4")).is_empty());
}

#[test]
fn level_rows_slice_one_level_under_a_parent() {
    let data = departments();
    let resolved = resolve(&data, &[]);

    let roots: Vec<&str> = level_rows(&data, &resolved, None, 1)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(roots, vec!["1"]);

    let under_root: Vec<&str> = level_rows(&data, &resolved, Some(&id("1")), 2)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(under_root, vec!["2", "3"]);

    // filtered view hides the sibling
    let resolved = resolve(&data, &[Filter::contains("name", "Eng")]);
    let under_root: Vec<&str> = level_rows(&data, &resolved, Some(&id("1")), 2)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(under_root, vec!["2"]);
}

#[test]
fn seed_from_selection_opens_ancestors_and_parents() {
    let data = departments();
    let seeds = seed_from_selection(&data, &[id("4"), id("3")]);

    let opened: Vec<&str> = seeds.iter().map(RecordId::as_str).collect();
    // ancestors of 4 are 1 and 2; 3 and 4 are leaves and stay closed
    assert_eq!(opened, vec!["1", "2"]);
}

#[test]
fn seed_from_matches_opens_the_match_path() {
    let data = departments();
    let seeds = seed_from_matches(&data, &[Filter::contains("name", "Eng")]);

    let opened: Vec<&str> = seeds.iter().map(RecordId::as_str).collect();
    // 4 matches but has no children; its ancestors open
    assert_eq!(opened, vec!["1", "2"]);
}

#[test]
fn expansion_reseeds_only_on_filter_boundary() {
    let mut expansion = ExpansionState::new();
    assert!(expansion.needs_reseed(false));

    expansion.reseed(false, [id("1")].into());
    assert!(!expansion.needs_reseed(false));
    assert!(expansion.needs_reseed(true));

    expansion.toggle(&id("2"), true);
    assert!(expansion.is_expanded(&id("2")));
    assert!(!expansion.needs_reseed(false), "user toggles do not force a reseed");

    expansion.toggle(&id("2"), false);
    assert!(!expansion.is_expanded(&id("2")));

    expansion.reset();
    assert!(expansion.needs_reseed(false));
    assert!(expansion.ids().is_empty());
}
