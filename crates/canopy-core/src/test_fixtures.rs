//! Shared fixtures for the module test suites.

use crate::{
    engine::Engine,
    record::Record,
    selection::SelectionPolicies,
    state::{EntityMeta, Event, QueryToken},
};

/// Screen metadata used across suites: a hierarchical `department` entity
/// with a nested `employee` list, and an unrelated flat `office` list.
pub(crate) fn department_metas() -> Vec<EntityMeta> {
    vec![
        EntityMeta::new("department", "department")
            .with_default_sort("name.asc")
            .with_policies(SelectionPolicies {
                cascade_select: true,
                cascade_deselect: true,
                ..SelectionPolicies::default()
            }),
        EntityMeta::new("employee", "department/:id/employee"),
        EntityMeta::new("office", "office"),
    ]
}

/// Department tree:
///   1 Engineering ── 2 Platform ── 4 Infra
///              └──── 3 Sales
pub(crate) fn department_records() -> Vec<Record> {
    vec![
        Record::new("1")
            .at_level(1, None)
            .with_field("name", "Engineering"),
        Record::new("2")
            .at_level(2, Some("1".into()))
            .with_field("name", "Platform Engineering"),
        Record::new("3")
            .at_level(2, Some("1".into()))
            .with_field("name", "Sales"),
        Record::new("4")
            .at_level(3, Some("2".into()))
            .with_field("name", "Infra Engineering"),
    ]
}

/// An engine with the department screen selected and no data fetched.
pub(crate) fn department_engine() -> Engine {
    let mut engine = Engine::new();
    let outcome = engine.apply(Event::ScreenSelected {
        screen: "org".to_string(),
        entities: department_metas(),
    });
    assert!(outcome.applied);

    engine
}

/// An engine with the department working set loaded through a full
/// fetch round-trip.
pub(crate) fn loaded_engine() -> Engine {
    let mut engine = department_engine();
    let token = QueryToken::new(1);

    let outcome = engine.apply(Event::FetchRequested {
        entity: "department".to_string(),
        depth: 1,
        token,
    });
    assert!(outcome.applied);

    let outcome = engine.apply(Event::FetchSucceeded {
        entity: "department".to_string(),
        depth: 1,
        token,
        has_next: false,
        query_key: "department?page=1".to_string(),
        records: department_records(),
    });
    assert!(outcome.applied);

    engine
}
