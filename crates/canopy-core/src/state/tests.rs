use crate::{
    record::RecordId,
    state::{EntityMeta, Event, QueryToken, ScreenState},
};
use serde_json::json;

fn screen_with(metas: Vec<EntityMeta>) -> ScreenState {
    ScreenState::new().select_screen("main", metas)
}

fn department_screen() -> ScreenState {
    screen_with(vec![
        EntityMeta::new("department", "department"),
        EntityMeta::new("employee", "department/:id/employee"),
        EntityMeta::new("office", "office"),
    ])
}

#[test]
fn select_screen_starts_fresh_state_machines() {
    let screen = department_screen();

    let dept = screen.entity("department").unwrap();
    assert_eq!(dept.page, 1);
    assert!(!dept.loading);
    assert!(dept.cursor.is_none());
    assert!(dept.cached_query_key.is_none());
    assert!(screen.meta("employee").is_some());
}

#[test]
fn begin_fetch_sets_loading_at_root_and_depth_independently() {
    let token = QueryToken::new(1);
    let screen = department_screen()
        .begin_fetch("department", 1, token)
        .begin_fetch("department", 3, token.next());

    let dept = screen.entity("department").unwrap();
    assert!(dept.loading);
    assert!(dept.loading_at(3));
    assert!(!dept.loading_at(2));

    // depth completion does not touch the root machine
    let (screen, applied) = screen.fetch_succeeded("department", 3, token.next(), false, "q1");
    assert!(applied);
    let dept = screen.entity("department").unwrap();
    assert!(dept.loading);
    assert!(!dept.loading_at(3));
    assert!(dept.cached_query_key.is_none());
}

#[test]
fn fetch_succeeded_records_has_next_and_query_key_at_root() {
    let token = QueryToken::new(7);
    let screen = department_screen().begin_fetch("department", 1, token);
    let (screen, applied) = screen.fetch_succeeded("department", 1, token, true, "dept?page=1");

    assert!(applied);
    let dept = screen.entity("department").unwrap();
    assert!(!dept.loading);
    assert!(dept.has_next);
    assert_eq!(dept.cached_query_key.as_deref(), Some("dept?page=1"));
}

#[test]
fn stale_completion_is_ignored() {
    let stale = QueryToken::new(1);
    let fresh = QueryToken::new(2);
    let screen = department_screen().begin_fetch("department", 1, stale);
    let (screen, _) = screen.fetch_succeeded("department", 1, stale, false, "q1");

    // a new fetch begins, then the old response arrives again
    let screen = screen.begin_fetch("department", 1, fresh);
    let (screen, applied) = screen.fetch_succeeded("department", 1, stale, true, "q0");

    assert!(!applied);
    let dept = screen.entity("department").unwrap();
    assert!(dept.loading, "stale success must not clear loading");
    assert!(!dept.has_next, "stale success must not record has_next");
    assert_eq!(
        dept.cached_query_key.as_deref(),
        Some("q1"),
        "stale success must not overwrite the cached query key"
    );
}

#[test]
fn stale_failure_is_ignored() {
    let stale = QueryToken::new(1);
    let fresh = QueryToken::new(2);
    let screen = department_screen()
        .begin_fetch("department", 1, fresh)
        .begin_fetch("department", 2, stale);

    let (screen, applied) = screen.fetch_failed("department", 1, stale);
    assert!(!applied);
    assert!(screen.entity("department").unwrap().loading);

    let (screen, applied) = screen.fetch_failed("department", 1, fresh);
    assert!(applied);
    assert!(!screen.entity("department").unwrap().loading);
}

#[test]
fn fetch_failed_clears_loading_only() {
    let token = QueryToken::new(3);
    let screen = department_screen().begin_fetch("department", 1, token);
    let (screen, _) = screen.fetch_succeeded("department", 1, token, true, "q1");

    let retry = token.next();
    let screen = screen.begin_fetch("department", 1, retry);
    let (screen, applied) = screen.fetch_failed("department", 1, retry);

    assert!(applied);
    let dept = screen.entity("department").unwrap();
    assert!(!dept.loading);
    assert!(dept.has_next, "failure must not roll back prior data");
    assert_eq!(dept.cached_query_key.as_deref(), Some("q1"));
}

#[test]
fn set_cursor_invalidates_descendant_paths() {
    let screen = department_screen()
        .set_depth_cursor("employee", 1, Some(RecordId::from("77")))
        .set_cursor("office", Some(RecordId::from("9")))
        .set_cursor("department", Some(RecordId::from("5")));

    assert_eq!(
        screen.entity("department").unwrap().cursor,
        Some(RecordId::from("5"))
    );
    assert_eq!(
        screen.entity("employee").unwrap().cursor,
        None,
        "employee path descends from department and must be reset"
    );
    assert!(screen.entity("employee").unwrap().cached_query_key.is_none());
    assert_eq!(
        screen.entity("office").unwrap().cursor,
        Some(RecordId::from("9")),
        "unrelated entity keeps its cursor"
    );
}

#[test]
fn depth_cursor_routes_to_depth_map() {
    let screen = department_screen()
        .set_depth_cursor("department", 2, Some(RecordId::from("4")))
        .set_depth_cursor("department", 1, Some(RecordId::from("1")));

    let dept = screen.entity("department").unwrap();
    assert_eq!(dept.cursor_at(1), Some(&RecordId::from("1")));
    assert_eq!(dept.cursor_at(2), Some(&RecordId::from("4")));
    assert_eq!(dept.cursor_at(3), None);
}

#[test]
fn page_changes_force_loading() {
    let screen = department_screen().set_page("department", 4);
    let dept = screen.entity("department").unwrap();
    assert_eq!(dept.page, 4);
    assert!(dept.loading);

    let screen = screen.load_more("department");
    assert_eq!(screen.entity("department").unwrap().page, 5);

    let screen = screen.set_page("department", 0);
    assert_eq!(screen.entity("department").unwrap().page, 1, "page floors at 1");
}

#[test]
fn force_invalidate_drops_cache_validity() {
    let token = QueryToken::new(1);
    let screen = department_screen().begin_fetch("department", 1, token);
    let (screen, _) = screen.fetch_succeeded("department", 1, token, false, "q1");

    let screen = screen.force_invalidate("department");
    let dept = screen.entity("department").unwrap();
    assert!(dept.loading);
    assert!(dept.cached_query_key.is_none());
}

#[test]
fn select_view_restarts_pagination() {
    let screen = department_screen()
        .set_page("department", 3)
        .set_page("office", 2)
        .select_view(&["department".to_string(), "ghost".to_string()]);

    assert_eq!(screen.entity("department").unwrap().page, 1);
    assert_eq!(screen.entity("office").unwrap().page, 2);
}

#[test]
fn record_created_settles_cursor_and_cache() {
    let screen = department_screen()
        .set_page("department", 2)
        .record_created("department", &RecordId::from("new-1"), "dept?new");

    let dept = screen.entity("department").unwrap();
    assert!(!dept.loading);
    assert_eq!(dept.cursor, Some(RecordId::from("new-1")));
    assert_eq!(dept.cached_query_key.as_deref(), Some("dept?new"));
}

#[test]
fn commit_round_trip_toggles_loading() {
    let names = vec!["department".to_string(), "employee".to_string()];
    let screen = department_screen().commit_requested(&names);
    assert!(screen.entity("department").unwrap().loading);
    assert!(screen.entity("employee").unwrap().loading);

    let screen = screen.commit_finished(&names);
    assert!(!screen.entity("department").unwrap().loading);
    assert!(!screen.entity("employee").unwrap().loading);
}

#[test]
fn events_deserialize_from_camel_case_wire_form() {
    let event: Event = serde_json::from_value(json!({
        "kind": "fetchSucceeded",
        "entity": "department",
        "depth": 1,
        "token": 4,
        "has_next": true,
        "query_key": "dept?page=1",
        "records": [
            { "id": "1", "fields": { "name": "Engineering" } },
            { "id": "2", "parent_id": "1", "level": 2, "fields": {} },
        ],
    }))
    .unwrap();

    assert_eq!(event.entity(), Some("department"));
    let Event::FetchSucceeded { token, records, .. } = event else {
        panic!("wrong variant");
    };
    assert_eq!(token, QueryToken::new(4));
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].parent_id, Some(RecordId::from("1")));

    let round_trip = serde_json::to_value(Event::LoadMoreRequested {
        entity: "office".to_string(),
    })
    .unwrap();
    assert_eq!(
        round_trip,
        json!({ "kind": "loadMoreRequested", "entity": "office" })
    );
}

#[test]
fn unknown_entity_transitions_are_inert() {
    let screen = department_screen();
    let next = screen.set_page("ghost", 9).force_invalidate("ghost");

    assert!(next.entity("ghost").is_none());
    assert_eq!(
        next.entities().count(),
        screen.entities().count(),
        "unknown names must not create entities"
    );
}
