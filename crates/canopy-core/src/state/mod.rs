mod event;

#[cfg(test)]
mod tests;

pub use event::*;

use crate::{record::RecordId, selection::SelectionPolicies};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// QueryToken
///
/// Monotonic token stamped when a fetch begins. A completion event carrying
/// any other token for the same `(entity, depth)` is ignored, which is what
/// makes a late, stale response inert.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct QueryToken(u64);

impl QueryToken {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

///
/// DepthState
///
/// Fetch/cursor substate for one nested occurrence of an entity. Depth
/// substates run the root state machine independently and never block it.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct DepthState {
    pub cursor: Option<RecordId>,
    pub loading: bool,
    pub begun_token: Option<QueryToken>,
}

///
/// EntityMeta
///
/// Static description of a business component on the active screen. `path`
/// encodes the entity's position under its parents (`parent/:id/child`) and
/// drives cursor invalidation when an ancestor's cursor changes.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityMeta {
    pub name: String,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_filter: Option<String>,

    #[serde(default)]
    pub policies: SelectionPolicies,
}

impl EntityMeta {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            default_sort: None,
            default_filter: None,
            policies: SelectionPolicies::default(),
        }
    }

    #[must_use]
    pub fn with_default_sort(mut self, raw: impl Into<String>) -> Self {
        self.default_sort = Some(raw.into());
        self
    }

    #[must_use]
    pub fn with_default_filter(mut self, raw: impl Into<String>) -> Self {
        self.default_filter = Some(raw.into());
        self
    }

    #[must_use]
    pub const fn with_policies(mut self, policies: SelectionPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Path prefix that all descendant entity paths contain.
    #[must_use]
    pub fn descendant_prefix(&self) -> String {
        format!("{}/:id", self.path)
    }
}

///
/// EntityState
///
/// Per-entity fetch metadata. The root cursor is meaningful only while
/// `cached_query_key` matches the last successful fetch; a cursor under a
/// stale key is provisional.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityState {
    pub name: String,
    pub cursor: Option<RecordId>,
    pub page: u32,
    pub loading: bool,
    pub has_next: bool,
    pub cached_query_key: Option<String>,
    pub begun_token: Option<QueryToken>,

    #[serde(default)]
    pub depth: BTreeMap<u32, DepthState>,
}

impl EntityState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cursor: None,
            page: 1,
            loading: false,
            has_next: false,
            cached_query_key: None,
            begun_token: None,
            depth: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn depth_state(&self, depth: u32) -> Option<&DepthState> {
        self.depth.get(&depth)
    }

    /// Cursor at the given depth; depth 1 is the root cursor.
    #[must_use]
    pub fn cursor_at(&self, depth: u32) -> Option<&RecordId> {
        if depth <= 1 {
            self.cursor.as_ref()
        } else {
            self.depth.get(&depth).and_then(|d| d.cursor.as_ref())
        }
    }

    /// Loading flag at the given depth; depth 1 is the root flag.
    #[must_use]
    pub fn loading_at(&self, depth: u32) -> bool {
        if depth <= 1 {
            self.loading
        } else {
            self.depth.get(&depth).is_some_and(|d| d.loading)
        }
    }

    fn begun_token_at(&self, depth: u32) -> Option<QueryToken> {
        if depth <= 1 {
            self.begun_token
        } else {
            self.depth.get(&depth).and_then(|d| d.begun_token)
        }
    }
}

///
/// ScreenState
///
/// All per-entity metadata for the active screen. Every transition is a
/// pure function: it takes the current snapshot and returns the next one.
/// Unknown entity names leave the snapshot unchanged; the engine reports
/// them as notices.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ScreenState {
    pub screen: Option<String>,
    entities: BTreeMap<String, EntityState>,
    metas: BTreeMap<String, EntityMeta>,
}

impl ScreenState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // Read surface
    //

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityState> {
        self.entities.get(name)
    }

    #[must_use]
    pub fn meta(&self, name: &str) -> Option<&EntityMeta> {
        self.metas.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityState> {
        self.entities.values()
    }

    pub fn metas(&self) -> impl Iterator<Item = &EntityMeta> {
        self.metas.values()
    }

    //
    // Transitions
    //

    /// Replace screen metadata wholesale: every listed entity starts from a
    /// fresh state machine.
    #[must_use]
    pub fn select_screen(&self, screen: impl Into<String>, metas: Vec<EntityMeta>) -> Self {
        let mut next = Self::new();
        next.screen = Some(screen.into());
        for meta in metas {
            next.entities
                .insert(meta.name.clone(), EntityState::new(meta.name.clone()));
            next.metas.insert(meta.name.clone(), meta);
        }

        next
    }

    /// Restart pagination for the entities present on the newly selected
    /// view. Unknown names are skipped.
    #[must_use]
    pub fn select_view(&self, entity_names: &[String]) -> Self {
        let mut next = self.clone();
        for name in entity_names {
            if let Some(entity) = next.entities.get_mut(name) {
                entity.page = 1;
            }
        }

        next
    }

    /// Mark a fetch in flight at the given depth and stamp its token.
    #[must_use]
    pub fn begin_fetch(&self, name: &str, depth: u32, token: QueryToken) -> Self {
        self.with_entity(name, |entity| {
            if depth <= 1 {
                entity.loading = true;
                entity.begun_token = Some(token);
            } else {
                let sub = entity.depth.entry(depth).or_default();
                sub.loading = true;
                sub.begun_token = Some(token);
            }
        })
    }

    /// Apply a successful fetch completion.
    ///
    /// Returns `(next, false)` untouched when the token does not match the
    /// most recent begin token at that depth.
    #[must_use]
    pub fn fetch_succeeded(
        &self,
        name: &str,
        depth: u32,
        token: QueryToken,
        has_next: bool,
        query_key: &str,
    ) -> (Self, bool) {
        if !self.token_matches(name, depth, token) {
            return (self.clone(), false);
        }

        let next = self.with_entity(name, |entity| {
            if depth <= 1 {
                entity.loading = false;
                entity.begun_token = None;
                entity.has_next = has_next;
                entity.cached_query_key = Some(query_key.to_string());
            } else if let Some(sub) = entity.depth.get_mut(&depth) {
                sub.loading = false;
                sub.begun_token = None;
            }
        });

        (next, true)
    }

    /// Apply a failed fetch completion: clears loading only. Prior data and
    /// cache keys stay intact; stale display beats blanking.
    #[must_use]
    pub fn fetch_failed(&self, name: &str, depth: u32, token: QueryToken) -> (Self, bool) {
        if !self.token_matches(name, depth, token) {
            return (self.clone(), false);
        }

        let next = self.with_entity(name, |entity| {
            if depth <= 1 {
                entity.loading = false;
                entity.begun_token = None;
            } else if let Some(sub) = entity.depth.get_mut(&depth) {
                sub.loading = false;
                sub.begun_token = None;
            }
        });

        (next, true)
    }

    /// Set the root cursor and invalidate every entity whose path descends
    /// from the changed entity: a changed parent selection invalidates the
    /// children's current selection and their cache validity.
    #[must_use]
    pub fn set_cursor(&self, name: &str, cursor: Option<RecordId>) -> Self {
        let mut next = self.with_entity(name, |entity| {
            entity.cursor = cursor;
        });

        if let Some(meta) = next.metas.get(name) {
            let prefix = meta.descendant_prefix();
            let descendants: Vec<String> = next
                .metas
                .values()
                .filter(|other| other.name != name && other.path.contains(&prefix))
                .map(|other| other.name.clone())
                .collect();

            for child in descendants {
                if let Some(entity) = next.entities.get_mut(&child) {
                    entity.cursor = None;
                    entity.cached_query_key = None;
                }
            }
        }

        next
    }

    /// Set the cursor at a specific depth; depth 1 routes to the root
    /// cursor without descendant invalidation.
    #[must_use]
    pub fn set_depth_cursor(&self, name: &str, depth: u32, cursor: Option<RecordId>) -> Self {
        self.with_entity(name, |entity| {
            if depth <= 1 {
                entity.cursor = cursor;
            } else {
                entity.depth.entry(depth).or_default().cursor = cursor;
            }
        })
    }

    /// Jump to a page; always re-enters loading.
    #[must_use]
    pub fn set_page(&self, name: &str, page: u32) -> Self {
        self.with_entity(name, |entity| {
            entity.page = page.max(1);
            entity.loading = true;
        })
    }

    /// Advance one page; always re-enters loading.
    #[must_use]
    pub fn load_more(&self, name: &str) -> Self {
        self.with_entity(name, |entity| {
            entity.page += 1;
            entity.loading = true;
        })
    }

    /// Restart pagination after a filter change.
    #[must_use]
    pub fn reset_page(&self, name: &str) -> Self {
        self.with_entity(name, |entity| {
            entity.page = 1;
        })
    }

    /// Force a refetch: re-enters loading and drops cache validity.
    #[must_use]
    pub fn force_invalidate(&self, name: &str) -> Self {
        self.with_entity(name, |entity| {
            entity.loading = true;
            entity.cached_query_key = None;
        })
    }

    /// A record was created remotely: the entity settles on it.
    #[must_use]
    pub fn record_created(&self, name: &str, record: &RecordId, query_key: &str) -> Self {
        self.with_entity(name, |entity| {
            entity.loading = false;
            entity.cursor = Some(record.clone());
            entity.cached_query_key = Some(query_key.to_string());
        })
    }

    /// A commit batch went out; the named entities enter loading.
    #[must_use]
    pub fn commit_requested(&self, names: &[String]) -> Self {
        self.with_entities(names, |entity| {
            entity.loading = true;
        })
    }

    /// A commit batch completed (either way); loading clears.
    #[must_use]
    pub fn commit_finished(&self, names: &[String]) -> Self {
        self.with_entities(names, |entity| {
            entity.loading = false;
        })
    }

    //
    // Helpers
    //

    fn token_matches(&self, name: &str, depth: u32, token: QueryToken) -> bool {
        self.entities
            .get(name)
            .is_some_and(|entity| entity.begun_token_at(depth) == Some(token))
    }

    fn with_entity(&self, name: &str, f: impl FnOnce(&mut EntityState)) -> Self {
        let mut next = self.clone();
        if let Some(entity) = next.entities.get_mut(name) {
            f(entity);
        }

        next
    }

    fn with_entities(&self, names: &[String], mut f: impl FnMut(&mut EntityState)) -> Self {
        let mut next = self.clone();
        for name in names {
            if let Some(entity) = next.entities.get_mut(name) {
                f(entity);
            }
        }

        next
    }
}
