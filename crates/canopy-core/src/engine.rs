use crate::{
    error::InternalError,
    filter::{Filter, FilterError, FilterRegistry, parse_filters},
    obs::{self, EngineEvent},
    pending::PendingChanges,
    record::{DataSet, Record, RecordId},
    selection::{
        SelectionError, SelectionTag, apply_ops, build_tags, plan_toggle, selected_records,
    },
    sorter::{Sorter, SorterRegistry, parse_sorters},
    state::{DepthState, EntityState, Event, ScreenState},
    tree::{
        ExpansionState, ResolvedTree, level_rows, resolve, seed_from_matches, seed_from_selection,
    },
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Notice
///
/// Expected conditions surfaced as values from [`Engine::apply`]. No
/// expected condition ever crosses the engine boundary as an error.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    UnknownEntity { entity: String },
    UnknownRecord { entity: String, record: RecordId },
    StaleResponseDropped { entity: String, depth: u32 },
    IncompleteHierarchy { entity: String, record: RecordId },
    EmptyFilterValue { entity: String, field: String },
    RootSelectionDisabled { entity: String, record: RecordId },
}

///
/// Outcome
///
/// Result of one applied event: whether the snapshot changed, and the
/// notice explaining a rejection when it did not.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Outcome {
    pub applied: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl Outcome {
    #[must_use]
    pub const fn applied() -> Self {
        Self {
            applied: true,
            notice: None,
        }
    }

    #[must_use]
    pub const fn rejected(notice: Notice) -> Self {
        Self {
            applied: false,
            notice: Some(notice),
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        !self.applied
    }
}

///
/// Engine
///
/// The owning handle over all core state: entity state machines, filter
/// and sorter registries, per-entity working sets, the pending-change
/// overlay, and tree expansion. Mutation happens only through
/// [`Engine::apply`]; each event is one atomic, synchronous transition.
/// External consumers read snapshots through the accessor surface.
///

#[derive(Debug, Default)]
pub struct Engine {
    screen: ScreenState,
    filters: FilterRegistry,
    sorters: SorterRegistry,
    data: BTreeMap<String, DataSet>,
    pending: PendingChanges,
    expansion: BTreeMap<String, ExpansionState>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // Event application
    //

    /// Apply one inbound event. Expected conditions come back as notices;
    /// the snapshot is unchanged whenever `applied` is false.
    pub fn apply(&mut self, event: Event) -> Outcome {
        match event {
            Event::ScreenSelected { screen, entities } => {
                self.screen = self.screen.select_screen(screen, entities);
                self.filters.clear();
                self.sorters.clear();
                self.data.clear();
                self.pending.clear_all();
                self.expansion.clear();
                self.seed_defaults();
                Outcome::applied()
            }

            Event::ViewSelected { entities } => {
                self.screen = self.screen.select_view(&entities);
                Outcome::applied()
            }

            Event::FetchRequested {
                entity,
                depth,
                token,
            } => self.known(&entity, |engine| {
                engine.screen = engine.screen.begin_fetch(&entity, depth, token);
                obs::emit(&EngineEvent::FetchBegin {
                    entity: entity.clone(),
                    depth,
                });
                Outcome::applied()
            }),

            Event::FetchSucceeded {
                entity,
                depth,
                token,
                has_next,
                query_key,
                records,
            } => self.known(&entity, |engine| {
                let (next, applied) =
                    engine
                        .screen
                        .fetch_succeeded(&entity, depth, token, has_next, &query_key);
                if !applied {
                    obs::emit(&EngineEvent::StaleResponseDropped {
                        entity: entity.clone(),
                        depth,
                    });
                    return Outcome::rejected(Notice::StaleResponseDropped {
                        entity: entity.clone(),
                        depth,
                    });
                }

                engine.screen = next;
                let count = records.len();
                engine.data.insert(entity.clone(), DataSet::new(records));
                engine.refresh_expansion(&entity);
                obs::emit(&EngineEvent::FetchFinish {
                    entity: entity.clone(),
                    depth,
                    ok: true,
                    records: count,
                });
                Outcome::applied()
            }),

            Event::FetchFailed {
                entity,
                depth,
                token,
            } => self.known(&entity, |engine| {
                let (next, applied) = engine.screen.fetch_failed(&entity, depth, token);
                if !applied {
                    obs::emit(&EngineEvent::StaleResponseDropped {
                        entity: entity.clone(),
                        depth,
                    });
                    return Outcome::rejected(Notice::StaleResponseDropped {
                        entity: entity.clone(),
                        depth,
                    });
                }

                engine.screen = next;
                obs::emit(&EngineEvent::FetchFinish {
                    entity: entity.clone(),
                    depth,
                    ok: false,
                    records: 0,
                });
                Outcome::applied()
            }),

            Event::LoadMoreRequested { entity } => self.known(&entity, |engine| {
                engine.screen = engine.screen.load_more(&entity);
                Outcome::applied()
            }),

            Event::CursorChanged { entity, cursor } => self.known(&entity, |engine| {
                engine.screen = engine.screen.set_cursor(&entity, cursor);
                Outcome::applied()
            }),

            Event::DepthCursorChanged {
                entity,
                depth,
                cursor,
            } => self.known(&entity, |engine| {
                engine.screen = engine.screen.set_depth_cursor(&entity, depth, cursor);
                Outcome::applied()
            }),

            Event::FilterAdded { entity, filter } => self.known(&entity, |engine| {
                let field = filter.field.clone();
                match engine.filters.add(&entity, filter) {
                    Ok(()) => {
                        engine.screen = engine.screen.reset_page(&entity);
                        engine.refresh_expansion(&entity);
                        Outcome::applied()
                    }
                    Err(FilterError::EmptyValue { .. }) => {
                        Outcome::rejected(Notice::EmptyFilterValue {
                            entity: entity.clone(),
                            field,
                        })
                    }
                }
            }),

            Event::FilterRemoved { entity, field, op } => self.known(&entity, |engine| {
                engine.filters.remove(&entity, &field, op);
                engine.screen = engine.screen.reset_page(&entity);
                engine.refresh_expansion(&entity);
                Outcome::applied()
            }),

            Event::AllFiltersRemoved { entity } => self.known(&entity, |engine| {
                engine.filters.remove_all(&entity);
                engine.screen = engine.screen.reset_page(&entity);
                engine.refresh_expansion(&entity);
                Outcome::applied()
            }),

            Event::SorterChanged { entity, sorters } => self.known(&entity, |engine| {
                engine.sorters.set(&entity, sorters);
                Outcome::applied()
            }),

            Event::PageChanged { entity, page } => self.known(&entity, |engine| {
                engine.screen = engine.screen.set_page(&entity, page);
                Outcome::applied()
            }),

            Event::ForceInvalidated { entity } => self.known(&entity, |engine| {
                engine.screen = engine.screen.force_invalidate(&entity);
                Outcome::applied()
            }),

            Event::SelectionToggled {
                entity,
                depth,
                record,
                selected,
            } => self.toggle_selection(&entity, depth, &record, selected),

            Event::ExpansionToggled {
                entity,
                record,
                expanded,
            } => self.known(&entity, |engine| {
                engine
                    .expansion
                    .entry(entity.clone())
                    .or_default()
                    .toggle(&record, expanded);
                Outcome::applied()
            }),

            Event::FieldChanged {
                entity,
                record,
                field,
                value,
            } => self.known(&entity, |engine| {
                engine.pending.set(&entity, &record, field, value);
                Outcome::applied()
            }),

            Event::RecordCreated {
                entity,
                record,
                query_key,
            } => self.known(&entity, |engine| {
                engine.screen = engine.screen.record_created(&entity, &record, &query_key);
                Outcome::applied()
            }),

            Event::CommitRequested { entities } => {
                self.screen = self.screen.commit_requested(&entities);
                Outcome::applied()
            }

            Event::CommitAcknowledged { entities } => {
                self.screen = self.screen.commit_finished(&entities);
                self.pending.clear(&entities);
                obs::emit(&EngineEvent::PendingCleared {
                    entities: entities.len(),
                    committed: true,
                });
                Outcome::applied()
            }

            // overlay entries survive a failed commit so the user can retry
            Event::CommitFailed { entities } => {
                self.screen = self.screen.commit_finished(&entities);
                Outcome::applied()
            }

            Event::PendingCancelled { entities } => {
                self.pending.clear(&entities);
                for entity in &entities {
                    if let Some(expansion) = self.expansion.get_mut(entity) {
                        expansion.reset();
                    }
                }
                obs::emit(&EngineEvent::PendingCleared {
                    entities: entities.len(),
                    committed: false,
                });
                Outcome::applied()
            }
        }
    }

    //
    // Read surface
    //

    #[must_use]
    pub const fn screen(&self) -> &ScreenState {
        &self.screen
    }

    #[must_use]
    pub fn state(&self, entity: &str) -> Option<&EntityState> {
        self.screen.entity(entity)
    }

    pub fn try_state(&self, entity: &str) -> Result<&EntityState, InternalError> {
        self.state(entity)
            .ok_or_else(|| InternalError::entity_not_found(entity))
    }

    #[must_use]
    pub fn depth_state(&self, entity: &str, depth: u32) -> Option<&DepthState> {
        self.screen
            .entity(entity)
            .and_then(|state| state.depth_state(depth))
    }

    #[must_use]
    pub fn records(&self, entity: &str) -> Option<&DataSet> {
        self.data.get(entity)
    }

    pub fn try_records(&self, entity: &str) -> Result<&DataSet, InternalError> {
        self.records(entity)
            .ok_or_else(|| InternalError::entity_not_found(entity))
    }

    /// The record the root cursor points at, if a cursor is set.
    ///
    /// A set cursor must reference the current working set; a dangling
    /// cursor is an invariant violation, not an expected condition.
    pub fn cursor_record(&self, entity: &str) -> Result<Option<&Record>, InternalError> {
        let state = self.try_state(entity)?;
        let Some(cursor) = &state.cursor else {
            return Ok(None);
        };

        let data = self.try_records(entity)?;
        data.get(cursor).map(Some).ok_or_else(|| {
            InternalError::state_invariant(format!(
                "cursor '{cursor}' of entity '{entity}' is not in the working set"
            ))
        })
    }

    #[must_use]
    pub fn active_filters(&self, entity: &str) -> &[Filter] {
        self.filters.get(entity)
    }

    #[must_use]
    pub fn active_sorters(&self, entity: &str) -> &[Sorter] {
        self.sorters.get(entity)
    }

    /// Resolve the visible working set for an entity under its active
    /// filters. With no data fetched yet, the result is empty.
    #[must_use]
    pub fn visible(&self, entity: &str) -> ResolvedTree {
        self.data
            .get(entity)
            .map(|data| resolve(data, self.filters.get(entity)))
            .unwrap_or_default()
    }

    /// Rows of one rendered tree level, restricted to the visible set.
    #[must_use]
    pub fn level_rows<'a>(
        &'a self,
        entity: &str,
        resolved: &ResolvedTree,
        parent: Option<&RecordId>,
        depth: u32,
    ) -> Vec<&'a Record> {
        self.data
            .get(entity)
            .map(|data| level_rows(data, resolved, parent, depth))
            .unwrap_or_default()
    }

    /// The derived selection list: committed flags overlaid with pending
    /// overrides, in working-set order.
    #[must_use]
    pub fn selected(&self, entity: &str) -> Vec<&Record> {
        self.data
            .get(entity)
            .map(|data| selected_records(data, &self.pending, entity))
            .unwrap_or_default()
    }

    /// Compact tag view of the current selection, valued by `value_key`
    /// through the pending overlay.
    #[must_use]
    pub fn tags(&self, entity: &str, value_key: &str) -> Vec<SelectionTag> {
        let items: Vec<(RecordId, String)> = self
            .selected(entity)
            .into_iter()
            .map(|record| {
                let value = self
                    .pending
                    .effective(entity, record, value_key)
                    .map(Value::text_repr)
                    .unwrap_or_default();
                (record.id.clone(), value)
            })
            .collect();

        build_tags(&items)
    }

    #[must_use]
    pub fn pending(&self, entity: &str, record: &RecordId, field: &str) -> Option<&Value> {
        self.pending.get(entity, record, field)
    }

    /// Merged view of one field: the pending overlay wins, the canonical
    /// record fills the rest.
    #[must_use]
    pub fn effective<'a>(&'a self, entity: &str, record: &'a Record, field: &str) -> Option<&'a Value> {
        self.pending.effective(entity, record, field)
    }

    #[must_use]
    pub fn expansion(&self, entity: &str) -> Option<&ExpansionState> {
        self.expansion.get(entity)
    }

    /// A root cursor is provisional while the entity's cached query key
    /// does not match the query that produced the current working set.
    #[must_use]
    pub fn is_cursor_provisional(&self, entity: &str, query_key: &str) -> bool {
        self.screen
            .entity(entity)
            .is_none_or(|state| state.cached_query_key.as_deref() != Some(query_key))
    }

    //
    // Helpers
    //

    fn known(&mut self, entity: &str, f: impl FnOnce(&mut Self) -> Outcome) -> Outcome {
        if self.screen.contains(entity) {
            f(self)
        } else {
            Outcome::rejected(Notice::UnknownEntity {
                entity: entity.to_string(),
            })
        }
    }

    fn seed_defaults(&mut self) {
        let seeds: Vec<(String, Option<String>, Option<String>)> = self
            .screen
            .metas()
            .map(|meta| {
                (
                    meta.name.clone(),
                    meta.default_filter.clone(),
                    meta.default_sort.clone(),
                )
            })
            .collect();

        for (name, default_filter, default_sort) in seeds {
            if let Some(raw) = default_filter {
                for filter in parse_filters(&raw) {
                    // defaults with blank values are skipped, not fatal
                    let _ = self.filters.add(&name, filter);
                }
            }
            if let Some(raw) = default_sort {
                self.sorters.set(&name, parse_sorters(&raw));
            }
        }
    }

    fn toggle_selection(
        &mut self,
        entity: &str,
        depth: u32,
        record: &RecordId,
        selected: bool,
    ) -> Outcome {
        let Some(meta) = self.screen.meta(entity) else {
            return Outcome::rejected(Notice::UnknownEntity {
                entity: entity.to_string(),
            });
        };
        let policies = meta.policies;

        let Some(data) = self.data.get(entity) else {
            return Outcome::rejected(Notice::UnknownRecord {
                entity: entity.to_string(),
                record: record.clone(),
            });
        };

        match plan_toggle(policies, data, &self.pending, entity, depth, record, selected) {
            Ok(ops) => {
                obs::emit(&EngineEvent::SelectionCascade {
                    entity: entity.to_string(),
                    ops: ops.len(),
                });
                apply_ops(&mut self.pending, entity, &ops);
                Outcome::applied()
            }
            Err(SelectionError::UnknownRecord { record }) => {
                Outcome::rejected(Notice::UnknownRecord {
                    entity: entity.to_string(),
                    record,
                })
            }
            Err(SelectionError::IncompleteHierarchy { record }) => {
                Outcome::rejected(Notice::IncompleteHierarchy {
                    entity: entity.to_string(),
                    record,
                })
            }
            Err(SelectionError::RootDisabled { record }) => {
                Outcome::rejected(Notice::RootSelectionDisabled {
                    entity: entity.to_string(),
                    record,
                })
            }
        }
    }

    /// Reseed the expansion set when the filter set has crossed the
    /// empty/non-empty boundary since it was last derived.
    fn refresh_expansion(&mut self, entity: &str) {
        let Some(data) = self.data.get(entity) else {
            return;
        };

        let filters_active = self.filters.is_active(entity);
        let expansion = self.expansion.entry(entity.to_string()).or_default();
        if !expansion.needs_reseed(filters_active) {
            return;
        }

        let seeds = if filters_active {
            seed_from_matches(data, self.filters.get(entity))
        } else {
            let selected: Vec<RecordId> = data
                .iter()
                .filter(|record| {
                    self.pending
                        .associate(entity, &record.id)
                        .unwrap_or(record.associated)
                })
                .map(|record| record.id.clone())
                .collect();
            seed_from_selection(data, &selected)
        };

        expansion.reseed(filters_active, seeds);
    }
}
