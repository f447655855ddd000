use crate::{
    record::{Record, RecordId},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// PendingRecord
///
/// Uncommitted edits for one record: field overrides plus an optional
/// selection (`associate`) override.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PendingRecord {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associate: Option<bool>,
}

impl PendingRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.associate.is_none()
    }
}

///
/// PendingChanges
///
/// The overlay of uncommitted local edits, keyed by `(entity, record)`.
/// Entries outlive individual fetches; they are cleared only by commit
/// acknowledgement or explicit cancel, always for a named batch of
/// entities and never partially.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PendingChanges(BTreeMap<String, BTreeMap<RecordId, PendingRecord>>);

impl PendingChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite one pending field edit.
    pub fn set(
        &mut self,
        entity: &str,
        record: &RecordId,
        field: impl Into<String>,
        value: Value,
    ) {
        self.entry(entity, record).fields.insert(field.into(), value);
    }

    /// Store or overwrite a selection override.
    pub fn set_associate(&mut self, entity: &str, record: &RecordId, selected: bool) {
        self.entry(entity, record).associate = Some(selected);
    }

    /// Pending value for a field, or `None` meaning "use canonical".
    #[must_use]
    pub fn get(&self, entity: &str, record: &RecordId, field: &str) -> Option<&Value> {
        self.record(entity, record)
            .and_then(|pending| pending.fields.get(field))
    }

    /// Pending selection override, or `None` meaning "use canonical".
    #[must_use]
    pub fn associate(&self, entity: &str, record: &RecordId) -> Option<bool> {
        self.record(entity, record)
            .and_then(|pending| pending.associate)
    }

    #[must_use]
    pub fn record(&self, entity: &str, record: &RecordId) -> Option<&PendingRecord> {
        self.0.get(entity).and_then(|records| records.get(record))
    }

    /// Merge rule for display and selection-derived computations:
    /// the overlay wins, the canonical record fills the rest.
    #[must_use]
    pub fn effective<'a>(&'a self, entity: &str, record: &'a Record, field: &str) -> Option<&'a Value> {
        self.get(entity, &record.id, field).or_else(|| record.field(field))
    }

    #[must_use]
    pub fn has_changes(&self, entity: &str) -> bool {
        self.0
            .get(entity)
            .is_some_and(|records| records.values().any(|p| !p.is_empty()))
    }

    /// Clear all overlay entries for a named batch of entities. Used for
    /// both commit acknowledgement and explicit cancel; this layer does
    /// not distinguish the two.
    pub fn clear(&mut self, entities: &[String]) {
        for entity in entities {
            self.0.remove(entity);
        }
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    fn entry(&mut self, entity: &str, record: &RecordId) -> &mut PendingRecord {
        self.0
            .entry(entity.to_string())
            .or_default()
            .entry(record.clone())
            .or_default()
    }
}
