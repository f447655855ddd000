use crate::value::Value;
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

///
/// RecordId
///
/// Identity of a record within one entity's working set. Ids are minted by
/// the remote source and treated as opaque text.
///

#[derive(Clone, Debug, Deref, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

///
/// Record
///
/// One canonical record as delivered by the remote source. `parent_id` and
/// `level` are present only for tree-shaped entities; `associated` is the
/// committed selection flag that the pending overlay may override.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,

    #[serde(default)]
    pub fields: BTreeMap<String, Value>,

    #[serde(default)]
    pub associated: bool,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            level: None,
            fields: BTreeMap::new(),
            associated: false,
        }
    }

    /// Attach tree placement: the hierarchy level and, above level 1, the
    /// owning parent record.
    #[must_use]
    pub fn at_level(mut self, level: u32, parent_id: Option<RecordId>) -> Self {
        self.level = Some(level);
        self.parent_id = parent_id;
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn with_associated(mut self, associated: bool) -> Self {
        self.associated = associated;
        self
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Hierarchy level, defaulting to 1 for flat entities.
    #[must_use]
    pub fn level_or_root(&self) -> u32 {
        self.level.unwrap_or(1)
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

///
/// DataSet
///
/// Working set for one entity. Built once per successful fetch and replaced
/// wholesale; no partial patching across fetches. Lookup structures are
/// derived at construction so closure walks stay linear.
///

#[derive(Clone, Debug, Default, Deref)]
pub struct DataSet {
    #[deref]
    records: Vec<Record>,
    by_id: HashMap<RecordId, usize>,
    children: HashMap<RecordId, Vec<RecordId>>,
}

impl DataSet {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut children: HashMap<RecordId, Vec<RecordId>> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            by_id.insert(record.id.clone(), idx);
            if let Some(parent) = &record.parent_id {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(record.id.clone());
            }
        }

        Self {
            records,
            by_id,
            children,
        }
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.by_id.get(id).map(|idx| &self.records[*idx])
    }

    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Direct children of a record, in working-set order.
    pub fn children_of(&self, id: &RecordId) -> impl Iterator<Item = &Record> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.get(child))
    }

    #[must_use]
    pub fn has_children(&self, id: &RecordId) -> bool {
        self.children.get(id).is_some_and(|ids| !ids.is_empty())
    }

    /// True when the record references a parent that is absent from this
    /// working set. Orphans are excluded from closures and rejected as
    /// selection targets.
    #[must_use]
    pub fn is_orphan(&self, record: &Record) -> bool {
        record
            .parent_id
            .as_ref()
            .is_some_and(|parent| !self.contains(parent))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for DataSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
