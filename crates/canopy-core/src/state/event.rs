use crate::{
    filter::{Filter, FilterOp},
    record::{Record, RecordId},
    sorter::Sorter,
    state::{EntityMeta, QueryToken},
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// Event
///
/// The inbound event surface of the engine. One event is one atomic
/// transition; events for a given `(entity, depth)` pair are applied in
/// the order received, with stale fetch completions screened out by the
/// [`QueryToken`] guard.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Event {
    ScreenSelected {
        screen: String,
        entities: Vec<EntityMeta>,
    },
    ViewSelected {
        entities: Vec<String>,
    },
    FetchRequested {
        entity: String,
        depth: u32,
        token: QueryToken,
    },
    FetchSucceeded {
        entity: String,
        depth: u32,
        token: QueryToken,
        has_next: bool,
        query_key: String,
        records: Vec<Record>,
    },
    FetchFailed {
        entity: String,
        depth: u32,
        token: QueryToken,
    },
    LoadMoreRequested {
        entity: String,
    },
    CursorChanged {
        entity: String,
        cursor: Option<RecordId>,
    },
    DepthCursorChanged {
        entity: String,
        depth: u32,
        cursor: Option<RecordId>,
    },
    FilterAdded {
        entity: String,
        filter: Filter,
    },
    FilterRemoved {
        entity: String,
        field: String,
        op: FilterOp,
    },
    AllFiltersRemoved {
        entity: String,
    },
    SorterChanged {
        entity: String,
        sorters: Vec<Sorter>,
    },
    PageChanged {
        entity: String,
        page: u32,
    },
    ForceInvalidated {
        entity: String,
    },
    SelectionToggled {
        entity: String,
        depth: u32,
        record: RecordId,
        selected: bool,
    },
    ExpansionToggled {
        entity: String,
        record: RecordId,
        expanded: bool,
    },
    FieldChanged {
        entity: String,
        record: RecordId,
        field: String,
        value: Value,
    },
    RecordCreated {
        entity: String,
        record: RecordId,
        query_key: String,
    },
    CommitRequested {
        entities: Vec<String>,
    },
    CommitAcknowledged {
        entities: Vec<String>,
    },
    CommitFailed {
        entities: Vec<String>,
    },
    PendingCancelled {
        entities: Vec<String>,
    },
}

impl Event {
    /// Entity the event targets, when it targets exactly one.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::FetchRequested { entity, .. }
            | Self::FetchSucceeded { entity, .. }
            | Self::FetchFailed { entity, .. }
            | Self::LoadMoreRequested { entity }
            | Self::CursorChanged { entity, .. }
            | Self::DepthCursorChanged { entity, .. }
            | Self::FilterAdded { entity, .. }
            | Self::FilterRemoved { entity, .. }
            | Self::AllFiltersRemoved { entity }
            | Self::SorterChanged { entity, .. }
            | Self::PageChanged { entity, .. }
            | Self::ForceInvalidated { entity }
            | Self::SelectionToggled { entity, .. }
            | Self::ExpansionToggled { entity, .. }
            | Self::FieldChanged { entity, .. }
            | Self::RecordCreated { entity, .. } => Some(entity),
            Self::ScreenSelected { .. }
            | Self::ViewSelected { .. }
            | Self::CommitRequested { .. }
            | Self::CommitAcknowledged { .. }
            | Self::CommitFailed { .. }
            | Self::PendingCancelled { .. } => None,
        }
    }
}
