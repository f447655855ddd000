mod tags;


pub use tags::*;

use crate::{
    pending::PendingChanges,
    record::{DataSet, Record, RecordId},
    tree::{ancestor_chain, descendants},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// SelectionError
///
/// Expected selection rejections. The engine maps these onto notices; a
/// rejected toggle is a no-op, never a crash.
///

#[derive(Debug, ThisError)]
pub enum SelectionError {
    #[error("record '{record}' is not in the working set")]
    UnknownRecord { record: RecordId },

    #[error("record '{record}' has an incomplete hierarchy")]
    IncompleteHierarchy { record: RecordId },

    #[error("root-level record '{record}' is not a selectable target")]
    RootDisabled { record: RecordId },
}

///
/// SelectionPolicies
///
/// Per-entity multi-select behavior, declared in the entity's metadata.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionPolicies {
    /// At most one selected record across the whole tree.
    pub radio_all: bool,

    /// At most one selected record at the root level.
    pub root_radio: bool,

    /// Selecting a record also selects its entire subtree.
    pub cascade_select: bool,

    /// Deselecting a record also deselects its entire subtree.
    pub cascade_deselect: bool,

    /// Root-level records cannot be selection targets.
    pub disable_root: bool,
}

///
/// SelectionOp
///
/// One overlay write produced by planning a toggle. Ops are applied in
/// order; none mutate canonical records.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectionOp {
    pub record: RecordId,
    pub selected: bool,
}

impl SelectionOp {
    #[must_use]
    pub const fn select(record: RecordId) -> Self {
        Self {
            record,
            selected: true,
        }
    }

    #[must_use]
    pub const fn deselect(record: RecordId) -> Self {
        Self {
            record,
            selected: false,
        }
    }
}

/// Whether a record is currently selected: the pending overlay override if
/// present, else the committed flag.
#[must_use]
pub fn is_selected(pending: &PendingChanges, entity: &str, record: &Record) -> bool {
    pending
        .associate(entity, &record.id)
        .unwrap_or(record.associated)
}

/// The derived selection list for an entity, in working-set order.
#[must_use]
pub fn selected_records<'a>(
    data: &'a DataSet,
    pending: &PendingChanges,
    entity: &str,
) -> Vec<&'a Record> {
    data.iter()
        .filter(|record| is_selected(pending, entity, record))
        .collect()
}

/// Plan the overlay writes for toggling `record` at tree level `depth`.
///
/// Policy order: radio-all clears everything first; root-radio retires the
/// previous root winner; cascade policies sweep the subtree; the record
/// itself is always last. Cascades are unconditional and override any
/// individual descendant state.
pub fn plan_toggle(
    policies: SelectionPolicies,
    data: &DataSet,
    pending: &PendingChanges,
    entity: &str,
    depth: u32,
    record_id: &RecordId,
    selected: bool,
) -> Result<Vec<SelectionOp>, SelectionError> {
    let record = data
        .get(record_id)
        .ok_or_else(|| SelectionError::UnknownRecord {
            record: record_id.clone(),
        })?;

    if policies.disable_root && depth <= 1 {
        return Err(SelectionError::RootDisabled {
            record: record_id.clone(),
        });
    }

    // a target with an unresolvable ancestor chain is rejected up front
    if ancestor_chain(data, record).is_err() {
        return Err(SelectionError::IncompleteHierarchy {
            record: record_id.clone(),
        });
    }

    let mut ops = Vec::new();

    if policies.radio_all {
        ops.extend(
            selected_records(data, pending, entity)
                .into_iter()
                .filter(|current| current.id != *record_id)
                .map(|current| SelectionOp::deselect(current.id.clone())),
        );
    } else if policies.root_radio && depth <= 1 && selected {
        let winner = selected_records(data, pending, entity)
            .into_iter()
            .find(|current| current.level_or_root() == 1 && current.id != *record_id);
        if let Some(current) = winner {
            ops.push(SelectionOp::deselect(current.id.clone()));
        }
    }

    let cascade = (selected && policies.cascade_select) || (!selected && policies.cascade_deselect);
    if cascade {
        ops.extend(
            descendants(data, record_id)
                .into_iter()
                .map(|id| SelectionOp {
                    record: id,
                    selected,
                }),
        );
    }

    ops.push(SelectionOp {
        record: record_id.clone(),
        selected,
    });

    Ok(ops)
}

/// Apply planned ops to the overlay.
pub fn apply_ops(pending: &mut PendingChanges, entity: &str, ops: &[SelectionOp]) {
    for op in ops {
        pending.set_associate(entity, &op.record, op.selected);
    }
}
