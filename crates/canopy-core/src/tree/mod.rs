mod closure;
mod expand;

#[cfg(test)]
mod property;
#[cfg(test)]
mod tests;

pub use closure::*;
pub use expand::*;

use crate::record::{DataSet, Record, RecordId};
use thiserror::Error as ThisError;

///
/// TreeError
///
/// Structural inconsistencies in a working set. Closure and selection
/// operations degrade to a no-op for the offending record; they never
/// abort a batch.
///

#[derive(Debug, ThisError)]
pub enum TreeError {
    #[error("record '{record}' references missing ancestor '{parent}'")]
    MissingAncestor { record: RecordId, parent: RecordId },

    #[error("record '{record}' sits on a parent cycle")]
    ParentCycle { record: RecordId },
}

/// Walk `parent_id` upward to the root, collecting every ancestor.
///
/// Fails when a link points outside the working set or loops; the caller
/// treats the record as having an incomplete hierarchy.
pub fn ancestor_chain<'a>(data: &'a DataSet, record: &Record) -> Result<Vec<&'a Record>, TreeError> {
    let mut chain = Vec::new();
    let mut current = record;

    while let Some(parent_id) = &current.parent_id {
        let parent = data.get(parent_id).ok_or_else(|| TreeError::MissingAncestor {
            record: record.id.clone(),
            parent: parent_id.clone(),
        })?;

        if parent.id == record.id || chain.iter().any(|seen: &&Record| seen.id == parent.id) {
            return Err(TreeError::ParentCycle {
                record: record.id.clone(),
            });
        }

        chain.push(parent);
        current = parent;
    }

    Ok(chain)
}

/// Breadth-first expansion over `parent_id` downward: every record whose
/// parent chain leads to `root`, in visit order. The root itself is not
/// included.
#[must_use]
pub fn descendants(data: &DataSet, root: &RecordId) -> Vec<RecordId> {
    let mut out = Vec::new();
    let mut queue: std::collections::VecDeque<RecordId> = std::collections::VecDeque::new();
    queue.push_back(root.clone());

    while let Some(id) = queue.pop_front() {
        for child in data.children_of(&id) {
            out.push(child.id.clone());
            queue.push_back(child.id.clone());
        }
    }

    out
}

/// Rows of one rendered tree level: records at `depth` under `parent`,
/// restricted to the resolved visible set. A level renders another
/// instance of itself for each expanded row, so this is the only shape
/// the rendering layer needs.
#[must_use]
pub fn level_rows<'a>(
    data: &'a DataSet,
    resolved: &ResolvedTree,
    parent: Option<&RecordId>,
    depth: u32,
) -> Vec<&'a Record> {
    data.iter()
        .filter(|record| resolved.contains(&record.id))
        .filter(|record| record.level_or_root() == depth)
        .filter(|record| depth == 1 || record.parent_id.as_ref() == parent)
        .collect()
}
