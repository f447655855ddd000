use crate::{TAG_DISPLAY_LIMIT, record::RecordId};
use serde::{Deserialize, Serialize};

///
/// SelectionTag
///
/// Compact display entry for one current selection. When the selection
/// exceeds the display cap, the remainder collapses into a single
/// synthetic, non-closable overflow tag; the cap is presentation-only.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectionTag {
    pub id: RecordId,
    pub value: String,
    pub closable: bool,
}

impl SelectionTag {
    /// Id carried by the synthetic overflow entry. Removing it is not a
    /// valid user operation.
    pub const OVERFLOW_ID: &'static str = "overflow";

    #[must_use]
    pub fn is_overflow(&self) -> bool {
        !self.closable && self.id.as_str() == Self::OVERFLOW_ID
    }
}

/// Build the tag view for the given `(id, display value)` pairs.
#[must_use]
pub fn build_tags(items: &[(RecordId, String)]) -> Vec<SelectionTag> {
    let mut tags: Vec<SelectionTag> = items
        .iter()
        .take(TAG_DISPLAY_LIMIT)
        .map(|(id, value)| SelectionTag {
            id: id.clone(),
            value: value.clone(),
            closable: true,
        })
        .collect();

    if items.len() > TAG_DISPLAY_LIMIT {
        let hidden = items.len() - TAG_DISPLAY_LIMIT;
        tags.push(SelectionTag {
            id: RecordId::from(SelectionTag::OVERFLOW_ID),
            value: format!("+{hidden} more"),
            closable: false,
        });
    }

    tags
}
