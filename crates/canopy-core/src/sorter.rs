use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        };
        write!(f, "{label}")
    }
}

///
/// Sorter
///
/// One sort key. Ordering itself is executed by the remote source; the
/// engine only stores the active list and hands it to the fetch layer.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Sorter {
    pub field: String,
    pub direction: SortDirection,
}

impl Sorter {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

///
/// SorterRegistry
///
/// One active ordered sorter list per entity, replaced wholesale on update.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SorterRegistry(BTreeMap<String, Vec<Sorter>>);

impl SorterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, entity: &str) -> &[Sorter] {
        self.0.get(entity).map_or(&[], Vec::as_slice)
    }

    /// Replace the entity's sorter list. An empty list clears the entry.
    pub fn set(&mut self, entity: &str, sorters: Vec<Sorter>) {
        if sorters.is_empty() {
            self.0.remove(entity);
        } else {
            self.0.insert(entity.to_string(), sorters);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Parse a default-sort string of the form `name.asc,created.desc`.
///
/// Unparsable segments are skipped; seeding defaults must not fail screen
/// selection.
#[must_use]
pub fn parse_sorters(raw: &str) -> Vec<Sorter> {
    raw.split(',')
        .filter_map(|segment| {
            let (field, direction) = segment.split_once('.')?;
            if field.is_empty() {
                return None;
            }
            match direction {
                "asc" => Some(Sorter::asc(field)),
                "desc" => Some(Sorter::desc(field)),
                _ => None,
            }
        })
        .collect()
}
