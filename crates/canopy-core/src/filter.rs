use crate::{record::Record, value::Value};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// FilterError
///

#[derive(Debug, ThisError)]
pub enum FilterError {
    #[error("filter value for field '{field}' is empty")]
    EmptyValue { field: String },
}

///
/// FilterOp
///
/// Comparison vocabulary for client-side filters. `Contains` is what the
/// hierarchy search surfaces emit; `EqualsOneOf` carries the id list of an
/// association-driven filter.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOp {
    Contains,
    Equals,
    EqualsOneOf,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::EqualsOneOf => "equalsOneOf",
        };
        write!(f, "{label}")
    }
}

impl FilterOp {
    /// Parse the wire label used in default-filter strings.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "contains" => Some(Self::Contains),
            "equals" => Some(Self::Equals),
            "equalsOneOf" => Some(Self::EqualsOneOf),
            _ => None,
        }
    }
}

///
/// FilterScope
///
/// Optional view/widget scoping carried by filters raised from popup
/// surfaces. The engine stores but does not interpret it.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
}

///
/// Filter
///
/// One predicate over a single field. At most one filter per `(field, op)`
/// slot exists per entity; adding a duplicate replaces its value.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<FilterScope>,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            scope: None,
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Equals, value)
    }

    pub fn equals_one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOp::EqualsOneOf, Value::List(values))
    }

    #[must_use]
    pub fn with_scope(mut self, scope: FilterScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Two filters occupy the same registry slot when field and operator
    /// both match.
    #[must_use]
    pub fn same_slot(&self, field: &str, op: FilterOp) -> bool {
        self.field == field && self.op == op
    }

    /// Apply this filter to one record. A record without the field never
    /// matches.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.field(&self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Contains => actual.contains_ci(&self.value),
            FilterOp::Equals => actual.text_eq(&self.value),
            FilterOp::EqualsOneOf => match &self.value {
                Value::List(allowed) => allowed.iter().any(|v| v.text_eq(actual)),
                other => other.text_eq(actual),
            },
        }
    }
}

///
/// FilterRegistry
///
/// Per-entity ordered filter lists; a pure value store. Page-reset coupling
/// on mutation is handled by the engine, not here.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FilterRegistry(BTreeMap<String, Vec<Filter>>);

impl FilterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active filters for an entity, in insertion order.
    #[must_use]
    pub fn get(&self, entity: &str) -> &[Filter] {
        self.0.get(entity).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_active(&self, entity: &str) -> bool {
        !self.get(entity).is_empty()
    }

    /// Add a filter, replacing the value of an existing `(field, op)` slot.
    ///
    /// Empty search input is rejected before the registry is touched; the
    /// caller is expected to re-prompt.
    pub fn add(&mut self, entity: &str, filter: Filter) -> Result<(), FilterError> {
        if filter.value.is_blank() {
            return Err(FilterError::EmptyValue {
                field: filter.field,
            });
        }

        let filters = self.0.entry(entity.to_string()).or_default();
        match filters
            .iter_mut()
            .find(|item| item.same_slot(&filter.field, filter.op))
        {
            Some(existing) => {
                existing.value = filter.value;
                existing.scope = filter.scope;
            }
            None => filters.push(filter),
        }

        Ok(())
    }

    /// Remove the filter occupying the `(field, op)` slot, if any.
    pub fn remove(&mut self, entity: &str, field: &str, op: FilterOp) {
        if let Some(filters) = self.0.get_mut(entity) {
            filters.retain(|item| !item.same_slot(field, op));
            if filters.is_empty() {
                self.0.remove(entity);
            }
        }
    }

    pub fn remove_all(&mut self, entity: &str) {
        self.0.remove(entity);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Parse a default-filter string of the form
/// `field1.contains=foo&field2.equalsOneOf=a,b`.
///
/// Unparsable segments are skipped; seeding defaults must not fail screen
/// selection.
#[must_use]
pub fn parse_filters(raw: &str) -> Vec<Filter> {
    raw.split('&')
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=')?;
            let (field, op_label) = key.rsplit_once('.')?;
            let op = FilterOp::parse(op_label)?;
            if field.is_empty() || value.is_empty() {
                return None;
            }

            let value = match op {
                FilterOp::EqualsOneOf => {
                    Value::List(value.split(',').map(Value::from).collect())
                }
                FilterOp::Contains | FilterOp::Equals => Value::from(value),
            };

            Some(Filter::new(field, op, value))
        })
        .collect()
}
