use crate::{filter::FilterError, selection::SelectionError, tree::TreeError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Expected conditions (stale responses, empty filter input, incomplete
/// hierarchies) never surface through this type; they are reported as
/// [`crate::engine::Notice`] values. `InternalError` is reserved for the
/// fallible read surface and genuine invariant violations.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an engine-origin not-found error for an unregistered entity.
    pub fn entity_not_found(name: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Engine,
            format!("entity '{}' is not registered", name.into()),
        )
    }

    /// Construct a state-origin invariant violation.
    pub(crate) fn state_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::State,
            message.into(),
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<FilterError> for InternalError {
    fn from(err: FilterError) -> Self {
        Self::new(ErrorClass::Invalid, ErrorOrigin::Filter, err.to_string())
    }
}

impl From<TreeError> for InternalError {
    fn from(err: TreeError) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Tree,
            err.to_string(),
        )
    }
}

impl From<SelectionError> for InternalError {
    fn from(err: SelectionError) -> Self {
        let class = match err {
            SelectionError::UnknownRecord { .. } => ErrorClass::NotFound,
            SelectionError::IncompleteHierarchy { .. } | SelectionError::RootDisabled { .. } => {
                ErrorClass::Invalid
            }
        };

        Self::new(class, ErrorOrigin::Selection, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Invalid,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    State,
    Filter,
    Tree,
    Selection,
    Pending,
    Engine,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::State => "state",
            Self::Filter => "filter",
            Self::Tree => "tree",
            Self::Selection => "selection",
            Self::Pending => "pending",
            Self::Engine => "engine",
        };
        write!(f, "{label}")
    }
}
