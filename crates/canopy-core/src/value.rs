use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Value
///
/// Field values as delivered by the remote source and carried through the
/// pending-change overlay. The engine never interprets values beyond their
/// canonical text form: filtering compares the string representation of
/// both sides, which is also how scalar columns are rendered.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Canonical string form used for display and substring matching.
    ///
    /// Lists join their members with a comma, matching how the remote
    /// source renders multivalue columns.
    #[must_use]
    pub fn text_repr(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::text_repr)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Case-insensitive substring test against another value's text form.
    #[must_use]
    pub fn contains_ci(&self, needle: &Self) -> bool {
        self.text_repr()
            .to_lowercase()
            .contains(&needle.text_repr().to_lowercase())
    }

    /// Case-sensitive equality on canonical text forms.
    #[must_use]
    pub fn text_eq(&self, other: &Self) -> bool {
        self.text_repr() == other.text_repr()
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// True when the canonical text form is empty.
    ///
    /// Used to reject empty search input before it reaches the registry.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) => v.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_repr())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn contains_ci_matches_across_case() {
        let field = Value::from("Engineering");
        assert!(field.contains_ci(&Value::from("eng")));
        assert!(field.contains_ci(&Value::from("NEER")));
        assert!(!field.contains_ci(&Value::from("marketing")));
    }

    #[test]
    fn numeric_values_match_by_text_form() {
        let field = Value::Int(1042);
        assert!(field.contains_ci(&Value::from("04")));
        assert!(field.text_eq(&Value::from("1042")));
    }

    #[test]
    fn list_text_repr_joins_members() {
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(list.text_repr(), "a,b");
    }

    #[test]
    fn blank_detection() {
        assert!(Value::None.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(!Value::Int(0).is_blank());
    }
}
