use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::{DaoError, DaoResult};

/// Column type as seen by the row mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Text,
    Decimal,
    Date,
    Timestamp,
}

/// A single bound parameter or decoded column value.
///
/// NULL carries its kind so strictly typed stores can bind it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(Kind),
    Int(i64),
    Text(String),
    Decimal(Decimal),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null(kind) => *kind,
            Self::Int(_) => Kind::Int,
            Self::Text(_) => Kind::Text,
            Self::Decimal(_) => Kind::Decimal,
            Self::Date(_) => Kind::Date,
            Self::Timestamp(_) => Kind::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Wraps an optional value, falling back to a typed NULL.
    pub fn nullable<T: Into<Value>>(value: Option<T>, kind: Kind) -> Self {
        value.map_or(Self::Null(kind), Into::into)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

/// A column a query is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: Kind,
}

impl Column {
    pub const fn new(name: &'static str, kind: Kind) -> Self {
        Self { name, kind }
    }
}

/// Conversion out of a [`Value`] of the matching kind.
pub trait FromValue: Sized {
    const KIND: Kind;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    const KIND: Kind = Kind::Int;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    const KIND: Kind = Kind::Text;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Decimal {
    const KIND: Kind = Kind::Decimal;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for NaiveDate {
    const KIND: Kind = Kind::Date;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for NaiveDateTime {
    const KIND: Kind = Kind::Timestamp;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

/// One result row: named values in the order the query declared them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.values.push((name.into(), value));
    }

    /// Builder form of [`Row::push`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads a non-null column.
    ///
    /// Fails with [`DaoError::Mapping`] if the column is absent, NULL, or of
    /// another kind.
    pub fn required<T: FromValue>(&self, name: &str) -> DaoResult<T> {
        match self.get(name) {
            None => Err(DaoError::Mapping(format!("column `{name}` is missing"))),
            Some(Value::Null(_)) => Err(DaoError::Mapping(format!("column `{name}` is null"))),
            Some(value) => Self::convert(name, value),
        }
    }

    /// Reads a nullable column; absent and NULL both map to `None`.
    pub fn optional<T: FromValue>(&self, name: &str) -> DaoResult<Option<T>> {
        match self.get(name) {
            None | Some(Value::Null(_)) => Ok(None),
            Some(value) => Self::convert(name, value).map(Some),
        }
    }

    fn convert<T: FromValue>(name: &str, value: &Value) -> DaoResult<T> {
        T::from_value(value).ok_or_else(|| {
            DaoError::Mapping(format!(
                "column `{name}` holds {:?}, expected {:?}",
                value.kind(),
                T::KIND
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_distinguishes_missing_from_null() {
        let row = Row::new().with("id", 7_i64).with("name", Value::Null(Kind::Text));

        assert_eq!(row.required::<i64>("id").unwrap(), 7);

        let missing = row.required::<String>("producer").unwrap_err();
        assert_eq!(missing.to_string(), "Mapping failed: column `producer` is missing");

        let null = row.required::<String>("name").unwrap_err();
        assert_eq!(null.to_string(), "Mapping failed: column `name` is null");
    }

    #[test]
    fn optional_tolerates_missing_and_null() {
        let row = Row::new().with("price", Value::Null(Kind::Decimal));

        assert_eq!(row.optional::<Decimal>("price").unwrap(), None);
        assert_eq!(row.optional::<Decimal>("creation_time").unwrap(), None);
    }

    #[test]
    fn kind_mismatch_is_a_mapping_failure() {
        let row = Row::new().with("id", "seven");

        assert!(matches!(row.required::<i64>("id"), Err(DaoError::Mapping(_))));
        assert!(matches!(row.optional::<i64>("id"), Err(DaoError::Mapping(_))));
    }

    #[test]
    fn nullable_keeps_the_kind() {
        assert_eq!(Value::nullable(None::<String>, Kind::Text), Value::Null(Kind::Text));
        assert_eq!(Value::nullable(Some(3_i64), Kind::Int), Value::Int(3));
        assert_eq!(Value::Null(Kind::Date).kind(), Kind::Date);
    }
}
