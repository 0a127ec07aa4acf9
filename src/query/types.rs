//! Selection, projection and parameter types consumed by the query compiler

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::QueryBuildError;

/// Field name whose value is a raw search clause rather than a term
pub const KEYWORD_FIELD: &str = "keyword";

/// Query parameter the compiler always pins to `json`
pub const RESPONSE_WRITER_PARAM: &str = "wt";

/// Field whose presence in a projection also requests stored content
pub const CONTENT_FIELD: &str = "content";

/// A scalar term value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => write!(f, "{}", s),
            QueryValue::Integer(i) => write!(f, "{}", i),
            QueryValue::Unsigned(u) => write!(f, "{}", u),
            // Integral floats keep their `.0`
            QueryValue::Float(x) => write!(f, "{:?}", x),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value as i64)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Integer(value as i64)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(QueryValue::Integer)
            .unwrap_or(QueryValue::Unsigned(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl QueryValue {
    /// Convert a JSON scalar, reporting `field` on anything else
    pub fn from_json(field: &str, value: &Value) -> Result<Self, QueryBuildError> {
        match value {
            Value::String(s) => Ok(QueryValue::Text(s.clone())),
            Value::Bool(b) => Ok(QueryValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(QueryValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(QueryValue::Unsigned(u))
                } else if let Some(x) = n.as_f64() {
                    Ok(QueryValue::Float(x))
                } else {
                    Err(QueryBuildError::UnsupportedValue {
                        field: field.to_string(),
                        found: n.to_string(),
                    })
                }
            }
            other => Err(QueryBuildError::UnsupportedValue {
                field: field.to_string(),
                found: other.to_string(),
            }),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Key of a selection criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriterionKey {
    /// A single field
    Field(String),
    /// Fields OR-ed against a shared value
    Group(Vec<String>),
}

impl CriterionKey {
    pub fn is_keyword(&self) -> bool {
        matches!(self, CriterionKey::Field(name) if name == KEYWORD_FIELD)
    }

    /// Label used in error reports
    pub fn label(&self) -> String {
        match self {
            CriterionKey::Field(name) => name.clone(),
            CriterionKey::Group(fields) => format!("({})", fields.join(",")),
        }
    }
}

/// Value of a selection criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CriterionValue {
    One(QueryValue),
    /// Values OR-ed together
    Any(Vec<QueryValue>),
}

macro_rules! criterion_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CriterionValue {
                fn from(value: $ty) -> Self {
                    CriterionValue::One(value.into())
                }
            }
        )*
    };
}

criterion_value_from!(QueryValue, &str, String, i64, i32, u32, u64, f64, bool);

impl From<Vec<QueryValue>> for CriterionValue {
    fn from(values: Vec<QueryValue>) -> Self {
        CriterionValue::Any(values)
    }
}

/// Ordered selection criteria.
///
/// Entries are compiled in insertion order. Re-inserting a key replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    entries: Vec<(CriterionKey, CriterionValue)>,
}

impl SelectionCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a criterion
    pub fn insert(&mut self, key: CriterionKey, value: CriterionValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Match a single field against a single value
    pub fn field(mut self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.insert(
            CriterionKey::Field(name.to_string()),
            CriterionValue::One(value.into()),
        );
        self
    }

    /// Match a single field against any of several values
    pub fn any_of<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.insert(
            CriterionKey::Field(name.to_string()),
            CriterionValue::Any(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Match any of several fields against the same value(s)
    pub fn group(mut self, fields: &[&str], value: impl Into<CriterionValue>) -> Self {
        self.insert(
            CriterionKey::Group(fields.iter().map(|f| f.to_string()).collect()),
            value.into(),
        );
        self
    }

    /// Match any of several fields against any of several values
    pub fn group_any<I, V>(self, fields: &[&str], values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        let values: Vec<QueryValue> = values.into_iter().map(Into::into).collect();
        self.group(fields, values)
    }

    /// Raw search clause. Compilation stops at this entry.
    pub fn keyword(mut self, clause: &str) -> Self {
        self.insert(
            CriterionKey::Field(KEYWORD_FIELD.to_string()),
            CriterionValue::One(QueryValue::Text(clause.to_string())),
        );
        self
    }

    /// Build criteria from a JSON object, keeping its key order.
    ///
    /// Arrays become OR-ed value lists. Field groups have no JSON form.
    pub fn from_json(value: &Value) -> Result<Self, QueryBuildError> {
        let object = value.as_object().ok_or(QueryBuildError::NotAnObject)?;
        let mut criteria = Self::new();
        for (key, raw) in object {
            let value = match raw {
                Value::Array(items) => CriterionValue::Any(
                    items
                        .iter()
                        .map(|item| QueryValue::from_json(key, item))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                scalar => CriterionValue::One(QueryValue::from_json(key, scalar)?),
            };
            criteria.insert(CriterionKey::Field(key.clone()), value);
        }
        Ok(criteria)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CriterionKey, CriterionValue)> {
        self.entries.iter()
    }
}

/// Fields to return from a read query
pub type Projection = BTreeSet<String>;

/// Build a projection from field names
pub fn projection<I, S>(fields: I) -> Projection
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

/// Value of an extra query parameter. `None` renders as a bare `&name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Single(Option<QueryValue>),
    Repeated(Vec<Option<QueryValue>>),
}

/// Ordered extra query parameters such as `start` and `rows`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, name: &str, value: ParamValue) {
        // The response writer is pinned by the compiler
        if name == RESPONSE_WRITER_PARAM {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn set(mut self, name: &str, value: impl Into<QueryValue>) -> Self {
        self.put(name, ParamValue::Single(Some(value.into())));
        self
    }

    /// Repeat `name` once per value
    pub fn set_repeated<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.put(
            name,
            ParamValue::Repeated(values.into_iter().map(|v| Some(v.into())).collect()),
        );
        self
    }

    /// Parameter without a value
    pub fn flag(mut self, name: &str) -> Self {
        self.put(name, ParamValue::Single(None));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.entries.iter()
    }
}
