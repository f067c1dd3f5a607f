//! Equality filters, rendered as OData for the remote table and evaluated
//! in-process for the local store.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::infra::codec::Entity;

/// Characters left unescaped in a query component, as in JavaScript's `encodeURIComponent`.
pub const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    And(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn and(self, other: Filter) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// OData `$filter` expression, e.g. `email eq 'a@b.com'`.
    pub fn to_odata(&self) -> String {
        match self {
            Self::Eq(field, value) => format!("{field} eq {}", odata_literal(value)),
            Self::And(left, right) => format!("({}) and ({})", left.to_odata(), right.to_odata()),
        }
    }

    /// The expression as a percent-encoded query component.
    pub fn to_query_component(&self) -> String {
        utf8_percent_encode(&self.to_odata(), QUERY_COMPONENT).to_string()
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::Eq(field, expected) => entity
                .attribute(field)
                .is_some_and(|actual| loosely_equal(&actual, expected)),
            Self::And(left, right) => left.matches(entity) && right.matches(entity),
        }
    }
}

fn odata_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "''".to_owned(),
        nested => format!("'{}'", nested.to_string().replace('\'', "''")),
    }
}

// Numbers compare by value so `1` and `1.0` match, as they do on the server.
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::Null) | (Value::Null, Value::String(a)) => a.is_empty(),
        _ => actual == expected,
    }
}
