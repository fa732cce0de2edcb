//! Attribute values of domain entities.

use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::model::{Collection, Entity};

/// A single attribute value.
///
/// The wire format types (`type="integer"`, `type="float"`, ...) map onto
/// this closed set; nested entities and collections are values too, which is
/// what lets the mapper recurse without reflection.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null (`nil="true"` on the wire)
    Null,
    /// Plain string, the wire default
    Text(String),
    /// `type="integer"`
    Integer(i64),
    /// `type="float"`; money values keep decimal precision
    Decimal(Decimal),
    /// `type="boolean"`
    Bool(bool),
    /// `type="datetime"` or `type="date"`
    DateTime(OffsetDateTime),
    /// A nested domain entity
    Entity(Entity),
    /// A nested homogeneous collection
    Collection(Collection),
    /// Repeated scalar elements under the same key (sync id batches)
    Many(Vec<Value>),
}

impl Value {
    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text content, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an `Integer` value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean content, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Decimal content, if this is a `Decimal` value.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow the nested entity, if any.
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the nested collection, if any.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Render an id-bearing value as the canonical id string.
    ///
    /// Ids arrive as `type="integer"` from the server but are set as strings
    /// by callers; both spell the same id.
    pub fn id_string(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "string",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "float",
            Value::Bool(_) => "boolean",
            Value::DateTime(_) => "datetime",
            Value::Entity(_) => "entity",
            Value::Collection(_) => "collection",
            Value::Many(_) => "list",
        }
    }

    /// Wire text rendition of a scalar value. Entities, collections and
    /// lists have no single-text form and render empty.
    pub fn wire_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::DateTime(dt) => dt.format(&Rfc3339).unwrap_or_default(),
            Value::Entity(_) | Value::Collection(_) | Value::Many(_) => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(dt: OffsetDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Entity(entity)
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Value::Collection(collection)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_wire_text_scalars() {
        assert_eq!(Value::Text("Acme".into()).wire_text(), "Acme");
        assert_eq!(Value::Integer(42).wire_text(), "42");
        assert_eq!(Value::Bool(true).wire_text(), "true");
        assert_eq!(Value::Bool(false).wire_text(), "false");
        assert_eq!(Value::Null.wire_text(), "");
    }

    #[test]
    fn test_wire_text_datetime_is_rfc3339() {
        let dt = datetime!(2012-03-08 10:15:50 +01:00);
        assert_eq!(
            Value::DateTime(dt).wire_text(),
            "2012-03-08T10:15:50+01:00"
        );
    }

    #[test]
    fn test_id_string_accepts_integer_and_text() {
        assert_eq!(Value::Integer(99).id_string().as_deref(), Some("99"));
        assert_eq!(Value::Text("99".into()).id_string().as_deref(), Some("99"));
        assert_eq!(Value::Bool(true).id_string(), None);
    }
}
