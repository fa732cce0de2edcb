//! Wire mapping between domain entities and the API's XML/JSON documents.

mod case;
mod json;
mod registry;
mod xml;

pub use case::{camel_to_kebab, wire_to_camel};
pub use json::JsonMapper;
pub use registry::{resolve, Registered};
pub use xml::XmlMapper;

use crate::model::{Collection, Entity, Value};
use crate::Result;

/// What a serializer is handed.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A single entity
    Entity(&'a Entity),
    /// A collection of entities
    Collection(&'a Collection),
}

/// What a parse produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The root resolved to a single entity
    Entity(Entity),
    /// The root resolved to a collection
    Collection(Collection),
    /// The root was not a registered element; its cast scalar value
    Value(Value),
}

impl Parsed {
    /// Unwrap an entity root.
    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Parsed::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Unwrap a collection root.
    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Parsed::Collection(c) => Some(c),
            _ => None,
        }
    }
}

/// A bidirectional mapper for one wire format.
///
/// The connector is generic over this: the XML mapper is the default, the
/// JSON mapper a drop-in alternative. Both share the registry and the
/// serialization policy; only the document syntax differs.
pub trait WireMapper: Send + Sync {
    /// MIME type sent as `Content-Type`.
    fn content_type(&self) -> &'static str;

    /// Document extension used in request URLs.
    fn extension(&self) -> &'static str;

    /// Serialize a subject to a wire document.
    fn to_wire(&self, subject: Subject<'_>) -> Result<String>;

    /// Parse a wire document into entities.
    fn from_wire(&self, input: &str) -> Result<Parsed>;
}

/// The attributes a save request carries.
///
/// A persisted entity sends only its dirty attributes plus `id` (an empty
/// dirty set still sends `id`), which is what makes PUT updates partial. A
/// new entity sends its full assigned set.
pub(crate) fn wire_attributes(entity: &Entity) -> Vec<(&'static str, Value)> {
    match entity.id() {
        Some(id) => {
            let mut attrs = entity.dirty_attributes();
            attrs.push(("id", Value::Text(id)));
            attrs
        }
        None => entity.assigned().map(|(k, v)| (k, v.clone())).collect(),
    }
}
