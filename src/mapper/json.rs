//! JSON wire mapper, a drop-in alternative to the XML default.

use serde_json::{json, Map, Value as Json};

use crate::error::MoneybirdError;
use crate::mapper::{
    camel_to_kebab, resolve, wire_attributes, wire_to_camel, Parsed, Registered, Subject,
    WireMapper,
};
use crate::model::{collect_unchecked, Collection, Entity, EntityKind, Value};
use crate::Result;

/// Maps entities to and from JSON documents.
///
/// The root element name resolves through the same registry as XML; nested
/// collections resolve through the entity schema's declared child kinds, so
/// both underscore and dash key spellings parse. JSON carries no type
/// annotations, so date strings stay strings on this path.
#[derive(Debug, Default, Clone)]
pub struct JsonMapper;

impl JsonMapper {
    /// Create a JSON mapper.
    pub fn new() -> Self {
        Self
    }
}

impl WireMapper for JsonMapper {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn to_wire(&self, subject: Subject<'_>) -> Result<String> {
        let document = match subject {
            Subject::Entity(entity) => {
                json!({ entity.kind().wire_name(): entity_body(entity)? })
            }
            Subject::Collection(collection) => {
                json!({ collection.kind().collection_wire_name(): collection_body(collection)? })
            }
        };
        serde_json::to_string(&document).map_err(|e| MoneybirdError::Mapper(e.to_string()))
    }

    fn from_wire(&self, input: &str) -> Result<Parsed> {
        let document: Json = serde_json::from_str(input)
            .map_err(|e| MoneybirdError::InvalidDocument(e.to_string()))?;
        let Json::Object(root) = document else {
            return Err(MoneybirdError::InvalidDocument(
                "expected a JSON object root".to_string(),
            ));
        };
        let Some((key, body)) = root.into_iter().next() else {
            return Err(MoneybirdError::InvalidDocument(
                "empty JSON document".to_string(),
            ));
        };
        // Registry keys are spelled with dashes.
        let registered = resolve(&key).or_else(|| resolve(&key.replace('_', "-")));
        match registered {
            Some(Registered::Entity(kind)) => Ok(Parsed::Entity(parse_entity(kind, body)?)),
            Some(Registered::Collection(kind)) => {
                Ok(Parsed::Collection(parse_collection(kind, body)?))
            }
            None => Ok(Parsed::Value(scalar_value(body))),
        }
    }
}

fn entity_body(entity: &Entity) -> Result<Json> {
    let mut body = Map::new();
    if entity.is_deleted() {
        body.insert("_destroy".to_string(), json!(1));
    }
    for (attr, value) in wire_attributes(entity) {
        match value {
            Value::Entity(child) => {
                body.insert(child.kind().wire_name().to_string(), entity_body(&child)?);
            }
            Value::Collection(children) => {
                body.insert(
                    children.kind().collection_wire_name().to_string(),
                    collection_body(&children)?,
                );
            }
            scalar => {
                body.insert(camel_to_kebab(attr), scalar_json(&scalar));
            }
        }
    }
    Ok(Json::Object(body))
}

fn collection_body(collection: &Collection) -> Result<Json> {
    let mut items = Vec::with_capacity(collection.len());
    for item in collection {
        items.push(entity_body(item)?);
    }
    Ok(Json::Array(items))
}

fn scalar_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Integer(i) => json!(i),
        Value::Many(items) => Json::Array(items.iter().map(scalar_json).collect()),
        // Decimals serialize as strings so money amounts keep their scale.
        other => json!(other.wire_text()),
    }
}

fn parse_entity(kind: EntityKind, body: Json) -> Result<Entity> {
    let Json::Object(fields) = body else {
        return Err(MoneybirdError::InvalidDocument(format!(
            "{kind}: expected a JSON object"
        )));
    };
    let schema = kind.schema();
    let mut data: Vec<(String, Value)> = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let camel = wire_to_camel(&key);
        let value = match schema.child_kind(&camel) {
            Some(child) => Value::Collection(parse_collection(child, value)?),
            None => match value {
                // Undeclared nested objects have no kind to parse into.
                Json::Object(_) => continue,
                other => scalar_value(other),
            },
        };
        data.push((camel, value));
    }
    Entity::from_data(kind, data, false)
}

fn parse_collection(kind: EntityKind, body: Json) -> Result<Collection> {
    let Json::Array(items) = body else {
        return Err(MoneybirdError::InvalidDocument(format!(
            "{kind}: expected a JSON array"
        )));
    };
    let mut entities = Vec::with_capacity(items.len());
    for item in items {
        entities.push(parse_entity(kind, item)?);
    }
    Ok(collect_unchecked(kind, entities))
}

fn scalar_value(value: Json) -> Value {
    match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n
                .to_string()
                .parse()
                .map(Value::Decimal)
                .unwrap_or(Value::Text(n.to_string())),
        },
        Json::String(s) => Value::Text(s),
        Json::Array(items) => Value::Many(items.into_iter().map(scalar_value).collect()),
        Json::Object(_) => Value::Null,
    }
}
