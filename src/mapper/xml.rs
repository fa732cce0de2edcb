//! XML wire mapper, the API's default format.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::MoneybirdError;
use crate::mapper::{
    camel_to_kebab, resolve, wire_attributes, wire_to_camel, Parsed, Registered, Subject,
    WireMapper,
};
use crate::model::{collect_unchecked, Collection, Entity, Value};
use crate::Result;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Maps entities to and from the API's XML documents.
#[derive(Debug, Default, Clone)]
pub struct XmlMapper;

impl XmlMapper {
    /// Create an XML mapper.
    pub fn new() -> Self {
        Self
    }
}

impl WireMapper for XmlMapper {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn to_wire(&self, subject: Subject<'_>) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(mapper_err)?;
        match subject {
            Subject::Entity(entity) => {
                write_entity(&mut writer, entity.kind().wire_name(), entity)?;
            }
            Subject::Collection(collection) => write_collection(&mut writer, collection)?,
        }
        String::from_utf8(writer.into_inner()).map_err(mapper_err)
    }

    fn from_wire(&self, input: &str) -> Result<Parsed> {
        let root = parse_tree(input)?;
        node_to_parsed(&root, "")
    }
}

fn mapper_err(err: impl std::fmt::Display) -> MoneybirdError {
    MoneybirdError::Mapper(err.to_string())
}

fn invalid(err: impl std::fmt::Display) -> MoneybirdError {
    MoneybirdError::InvalidDocument(err.to_string())
}

fn write_entity(writer: &mut Writer<Vec<u8>>, name: &str, entity: &Entity) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(mapper_err)?;
    if entity.is_deleted() {
        write_leaf(writer, "_destroy", "1")?;
    }
    for (attr, value) in wire_attributes(entity) {
        write_value(writer, &camel_to_kebab(attr), &value)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(mapper_err)
}

fn write_collection(writer: &mut Writer<Vec<u8>>, collection: &Collection) -> Result<()> {
    let name = collection.kind().collection_wire_name();
    let mut start = BytesStart::new(name);
    if !collection.kind().is_sync() {
        start.push_attribute(("type", "array"));
    }
    writer.write_event(Event::Start(start)).map_err(mapper_err)?;
    for item in collection {
        write_entity(writer, item.kind().wire_name(), item)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(mapper_err)
}

fn write_value(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => {
            let mut start = BytesStart::new(key);
            start.push_attribute(("nil", "true"));
            writer.write_event(Event::Empty(start)).map_err(mapper_err)
        }
        Value::Many(items) => {
            for item in items {
                write_leaf(writer, key, &item.wire_text())?;
            }
            Ok(())
        }
        Value::Entity(entity) => write_entity(writer, entity.kind().wire_name(), entity),
        Value::Collection(collection) => write_collection(writer, collection),
        scalar => write_leaf(writer, key, &scalar.wire_text()),
    }
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, key: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(key)))
        .map_err(mapper_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(mapper_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(key)))
        .map_err(mapper_err)
}

/// Generic parsed element, before registry resolution.
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_tree(input: &str) -> Result<Node> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(start) => {
                stack.push(node_from_start(&start)?);
            }
            Event::Empty(start) => {
                let node = node_from_start(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().map_err(invalid)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(data.as_ref()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| invalid("unbalanced closing element"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(invalid("document ended before the root element closed"));
    }
    root.ok_or_else(|| invalid("document has no root element"))
}

fn node_from_start(start: &BytesStart<'_>) -> Result<Node> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(invalid)?;
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value().map_err(invalid)?.into_owned(),
        ));
    }
    Ok(Node {
        name,
        attrs,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut Vec<Node>, root: &mut Option<Node>, node: Node) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(invalid("multiple root elements")),
    }
    Ok(())
}

fn node_to_parsed(node: &Node, parent_path: &str) -> Result<Parsed> {
    let path = if parent_path.is_empty() {
        node.name.clone()
    } else {
        format!("{parent_path}/{}", node.name)
    };
    match resolve(&path) {
        Some(Registered::Collection(kind)) => {
            let mut items = Vec::with_capacity(node.children.len());
            for child in &node.children {
                match node_to_parsed(child, &path)? {
                    Parsed::Entity(entity) if entity.kind() == kind => items.push(entity),
                    Parsed::Entity(entity) => {
                        return Err(MoneybirdError::TypeMismatch {
                            expected: kind.name(),
                            actual: entity.kind().name(),
                        });
                    }
                    _ => {
                        return Err(invalid(format!(
                            "unexpected child {} in collection {path}",
                            child.name
                        )));
                    }
                }
            }
            Ok(Parsed::Collection(collect_unchecked(kind, items)))
        }
        Some(Registered::Entity(kind)) => {
            let mut fields: Vec<(String, Value)> = Vec::with_capacity(node.children.len());
            for child in &node.children {
                let key = wire_to_camel(&child.name);
                let value = match node_to_parsed(child, &path)? {
                    Parsed::Entity(e) => Value::Entity(e),
                    Parsed::Collection(c) => Value::Collection(c),
                    Parsed::Value(v) => v,
                };
                // Repeated keys collapse into a list (sync id batches).
                if let Some((_, existing)) = fields.iter_mut().find(|(k, _)| *k == key) {
                    match existing {
                        Value::Many(items) => items.push(value),
                        single => {
                            let first = std::mem::replace(single, Value::Null);
                            *single = Value::Many(vec![first, value]);
                        }
                    }
                } else {
                    fields.push((key, value));
                }
            }
            Ok(Parsed::Entity(Entity::from_data(kind, fields, false)?))
        }
        None => Ok(Parsed::Value(cast_leaf(node)?)),
    }
}

fn cast_leaf(node: &Node) -> Result<Value> {
    if node.attr("nil") == Some("true") {
        return Ok(Value::Null);
    }
    let text = node.text.as_str();
    match node.attr("type") {
        Some("integer") => text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid(format!("{}: invalid integer {text:?}", node.name))),
        Some("float") => text
            .trim()
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| invalid(format!("{}: invalid float {text:?}", node.name))),
        Some("boolean") => Ok(Value::Bool(text.trim() == "true")),
        Some("datetime") | Some("date") => parse_datetime(text.trim())
            .ok_or_else(|| invalid(format!("{}: invalid date {text:?}", node.name))),
        _ => Ok(Value::Text(text.to_string())),
    }
}

fn parse_datetime(text: &str) -> Option<Value> {
    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(Value::DateTime(dt));
    }
    Date::parse(text, DATE_FORMAT)
        .ok()
        .map(|date| Value::DateTime(date.midnight().assume_utc()))
}
