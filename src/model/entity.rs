//! Generic dirty-tracking domain entity.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::MoneybirdError;
use crate::model::{Collection, Disclosure, EntityKind, RequiredRule, Value};
use crate::Result;

static NULL: Value = Value::Null;

fn valid_id(value: &Value) -> bool {
    value
        .id_string()
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

/// A domain entity: an attribute bag typed by [`EntityKind`], with dirty
/// tracking on every write.
///
/// All mutation goes through [`set_data`](Entity::set_data) (or the
/// unfiltered constructor path used by the wire mapper); there is no
/// per-attribute setter. That is deliberate: every write is recorded in the
/// dirty set, which is what makes partial updates work.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    values: BTreeMap<&'static str, Value>,
    dirty: BTreeSet<&'static str>,
    deleted: bool,
}

impl Entity {
    /// Create an empty entity of the given kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
            dirty: BTreeSet::new(),
            deleted: false,
        }
    }

    /// Construct an entity from wire or caller data.
    ///
    /// Unlike [`set_data`](Entity::set_data) this path may assign `id` and
    /// read-only attributes; the mapper uses it with `is_dirty = false` so
    /// freshly parsed entities start clean.
    pub fn from_data<K, I>(kind: EntityKind, data: I, is_dirty: bool) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut entity = Self::new(kind);
        entity.apply(data, is_dirty, false)?;
        Ok(entity)
    }

    /// Kind of this entity.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Bulk-assign declared attributes.
    ///
    /// `id` and read-only attributes in the payload are skipped, unknown
    /// keys are ignored. Each accepted attribute is marked dirty or clean
    /// per `is_dirty`. Attribute-specific validation applies: ids must be
    /// digit strings or null, an envelope send method must be one of
    /// `hand`, `email` or `post`, and a nested collection must match the
    /// child kind declared for its attribute.
    pub fn set_data<K, I>(&mut self, data: I, is_dirty: bool) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        self.apply(data, is_dirty, true)
    }

    fn apply<K, I>(&mut self, data: I, is_dirty: bool, filter: bool) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let schema = self.kind.schema();
        for (key, value) in data {
            let Some(name) = schema.attribute(key.as_ref()) else {
                continue;
            };
            let protected = name == "id" || schema.is_readonly(name);
            if filter && protected {
                continue;
            }
            self.check(name, &value)?;
            if name == "url" {
                self.derive_pdf_url(&value);
            }
            self.values.insert(name, value);
            if is_dirty && !protected {
                self.dirty.insert(name);
            }
        }
        Ok(())
    }

    fn check(&self, name: &'static str, value: &Value) -> Result<()> {
        if name == "id" && !value.is_null() {
            // A sync marker carries a whole batch of ids.
            let valid = match value {
                Value::Many(ids) if self.kind.is_sync() => ids.iter().all(valid_id),
                single => valid_id(single),
            };
            if !valid {
                return Err(MoneybirdError::InvalidId(format!(
                    "{} id must be a positive integer, got {}",
                    self.kind,
                    value.wire_text()
                )));
            }
        }
        if name == "sendMethod" && self.kind.is_envelope() {
            let valid = matches!(value.as_str(), Some("hand" | "email" | "post"));
            if !valid {
                return Err(MoneybirdError::InvalidSendMethod(value.wire_text()));
            }
        }
        if let Some(child) = self.kind.schema().child_kind(name) {
            match value {
                Value::Collection(c) if c.kind() == child => {}
                Value::Null => {}
                Value::Collection(c) => {
                    return Err(MoneybirdError::TypeMismatch {
                        expected: child.name(),
                        actual: c.kind().name(),
                    });
                }
                other => {
                    return Err(MoneybirdError::TypeMismatch {
                        expected: child.name(),
                        actual: other.type_name(),
                    });
                }
            }
        }
        Ok(())
    }

    // The API exposes the document pdf next to its html url.
    fn derive_pdf_url(&mut self, url: &Value) {
        if self.kind.schema().attribute("pdfUrl").is_none() {
            return;
        }
        if let Some(url) = url.as_str() {
            self.values
                .insert("pdfUrl", Value::Text(format!("{url}.pdf")));
        }
    }

    /// Read a declared attribute. Declared but unassigned attributes read
    /// as [`Value::Null`]; undeclared names fail.
    pub fn get(&self, attr: &str) -> Result<&Value> {
        let Some(name) = self.kind.schema().attribute(attr) else {
            return Err(MoneybirdError::Undisclosed(format!(
                "{}.{attr}",
                self.kind
            )));
        };
        Ok(self.values.get(name).unwrap_or(&NULL))
    }

    /// True if the attribute has been assigned.
    pub fn has(&self, attr: &str) -> bool {
        self.values.contains_key(attr)
    }

    /// Canonical id string, if the entity is persisted.
    pub fn id(&self) -> Option<String> {
        self.values.get("id").and_then(Value::id_string)
    }

    /// True once the server has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Immutable snapshot of the assigned attributes.
    pub fn disclose(&self) -> Disclosure {
        Disclosure::new(self.kind, self.values.clone())
    }

    /// Iterate over the assigned attributes in declaration-independent
    /// (sorted) order.
    pub fn assigned(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// True if any own attribute is dirty, the delete flag is set, or a
    /// nested entity or collection is itself dirty.
    pub fn is_dirty(&self) -> bool {
        if !self.dirty.is_empty() || self.deleted {
            return true;
        }
        self.values.values().any(|v| match v {
            Value::Entity(e) => e.is_dirty(),
            Value::Collection(c) => c.is_dirty(),
            _ => false,
        })
    }

    /// The attributes a partial update must carry: dirty scalars and
    /// entities, plus a fresh collection holding only the dirty children
    /// of each nested collection.
    pub fn dirty_attributes(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        for (name, value) in &self.values {
            match value {
                Value::Collection(c) => {
                    let dirty = c.dirty_items();
                    if !dirty.is_empty() {
                        out.push((*name, Value::Collection(dirty)));
                    }
                }
                other if self.dirty.contains(name) => out.push((*name, other.clone())),
                _ => {}
            }
        }
        out
    }

    /// Clear the dirty set, recursively.
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
        for value in self.values.values_mut() {
            match value {
                Value::Entity(e) => e.mark_clean(),
                Value::Collection(c) => c.mark_clean(),
                _ => {}
            }
        }
    }

    /// Adopt the state of a reloaded entity, resetting all dirtiness.
    pub fn reload(&mut self, other: Entity) {
        self.values = other.values;
        self.dirty.clear();
        self.deleted = false;
    }

    /// Deep-clone the entity as a new, unsaved one.
    ///
    /// `id`, read-only attributes, the kind's own copy exclusions (a
    /// contact's `customerId`) and the caller's `exclude` list are
    /// dropped; nested entities and collections are copied recursively.
    /// Every copied attribute is dirty, so the copy saves in full.
    pub fn deep_copy(&self, exclude: &[&str]) -> Entity {
        let schema = self.kind.schema();
        let mut copy = Entity::new(self.kind);
        for (name, value) in &self.values {
            if *name == "id"
                || schema.is_readonly(name)
                || self.kind.copy_exclude().contains(name)
                || exclude.contains(name)
            {
                continue;
            }
            let value = match value {
                Value::Entity(e) => Value::Entity(e.deep_copy(&[])),
                Value::Collection(c) => Value::Collection(c.deep_copy()),
                other => other.clone(),
            };
            copy.values.insert(name, value);
            copy.dirty.insert(name);
        }
        copy
    }

    /// Check the kind's required-attribute rules.
    pub fn validate(&self) -> Result<()> {
        let schema = self.kind.schema();
        for rule in schema.required {
            match rule {
                RequiredRule::Attr(attr) => {
                    if !self.is_assigned(attr) {
                        return Err(self.invalid(format!("{attr} is required")));
                    }
                }
                RequiredRule::AnyOf(attrs) => {
                    if !attrs.iter().any(|a| self.is_assigned(a)) {
                        return Err(
                            self.invalid(format!("one of {} is required", attrs.join(", ")))
                        );
                    }
                }
            }
        }
        if schema.requires_details {
            let has_detail = self
                .values
                .get("details")
                .and_then(Value::as_collection)
                .is_some_and(|c| !c.is_empty());
            if !has_detail {
                return Err(self.invalid("at least one detail line is required".to_string()));
            }
        }
        Ok(())
    }

    fn is_assigned(&self, attr: &str) -> bool {
        self.values.get(attr).is_some_and(|v| !v.is_null())
    }

    fn invalid(&self, message: String) -> MoneybirdError {
        MoneybirdError::NotValid {
            message: format!("{}: {message}", self.kind),
            errors: Default::default(),
        }
    }

    /// Flag a line item for deletion on the next save of its document.
    pub fn mark_deleted(&mut self) -> Result<()> {
        if !self.kind.schema().deletable {
            return Err(MoneybirdError::InvalidState(format!(
                "{} cannot be deleted by saving",
                self.kind
            )));
        }
        self.deleted = true;
        Ok(())
    }

    /// True if the line item is flagged for deletion.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Entity {
        Entity::new(EntityKind::Contact)
    }

    #[test]
    fn test_set_data_marks_dirty() {
        let mut c = contact();
        c.set_data([("companyName", Value::from("Acme"))], true)
            .unwrap();
        assert!(c.is_dirty());
        assert_eq!(
            c.dirty_attributes(),
            vec![("companyName", Value::from("Acme"))]
        );
    }

    #[test]
    fn test_set_data_clean_load_is_not_dirty() {
        let mut c = contact();
        c.set_data([("companyName", Value::from("Acme"))], false)
            .unwrap();
        assert!(!c.is_dirty());
        assert!(c.dirty_attributes().is_empty());
    }

    #[test]
    fn test_readonly_attributes_are_skipped_by_set_data() {
        let mut c = contact();
        c.set_data([("revision", Value::from(7)), ("id", Value::from(3))], true)
            .unwrap();
        assert!(c.get("revision").unwrap().is_null());
        assert!(c.id().is_none());
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_constructor_path_sets_readonly_and_id() {
        let c = Entity::from_data(
            EntityKind::Contact,
            [("id", Value::from(3)), ("revision", Value::from(7))],
            false,
        )
        .unwrap();
        assert_eq!(c.id().as_deref(), Some("3"));
        assert_eq!(c.get("revision").unwrap().as_integer(), Some(7));
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut c = contact();
        c.set_data([("nonsense", Value::from("x"))], true).unwrap();
        assert!(!c.is_dirty());
        assert!(c.get("nonsense").is_err());
    }

    #[test]
    fn test_id_must_be_digits() {
        let result = Entity::from_data(EntityKind::Contact, [("id", Value::from("12x"))], false);
        assert!(matches!(result, Err(MoneybirdError::InvalidId(_))));
        let result = Entity::from_data(EntityKind::Contact, [("id", Value::Null)], false);
        assert!(result.is_ok());
    }

    #[test]
    fn test_envelope_send_method_is_validated() {
        let mut env = Entity::new(EntityKind::InvoiceEnvelope);
        let result = env.set_data([("sendMethod", Value::from("pigeon"))], true);
        assert!(matches!(result, Err(MoneybirdError::InvalidSendMethod(_))));
        env.set_data([("sendMethod", Value::from("email"))], true)
            .unwrap();
    }

    #[test]
    fn test_collection_attribute_is_kind_checked() {
        let mut invoice = Entity::new(EntityKind::Invoice);
        let wrong = Collection::new(EntityKind::EstimateDetail);
        let result = invoice.set_data([("details", Value::from(wrong))], true);
        assert!(matches!(result, Err(MoneybirdError::TypeMismatch { .. })));
    }

    #[test]
    fn test_nested_dirty_propagates() {
        let mut detail = Entity::new(EntityKind::InvoiceDetail);
        detail
            .set_data([("description", Value::from("Work"))], true)
            .unwrap();
        let mut details = Collection::new(EntityKind::InvoiceDetail);
        details.push(detail).unwrap();
        let invoice = Entity::from_data(
            EntityKind::Invoice,
            [("details", Value::from(details))],
            false,
        )
        .unwrap();
        assert!(invoice.is_dirty());
        let dirty = invoice.dirty_attributes();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, "details");
    }

    #[test]
    fn test_dirty_collection_contains_only_dirty_children() {
        let clean = Entity::from_data(
            EntityKind::InvoiceDetail,
            [("description", Value::from("Old"))],
            false,
        )
        .unwrap();
        let mut touched = Entity::new(EntityKind::InvoiceDetail);
        touched
            .set_data([("description", Value::from("New"))], true)
            .unwrap();
        let mut details = Collection::new(EntityKind::InvoiceDetail);
        details.push(clean).unwrap();
        details.push(touched).unwrap();
        let invoice = Entity::from_data(
            EntityKind::Invoice,
            [("details", Value::from(details))],
            false,
        )
        .unwrap();
        let dirty = invoice.dirty_attributes();
        let collection = dirty[0].1.as_collection().unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.iter().next().unwrap().get("description").unwrap(),
            &Value::from("New")
        );
    }

    #[test]
    fn test_reload_resets_dirtiness() {
        let mut c = contact();
        c.set_data([("companyName", Value::from("Acme"))], true)
            .unwrap();
        let fresh = Entity::from_data(
            EntityKind::Contact,
            [("id", Value::from(5)), ("companyName", Value::from("Acme"))],
            false,
        )
        .unwrap();
        c.reload(fresh);
        assert!(!c.is_dirty());
        assert_eq!(c.id().as_deref(), Some("5"));
    }

    #[test]
    fn test_deep_copy_drops_readonly_and_excluded() {
        let c = Entity::from_data(
            EntityKind::Contact,
            [
                ("id", Value::from(5)),
                ("revision", Value::from(2)),
                ("companyName", Value::from("Acme")),
                ("email", Value::from("acme@example.test")),
            ],
            false,
        )
        .unwrap();
        let copy = c.deep_copy(&["email"]);
        assert!(copy.id().is_none());
        assert!(copy.get("revision").unwrap().is_null());
        assert!(copy.get("email").unwrap().is_null());
        assert_eq!(copy.get("companyName").unwrap().as_str(), Some("Acme"));
        assert!(copy.is_dirty());
    }

    #[test]
    fn test_deep_copy_never_carries_the_customer_id() {
        let c = Entity::from_data(
            EntityKind::Contact,
            [
                ("id", Value::from(5)),
                ("companyName", Value::from("Acme")),
                ("customerId", Value::from("C-1")),
            ],
            false,
        )
        .unwrap();
        let copy = c.deep_copy(&[]);
        assert!(copy.get("customerId").unwrap().is_null());
        assert_eq!(copy.get("companyName").unwrap().as_str(), Some("Acme"));
    }

    #[test]
    fn test_validate_any_of_group() {
        let mut c = contact();
        assert!(matches!(
            c.validate(),
            Err(MoneybirdError::NotValid { .. })
        ));
        c.set_data([("lastname", Value::from("Jansen"))], true)
            .unwrap();
        c.validate().unwrap();
    }

    #[test]
    fn test_validate_requires_detail_line() {
        let mut invoice = Entity::new(EntityKind::Invoice);
        invoice
            .set_data([("contactId", Value::from(9))], true)
            .unwrap();
        assert!(invoice.validate().is_err());
        let mut detail = Entity::new(EntityKind::InvoiceDetail);
        detail
            .set_data([("description", Value::from("Work"))], true)
            .unwrap();
        let mut details = Collection::new(EntityKind::InvoiceDetail);
        details.push(detail).unwrap();
        invoice
            .set_data([("details", Value::from(details))], true)
            .unwrap();
        invoice.validate().unwrap();
    }

    #[test]
    fn test_mark_deleted_only_on_line_items() {
        let mut c = contact();
        assert!(matches!(
            c.mark_deleted(),
            Err(MoneybirdError::InvalidState(_))
        ));
        let mut detail = Entity::new(EntityKind::InvoiceDetail);
        detail.mark_deleted().unwrap();
        assert!(detail.is_deleted());
        assert!(detail.is_dirty());
    }

    #[test]
    fn test_url_assignment_derives_pdf_url() {
        let invoice = Entity::from_data(
            EntityKind::Invoice,
            [("url", Value::from("https://example.test/invoice/abc"))],
            false,
        )
        .unwrap();
        assert_eq!(
            invoice.get("pdfUrl").unwrap().as_str(),
            Some("https://example.test/invoice/abc.pdf")
        );
    }
}
