//! Read-only attribute snapshots.

use std::collections::BTreeMap;

use crate::model::{EntityKind, Value};

/// An immutable snapshot of an entity's assigned attributes.
///
/// Taken with [`crate::model::Entity::disclose`]; later writes to the
/// entity do not show through. This is the read surface serializers and
/// callers get instead of mutable access.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    kind: EntityKind,
    values: BTreeMap<&'static str, Value>,
}

impl Disclosure {
    pub(crate) fn new(kind: EntityKind, values: BTreeMap<&'static str, Value>) -> Self {
        Self { kind, values }
    }

    /// Kind of the entity this snapshot was taken from.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Value of an assigned attribute, if present in the snapshot.
    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.values.get(attr)
    }

    /// True if the attribute was assigned when the snapshot was taken.
    pub fn contains(&self, attr: &str) -> bool {
        self.values.contains_key(attr)
    }

    /// Number of assigned attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing was assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the snapshot in sorted attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}
