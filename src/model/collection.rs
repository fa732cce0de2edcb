//! Homogeneous, kind-checked entity collections.

use crate::error::MoneybirdError;
use crate::model::{Entity, EntityKind, Value};
use crate::Result;

/// An ordered collection of entities, all of one [`EntityKind`].
///
/// Pushing an entity of a different kind fails with
/// [`MoneybirdError::TypeMismatch`], which keeps nested document attributes
/// (`details`, `payments`, ...) well typed without runtime class checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    kind: EntityKind,
    items: Vec<Entity>,
}

impl Collection {
    /// Create an empty collection bound to a kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Kind every item must have.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Append an entity, checking its kind.
    pub fn push(&mut self, entity: Entity) -> Result<()> {
        if entity.kind() != self.kind {
            return Err(MoneybirdError::TypeMismatch {
                expected: self.kind.name(),
                actual: entity.kind().name(),
            });
        }
        self.items.push(entity);
        Ok(())
    }

    /// Append every item of another collection, checking kinds.
    pub fn merge(&mut self, other: Collection) -> Result<()> {
        for item in other.items {
            self.push(item)?;
        }
        Ok(())
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the collection has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.items.iter()
    }

    /// Iterate mutably over the items.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.items.iter_mut()
    }

    /// Item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    /// True if any item is dirty.
    pub fn is_dirty(&self) -> bool {
        self.items.iter().any(Entity::is_dirty)
    }

    /// A fresh collection holding clones of only the dirty items.
    pub fn dirty_items(&self) -> Collection {
        Collection {
            kind: self.kind,
            items: self.items.iter().filter(|i| i.is_dirty()).cloned().collect(),
        }
    }

    /// Clear the dirty state of every item.
    pub fn mark_clean(&mut self) {
        for item in &mut self.items {
            item.mark_clean();
        }
    }

    /// Deep-copy every item as a new, unsaved entity.
    pub fn deep_copy(&self) -> Collection {
        Collection {
            kind: self.kind,
            items: self.items.iter().map(|i| i.deep_copy(&[])).collect(),
        }
    }
}

impl IntoIterator for Collection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<Collection> for Vec<Entity> {
    fn from(collection: Collection) -> Self {
        collection.items
    }
}

/// Collect entities of a known kind. Items of the wrong kind are a
/// programming error here, so this is only used internally after the kind
/// has been checked.
pub(crate) fn collect_unchecked(kind: EntityKind, items: Vec<Entity>) -> Collection {
    Collection { kind, items }
}
