//! Domain model: entity kinds, dirty-tracking entities, typed collections
//! and read-only disclosures.

mod collection;
mod disclosure;
mod entity;
mod envelope;
mod kind;
mod value;

pub use collection::Collection;
pub(crate) use collection::collect_unchecked;
pub use disclosure::Disclosure;
pub use entity::Entity;
pub use envelope::{Envelope, SendMethod};
pub use kind::{EntityKind, RequiredRule, Schema};
pub use value::Value;
