//! Delivery envelopes for sending documents.

use crate::model::{Entity, EntityKind, Value};
use crate::Result;

/// How a document leaves the administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendMethod {
    /// Mark as sent without any delivery
    Hand,
    /// Deliver by email
    #[default]
    Email,
    /// Deliver through the postal service
    Post,
}

impl SendMethod {
    /// Wire spelling of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            SendMethod::Hand => "hand",
            SendMethod::Email => "email",
            SendMethod::Post => "post",
        }
    }
}

/// Delivery instructions that accompany a send request.
///
/// Serialized under the document's own element name (`invoice` or
/// `estimate`), carrying only the fields that were actually set.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    method: SendMethod,
    email: Option<String>,
    message: Option<String>,
}

impl Envelope {
    /// Envelope with the given send method and no overrides.
    pub fn new(method: SendMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Override the recipient address (email delivery only).
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Custom message body for the delivery email.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Send method of this envelope.
    pub fn method(&self) -> SendMethod {
        self.method
    }

    /// Build the wire entity for a document kind. Only assigned fields are
    /// carried; the message attribute name differs per document.
    pub(crate) fn to_entity(&self, kind: EntityKind) -> Result<Entity> {
        let message_attr = match kind {
            EntityKind::EstimateEnvelope => "estimateEmail",
            _ => "invoiceEmail",
        };
        let mut data = vec![("sendMethod", Value::from(self.method.as_str()))];
        if let Some(email) = &self.email {
            data.push(("email", Value::from(email.as_str())));
        }
        if let Some(message) = &self.message {
            data.push((message_attr, Value::from(message.as_str())));
        }
        Entity::from_data(kind, data, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_assigned_fields_are_carried() {
        let entity = Envelope::new(SendMethod::Email)
            .to_entity(EntityKind::InvoiceEnvelope)
            .unwrap();
        assert_eq!(entity.get("sendMethod").unwrap().as_str(), Some("email"));
        assert!(!entity.has("email"));
        assert!(!entity.has("invoiceEmail"));
    }

    #[test]
    fn test_estimate_message_attribute() {
        let entity = Envelope::new(SendMethod::Email)
            .email("billing@example.test")
            .message("See attached")
            .to_entity(EntityKind::EstimateEnvelope)
            .unwrap();
        assert_eq!(
            entity.get("estimateEmail").unwrap().as_str(),
            Some("See attached")
        );
        assert_eq!(
            entity.get("email").unwrap().as_str(),
            Some("billing@example.test")
        );
    }
}
