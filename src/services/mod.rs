//! Per-resource service façades over the connector.
//!
//! Each service is a thin, cheaply constructed wrapper around a connector
//! clone; holding one does not pin any extra state.

mod contact;
mod estimate;
mod incoming_invoice;
mod invoice;
mod invoice_profile;
mod product;
mod recurring_template;
mod tax_rate;

pub use contact::ContactService;
pub use estimate::EstimateService;
pub use incoming_invoice::IncomingInvoiceService;
pub use invoice::InvoiceService;
pub use invoice_profile::InvoiceProfileService;
pub use product::ProductService;
pub use recurring_template::RecurringTemplateService;
pub use tax_rate::TaxRateService;

use crate::connector::ApiConnector;
use crate::error::MoneybirdError;
use crate::model::{Entity, EntityKind};
use crate::Result;

impl ApiConnector {
    /// Contact operations.
    pub fn contacts(&self) -> ContactService {
        ContactService::new(self.clone())
    }

    /// Invoice operations.
    pub fn invoices(&self) -> InvoiceService {
        InvoiceService::new(self.clone())
    }

    /// Estimate operations.
    pub fn estimates(&self) -> EstimateService {
        EstimateService::new(self.clone())
    }

    /// Incoming invoice operations.
    pub fn incoming_invoices(&self) -> IncomingInvoiceService {
        IncomingInvoiceService::new(self.clone())
    }

    /// Recurring template operations.
    pub fn recurring_templates(&self) -> RecurringTemplateService {
        RecurringTemplateService::new(self.clone())
    }

    /// Product catalog operations.
    pub fn products(&self) -> ProductService {
        ProductService::new(self.clone())
    }

    /// Tax rate operations.
    pub fn tax_rates(&self) -> TaxRateService {
        TaxRateService::new(self.clone())
    }

    /// Invoice profile operations.
    pub fn invoice_profiles(&self) -> InvoiceProfileService {
        InvoiceProfileService::new(self.clone())
    }
}

pub(crate) fn expect_kind(entity: &Entity, kind: EntityKind) -> Result<()> {
    if entity.kind() != kind {
        return Err(MoneybirdError::TypeMismatch {
            expected: kind.name(),
            actual: entity.kind().name(),
        });
    }
    Ok(())
}

/// Build a new document for a contact, carrying the contact id and the
/// address attributes over. Attributes the document kind does not declare
/// are dropped silently.
pub(crate) fn document_for_contact(kind: EntityKind, contact: &Entity) -> Result<Entity> {
    expect_kind(contact, EntityKind::Contact)?;
    let mut document = Entity::new(kind);
    let mut data = Vec::new();
    if let Some(id) = contact.id() {
        data.push(("contactId", crate::model::Value::Text(id)));
    }
    for attr in EntityKind::contact_carryover() {
        if contact.has(attr) {
            data.push((attr, contact.get(attr)?.clone()));
        }
    }
    document.set_data(data, true)?;
    Ok(document)
}
