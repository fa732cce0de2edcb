//! Invoice operations.

use crate::connector::ApiConnector;
use crate::error::MoneybirdError;
use crate::model::{Collection, Entity, EntityKind, Envelope, SendMethod};
use crate::services::expect_kind;
use crate::Result;

/// Service for sales invoices.
#[derive(Clone)]
pub struct InvoiceService {
    connector: ApiConnector,
}

impl InvoiceService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch an invoice by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entity> {
        self.connector.get_by_id(EntityKind::Invoice, id).await
    }

    /// Fetch an invoice by its invoice number.
    pub async fn get_by_invoice_id(&self, invoice_id: &str) -> Result<Entity> {
        self.connector
            .get_by_named_id(EntityKind::Invoice, "invoice_id", invoice_id)
            .await
    }

    /// Fetch invoices, optionally filtered (`"open"`, `"late"`, an
    /// advanced filter id, ...) or scoped to a contact.
    pub async fn get_all(
        &self,
        filter: Option<&str>,
        parent: Option<&Entity>,
    ) -> Result<Collection> {
        self.connector
            .get_all(EntityKind::Invoice, filter, parent)
            .await
    }

    /// Insert or update an invoice and reload it from the response.
    pub async fn save(&self, invoice: &mut Entity) -> Result<()> {
        expect_kind(invoice, EntityKind::Invoice)?;
        self.connector.save(invoice).await
    }

    /// Delete an invoice.
    pub async fn delete(&self, invoice: &Entity) -> Result<()> {
        expect_kind(invoice, EntityKind::Invoice)?;
        self.connector.delete(invoice).await
    }

    /// Send the invoice, saving it first when it was never saved.
    pub async fn send(&self, invoice: &mut Entity, envelope: &Envelope) -> Result<()> {
        expect_kind(invoice, EntityKind::Invoice)?;
        self.connector.send_document(invoice, envelope).await
    }

    /// Mark the invoice as sent without delivering it.
    pub async fn mark_as_sent(&self, invoice: &mut Entity) -> Result<()> {
        self.send(invoice, &Envelope::new(SendMethod::Hand)).await
    }

    /// Send a payment reminder. Draft invoices must be sent first.
    pub async fn remind(&self, invoice: &mut Entity, envelope: &Envelope) -> Result<()> {
        expect_kind(invoice, EntityKind::Invoice)?;
        ensure_not_draft(invoice, "Send invoice before reminding")?;
        self.connector.remind(invoice, envelope).await
    }

    /// Register a payment. Draft invoices must be sent first.
    pub async fn register_payment(
        &self,
        invoice: &mut Entity,
        payment: &mut Entity,
    ) -> Result<()> {
        expect_kind(invoice, EntityKind::Invoice)?;
        ensure_not_draft(invoice, "Send invoice before registering payments")?;
        self.connector.register_payment(invoice, payment).await
    }

    /// Fetch the PDF rendition. Draft invoices must be sent first.
    pub async fn pdf(&self, invoice: &Entity) -> Result<Vec<u8>> {
        expect_kind(invoice, EntityKind::Invoice)?;
        ensure_not_draft(invoice, "Send invoice before requesting the pdf document")?;
        self.connector.get_pdf(invoice).await
    }

    /// List id and revision of every invoice, for change detection.
    pub async fn sync_list(&self) -> Result<Collection> {
        self.connector.sync_list(EntityKind::Invoice).await
    }

    /// Fetch full invoices for a batch of ids.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Collection> {
        self.connector.get_by_ids(EntityKind::Invoice, ids).await
    }
}

fn ensure_not_draft(invoice: &Entity, message: &str) -> Result<()> {
    if invoice.get("state")?.as_str() == Some("draft") {
        return Err(MoneybirdError::InvalidState(message.to_string()));
    }
    Ok(())
}
