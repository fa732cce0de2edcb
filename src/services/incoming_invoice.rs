//! Incoming invoice operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, Entity, EntityKind};
use crate::services::expect_kind;
use crate::Result;

/// Service for incoming (purchase) invoices.
#[derive(Clone)]
pub struct IncomingInvoiceService {
    connector: ApiConnector,
}

impl IncomingInvoiceService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch an incoming invoice by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entity> {
        self.connector
            .get_by_id(EntityKind::IncomingInvoice, id)
            .await
    }

    /// Fetch incoming invoices, optionally filtered or scoped to a
    /// contact.
    pub async fn get_all(
        &self,
        filter: Option<&str>,
        parent: Option<&Entity>,
    ) -> Result<Collection> {
        self.connector
            .get_all(EntityKind::IncomingInvoice, filter, parent)
            .await
    }

    /// Insert or update an incoming invoice and reload it from the
    /// response.
    pub async fn save(&self, invoice: &mut Entity) -> Result<()> {
        expect_kind(invoice, EntityKind::IncomingInvoice)?;
        self.connector.save(invoice).await
    }

    /// Delete an incoming invoice.
    pub async fn delete(&self, invoice: &Entity) -> Result<()> {
        expect_kind(invoice, EntityKind::IncomingInvoice)?;
        self.connector.delete(invoice).await
    }

    /// Register a payment on an incoming invoice.
    pub async fn register_payment(
        &self,
        invoice: &mut Entity,
        payment: &mut Entity,
    ) -> Result<()> {
        expect_kind(invoice, EntityKind::IncomingInvoice)?;
        self.connector.register_payment(invoice, payment).await
    }

    /// List id and revision of every incoming invoice, for change
    /// detection.
    pub async fn sync_list(&self) -> Result<Collection> {
        self.connector.sync_list(EntityKind::IncomingInvoice).await
    }

    /// Fetch full incoming invoices for a batch of ids.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Collection> {
        self.connector
            .get_by_ids(EntityKind::IncomingInvoice, ids)
            .await
    }
}
