//! Contact operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, Entity, EntityKind};
use crate::services::{document_for_contact, expect_kind};
use crate::Result;

/// Service for contacts.
#[derive(Clone)]
pub struct ContactService {
    connector: ApiConnector,
}

impl ContactService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch a contact by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entity> {
        self.connector.get_by_id(EntityKind::Contact, id).await
    }

    /// Fetch a contact by the customer id assigned in the administration.
    pub async fn get_by_customer_id(&self, customer_id: &str) -> Result<Entity> {
        self.connector
            .get_by_named_id(EntityKind::Contact, "customer_id", customer_id)
            .await
    }

    /// Fetch all contacts.
    pub async fn get_all(&self) -> Result<Collection> {
        self.connector.get_all(EntityKind::Contact, None, None).await
    }

    /// Insert or update a contact and reload it from the response.
    pub async fn save(&self, contact: &mut Entity) -> Result<()> {
        expect_kind(contact, EntityKind::Contact)?;
        self.connector.save(contact).await
    }

    /// Delete a contact. Refused while any dependent documents exist.
    pub async fn delete(&self, contact: &Entity) -> Result<()> {
        expect_kind(contact, EntityKind::Contact)?;
        self.connector.delete(contact).await
    }

    /// Build a new invoice for a contact, carrying its address over.
    pub fn create_invoice(&self, contact: &Entity) -> Result<Entity> {
        document_for_contact(EntityKind::Invoice, contact)
    }

    /// Build a new estimate for a contact.
    pub fn create_estimate(&self, contact: &Entity) -> Result<Entity> {
        document_for_contact(EntityKind::Estimate, contact)
    }

    /// Build a new recurring template for a contact.
    pub fn create_recurring_template(&self, contact: &Entity) -> Result<Entity> {
        document_for_contact(EntityKind::RecurringTemplate, contact)
    }

    /// Build a new incoming invoice for a contact.
    pub fn create_incoming_invoice(&self, contact: &Entity) -> Result<Entity> {
        document_for_contact(EntityKind::IncomingInvoice, contact)
    }

    /// Fetch the contact's invoices, optionally filtered.
    pub async fn invoices(&self, contact: &Entity, filter: Option<&str>) -> Result<Collection> {
        expect_kind(contact, EntityKind::Contact)?;
        self.connector
            .get_all(EntityKind::Invoice, filter, Some(contact))
            .await
    }

    /// Fetch the contact's estimates, optionally filtered.
    pub async fn estimates(&self, contact: &Entity, filter: Option<&str>) -> Result<Collection> {
        expect_kind(contact, EntityKind::Contact)?;
        self.connector
            .get_all(EntityKind::Estimate, filter, Some(contact))
            .await
    }

    /// Fetch the contact's recurring templates, optionally filtered.
    pub async fn recurring_templates(
        &self,
        contact: &Entity,
        filter: Option<&str>,
    ) -> Result<Collection> {
        expect_kind(contact, EntityKind::Contact)?;
        self.connector
            .get_all(EntityKind::RecurringTemplate, filter, Some(contact))
            .await
    }

    /// Fetch the contact's incoming invoices, optionally filtered.
    pub async fn incoming_invoices(
        &self,
        contact: &Entity,
        filter: Option<&str>,
    ) -> Result<Collection> {
        expect_kind(contact, EntityKind::Contact)?;
        self.connector
            .get_all(EntityKind::IncomingInvoice, filter, Some(contact))
            .await
    }

    /// List id and revision of every contact, for change detection.
    pub async fn sync_list(&self) -> Result<Collection> {
        self.connector.sync_list(EntityKind::Contact).await
    }

    /// Fetch full contacts for a batch of ids.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Collection> {
        self.connector.get_by_ids(EntityKind::Contact, ids).await
    }
}
