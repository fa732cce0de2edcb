//! Estimate operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, Entity, EntityKind, Envelope};
use crate::services::expect_kind;
use crate::Result;

/// Service for estimates.
#[derive(Clone)]
pub struct EstimateService {
    connector: ApiConnector,
}

impl EstimateService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch an estimate by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entity> {
        self.connector.get_by_id(EntityKind::Estimate, id).await
    }

    /// Fetch estimates, optionally filtered or scoped to a contact.
    pub async fn get_all(
        &self,
        filter: Option<&str>,
        parent: Option<&Entity>,
    ) -> Result<Collection> {
        self.connector
            .get_all(EntityKind::Estimate, filter, parent)
            .await
    }

    /// Insert or update an estimate and reload it from the response.
    pub async fn save(&self, estimate: &mut Entity) -> Result<()> {
        expect_kind(estimate, EntityKind::Estimate)?;
        self.connector.save(estimate).await
    }

    /// Delete an estimate.
    pub async fn delete(&self, estimate: &Entity) -> Result<()> {
        expect_kind(estimate, EntityKind::Estimate)?;
        self.connector.delete(estimate).await
    }

    /// Send the estimate, saving it first when it was never saved.
    pub async fn send(&self, estimate: &mut Entity, envelope: &Envelope) -> Result<()> {
        expect_kind(estimate, EntityKind::Estimate)?;
        self.connector.send_document(estimate, envelope).await
    }

    /// Fetch the PDF rendition of a saved estimate.
    pub async fn pdf(&self, estimate: &Entity) -> Result<Vec<u8>> {
        expect_kind(estimate, EntityKind::Estimate)?;
        self.connector.get_pdf(estimate).await
    }

    /// List id and revision of every estimate, for change detection.
    pub async fn sync_list(&self) -> Result<Collection> {
        self.connector.sync_list(EntityKind::Estimate).await
    }

    /// Fetch full estimates for a batch of ids.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Collection> {
        self.connector.get_by_ids(EntityKind::Estimate, ids).await
    }
}
