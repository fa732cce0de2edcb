//! Recurring template operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, Entity, EntityKind};
use crate::services::expect_kind;
use crate::Result;

/// Service for recurring invoice templates.
#[derive(Clone)]
pub struct RecurringTemplateService {
    connector: ApiConnector,
}

impl RecurringTemplateService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch a recurring template by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entity> {
        self.connector
            .get_by_id(EntityKind::RecurringTemplate, id)
            .await
    }

    /// Fetch recurring templates, optionally filtered (`"monthly"`,
    /// `"upcoming"`, ...) or scoped to a contact.
    pub async fn get_all(
        &self,
        filter: Option<&str>,
        parent: Option<&Entity>,
    ) -> Result<Collection> {
        self.connector
            .get_all(EntityKind::RecurringTemplate, filter, parent)
            .await
    }

    /// Insert or update a recurring template and reload it from the
    /// response.
    pub async fn save(&self, template: &mut Entity) -> Result<()> {
        expect_kind(template, EntityKind::RecurringTemplate)?;
        self.connector.save(template).await
    }

    /// Delete a recurring template.
    pub async fn delete(&self, template: &Entity) -> Result<()> {
        expect_kind(template, EntityKind::RecurringTemplate)?;
        self.connector.delete(template).await
    }
}
