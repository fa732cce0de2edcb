//! Product catalog operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, Entity, EntityKind};
use crate::Result;

/// Service for the read-only product catalog.
#[derive(Clone)]
pub struct ProductService {
    connector: ApiConnector,
}

impl ProductService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch a product by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entity> {
        self.connector.get_by_id(EntityKind::Product, id).await
    }

    /// Fetch all products.
    pub async fn get_all(&self) -> Result<Collection> {
        self.connector.get_all(EntityKind::Product, None, None).await
    }
}
