//! Invoice profile operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, EntityKind};
use crate::Result;

/// Service for the read-only invoice profiles of the administration.
#[derive(Clone)]
pub struct InvoiceProfileService {
    connector: ApiConnector,
}

impl InvoiceProfileService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch all invoice profiles.
    pub async fn get_all(&self) -> Result<Collection> {
        self.connector
            .get_all(EntityKind::InvoiceProfile, None, None)
            .await
    }
}
