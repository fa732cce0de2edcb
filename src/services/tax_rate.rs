//! Tax rate operations.

use crate::connector::ApiConnector;
use crate::model::{Collection, EntityKind};
use crate::Result;

/// Service for the read-only tax rates of the administration.
#[derive(Clone)]
pub struct TaxRateService {
    connector: ApiConnector,
}

impl TaxRateService {
    pub(crate) fn new(connector: ApiConnector) -> Self {
        Self { connector }
    }

    /// Fetch all tax rates.
    pub async fn get_all(&self) -> Result<Collection> {
        self.connector.get_all(EntityKind::TaxRate, None, None).await
    }
}
