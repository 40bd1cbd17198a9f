//! Information domain service: banner and service catalogue listings.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ledger::{Banner, ServiceItem};
use crate::domain::ports::{CatalogueRepository, CatalogueStoreError, InformationQuery};

/// Domain service implementing the catalogue listings.
#[derive(Clone)]
pub struct InformationService<C> {
    catalogue: Arc<C>,
}

impl<C> InformationService<C> {
    /// Create a new service over the given catalogue repository.
    pub fn new(catalogue: Arc<C>) -> Self {
        Self { catalogue }
    }
}

impl<C> InformationService<C>
where
    C: CatalogueRepository,
{
    fn map_catalogue_error(error: CatalogueStoreError) -> Error {
        match error {
            CatalogueStoreError::Connection { message } => {
                warn!(%message, "catalogue repository unreachable");
                Error::service_unavailable("catalogue unavailable")
            }
            CatalogueStoreError::Query { message } => {
                warn!(%message, "catalogue query failed");
                Error::internal("catalogue error")
            }
        }
    }
}

#[async_trait]
impl<C> InformationQuery for InformationService<C>
where
    C: CatalogueRepository,
{
    async fn banners(&self) -> Result<Vec<Banner>, Error> {
        self.catalogue
            .list_banners()
            .await
            .map_err(Self::map_catalogue_error)
    }

    async fn services(&self) -> Result<Vec<ServiceItem>, Error> {
        self.catalogue
            .list_services()
            .await
            .map_err(Self::map_catalogue_error)
    }
}
