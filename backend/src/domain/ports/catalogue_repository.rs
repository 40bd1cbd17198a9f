//! Port for the read-mostly service and banner catalogue.

use async_trait::async_trait;

use crate::domain::ledger::{Banner, ServiceItem};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by catalogue repository adapters.
    pub enum CatalogueStoreError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "catalogue repository query failed: {message}",
    }
}

/// Port for catalogue reads. Listings preserve seed order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// All promotional banners.
    async fn list_banners(&self) -> Result<Vec<Banner>, CatalogueStoreError>;

    /// All payable services.
    async fn list_services(&self) -> Result<Vec<ServiceItem>, CatalogueStoreError>;
}
