//! Driving port for the information (catalogue) use-cases.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ledger::{Banner, ServiceItem};

/// Read-only catalogue listings in seed order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InformationQuery: Send + Sync {
    /// All promotional banners.
    async fn banners(&self) -> Result<Vec<Banner>, Error>;

    /// All payable services.
    async fn services(&self) -> Result<Vec<ServiceItem>, Error>;
}
