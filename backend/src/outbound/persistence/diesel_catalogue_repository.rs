//! PostgreSQL-backed `CatalogueRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ledger::{Banner, ServiceCode, ServiceItem};
use crate::domain::ports::{CatalogueRepository, CatalogueStoreError};

use super::models::{BannerRow, ServiceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{banners, services};

/// Diesel-backed implementation of the [`CatalogueRepository`] port.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain catalogue store errors.
fn map_pool_error(error: PoolError) -> CatalogueStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CatalogueStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain catalogue store errors.
fn map_diesel_error(error: diesel::result::Error) -> CatalogueStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CatalogueStoreError::connection("database connection error")
        }
        _ => CatalogueStoreError::query("database error"),
    }
}

/// Convert a stored row to a domain service item.
fn row_to_service(row: ServiceRow) -> Result<ServiceItem, CatalogueStoreError> {
    let code = ServiceCode::new(row.service_code)
        .map_err(|err| CatalogueStoreError::query(format!("stored service invalid: {err}")))?;
    Ok(ServiceItem {
        code,
        name: row.service_name,
        icon: row.service_icon,
        tariff: row.service_tariff,
    })
}

/// Convert a stored row to a domain banner.
fn row_to_banner(row: BannerRow) -> Banner {
    Banner {
        name: row.banner_name,
        image: row.banner_image,
        description: row.description,
    }
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_banners(&self) -> Result<Vec<Banner>, CatalogueStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BannerRow> = banners::table
            .select(BannerRow::as_select())
            .order_by(banners::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_banner).collect())
    }

    async fn list_services(&self) -> Result<Vec<ServiceItem>, CatalogueStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ServiceRow> = services::table
            .select(ServiceRow::as_select())
            .order_by(services::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_service).collect()
    }
}
