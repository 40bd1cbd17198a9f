//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Registration runs as one store transaction: the user row and its zero
//! balance row commit together, so the "exactly one balance row per user"
//! lifecycle invariant holds from the first moment the account exists.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::user::{
    Email, NewUser, PersonName, StoredCredentials, UserId, UserProfile,
};

use super::models::{CredentialsRow, NewBalanceRow, NewUserRow, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::{balances, users};

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain user store errors.
fn map_pool_error(error: PoolError) -> UserStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain user store errors. `email` names the value
/// reported on unique violations (the only unique constraint besides the
/// random primary key).
fn map_diesel_error(error: diesel::result::Error, email: &str) -> UserStoreError {
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
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserStoreError::duplicate_email(email)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        _ => UserStoreError::query("database error"),
    }
}

/// Convert a stored row to domain credentials.
fn row_to_credentials(row: CredentialsRow) -> Result<StoredCredentials, UserStoreError> {
    let email = Email::new(row.email)
        .map_err(|err| UserStoreError::query(format!("stored email invalid: {err}")))?;
    Ok(StoredCredentials {
        user_id: UserId::from(row.id),
        email,
        password_hash: row.password_hash,
    })
}

/// Convert a stored row to a domain profile.
fn row_to_profile(row: ProfileRow) -> Result<UserProfile, UserStoreError> {
    let email = Email::new(row.email)
        .map_err(|err| UserStoreError::query(format!("stored email invalid: {err}")))?;
    let first_name = PersonName::new(row.first_name)
        .map_err(|err| UserStoreError::query(format!("stored name invalid: {err}")))?;
    let last_name = PersonName::new(row.last_name)
        .map_err(|err| UserStoreError::query(format!("stored name invalid: {err}")))?;
    Ok(UserProfile {
        email,
        first_name,
        last_name,
        profile_image: row.profile_image,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create_with_balance(&self, user: NewUser) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let email = user.email.as_ref().to_owned();
        conn.transaction(|conn| {
            async move {
                let new_user = NewUserRow {
                    id: *user.id.as_uuid(),
                    email: user.email.as_ref(),
                    password_hash: &user.password_hash,
                    first_name: user.first_name.as_ref(),
                    last_name: user.last_name.as_ref(),
                };
                diesel::insert_into(users::table)
                    .values(&new_user)
                    .execute(conn)
                    .await?;

                let new_balance = NewBalanceRow {
                    user_id: *user.id.as_uuid(),
                    amount: Decimal::ZERO,
                };
                diesel::insert_into(balances::table)
                    .values(&new_balance)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, &email))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CredentialsRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, email.as_ref()))?;

        row.map(row_to_credentials).transpose()
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = users::table
            .filter(users::id.eq(user_id.as_uuid()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, ""))?;

        row.map(row_to_profile).transpose()
    }

    async fn update_names(
        &self,
        user_id: &UserId,
        first_name: &PersonName,
        last_name: &PersonName,
    ) -> Result<Option<UserProfile>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> =
            diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
                .set((
                    users::first_name.eq(first_name.as_ref()),
                    users::last_name.eq(last_name.as_ref()),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .returning(ProfileRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, ""))?;

        row.map(row_to_profile).transpose()
    }

    async fn update_profile_image(
        &self,
        user_id: &UserId,
        image_url: &str,
    ) -> Result<Option<UserProfile>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> =
            diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
                .set((
                    users::profile_image.eq(image_url),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .returning(ProfileRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, ""))?;

        row.map(row_to_profile).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let diesel_err = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        let store_err = map_diesel_error(diesel_err, "ada@example.com");
        assert_eq!(
            store_err,
            UserStoreError::duplicate_email("ada@example.com")
        );
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let store_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(store_err, UserStoreError::Connection { .. }));
    }

    #[rstest]
    fn credentials_row_converts() {
        let id = Uuid::new_v4();
        let credentials = row_to_credentials(CredentialsRow {
            id,
            email: "ada@example.com".to_owned(),
            password_hash: "hash".to_owned(),
        })
        .expect("row converts");
        assert_eq!(credentials.user_id, UserId::from(id));
        assert_eq!(credentials.email.as_ref(), "ada@example.com");
    }

    #[rstest]
    fn profile_row_with_corrupt_email_is_a_query_error() {
        let error = row_to_profile(ProfileRow {
            email: "not-an-email".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            profile_image: None,
        })
        .expect_err("corrupt email must fail");
        assert!(matches!(error, UserStoreError::Query { .. }));
    }
}
