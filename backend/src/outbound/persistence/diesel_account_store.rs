//! PostgreSQL-backed `AccountStore`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountStore, AccountStoreError};
use crate::domain::{Account, AccountId, Credentials, Registration, Username};
use crate::outbound::password::{StoredPassword, hash_blocking, verify_blocking};

use super::error_mapping::{DbFailure, classify_diesel_error, classify_pool_error};
use super::models::{AccountRow, NewAccountRow};
use super::pool::DbPool;
use super::schema::accounts;

/// Diesel implementation of the account store.
#[derive(Clone)]
pub struct DieselAccountStore {
    pool: DbPool,
}

impl DieselAccountStore {
    /// Create a store over a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> AccountStoreError {
    match failure {
        DbFailure::Connection(message) => AccountStoreError::connection(message),
        DbFailure::UniqueViolation(constraint) => {
            AccountStoreError::query(format!("unexpected unique violation on {constraint}"))
        }
        DbFailure::Query(message) => AccountStoreError::query(message),
    }
}

fn account_from_row(row: AccountRow) -> Result<Account, AccountStoreError> {
    let username = Username::new(&row.username).map_err(|err| {
        AccountStoreError::query(format!("stored username for {} invalid: {err}", row.id))
    })?;
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        username,
    })
}

#[async_trait]
impl AccountStore for DieselAccountStore {
    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<Account, AccountStoreError> {
        let password = hash_blocking(registration.password())
            .await
            .map_err(|err| AccountStoreError::query(err.to_string()))?;
        let id = AccountId::random();
        let username = registration.username().as_ref();
        let row = NewAccountRow {
            id: *id.as_uuid(),
            username,
            password_hash: password.as_str(),
        };

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;
        let inserted = diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await;

        match inserted.map_err(classify_diesel_error) {
            Ok(_) => Ok(Account {
                id,
                username: registration.username().clone(),
            }),
            Err(DbFailure::UniqueViolation(_)) => {
                Err(AccountStoreError::duplicate_username(username))
            }
            Err(other) => Err(map_failure(other)),
        }
    }

    async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Account>, AccountStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::username.eq(credentials.username()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(classify_diesel_error(err)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stored = StoredPassword::from_phc(row.password_hash.clone());
        let matches = verify_blocking(stored, credentials.password())
            .await
            .map_err(|err| AccountStoreError::query(err.to_string()))?;
        if !matches {
            return Ok(None);
        }
        account_from_row(row).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn rows_with_valid_usernames_convert() {
        let row = AccountRow {
            id: Uuid::new_v4(),
            username: "alice".to_owned(),
            password_hash: String::new(),
        };
        let account = account_from_row(row).expect("valid row");
        assert_eq!(account.username.as_ref(), "alice");
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let err = map_failure(DbFailure::Connection("refused".to_owned()));
        assert_eq!(err, AccountStoreError::connection("refused"));
    }
}
