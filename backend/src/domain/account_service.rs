//! Account sign-up and sign-in use cases.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{AccountCommand, AccountStore, AccountStoreError};
use crate::domain::{Account, Credentials, Error, Registration};

/// Account service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> AccountService<S> {
    /// Create a service over an account store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn map_store_error(error: AccountStoreError) -> Error {
    match error {
        AccountStoreError::Connection { message } => {
            Error::service_unavailable(format!("account store unavailable: {message}"))
        }
        AccountStoreError::Query { message } => {
            Error::internal(format!("account store error: {message}"))
        }
        AccountStoreError::DuplicateUsername { username } => {
            Error::conflict("username is already taken").with_details(json!({
                "field": "username",
                "value": username,
                "code": "duplicate_username",
            }))
        }
    }
}

#[async_trait]
impl<S> AccountCommand for AccountService<S>
where
    S: AccountStore,
{
    async fn sign_up(&self, registration: &Registration) -> Result<Account, Error> {
        let account = self
            .store
            .create_account(registration)
            .await
            .map_err(map_store_error)?;
        debug!(account_id = %account.id, "account created");
        Ok(account)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, Error> {
        self.store
            .verify_credentials(credentials)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::unauthorized("invalid username or password"))
    }
}
