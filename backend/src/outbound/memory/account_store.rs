//! Mutex-guarded account store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{AccountStore, AccountStoreError};
use crate::domain::{Account, AccountId, Credentials, Registration, Username};
use crate::outbound::password::{PasswordError, StoredPassword, hash_blocking, verify_blocking};

#[derive(Debug, Clone)]
struct StoredAccount {
    id: AccountId,
    username: Username,
    password: StoredPassword,
}

fn password_failure(error: PasswordError) -> AccountStoreError {
    AccountStoreError::query(error.to_string())
}

/// Account store backed by a process-local map keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<String, StoredAccount>>,
}

impl InMemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredAccount>>, AccountStoreError> {
        self.accounts
            .lock()
            .map_err(|_| AccountStoreError::connection("account map poisoned"))
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<Account, AccountStoreError> {
        let username = registration.username().clone();
        let taken = self.lock()?.contains_key(username.as_ref());
        if taken {
            return Err(AccountStoreError::duplicate_username(username.as_ref()));
        }
        let password = hash_blocking(registration.password())
            .await
            .map_err(password_failure)?;

        let mut accounts = self.lock()?;
        if accounts.contains_key(username.as_ref()) {
            return Err(AccountStoreError::duplicate_username(username.as_ref()));
        }
        let stored = StoredAccount {
            id: AccountId::random(),
            username: username.clone(),
            password,
        };
        let account = Account {
            id: stored.id,
            username: stored.username.clone(),
        };
        accounts.insert(username.to_string(), stored);
        Ok(account)
    }

    async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Account>, AccountStoreError> {
        let found = self.lock()?.get(credentials.username()).cloned();
        let Some(stored) = found else {
            return Ok(None);
        };
        let matches = verify_blocking(stored.password, credentials.password())
            .await
            .map_err(password_failure)?;
        Ok(matches.then(|| Account {
            id: stored.id,
            username: stored.username,
        }))
    }
}
