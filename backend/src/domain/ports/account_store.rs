//! Driven port for account storage and credential checks.

use async_trait::async_trait;

use crate::domain::{Account, Credentials, Registration};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account store adapters.
    pub enum AccountStoreError {
        /// The store could not be reached.
        Connection { message: String } => "account store connection failed: {message}",
        /// A query failed during execution.
        Query { message: String } => "account store query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } => "username {username} is already taken",
    }
}

/// Account persistence and password verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Register a new account, hashing the supplied password.
    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<Account, AccountStoreError>;

    /// Return the account when the username exists and the password matches.
    ///
    /// Unknown usernames and wrong passwords both yield `Ok(None)`.
    async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<Account>, AccountStoreError>;
}
