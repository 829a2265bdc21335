//! Driving port for sign-up and sign-in.

use async_trait::async_trait;

use crate::domain::{Account, Credentials, Error, Registration};

/// Account use cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. Duplicate usernames fail with a conflict.
    async fn sign_up(&self, registration: &Registration) -> Result<Account, Error>;

    /// Authenticate credentials. Any mismatch fails as unauthorised.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, Error>;
}
