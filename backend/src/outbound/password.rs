//! Argon2id password hashes shared by account store adapters.
//!
//! Hashes are stored as PHC strings, so the salt and cost parameters travel
//! with the hash. Hashing and verification are CPU-bound and run on the
//! blocking pool.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;
use zeroize::Zeroizing;

const SALT_LEN: usize = 16;

/// Failures while producing a password hash.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The hasher rejected its input or parameters.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Hasher error text.
        message: String,
    },
    /// The blocking task did not complete.
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// PHC-encoded argon2id hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPassword(String);

impl StoredPassword {
    /// Hash `password` under a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Hash`] when the salt or hash cannot be encoded.
    pub fn hash(password: &str) -> Result<Self, PasswordError> {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(hash_error)?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(hash_error)?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a PHC string read from storage.
    #[must_use]
    pub const fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    /// The PHC string to persist.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `password` matches. Unparseable stored hashes never match.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

fn hash_error(error: argon2::password_hash::Error) -> PasswordError {
    PasswordError::Hash {
        message: error.to_string(),
    }
}

/// Hash `password` on the blocking pool.
///
/// # Errors
///
/// Propagates hashing failures and task join failures.
pub async fn hash_blocking(password: &str) -> Result<StoredPassword, PasswordError> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || StoredPassword::hash(&password)).await?
}

/// Verify `password` against `stored` on the blocking pool.
///
/// # Errors
///
/// Returns [`PasswordError::Task`] when the blocking task does not complete.
pub async fn verify_blocking(
    stored: StoredPassword,
    password: &str,
) -> Result<bool, PasswordError> {
    let password = Zeroizing::new(password.to_owned());
    Ok(tokio::task::spawn_blocking(move || stored.verify(&password)).await?)
}
