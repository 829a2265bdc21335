//! Account identity primitives.
//!
//! Accounts are owned by the account store. The ledger only ever sees an
//! [`AccountId`] resolved from an authenticated session.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by account primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// Account id was empty.
    EmptyId,
    /// Account id was not a UUID.
    InvalidId,
    /// Username was blank once trimmed.
    EmptyUsername,
    /// Username is shorter than [`USERNAME_MIN`].
    UsernameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Username is longer than [`USERNAME_MAX`].
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "account id must not be empty"),
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier stored as a UUID.
///
/// # Examples
/// ```
/// use waterlog::domain::AccountId;
///
/// let id = AccountId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(Uuid);

impl AccountId {
    /// Validate and construct an [`AccountId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(AccountValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(AccountValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Wrap a UUID read from storage.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum allowed username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed username length.
pub const USERNAME_MAX: usize = 32;

/// Unique login name, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if length < USERNAME_MIN {
            return Err(AccountValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered account as seen by the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Stable identifier.
    pub id: AccountId,
    /// Unique login name.
    pub username: Username,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", AccountValidationError::EmptyId)]
    #[case("not-a-uuid", AccountValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", AccountValidationError::InvalidId)]
    fn rejects_invalid_account_ids(#[case] raw: &str, #[case] expected: AccountValidationError) {
        assert_eq!(AccountId::new(raw).expect_err("invalid id"), expected);
    }

    #[rstest]
    fn account_id_round_trips_through_serde() {
        let id = AccountId::random();
        let json = serde_json::to_string(&id).expect("serialise");
        let decoded: AccountId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(decoded, id);
    }

    #[rstest]
    #[case("  ", AccountValidationError::EmptyUsername)]
    #[case("ab", AccountValidationError::UsernameTooShort { min: USERNAME_MIN })]
    #[case(
        "a-very-long-username-that-keeps-going",
        AccountValidationError::UsernameTooLong { max: USERNAME_MAX }
    )]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: AccountValidationError) {
        assert_eq!(Username::new(raw).expect_err("invalid username"), expected);
    }

    #[rstest]
    fn trims_usernames() {
        let username = Username::new("  alice ").expect("valid username");
        assert_eq!(username.as_ref(), "alice");
    }
}
