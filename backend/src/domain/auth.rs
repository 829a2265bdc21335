//! Credential payloads accepted by the account store.
//!
//! Handlers validate raw strings through these constructors before talking to
//! a port. Passwords live in [`Zeroizing`] buffers so they are wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::account::{AccountValidationError, Username};

/// Error returned when credential inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Username failed account naming rules.
    InvalidUsername(AccountValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::InvalidUsername(inner) => write!(f, "{inner}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

fn require_password(password: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Sign-in credentials.
///
/// The username is trimmed but not checked against naming rules, so unknown
/// or malformed names surface as a plain authentication failure.
///
/// # Examples
/// ```
/// use waterlog::domain::Credentials;
///
/// let creds = Credentials::try_from_parts(" alice ", "pw").expect("valid credentials");
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        Ok(Self {
            username: trimmed.to_owned(),
            password: require_password(password)?,
        })
    }

    /// Username used for the lookup.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Caller-supplied password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Sign-up request with a username that satisfies the naming rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username).map_err(|error| match error {
            AccountValidationError::EmptyUsername => CredentialsValidationError::EmptyUsername,
            other => CredentialsValidationError::InvalidUsername(other),
        })?;
        Ok(Self {
            username,
            password: require_password(password)?,
        })
    }

    /// Requested username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Caller-supplied password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
