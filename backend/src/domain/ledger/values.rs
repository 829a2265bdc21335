//! Validated scalar values used by the ledger.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Goal applied to a freshly created daily record, in litres.
pub const DEFAULT_GOAL_LITERS: f64 = 3.0;

/// Largest amount accepted for a single entry or total override.
pub const MAX_AMOUNT_MILLILITERS: i64 = 100_000;

const MILLILITERS_PER_LITER: f64 = 1000.0;

/// Validation failures for ledger values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerValidationError {
    /// Intake and removal amounts must not be negative.
    #[error("amount must be zero or greater, got {value}")]
    NegativeAmount {
        /// Rejected amount in millilitres.
        value: i64,
    },
    /// Amounts above [`MAX_AMOUNT_MILLILITERS`] are refused so running
    /// totals cannot overflow.
    #[error("amount must be at most {max} millilitres, got {value}")]
    AmountTooLarge {
        /// Rejected amount in millilitres.
        value: i64,
        /// Largest accepted amount.
        max: i64,
    },
    /// Goals must be finite and strictly positive.
    #[error("goal must be a positive number of litres, got {value}")]
    InvalidGoal {
        /// Rejected goal in litres.
        value: f64,
    },
}

/// Water amount in millilitres supplied by a caller, within
/// `0..=MAX_AMOUNT_MILLILITERS`.
///
/// # Examples
/// ```
/// use waterlog::domain::IntakeAmount;
///
/// assert_eq!(IntakeAmount::new(250).expect("valid").milliliters(), 250);
/// assert!(IntakeAmount::new(-1).is_err());
/// assert!(IntakeAmount::new(i64::MAX).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IntakeAmount(i64);

impl IntakeAmount {
    /// Validate a millilitre amount.
    pub const fn new(milliliters: i64) -> Result<Self, LedgerValidationError> {
        if milliliters < 0 {
            return Err(LedgerValidationError::NegativeAmount { value: milliliters });
        }
        if milliliters > MAX_AMOUNT_MILLILITERS {
            return Err(LedgerValidationError::AmountTooLarge {
                value: milliliters,
                max: MAX_AMOUNT_MILLILITERS,
            });
        }
        Ok(Self(milliliters))
    }

    /// Amount in millilitres.
    #[must_use]
    pub const fn milliliters(self) -> i64 {
        self.0
    }
}

/// Daily hydration goal in litres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct GoalLiters(f64);

impl GoalLiters {
    /// Validate a goal expressed in litres.
    pub fn new(liters: f64) -> Result<Self, LedgerValidationError> {
        if !liters.is_finite() || liters <= 0.0 {
            return Err(LedgerValidationError::InvalidGoal { value: liters });
        }
        Ok(Self(liters))
    }

    /// Goal in litres.
    #[must_use]
    pub const fn liters(self) -> f64 {
        self.0
    }

    /// Goal converted to whole millilitres, rounded to nearest.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "goals are validated finite and realistic goals fit in i64"
    )]
    pub fn milliliters(self) -> i64 {
        (self.0 * MILLILITERS_PER_LITER).round() as i64
    }
}

impl Default for GoalLiters {
    fn default() -> Self {
        Self(DEFAULT_GOAL_LITERS)
    }
}

impl TryFrom<f64> for GoalLiters {
    type Error = LedgerValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GoalLiters> for f64 {
    fn from(value: GoalLiters) -> Self {
        value.0
    }
}

/// Stable identifier of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a daily record row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
