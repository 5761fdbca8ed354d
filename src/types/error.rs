//! Error types for the user economy engine
//!
//! This module defines every error an economy operation can return. Callers
//! switch on the variant, never on the rendered message.
//!
//! # Error Categories
//!
//! - **Caller mistakes**: `InvalidArgument`, `InvalidReward`, `InvalidKudosKind`.
//!   Rejected before any store call.
//! - **Business outcomes**: `InsufficientFunds`, `NotYetAvailable`. Expected
//!   results of a well-formed request; never logged at error level.
//! - **Store failures**: `NotFound`, `AlreadyExists`, `Unavailable`,
//!   `ArithmeticOverflow`. Surfaced to the caller for retry/alerting decisions.
//! - **Snapshot errors**: file I/O and JSON failures of the sweeper's snapshot.

use thiserror::Error;

use super::balance::{Counter, UserId};
use super::reward::RewardType;

/// Main error type for the economy engine
///
/// Every failure is scoped to a single user operation; nothing here is fatal
/// to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    /// The user has no balance record
    #[error("User {user} not found")]
    NotFound {
        /// The user that was looked up
        user: UserId,
    },

    /// A balance record already exists for the user
    #[error("User {user} already has a balance record")]
    AlreadyExists {
        /// The user being registered
        user: UserId,
    },

    /// Malformed input: unknown credit kind, non-positive amount, etc.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was wrong
        message: String,
    },

    /// The conditional update's guard failed
    ///
    /// Carries the required and available amounts so the caller can present a
    /// precise message.
    #[error("Insufficient {counter} for user {user}: need {required}, have {available}")]
    InsufficientFunds {
        /// User whose balance was short
        user: UserId,
        /// Counter that failed the guard
        counter: Counter,
        /// Amount the operation needed
        required: u64,
        /// Amount observed when the guard failed
        available: u64,
    },

    /// Requested reward is not a member of the reward enumeration
    #[error("Invalid reward type: {reward}")]
    InvalidReward {
        /// The rejected reward name
        reward: String,
    },

    /// Requested kudos source is neither encouragements nor congratulations
    #[error("Invalid kudos kind '{kind}': must be 'encouragements' or 'congratulations'")]
    InvalidKudosKind {
        /// The rejected kudos kind
        kind: String,
    },

    /// The reward is defined but disabled
    #[error("{reward} rewards are not yet available")]
    NotYetAvailable {
        /// The disabled reward
        reward: RewardType,
    },

    /// The store did not answer within the deadline or failed transiently
    #[error("Store unavailable during {operation}: {message}")]
    Unavailable {
        /// Store operation that failed
        operation: String,
        /// Description of the failure
        message: String,
    },

    /// An increment would overflow the counter
    #[error("Arithmetic overflow on {counter} for user {user}")]
    ArithmeticOverflow {
        /// Counter being incremented
        counter: Counter,
        /// User whose record was touched
        user: UserId,
    },

    /// Reading or writing a balance snapshot failed
    #[error("Snapshot error: {message}")]
    Snapshot {
        /// Description of the failure
        message: String,
    },
}

impl From<std::io::Error> for EconomyError {
    fn from(error: std::io::Error) -> Self {
        EconomyError::Snapshot {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for EconomyError {
    fn from(error: serde_json::Error) -> Self {
        EconomyError::Snapshot {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl EconomyError {
    /// Create a NotFound error
    pub fn not_found(user: &UserId) -> Self {
        EconomyError::NotFound { user: user.clone() }
    }

    /// Create an AlreadyExists error
    pub fn already_exists(user: &UserId) -> Self {
        EconomyError::AlreadyExists { user: user.clone() }
    }

    /// Create an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        EconomyError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        user: &UserId,
        counter: Counter,
        required: u64,
        available: u64,
    ) -> Self {
        EconomyError::InsufficientFunds {
            user: user.clone(),
            counter,
            required,
            available,
        }
    }

    /// Create an InvalidReward error
    pub fn invalid_reward(reward: &str) -> Self {
        EconomyError::InvalidReward {
            reward: reward.to_string(),
        }
    }

    /// Create an InvalidKudosKind error
    pub fn invalid_kudos_kind(kind: &str) -> Self {
        EconomyError::InvalidKudosKind {
            kind: kind.to_string(),
        }
    }

    /// Create a NotYetAvailable error
    pub fn not_yet_available(reward: RewardType) -> Self {
        EconomyError::NotYetAvailable { reward }
    }

    /// Create an Unavailable error
    pub fn unavailable(operation: &str, message: impl Into<String>) -> Self {
        EconomyError::Unavailable {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(counter: Counter, user: &UserId) -> Self {
        EconomyError::ArithmeticOverflow {
            counter,
            user: user.clone(),
        }
    }

    /// Whether this is an expected business result rather than a failure
    ///
    /// `InsufficientFunds` and `NotYetAvailable` are answers to well-formed
    /// requests and must not be logged as errors.
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            EconomyError::InsufficientFunds { .. } | EconomyError::NotYetAvailable { .. }
        )
    }

    /// Whether the caller passed bad input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EconomyError::InvalidArgument { .. }
                | EconomyError::InvalidReward { .. }
                | EconomyError::InvalidKudosKind { .. }
        )
    }
}
