//! Unified error type for the ledger engine.
//!
//! Errors fall into three families that callers care about: validation
//! failures (bad input, rejected money movement), missing rows, and store
//! failures passed through unmodified from sea-orm.

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: i64 },

    #[error("Insufficient funds: {available} available, {required} required")]
    InsufficientFunds { available: i64, required: i64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn account_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Account",
            id: id.to_string(),
        }
    }

    pub fn budget_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Budget",
            id: id.to_string(),
        }
    }

    pub fn category_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Category",
            id: id.to_string(),
        }
    }

    pub fn transaction_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Transaction",
            id: id.to_string(),
        }
    }

    pub fn goal_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Goal",
            id: id.to_string(),
        }
    }

    /// Rejected input or a money movement the rules forbid.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidAmount { .. } | Self::InsufficientFunds { .. }
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Failure reported by the backing row store.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::account_not_found(42).to_string(),
            "Account not found: 42"
        );
        assert_eq!(
            Error::InsufficientFunds {
                available: 1000,
                required: 2500
            }
            .to_string(),
            "Insufficient funds: 1000 available, 2500 required"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::validation("same account").is_validation());
        assert!(Error::InvalidAmount { amount: 0 }.is_validation());
        assert!(
            Error::InsufficientFunds {
                available: 0,
                required: 1
            }
            .is_validation()
        );
        assert!(Error::category_not_found(1).is_not_found());
        assert!(Error::from(DbErr::Custom("boom".to_string())).is_store());
        assert!(!Error::goal_not_found(1).is_store());
    }
}
