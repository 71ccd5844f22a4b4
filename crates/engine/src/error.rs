//! The module contains the errors the engine can return.
//!
//! Domain errors (user recoverable):
//!
//! - [`InvalidAmount`] when an amount is not positive, not numeric or overflows.
//! - [`InsufficientFunds`] when a debit exceeds the primary account balance.
//! - [`NotFound`] when a payee, business, PayCode or achievement is unknown.
//! - [`InvalidName`] when a recipient or participant name is blank.
//!
//! Persistence errors ([`Database`], [`Serialization`], [`Storage`]) never
//! undo an in-memory mutation; the engine logs them and keeps going.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`Database`]: EngineError::Database
//!  [`Serialization`]: EngineError::Serialization
//!  [`Storage`]: EngineError::Storage
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Message shown to the user by the notification boundary.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAmount(_) => "Please enter a valid amount".to_string(),
            Self::InsufficientFunds(_) => "Insufficient balance".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::InvalidName(reason) => format!("Invalid name: {reason}"),
            Self::Storage(_) | Self::Serialization(_) | Self::Database(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
