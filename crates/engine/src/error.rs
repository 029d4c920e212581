//! The module contains the errors the engine can throw.
//!
//! Most variants map to a caller mistake (stale state, bad input) and are
//! surfaced as-is; [`Database`] and [`Ledger`] are dependency failures and
//! the operation that produced them leaves no partial state behind.
//!
//!  [`Database`]: EngineError::Database
//!  [`Ledger`]: EngineError::Ledger
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Card-governed obligation: {0}")]
    CardGoverned(String),
    #[error("Series inconsistency: {0}")]
    SeriesConsistency(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Ledger failure: {0}")]
    Ledger(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::CardGoverned(a), Self::CardGoverned(b)) => a == b,
            (Self::SeriesConsistency(a), Self::SeriesConsistency(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Ledger(a), Self::Ledger(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
