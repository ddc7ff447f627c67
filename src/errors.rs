//! Unified error types for the planner.
//!
//! Every remote call surfaces its failure as a variant of [`Error`] so callers can
//! decide whether to show it to the user. None of them are fatal.

use sea_orm::prelude::Uuid;
use thiserror::Error;

/// All failures the planner can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote store rejected the call or the transport failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// An update or delete matched no row visible to the active identity
    #[error("No row {id} in `{collection}` for the active identity")]
    RowNotFound {
        /// Collection the call targeted
        collection: &'static str,
        /// Id that was not found
        id: Uuid,
    },

    /// A draft or patch failed local validation; nothing was sent
    #[error("Invalid `{collection}` fields: {reason}")]
    Validation {
        /// Collection the fields were meant for
        collection: &'static str,
        /// What was wrong
        reason: String,
    },

    /// A write was issued for an identity other than the one the cache belongs to
    #[error("`{collection}` store holds rows for another identity")]
    IdentityMismatch {
        /// Collection of the store
        collection: &'static str,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// I/O failure outside the database driver
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on `collection`.
    pub fn validation(collection: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            collection,
            reason: reason.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
