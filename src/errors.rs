//! Error types.
//! `DbError` is what every connection/binder operation returns; `AppError`
//! wraps it for the CLI together with I/O, config and output failures.

use std::io;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    // ---------------------------
    // Connection lifecycle
    // ---------------------------
    #[error("SQLITE DATABASE OPEN FAILURE ({path}): {message}")]
    OpenFailure { path: String, message: String },

    #[error("SQLITE DATABASE ALREADY OPENED ({path}), CREATE NEW OBJECT FOR NEW DATABASE")]
    AlreadyOpen { path: String },

    #[error("No database connected")]
    NotConnected,

    // ---------------------------
    // Query binding
    // ---------------------------
    #[error("Query Binding Failed: no value bound for placeholder '{placeholder}'")]
    BindFailure { placeholder: String },

    // ---------------------------
    // Engine
    // ---------------------------
    #[error("{0}")]
    EngineFailure(String),
}

impl DbError {
    /// Numeric code used by the older integer-based error reporting.
    pub fn code(&self) -> u8 {
        match self {
            DbError::OpenFailure { .. } => 1,
            DbError::AlreadyOpen { .. } => 2,
            DbError::BindFailure { .. } => 3,
            DbError::NotConnected => 4,
            DbError::EngineFailure(_) => 127,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        // Keep the engine's own text when there is one.
        match e {
            rusqlite::Error::SqliteFailure(err, Some(msg)) => {
                DbError::EngineFailure(format!("{msg} ({err})"))
            }
            other => DbError::EngineFailure(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid binding '{0}', expected KEY=VALUE")]
    InvalidBinding(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type AppResult<T> = Result<T, AppError>;
