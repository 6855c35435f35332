//! Error types for the database layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Invalid stored value for {field}: {message}")]
    DecodeError { field: &'static str, message: String },
}

impl DatabaseError {
    pub fn decode(field: &'static str, message: impl Into<String>) -> Self {
        Self::DecodeError {
            field,
            message: message.into(),
        }
    }
}
