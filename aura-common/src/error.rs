//! Error and result types shared by the AuraRadio service crates

use thiserror::Error;

/// Shorthand result used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad or missing configuration; only raised during startup
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected caller input; surfaces as a 400 at the API boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for faults the caller cannot act on
    #[error("Internal error: {0}")]
    Internal(String),
}
