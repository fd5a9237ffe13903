//! Error types for Warden

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A blocking database task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// Raised to direct callers of the orchestrator for an unregistered name
    #[error("Agent \"{0}\" not found")]
    AgentNotFound(String),

    #[error("Agent \"{0}\" is already registered")]
    DuplicateAgent(String),

    /// A stage of an agent cycle failed
    #[error("Agent error: {0}")]
    Agent(String),
}

pub type Result<T> = std::result::Result<T, Error>;
