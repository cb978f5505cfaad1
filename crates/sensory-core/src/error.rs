//! Error types returned across the core's public API.
//!
//! Nothing in the core panics on bad input; every recoverable failure is one of
//! these values and callers decide whether to surface it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("no config registered for theme '{0}'")]
    UnknownTheme(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write rejected for '{key}': {reason}")]
    WriteRejected { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("nothing stored under '{0}'")]
    NotFound(String),
    #[error("stored data under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset '{0}' does not exist")]
    NotFound(String),
    #[error("preset name '{0}' is already taken")]
    NameTaken(String),
    #[error("preset name must not be empty")]
    InvalidName,
    #[error("current theme '{0}' has no config to snapshot")]
    MissingConfig(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
