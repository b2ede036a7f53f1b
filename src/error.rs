//! Error types for box_packer.
//!
//! The engine itself never fails: items that do not fit end up in the unpacked list.
//! Everything here comes from the layers around it.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Request rejected before the engine ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preset '{0}' already exists")]
    DuplicatePreset(String),

    #[error("preset '{0}' not found")]
    PresetNotFound(String),

    /// The background worker hung up.
    #[error("packing worker is unavailable")]
    WorkerUnavailable,

    /// The background worker reported a failure.
    #[error("packing worker failed: {0}")]
    Worker(String),
}
