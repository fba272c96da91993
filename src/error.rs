//! Error taxonomy for the engine.
//!
//! - [`CheckInError`]: the check-in is out of the accepted domain. Rejected up front.
//! - [`StoreError`]: the history medium failed. Reads absorb it, writes surface it.
//! - [`EngineError`]: what `RitmoEngine::evaluate` can return.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckInError {
    #[error("usuario_id must not be empty")]
    EmptyUserId,

    #[error("foco must be between 1 and 5, got {0}")]
    FocusOutOfRange(u8),

    #[error("horas_sono must be between 0 and 24, got {0}")]
    SleepOutOfRange(f64),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt history record at line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid check-in: {0}")]
    InvalidCheckIn(#[from] CheckInError),

    #[error("failed to append check-in to history: {0}")]
    StoreWrite(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
