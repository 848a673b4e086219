//! Error types for ctlmap-core.

use thiserror::Error;

/// Recoverable failure kinds reported by the binding table and automation manager.
///
/// These never abort an operation with a panic. The operation becomes a no-op
/// (or yields a fallback value) and the kind is handed to the error callback.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Path does not resolve, or resolves to a directory node.
    #[error("Bad path")]
    BadPath,

    /// Resolved port lacks a usable value type or required scaling keys.
    #[error("Failed to read metadata")]
    UnreadableMetadata,

    /// Path exceeds the fixed path buffer capacity.
    #[error("Path too long")]
    PathTooLong,

    /// No free table entry, slot or binding.
    #[error("Capacity exhausted")]
    CapacityExhausted,

    /// Scaling tag is neither `linear` nor `logarithmic`.
    #[error("Unknown scale")]
    UnknownScale,
}

/// Construction-time errors (building port trees, validating configs).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid port name: {0}")]
    InvalidPortName(String),

    #[error("Duplicate port: {0}")]
    DuplicatePort(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiParse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
