use crate::round::{Action, Phase};
use thiserror::Error;

/// Coarse classification of [Error], stable across detail changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    Range,
    Encoding,
    Validation,
    NotFound,
    PhaseViolation,
    Storage,
}

/// Error type for the commit-reveal core.
#[derive(Error, Debug)]
pub enum Error {
    /// Input that is not well-formed hex (or otherwise undecodable bytes).
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// A value outside the bounds the protocol can represent.
    #[error("{field} out of range: {value}")]
    Range { field: &'static str, value: String },
    /// Invalid arguments to commitment computation.
    #[error("cannot encode commitment: {0}")]
    Encoding(&'static str),
    /// Structurally invalid payload arguments.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    /// No stored seed, or no snapshot for a round.
    #[error("{what} not found for round {round_id}")]
    NotFound { what: &'static str, round_id: u64 },
    /// Action attempted outside the phase where it is legal.
    #[error("{action} is not allowed while round {round_id} is {phase}")]
    PhaseViolation {
        action: Action,
        phase: Phase,
        round_id: u64,
    },
    /// The injected key-value store failed.
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedInput(_) => ErrorKind::MalformedInput,
            Error::Range { .. } => ErrorKind::Range,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PhaseViolation { .. } => ErrorKind::PhaseViolation,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
