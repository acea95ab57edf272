use thiserror::Error;

/// Coarse classification of every [`SkeinError`].
///
/// Callers that only care about *why* an operation failed, rather than the
/// precise violation, match on this instead of the full enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied structurally invalid parameters.
    InvalidInput,
    /// A proof buffer could not be decoded.
    MalformedProof,
    /// A proof target could not be located in the tree.
    ElementNotFound,
    /// The hash or randomness primitive failed.
    PrimitiveFailure,
}

/// All error codes for the Skein engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkeinError {
    // ─── Hash Tree Errors ────────────────────────────────────────────────────
    #[error("cannot build a hash tree with no leaves")]
    EmptyTree,

    #[error("leaf {index} is not raw bytes and no serializer was provided")]
    MissingSerializer { index: usize },

    #[error("leaf index {index} out of range for tree of {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("element not found in tree")]
    ElementNotFound,

    #[error("proof length {len} is not a multiple of {step}")]
    ProofLength { len: usize, step: usize },

    #[error("proof step {step} has side byte {side}, expected 0 or 1")]
    InvalidSide { step: usize, side: u8 },

    // ─── Secret Sharing Errors ───────────────────────────────────────────────
    #[error("secret must be at least {min} bytes, got {len}")]
    NeedMoreData { len: usize, min: usize },

    #[error("threshold must be at least {min}, got {threshold}")]
    ThresholdTooLow { threshold: usize, min: usize },

    #[error("share count {shares} is below threshold {threshold}")]
    TooFewShares { shares: usize, threshold: usize },

    #[error("share count {shares} exceeds maximum {max}")]
    TooManyShares { shares: usize, max: usize },

    #[error("need at least {min} shares to restore, got {shares}")]
    NotEnoughShares { shares: usize, min: usize },

    #[error("share {index} has length {actual}, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("share too short: {len} bytes (min {min})")]
    ShareTooShort { len: usize, min: usize },

    #[error("share x-coordinate must be non-zero")]
    InvalidShareIndex,

    #[error("duplicate share x-coordinate: {0}")]
    DuplicateShareIndex(u8),

    // ─── Field Errors ────────────────────────────────────────────────────────
    #[error("division by zero in GF(256)")]
    DivisionByZero,

    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    // ─── Encoding Errors ─────────────────────────────────────────────────────
    #[error("invalid encoding: {reason}")]
    InvalidEncoding { reason: String },

    // ─── Primitive Errors ────────────────────────────────────────────────────
    #[error("primitive failure: {reason}")]
    PrimitiveFailure { reason: String },
}

impl SkeinError {
    /// Map this error onto its coarse [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            SkeinError::ProofLength { .. } | SkeinError::InvalidSide { .. } => {
                ErrorKind::MalformedProof
            }
            SkeinError::ElementNotFound => ErrorKind::ElementNotFound,
            SkeinError::PrimitiveFailure { .. } => ErrorKind::PrimitiveFailure,
            SkeinError::EmptyTree
            | SkeinError::MissingSerializer { .. }
            | SkeinError::IndexOutOfRange { .. }
            | SkeinError::NeedMoreData { .. }
            | SkeinError::ThresholdTooLow { .. }
            | SkeinError::TooFewShares { .. }
            | SkeinError::TooManyShares { .. }
            | SkeinError::NotEnoughShares { .. }
            | SkeinError::LengthMismatch { .. }
            | SkeinError::ShareTooShort { .. }
            | SkeinError::InvalidShareIndex
            | SkeinError::DuplicateShareIndex(_)
            | SkeinError::DivisionByZero
            | SkeinError::InvalidRange { .. }
            | SkeinError::InvalidEncoding { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Result type for Skein operations.
pub type SkeinResult<T> = Result<T, SkeinError>;
