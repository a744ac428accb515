//! Error types for the abiscope build and decode pipeline.

use thiserror::Error;

/// Errors raised while turning a declared ABI type string into a [`ParamType`].
///
/// [`ParamType`]: crate::types::ParamType
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Unsupported ABI type '{ty}'")]
    Unsupported { ty: String },

    #[error("Invalid size in ABI type '{ty}'")]
    InvalidSize { ty: String },

    #[error("Tuple type '{ty}' has no components")]
    MissingComponents { ty: String },

    #[error("Non-tuple type '{ty}' declares components")]
    UnexpectedComponents { ty: String },
}

/// Errors from the signature registry builder and artifact loader.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to parse interface document '{source_name}': {reason}")]
    Parse { source_name: String, reason: String },

    #[error("Invalid entry '{entry}' in '{source_name}': {source}")]
    InvalidEntry {
        source_name: String,
        entry: String,
        #[source]
        source: TypeError,
    },

    #[error("{path} is not a directory")]
    NotADirectory { path: String },

    #[error("Unsupported registry artifact version {found} (expected {expected})")]
    ArtifactVersion { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors that can occur while decoding a single value from a buffer.
///
/// These never escape the public decode entry points; they are rendered into
/// the `decode_errors` map of the decoded record instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Buffer too short: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Offset {offset} points outside the buffer (length {len})")]
    OffsetOutOfRange { offset: String, len: usize },

    #[error("Length {length} does not fit in the buffer")]
    LengthOverflow { length: String },

    #[error("Missing topic at index {index}")]
    MissingTopic { index: usize },

    #[error("Invalid hex: {reason}")]
    InvalidHex { reason: String },

    #[error("Type '{ty}' is not a single-word value")]
    NotAWord { ty: String },

    #[error("Decoded output exceeds the {limit}-byte budget")]
    BudgetExceeded { limit: usize },
}
