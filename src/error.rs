//! Error types for model loading and construction.
//!
//! Every fallible operation in this crate happens before audio starts
//! flowing: opening and parsing the model-data file, validating the
//! configuration, and streaming weights into the blocks. The audio path
//! (`Model::process` / `Model::finalize`) never returns an error; host
//! contract violations there are programmer errors and panic.

use thiserror::Error;

/// Errors surfaced while loading or constructing a model.
#[derive(Debug, Error)]
pub enum Error {
    /// The model-data file could not be opened or read.
    #[error("failed to read model data: {0}")]
    Io(#[from] std::io::Error),

    /// The model-data document is not valid JSON.
    #[error("malformed model data: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration is structurally invalid for this engine.
    #[error("{0}")]
    Config(String),

    /// The weight stream contains more values than the model consumes.
    #[error("weight stream has {remaining} unconsumed values")]
    WeightOverflow { remaining: usize },

    /// The weight stream ended before all parameters were filled.
    #[error("weight stream exhausted before all parameters were read")]
    WeightUnderflow,

    /// A configured feature exists in the format but not in this engine.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// A WAV file could not be read or written.
    #[cfg(feature = "tools")]
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// A specialized [`Result`](std::result::Result) type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
