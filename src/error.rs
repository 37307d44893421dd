use crate::decoder::DecodeError;
use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors surfaced by a load, either synchronously from `load` or later from
/// the preload pass.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("image contains no frames")]
    EmptySequence,

    #[error("decoding frame {index} failed")]
    DecodeFailed {
        index: usize,
        #[source]
        source: DecodeError,
    },
}

/// Errors raised while reading a [`PlayerConfig`](crate::PlayerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive number of seconds, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

impl LoadError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode_failed(index: usize, source: DecodeError) -> Self {
        Self::DecodeFailed { index, source }
    }
}
