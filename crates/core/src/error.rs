//! Error taxonomy for the decoding engine.
//!
//! Every failure aborts the current request and is reported to the caller
//! as a single terminal error. Nothing here is retried: re-running a
//! stochastic generation could mask the original fault behind a different
//! but "successful" result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller supplied an out-of-contract sampling parameter.
    /// Rejected before any forward-pass call is issued.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The forward-pass service failed. Propagated, never retried.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The tokenizer could not render a token-id sequence back to text.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The tokenizer could not encode input text.
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// A named special token is missing from the tokenizer vocabulary.
    /// Raised at construction time; the service must refuse to start.
    #[error("unknown special token: {0}")]
    UnknownSpecialToken(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
