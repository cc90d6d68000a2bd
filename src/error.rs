//! Error types shared by the delta codec and the patch text format.
//!
//! `diff_main`, the cleanup passes, the bitap matcher, and `Patch::apply`
//! never fail (see the crate-level docs): bitap and patch-location failures
//! are reported as `-1`/`false` values, not propagated as errors. Only the
//! two text decoders in this crate (delta, patch text) can fail, and they do
//! so with one of the variants below.

use thiserror::Error;

/// Errors produced while decoding a delta string or a patch text block.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A patch header, an op-code prefix, or a numeric field could not be
    /// parsed.
    #[error("invalid format: {0}")]
    FormatError(String),

    /// URL-decoded insert text was not valid UTF-8.
    #[error("invalid UTF-8 in encoded text: {0}")]
    EncodingError(String),

    /// A retain/delete count in a delta ran past the end of the source
    /// text, or the delta did not consume the whole source.
    #[error("delta out of range: {0}")]
    OutOfRange(String),

    /// A delta token carried a negative count.
    #[error("negative count in delta: {0}")]
    NegativeCount(String),
}

pub type Result<T> = std::result::Result<T, DiffError>;
