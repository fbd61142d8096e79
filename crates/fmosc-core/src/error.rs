//! Error type shared by the synthesis core.
//!
//! Every variant is local and recoverable by the caller. The render path never
//! produces one of these mid-buffer: it substitutes silence or the
//! last-known-good value instead.

use thiserror::Error;

/// Errors returned by note lookup and voice control operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// A note resolved outside the supported keyboard span (A0..=C7).
    #[error("note {note} is outside the supported range {min}..={max}")]
    OutOfRange {
        /// Key index (A0 = 0) the note resolved to.
        note: i32,
        /// Lowest supported key index.
        min: i32,
        /// Highest supported key index.
        max: i32,
    },

    /// A setter or parser received a value outside its domain.
    #[error("invalid value for {param}: {reason}")]
    InvalidParameter {
        /// Name of the rejected parameter.
        param: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The voice was released; no further operations succeed.
    #[error("voice has already been released")]
    AlreadyReleased,
}

impl SynthError {
    pub(crate) fn invalid(param: &'static str, reason: &'static str) -> Self {
        SynthError::InvalidParameter { param, reason }
    }
}

/// Convenience result type for synthesis operations.
pub type Result<T> = core::result::Result<T, SynthError>;
