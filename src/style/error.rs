//! Style validation errors.

use thiserror::Error;

/// Error returned when a style description cannot be used.
///
/// Both variants are programmer errors: they are raised synchronously at
/// decoration or instance construction time and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// The style source handed to the decorator is not a mapping of
    /// selectors to declarations.
    #[error("style source must be a mapping of selectors to declarations: {reason}")]
    InvalidStyleInput { reason: String },
    /// A derived-style function produced something other than a mapping of
    /// selectors to declarations.
    #[error("derived styles did not produce a mapping of selectors to declarations: {reason}")]
    InvalidStyleResult { reason: String },
}

impl StyleError {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        StyleError::InvalidStyleInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn result(reason: impl Into<String>) -> Self {
        StyleError::InvalidStyleResult {
            reason: reason.into(),
        }
    }
}
