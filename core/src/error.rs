//! Errors raised while setting up or running a transfer session.
//!
//! # Design
//! These never reach the caller. The session uses them with `?` internally
//! and collapses them into a sentinel `Response` at the boundary; the
//! variant only decides which diagnostic body is reported and what gets
//! logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    /// The engine rejected an option while the session was being configured.
    #[error("failed to configure transfer: {0}")]
    Configure(#[source] curl::Error),

    /// A multipart form could not be assembled.
    #[error("failed to build multipart form: {0}")]
    Form(#[from] curl::FormError),

    /// The blocking transfer itself failed, including callback aborts.
    #[error("transfer failed: {0}")]
    Perform(#[source] curl::Error),

    /// The transfer completed but the status code could not be read back.
    #[error("failed to read response code: {0}")]
    Status(#[source] curl::Error),
}

impl From<curl::Error> for TransferError {
    fn from(err: curl::Error) -> Self {
        TransferError::Configure(err)
    }
}

impl TransferError {
    /// Failures that happened before the transfer started.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TransferError::Configure(_) | TransferError::Form(_))
    }
}
