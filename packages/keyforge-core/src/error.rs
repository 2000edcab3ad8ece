//! # Error Handling
//!
//! Error types for Keyforge Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Derivation Errors                                                 │
//! │  │   ├── InvalidParameters     - scrypt cost parameters rejected       │
//! │  │   └── InvalidKeyLength      - master key is not 32 bytes            │
//! │  │                                                                      │
//! │  ├── Input Errors                                                      │
//! │  │   ├── InvalidContext        - malformed or duplicate context        │
//! │  │   └── InvalidSalt           - salt could not be decoded             │
//! │  │                                                                      │
//! │  └── Runtime Errors                                                    │
//! │      ├── Timeout               - background stretch missed deadline    │
//! │      └── Internal              - background task failed                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both derivation functions are pure, so none of the derivation or input
//! errors can be fixed by retrying. Only [`Error::Timeout`] is recoverable.

use thiserror::Error;

/// Result type alias for Keyforge Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Keyforge Core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Derivation Errors (100-199)
    // ========================================================================

    /// Stretch cost parameters failed validation
    #[error("Invalid stretch parameters: {0}")]
    InvalidParameters(String),

    /// Master key passed to the expander has the wrong length
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    // ========================================================================
    // Input Errors (200-299)
    // ========================================================================

    /// Context string or context set failed validation
    #[error("Invalid key context: {0}")]
    InvalidContext(String),

    /// Salt could not be decoded
    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    // ========================================================================
    // Runtime Errors (900-999)
    // ========================================================================

    /// Background stretch exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get a stable numeric code for this error
    ///
    /// Error codes are organized by category:
    /// - 100-199: Derivation
    /// - 200-299: Input
    /// - 900-999: Runtime
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameters(_) => 100,
            Error::InvalidKeyLength { .. } => 101,

            Error::InvalidContext(_) => 200,
            Error::InvalidSalt(_) => 201,

            Error::Timeout(_) => 900,
            Error::Internal(_) => 901,
        }
    }

    /// Check if this error is recoverable
    ///
    /// A timed-out stretch may succeed once the blocking pool is less busy.
    /// Everything else is a programming or configuration error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl From<scrypt::errors::InvalidParams> for Error {
    fn from(err: scrypt::errors::InvalidParams) -> Self {
        Error::InvalidParameters(err.to_string())
    }
}

impl From<scrypt::errors::InvalidOutputLen> for Error {
    fn from(err: scrypt::errors::InvalidOutputLen) -> Self {
        Error::InvalidParameters(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("stretch task failed: {}", err))
    }
}
