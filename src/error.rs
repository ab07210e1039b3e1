//! Error types for the browser broker.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use browser_broker::{Result, SessionPool};
//!
//! async fn example(pool: &SessionPool) -> Result<()> {
//!     let checkout = pool.acquire_context(false).await?;
//!     // drive the page through the routing layer
//!     pool.release();
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Exhaustion | [`Error::NoEndpoints`], [`Error::NoCredentials`] |
//! | Upstream | [`Error::ListFetch`], [`Error::Http`] |
//! | Driver | [`Error::Driver`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::rotation::GroupId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when settings are missing or malformed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A configured endpoint-list source URL failed to parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Exhaustion Errors
    // ========================================================================
    /// No endpoints survived exclusion filtering.
    ///
    /// Fatal to the calling operation; never retried internally.
    #[error("No endpoints available")]
    NoEndpoints,

    /// An endpoint list contained no well-formed line to take credentials from.
    #[error("No credentials for group {group}")]
    NoCredentials {
        /// The credential group whose list was unusable.
        group: GroupId,
    },

    // ========================================================================
    // Upstream Errors
    // ========================================================================
    /// An endpoint-list source could not be fetched.
    ///
    /// Recoverable when a previously cached list exists; fatal otherwise.
    #[error("Failed to fetch endpoint list for group {group}: {message}")]
    ListFetch {
        /// The credential group whose source failed.
        group: GroupId,
        /// Description of the fetch failure.
        message: String,
    },

    /// HTTP transport error from the list fetcher.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Driver Errors
    // ========================================================================
    /// The external browser driver rejected a launch or creation call.
    ///
    /// Propagated to the caller untouched; the pool commits no partial state.
    #[error("Driver error: {message}")]
    Driver {
        /// Description of the driver failure.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a no-credentials error for a group.
    #[inline]
    pub fn no_credentials(group: GroupId) -> Self {
        Self::NoCredentials { group }
    }

    /// Creates a list-fetch error for a group.
    #[inline]
    pub fn list_fetch(group: GroupId, message: impl Into<String>) -> Self {
        Self::ListFetch {
            group,
            message: message.into(),
        }
    }

    /// Creates a driver error.
    #[inline]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is an exhaustion error.
    ///
    /// Exhaustion errors are fatal to the calling operation and are never
    /// retried internally.
    #[inline]
    #[must_use]
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::NoEndpoints | Self::NoCredentials { .. })
    }

    /// Returns `true` if this is an upstream fetch error.
    ///
    /// Fetch errors are tolerated when a cached endpoint list exists.
    #[inline]
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::ListFetch { .. } | Self::Http(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoEndpoints;
        assert_eq!(err.to_string(), "No endpoints available");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing PROXY_LIST_1_URL");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing PROXY_LIST_1_URL"
        );
    }

    #[test]
    fn test_no_credentials_display() {
        let err = Error::no_credentials(GroupId::new(2));
        assert_eq!(err.to_string(), "No credentials for group 2");
    }

    #[test]
    fn test_is_exhaustion() {
        assert!(Error::NoEndpoints.is_exhaustion());
        assert!(Error::no_credentials(GroupId::new(1)).is_exhaustion());
        assert!(!Error::config("test").is_exhaustion());
    }

    #[test]
    fn test_is_fetch_error() {
        let fetch_err = Error::list_fetch(GroupId::new(1), "503 Service Unavailable");
        assert!(fetch_err.is_fetch_error());
        assert!(!Error::NoEndpoints.is_fetch_error());
        assert!(!Error::driver("launch failed").is_fetch_error());
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
