//! External browser-driver contract.
//!
//! The broker never drives a browser engine itself. It consumes a driver
//! through the seam traits below: launch a browser, open one isolated
//! browsing context, open one page, close things. Everything past that —
//! navigation, evaluation, DOM work — belongs to the routing layer and the
//! driver implementation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BrowserDriver`] | Launches browser processes |
//! | [`BrowserHandle`] | One live browser process |
//! | [`BrowsingContext`] | One isolated context inside a browser |
//! | [`Page`] | Opaque page handle, driven elsewhere |
//! | [`LaunchOptions`] | Launch configuration |
//! | [`ProxySettings`] | Outbound proxy for a launch |

// ============================================================================
// Submodules
// ============================================================================

/// Browser launch options and proxy settings.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use options::{LaunchOptions, ProxySettings};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// BrowserDriver
// ============================================================================

/// Launches browser processes.
///
/// Implementations own process management, profiles, and transport; the
/// broker only asks for a handle and hands back launch options.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Launches a browser process.
    ///
    /// # Errors
    ///
    /// Returns a driver error when the process cannot be started. The pool
    /// propagates it untouched and commits no state.
    async fn launch(&self, options: LaunchOptions) -> Result<Arc<dyn BrowserHandle>>;
}

// ============================================================================
// BrowserHandle
// ============================================================================

/// One live browser process.
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    /// Opens a new isolated browsing context.
    ///
    /// # Errors
    ///
    /// Returns a driver error when context creation fails.
    async fn new_context(&self) -> Result<Arc<dyn BrowsingContext>>;

    /// Closes the browser process.
    ///
    /// # Errors
    ///
    /// May fail; the pool logs and swallows close errors, resetting its local
    /// state regardless.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// BrowsingContext
// ============================================================================

/// One isolated browsing context inside a browser.
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    /// Opens a new page in this context.
    ///
    /// # Errors
    ///
    /// Returns a driver error when page creation fails.
    async fn new_page(&self) -> Result<Arc<dyn Page>>;

    /// Closes the context and its pages.
    ///
    /// # Errors
    ///
    /// May fail; the pool logs and swallows close errors.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// Page
// ============================================================================

/// Opaque page handle.
///
/// The broker stores and hands out pages but never drives them; navigation
/// and evaluation live in the routing layer against the concrete driver type.
pub trait Page: Send + Sync {}
