//! Browser broker - session pooling and proxy endpoint rotation.
//!
//! This library makes unattended, repeated automated browsing viable without
//! exhausting automation resources or tripping anti-automation defenses. Two
//! cooperating process-wide components do the work:
//!
//! - **[`SessionPool`]** owns at most one browser process and one browsing
//!   context/page pair, hands callers a reusable checkout, tracks
//!   authentication state across checkouts, and lazily tears down idle
//!   resources through a cancellable deferred check.
//! - **[`RotationManager`]** maintains proxy endpoint lists grouped by
//!   credential group, rotates through groups round robin, balances
//!   per-endpoint usage against an escalating threshold, honors an exclusion
//!   list, and refreshes cached lists on a TTL.
//!
//! The rotation manager is a leaf; the pool depends on it for launch-time
//! proxy configuration. The browser driver itself is an external
//! collaborator consumed through the [`driver`] seam traits.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use browser_broker::{RotationManager, SessionPool, Settings};
//! use browser_broker::driver::BrowserDriver;
//! use browser_broker::rotation::HttpFetcher;
//!
//! # async fn example(driver: Arc<dyn BrowserDriver>) -> browser_broker::Result<()> {
//! let settings = Settings::from_env()?;
//! let rotation = Arc::new(RotationManager::from_settings(
//!     &settings,
//!     Arc::new(HttpFetcher::new()),
//! ));
//! let pool = SessionPool::new(driver, rotation, settings.idle_timeout);
//!
//! let checkout = pool.acquire_context(false).await?;
//! // drive checkout.page through the routing layer, confirm login, then:
//! pool.mark_authenticated();
//! pool.release();
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pool`] | Session pool: acquire, release, idle teardown |
//! | [`rotation`] | Endpoint rotation: groups, ledger, exclusions |
//! | [`driver`] | External browser-driver contract |
//! | [`config`] | Settings discovery and defaults |
//! | [`error`] | Error types and [`Result`] alias |

// ============================================================================
// Modules
// ============================================================================

/// Settings discovery and defaults.
///
/// Credential groups are probed from sequential configuration keys at
/// startup; see [`Settings`].
pub mod config;

/// External browser-driver contract.
///
/// Seam traits the pool consumes; implemented outside this crate.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Session pool.
///
/// One browser, one context, one page, reused across logical operations.
pub mod pool;

/// Endpoint rotation manager.
///
/// Group round robin, usage ledger, exclusion filtering, TTL-cached lists.
pub mod rotation;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration types
pub use config::{DEFAULT_CACHE_TTL, DEFAULT_IDLE_TIMEOUT, GroupSource, Settings};

// Driver contract types
pub use driver::{BrowserDriver, BrowserHandle, BrowsingContext, LaunchOptions, Page, ProxySettings};

// Error types
pub use error::{Error, Result};

// Pool types
pub use pool::{SessionCheckout, SessionPool};

// Rotation types
pub use rotation::{
    Credentials, Endpoint, EndpointListFetcher, ExclusionSet, GroupId, GroupList, HttpFetcher,
    RotatedEndpoint, RotationManager,
};
