//! Pool state and checkout types.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::driver::{BrowserHandle, BrowsingContext, Page};

// ============================================================================
// SessionCheckout
// ============================================================================

/// A checked-out session handed to the routing layer.
///
/// The handles stay owned by the pool; a checkout is a reference-counted view
/// valid until the pool recreates the underlying resources.
#[derive(Clone)]
pub struct SessionCheckout {
    /// The live browser process.
    pub browser: Arc<dyn BrowserHandle>,

    /// The live browsing context.
    pub context: Arc<dyn BrowsingContext>,

    /// The live page.
    pub page: Arc<dyn Page>,

    /// Whether a caller has confirmed authentication on this context.
    pub authenticated: bool,
}

impl fmt::Debug for SessionCheckout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCheckout")
            .field("browser", &"<dyn BrowserHandle>")
            .field("context", &"<dyn BrowsingContext>")
            .field("page", &"<dyn Page>")
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

// ============================================================================
// PoolState
// ============================================================================

/// Mutable pool state behind the session pool's mutex.
///
/// Invariants: `context` implies `browser`; `authenticated` implies
/// `context`. Every transition fully overwrites fields, never merges.
pub(crate) struct PoolState {
    /// The live browser process, if any.
    pub browser: Option<Arc<dyn BrowserHandle>>,

    /// The live browsing context, if any.
    pub context: Option<Arc<dyn BrowsingContext>>,

    /// The live page, if any.
    pub page: Option<Arc<dyn Page>>,

    /// Whether a caller has confirmed authentication on the current context.
    pub authenticated: bool,

    /// When the session was last acquired or released.
    pub last_used_at: Option<Instant>,

    /// Whether a caller currently holds the session.
    pub in_use: bool,

    /// Pending deferred idle check, if armed.
    pub cleanup: Option<JoinHandle<()>>,
}

impl PoolState {
    /// Creates empty pool state.
    pub(crate) fn new() -> Self {
        Self {
            browser: None,
            context: None,
            page: None,
            authenticated: false,
            last_used_at: None,
            in_use: false,
            cleanup: None,
        }
    }

    /// Returns `true` if the session has sat unused longer than the idle
    /// timeout. Strict: exactly at the boundary is not stale.
    pub(crate) fn is_stale(&self, idle_timeout: Duration) -> bool {
        self.last_used_at
            .is_some_and(|at| at.elapsed() > idle_timeout)
    }

    /// Cancels the pending idle check, if any.
    pub(crate) fn cancel_cleanup(&mut self) {
        if let Some(handle) = self.cleanup.take() {
            handle.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
