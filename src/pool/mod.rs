//! Browser session pool.
//!
//! Owns at most one browser process and one browsing-context/page pair, hands
//! callers a reusable checkout, tracks authentication state across checkouts,
//! and lazily tears down idle resources through a deferred, cancellable idle
//! check.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SessionPool`] | Acquire/release lifecycle around one session |
//! | [`SessionCheckout`] | Handles handed to the routing layer |
//!
//! # Example
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
//! // ... drive checkout.page through the routing layer ...
//! pool.release();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Pool state and checkout types.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use state::SessionCheckout;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::driver::{BrowserDriver, BrowserHandle, LaunchOptions};
use crate::error::Result;
use crate::rotation::RotationManager;

use state::PoolState;

// ============================================================================
// Constants
// ============================================================================

/// Slack added when arming the deferred idle check.
///
/// `is_stale` is strict at the boundary, so a check firing exactly one idle
/// timeout after release would observe a non-stale session and never tear it
/// down. The slack puts the fire time unambiguously past the boundary.
const IDLE_CHECK_SLACK: Duration = Duration::from_secs(1);

// ============================================================================
// SessionPool
// ============================================================================

/// Reusable browser session with deferred idle teardown.
///
/// One instance lives for the whole process, created at the composition root
/// and shared by reference. Cloning is cheap and shares the same state.
///
/// The pool never authenticates; callers confirm login success independently
/// and report it through [`SessionPool::mark_authenticated`].
#[derive(Clone)]
pub struct SessionPool {
    /// Shared inner state.
    inner: Arc<PoolInner>,
}

/// Internal shared state for the pool.
struct PoolInner {
    /// External driver used to launch browsers.
    driver: Arc<dyn BrowserDriver>,

    /// Endpoint source for launch-time proxy configuration.
    rotation: Arc<RotationManager>,

    /// Idle time before the session is considered stale.
    idle_timeout: Duration,

    /// Pool state. Never held across an await.
    state: Mutex<PoolState>,
}

// ============================================================================
// SessionPool - Display
// ============================================================================

impl fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SessionPool")
            .field("browser", &state.browser.is_some())
            .field("context", &state.context.is_some())
            .field("authenticated", &state.authenticated)
            .field("in_use", &state.in_use)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SessionPool - Construction
// ============================================================================

impl SessionPool {
    /// Creates a session pool.
    ///
    /// # Arguments
    ///
    /// * `driver` - External browser driver
    /// * `rotation` - Endpoint rotation manager for launch proxies
    /// * `idle_timeout` - Idle time before teardown
    #[must_use]
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        rotation: Arc<RotationManager>,
        idle_timeout: Duration,
    ) -> Self {
        info!(
            idle_secs = idle_timeout.as_secs(),
            "Session pool initialized"
        );

        Self {
            inner: Arc::new(PoolInner {
                driver,
                rotation,
                idle_timeout,
                state: Mutex::new(PoolState::new()),
            }),
        }
    }
}

// ============================================================================
// SessionPool - Acquisition
// ============================================================================

impl SessionPool {
    /// Returns a live browser, launching one when needed.
    ///
    /// A non-stale browser is reused (marked in-use, last-use stamped, any
    /// pending idle check cancelled). A stale one is torn down fully, context
    /// first, before a replacement is launched against an endpoint obtained
    /// from the rotation manager.
    ///
    /// # Arguments
    ///
    /// * `debug` - Launch with a visible window instead of headless
    ///
    /// # Errors
    ///
    /// Launch and endpoint-selection failures propagate unmodified; no
    /// partial state is committed.
    pub async fn acquire_browser(&self, debug: bool) -> Result<Arc<dyn BrowserHandle>> {
        if let Some(browser) = self.reuse_browser() {
            debug!("Reusing live browser");
            return Ok(browser);
        }

        if self.has_browser() {
            info!("Browser is stale, tearing down before relaunch");
            self.close_browser().await;
        }

        self.launch_browser(debug).await
    }

    /// Returns a live checkout, creating browser/context/page as needed.
    ///
    /// A non-stale context and page are returned verbatim, preserving the
    /// `authenticated` flag. A stale context is torn down and replaced; a
    /// fresh context always starts with `authenticated = false`.
    ///
    /// # Arguments
    ///
    /// * `debug` - Launch with a visible window instead of headless
    ///
    /// # Errors
    ///
    /// Driver and endpoint-selection failures propagate unmodified; no
    /// partial state is committed.
    pub async fn acquire_context(&self, debug: bool) -> Result<SessionCheckout> {
        if let Some(checkout) = self.reuse_context() {
            debug!(
                authenticated = checkout.authenticated,
                "Reusing live context"
            );
            return Ok(checkout);
        }

        if self.has_context() {
            info!("Context is stale, tearing down before replacement");
            self.close_context().await;
        }

        let browser = self.acquire_browser(debug).await?;
        let context = browser.new_context().await?;
        let page = context.new_page().await?;
        debug!("Opened fresh context and page");

        {
            let mut state = self.inner.state.lock();
            state.context = Some(Arc::clone(&context));
            state.page = Some(Arc::clone(&page));
            state.authenticated = false;
            state.in_use = true;
            state.last_used_at = Some(Instant::now());
        }

        Ok(SessionCheckout {
            browser,
            context,
            page,
            authenticated: false,
        })
    }

    /// Marks the current context as authenticated.
    ///
    /// Called by the routing layer after it has independently confirmed a
    /// successful login. No-op (with a warning) when no context is live.
    pub fn mark_authenticated(&self) {
        let mut state = self.inner.state.lock();
        if state.context.is_some() {
            state.authenticated = true;
            debug!("Session marked authenticated");
        } else {
            warn!("mark_authenticated called with no live context");
        }
    }

    /// Releases the session and arms the deferred idle check.
    ///
    /// Marks the session unused, stamps the last-use time, and (re)arms an
    /// idle check that tears the session down once it has sat unused past the
    /// idle timeout. Never destroys anything synchronously; a caller
    /// re-acquiring shortly after release gets the live session back.
    pub fn release(&self) {
        let mut state = self.inner.state.lock();
        state.in_use = false;
        state.last_used_at = Some(Instant::now());
        state.cancel_cleanup();

        let pool = self.clone();
        let delay = self.inner.idle_timeout + IDLE_CHECK_SLACK;
        state.cleanup = Some(tokio::spawn(async move {
            sleep(delay).await;
            pool.idle_check().await;
        }));

        debug!("Session released, idle check armed");
    }
}

// ============================================================================
// SessionPool - Inspection
// ============================================================================

impl SessionPool {
    /// Returns `true` if the session has sat unused past the idle timeout.
    ///
    /// Strict: exactly at the boundary is not stale.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.inner.state.lock().is_stale(self.inner.idle_timeout)
    }

    /// Returns `true` if a browser is live.
    #[must_use]
    pub fn has_browser(&self) -> bool {
        self.inner.state.lock().browser.is_some()
    }

    /// Returns `true` if a context is live.
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.inner.state.lock().context.is_some()
    }

    /// Returns `true` if the current context is marked authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.lock().authenticated
    }

    /// Returns `true` if a caller currently holds the session.
    #[must_use]
    pub fn is_in_use(&self) -> bool {
        self.inner.state.lock().in_use
    }
}

// ============================================================================
// SessionPool - Teardown
// ============================================================================

impl SessionPool {
    /// Closes the context and page. Idempotent.
    ///
    /// Local fields (`context`, `page`, `authenticated`) are reset before the
    /// driver close is awaited; a failing close is logged and swallowed, since
    /// subsequent acquisitions depend only on local state.
    pub async fn close_context(&self) {
        let context = {
            let mut state = self.inner.state.lock();
            state.page = None;
            state.authenticated = false;
            state.context.take()
        };

        if let Some(context) = context {
            debug!("Closing browsing context");
            if let Err(error) = context.close().await {
                warn!(error = %error, "Context close failed, local state reset anyway");
            }
        }
    }

    /// Closes the browser, context first. Idempotent.
    ///
    /// Cancels any pending idle check, then resets all local fields
    /// (`browser`, `in_use`, `last_used_at` included) regardless of whether
    /// the driver close succeeds.
    pub async fn close_browser(&self) {
        {
            let mut state = self.inner.state.lock();
            state.cancel_cleanup();
        }

        self.close_context().await;

        let browser = {
            let mut state = self.inner.state.lock();
            state.in_use = false;
            state.last_used_at = None;
            state.browser.take()
        };

        if let Some(browser) = browser {
            info!("Closing browser");
            if let Err(error) = browser.close().await {
                warn!(error = %error, "Browser close failed, local state reset anyway");
            }
        }
    }
}

// ============================================================================
// SessionPool - Internals
// ============================================================================

impl SessionPool {
    /// Checks out the live browser when present and not stale.
    fn reuse_browser(&self) -> Option<Arc<dyn BrowserHandle>> {
        let mut state = self.inner.state.lock();
        if state.is_stale(self.inner.idle_timeout) {
            return None;
        }
        let browser = state.browser.clone()?;

        state.cancel_cleanup();
        state.in_use = true;
        state.last_used_at = Some(Instant::now());
        Some(browser)
    }

    /// Checks out the live context when present and not stale.
    fn reuse_context(&self) -> Option<SessionCheckout> {
        let mut state = self.inner.state.lock();
        if state.is_stale(self.inner.idle_timeout) {
            return None;
        }
        let browser = state.browser.clone()?;
        let context = state.context.clone()?;
        let page = state.page.clone()?;

        state.cancel_cleanup();
        state.in_use = true;
        state.last_used_at = Some(Instant::now());
        Some(SessionCheckout {
            browser,
            context,
            page,
            authenticated: state.authenticated,
        })
    }

    /// Launches a fresh browser against a rotated endpoint.
    async fn launch_browser(&self, debug: bool) -> Result<Arc<dyn BrowserHandle>> {
        let rotated = self.inner.rotation.get_endpoint().await?;
        let headless = !debug;
        info!(
            server = %rotated.server(),
            group = %rotated.group,
            headless = headless,
            "Launching browser"
        );

        let options = LaunchOptions::new()
            .with_headless(headless)
            .with_proxy(rotated.to_proxy_settings());
        let browser = self.inner.driver.launch(options).await?;

        {
            let mut state = self.inner.state.lock();
            state.browser = Some(Arc::clone(&browser));
            state.in_use = true;
            state.last_used_at = Some(Instant::now());
        }

        Ok(browser)
    }

    /// Deferred idle check armed by [`SessionPool::release`].
    ///
    /// Tears the session down only when it is still unused and still stale at
    /// fire time; an acquisition in between cancels the check entirely.
    async fn idle_check(&self) {
        let should_close = {
            let mut state = self.inner.state.lock();
            // This task is the pending check; drop the handle without abort
            // so the teardown below is not cancelled mid-flight.
            state.cleanup = None;
            !state.in_use && state.is_stale(self.inner.idle_timeout)
        };

        if should_close {
            info!("Idle session expired, tearing down");
            self.close_browser().await;
        } else {
            debug!("Idle check fired but session is active again");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use url::Url;

    use crate::config::GroupSource;
    use crate::driver::{BrowsingContext, Page, ProxySettings};
    use crate::error::Error;
    use crate::rotation::{EndpointListFetcher, ExclusionSet, GroupId};

    const IDLE: Duration = Duration::from_secs(300);

    // ------------------------------------------------------------------------
    // Mocks
    // ------------------------------------------------------------------------

    /// Shared event log for ordering assertions.
    type Events = Arc<Mutex<Vec<&'static str>>>;

    struct StaticFetcher {
        text: &'static str,
    }

    #[async_trait]
    impl EndpointListFetcher for StaticFetcher {
        async fn fetch(&self, _url: &Url) -> Result<String> {
            Ok(self.text.to_string())
        }
    }

    struct MockPage;

    impl Page for MockPage {}

    struct MockContext {
        events: Events,
        fail_close: bool,
    }

    #[async_trait]
    impl BrowsingContext for MockContext {
        async fn new_page(&self) -> Result<Arc<dyn Page>> {
            Ok(Arc::new(MockPage))
        }

        async fn close(&self) -> Result<()> {
            self.events.lock().push("context_close");
            if self.fail_close {
                Err(Error::driver("context close rejected"))
            } else {
                Ok(())
            }
        }
    }

    struct MockBrowser {
        events: Events,
        fail_close: bool,
    }

    #[async_trait]
    impl BrowserHandle for MockBrowser {
        async fn new_context(&self) -> Result<Arc<dyn BrowsingContext>> {
            Ok(Arc::new(MockContext {
                events: Arc::clone(&self.events),
                fail_close: self.fail_close,
            }))
        }

        async fn close(&self) -> Result<()> {
            self.events.lock().push("browser_close");
            if self.fail_close {
                Err(Error::driver("browser close rejected"))
            } else {
                Ok(())
            }
        }
    }

    struct MockDriver {
        events: Events,
        launches: AtomicUsize,
        fail_launch: AtomicBool,
        fail_close: bool,
        last_options: Mutex<Option<LaunchOptions>>,
    }

    impl MockDriver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Arc::new(Mutex::new(Vec::new())),
                launches: AtomicUsize::new(0),
                fail_launch: AtomicBool::new(false),
                fail_close: false,
                last_options: Mutex::new(None),
            })
        }

        fn failing_close() -> Arc<Self> {
            let mut driver = Self::new();
            Arc::get_mut(&mut driver).expect("fresh arc").fail_close = true;
            driver
        }

        fn launches(&self) -> usize {
            self.launches.load(Ordering::SeqCst)
        }

        fn last_proxy(&self) -> Option<ProxySettings> {
            self.last_options
                .lock()
                .as_ref()
                .and_then(|options| options.proxy.clone())
        }
    }

    #[async_trait]
    impl BrowserDriver for MockDriver {
        async fn launch(&self, options: LaunchOptions) -> Result<Arc<dyn BrowserHandle>> {
            if self.fail_launch.load(Ordering::SeqCst) {
                return Err(Error::driver("launch rejected"));
            }
            self.launches.fetch_add(1, Ordering::SeqCst);
            *self.last_options.lock() = Some(options);
            Ok(Arc::new(MockBrowser {
                events: Arc::clone(&self.events),
                fail_close: self.fail_close,
            }))
        }
    }

    fn rotation() -> Arc<RotationManager> {
        Arc::new(RotationManager::new(
            vec![GroupSource {
                group: GroupId::new(1),
                url: Url::parse("http://lists.test/1").expect("test url"),
            }],
            ExclusionSet::new(),
            Duration::from_secs(3600),
            Arc::new(StaticFetcher {
                text: "1.1.1.1:8001:alice:secret\n2.2.2.2:8002:alice:secret\n",
            }),
        ))
    }

    fn pool_with(driver: Arc<MockDriver>) -> SessionPool {
        SessionPool::new(driver, rotation(), IDLE)
    }

    /// Lets spawned idle checks run to completion on the test runtime.
    async fn drain_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    // ------------------------------------------------------------------------
    // Acquisition Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_acquire_context_launches_once() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        let checkout = pool.acquire_context(false).await.expect("acquire");
        assert!(!checkout.authenticated);
        assert_eq!(driver.launches(), 1);
        assert!(pool.has_browser());
        assert!(pool.has_context());
        assert!(pool.is_in_use());
    }

    #[tokio::test]
    async fn test_launch_uses_rotated_proxy() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");

        let proxy = driver.last_proxy().expect("proxy configured");
        assert!(proxy.has_auth());
        assert_eq!(proxy.username.as_deref(), Some("alice"));
        assert!(proxy.server.ends_with(":8001") || proxy.server.ends_with(":8002"));
    }

    #[tokio::test]
    async fn test_debug_mode_disables_headless() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(true).await.expect("acquire");
        let options = driver.last_options.lock().clone().expect("options");
        assert!(!options.headless);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuse_preserves_authentication() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        let first = pool.acquire_context(false).await.expect("first");
        pool.mark_authenticated();
        pool.release();

        tokio::time::advance(Duration::from_secs(60)).await;

        let second = pool.acquire_context(false).await.expect("second");
        assert!(second.authenticated);
        assert!(Arc::ptr_eq(&first.context, &second.context));
        assert_eq!(driver.launches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_acquire_recreates_and_resets_authentication() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        let first = pool.acquire_context(false).await.expect("first");
        pool.mark_authenticated();

        // No release, so no idle check is armed; the session just goes stale.
        tokio::time::advance(IDLE * 2).await;

        let second = pool.acquire_context(false).await.expect("second");
        assert!(!second.authenticated);
        assert!(!Arc::ptr_eq(&first.context, &second.context));
        assert_eq!(driver.launches(), 2, "stale browser relaunched");
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_stale_boundary() {
        let driver = MockDriver::new();
        let pool = pool_with(driver);

        pool.acquire_context(false).await.expect("acquire");

        tokio::time::advance(IDLE).await;
        assert!(!pool.is_stale(), "exactly at the boundary");

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(pool.is_stale(), "past the boundary");
    }

    #[tokio::test]
    async fn test_launch_failure_commits_no_state() {
        let driver = MockDriver::new();
        driver.fail_launch.store(true, Ordering::SeqCst);
        let pool = pool_with(Arc::clone(&driver));

        let err = pool.acquire_context(false).await.unwrap_err();
        assert!(matches!(err, Error::Driver { .. }));
        assert!(!pool.has_browser());
        assert!(!pool.has_context());
        assert!(!pool.is_in_use());
    }

    #[tokio::test]
    async fn test_endpoint_failure_propagates() {
        struct FailingFetcher;

        #[async_trait]
        impl EndpointListFetcher for FailingFetcher {
            async fn fetch(&self, _url: &Url) -> Result<String> {
                Err(Error::list_fetch(GroupId::new(1), "unreachable"))
            }
        }

        let rotation = Arc::new(RotationManager::new(
            vec![GroupSource {
                group: GroupId::new(1),
                url: Url::parse("http://lists.test/1").expect("test url"),
            }],
            ExclusionSet::new(),
            Duration::from_secs(3600),
            Arc::new(FailingFetcher),
        ));
        let pool = SessionPool::new(MockDriver::new(), rotation, IDLE);

        let err = pool.acquire_context(false).await.unwrap_err();
        assert!(err.is_fetch_error());
        assert!(!pool.has_browser());
    }

    // ------------------------------------------------------------------------
    // Release / Idle Check Tests
    // ------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_release_never_destroys_synchronously() {
        let driver = MockDriver::new();
        let pool = pool_with(driver);

        pool.acquire_context(false).await.expect("acquire");
        pool.release();

        assert!(pool.has_browser());
        assert!(pool.has_context());
        assert!(!pool.is_in_use());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_check_tears_down_expired_session() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.release();

        // Let the spawned cleanup task register its idle-timer before the
        // simulated clock jumps, so the deadline is relative to release time.
        tokio::task::yield_now().await;
        tokio::time::advance(IDLE + IDLE_CHECK_SLACK + Duration::from_millis(1)).await;
        drain_tasks().await;

        assert!(!pool.has_browser());
        assert!(!pool.has_context());
        assert!(!pool.is_authenticated());
        let events = driver.events.lock().clone();
        assert_eq!(events, vec!["context_close", "browser_close"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reacquire_cancels_pending_idle_check() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.release();

        tokio::time::advance(IDLE / 2).await;
        pool.acquire_context(false).await.expect("reacquire");

        // Well past the original expiry: the cancelled check must not fire
        // and the in-use session must survive.
        tokio::time::advance(IDLE * 3).await;
        drain_tasks().await;

        assert!(pool.has_browser());
        assert_eq!(driver.launches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_rearms_idle_check() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.release();

        tokio::time::advance(IDLE / 2).await;
        pool.acquire_context(false).await.expect("reacquire");
        pool.release();

        // Let the re-armed cleanup task register its idle-timer before the
        // simulated clock jumps past the second release's deadline.
        tokio::task::yield_now().await;
        // The re-armed check fires a full idle timeout after the second
        // release, tearing the session down then.
        tokio::time::advance(IDLE + IDLE_CHECK_SLACK + Duration::from_millis(1)).await;
        drain_tasks().await;

        assert!(!pool.has_browser());
    }

    // ------------------------------------------------------------------------
    // Teardown Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_close_context_resets_fields() {
        let driver = MockDriver::new();
        let pool = pool_with(driver);

        pool.acquire_context(false).await.expect("acquire");
        pool.mark_authenticated();

        pool.close_context().await;
        assert!(!pool.has_context());
        assert!(!pool.is_authenticated());
        assert!(pool.has_browser(), "browser survives context close");
    }

    #[tokio::test]
    async fn test_close_context_swallows_driver_error() {
        let driver = MockDriver::failing_close();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.mark_authenticated();

        pool.close_context().await;
        assert!(!pool.has_context());
        assert!(!pool.is_authenticated());
        assert_eq!(driver.events.lock().clone(), vec!["context_close"]);
    }

    #[tokio::test]
    async fn test_close_browser_closes_context_first() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.close_browser().await;

        assert!(!pool.has_browser());
        assert!(!pool.has_context());
        assert!(!pool.is_in_use());
        assert!(!pool.is_stale(), "last use cleared");
        assert_eq!(
            driver.events.lock().clone(),
            vec!["context_close", "browser_close"]
        );
    }

    #[tokio::test]
    async fn test_close_browser_swallows_driver_error() {
        let driver = MockDriver::failing_close();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.close_browser().await;

        assert!(!pool.has_browser());
        assert!(!pool.has_context());
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let driver = MockDriver::new();
        let pool = pool_with(Arc::clone(&driver));

        pool.acquire_context(false).await.expect("acquire");
        pool.close_browser().await;
        pool.close_browser().await;
        pool.close_context().await;

        assert_eq!(
            driver.events.lock().clone(),
            vec!["context_close", "browser_close"]
        );
    }

    #[tokio::test]
    async fn test_mark_authenticated_without_context_is_noop() {
        let driver = MockDriver::new();
        let pool = pool_with(driver);

        pool.mark_authenticated();
        assert!(!pool.is_authenticated());
    }
}
