//! Endpoint rotation manager.
//!
//! Supplies a request-scoped proxy endpoint such that load stays balanced
//! across endpoints, immediate repetition is avoided, excluded endpoints are
//! never returned, and cached lists refresh on a TTL without forcing every
//! call through a network fetch.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RotationManager`] | Group round robin, usage ledger, selection |
//! | [`RotatedEndpoint`] | Selected endpoint plus group credentials |
//! | [`GroupList`] | Parsed per-group endpoint list |
//! | [`ExclusionSet`] | Hosts and `host:port` pairs never selected |
//! | [`EndpointListFetcher`] | Seam for fetching raw list text |
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use browser_broker::{RotationManager, Settings};
//! use browser_broker::rotation::HttpFetcher;
//!
//! # async fn example() -> browser_broker::Result<()> {
//! let settings = Settings::from_env()?;
//! let rotation = RotationManager::from_settings(&settings, Arc::new(HttpFetcher::new()));
//!
//! let rotated = rotation.get_endpoint().await?;
//! println!("launching via {}", rotated.server());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Exclusion set parsing and membership.
pub mod exclusion;

/// Endpoint-list fetching seam and HTTP implementation.
pub mod fetch;

/// Endpoint list types and parsing.
pub mod list;

// ============================================================================
// Re-exports
// ============================================================================

pub use exclusion::ExclusionSet;
pub use fetch::{EndpointListFetcher, HttpFetcher};
pub use list::{Credentials, Endpoint, GroupId, GroupList};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use rand::Rng;
use rustc_hash::FxHashMap;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{GroupSource, Settings};
use crate::driver::ProxySettings;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Initial per-endpoint usage threshold.
const INITIAL_THRESHOLD: u32 = 10;

/// Amount the threshold is raised by when every endpoint has reached it.
const THRESHOLD_INCREMENT: u32 = 10;

// ============================================================================
// RotatedEndpoint
// ============================================================================

/// Result of one rotation: an endpoint and the rotated-to group's credentials.
///
/// Group rotation and endpoint selection use independent state, so the
/// endpoint is drawn from the global deduplicated pool and need not appear in
/// the credential group's own list.
#[derive(Debug, Clone)]
pub struct RotatedEndpoint {
    /// The selected endpoint.
    pub endpoint: Endpoint,

    /// Credentials of the rotated-to group.
    pub credentials: Credentials,

    /// The rotated-to group.
    pub group: GroupId,
}

impl RotatedEndpoint {
    /// Returns the `host:port` server string of the selected endpoint.
    #[inline]
    #[must_use]
    pub fn server(&self) -> String {
        self.endpoint.server()
    }

    /// Converts into proxy settings for a browser launch.
    #[must_use]
    pub fn to_proxy_settings(&self) -> ProxySettings {
        ProxySettings::new(self.endpoint.server()).with_credentials(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
        )
    }
}

// ============================================================================
// RotationState
// ============================================================================

/// Mutable rotation state behind the manager's mutex.
struct RotationState {
    /// Cached per-group lists from the last successful refresh.
    lists: Vec<GroupList>,

    /// When the cache was last refreshed.
    fetched_at: Option<Instant>,

    /// Index into the source list of the last group used.
    last_group: Option<usize>,

    /// Server string of the last endpoint returned.
    last_server: Option<String>,

    /// Per-endpoint use counts since process start. Never reset.
    ledger: FxHashMap<String, u32>,

    /// Current usage threshold. Only ever raised.
    threshold: u32,
}

impl RotationState {
    fn new() -> Self {
        Self {
            lists: Vec::new(),
            fetched_at: None,
            last_group: None,
            last_server: None,
            ledger: FxHashMap::default(),
            threshold: INITIAL_THRESHOLD,
        }
    }
}

// ============================================================================
// RotationManager
// ============================================================================

/// Load-balanced, exclusion-aware endpoint selection across credential groups.
///
/// One instance lives for the whole process, created at the composition root
/// and shared by reference.
pub struct RotationManager {
    /// Ordered group discovery list. Immutable after startup.
    sources: Vec<GroupSource>,

    /// Endpoints that must never be selected.
    exclusions: ExclusionSet,

    /// Maximum age of cached lists before a refresh.
    cache_ttl: Duration,

    /// Fetcher for raw list text.
    fetcher: Arc<dyn EndpointListFetcher>,

    /// Rotation state.
    state: Mutex<RotationState>,
}

// ============================================================================
// RotationManager - Construction
// ============================================================================

impl RotationManager {
    /// Creates a rotation manager.
    ///
    /// # Arguments
    ///
    /// * `sources` - Ordered group sources from configuration discovery
    /// * `exclusions` - Parsed exclusion set
    /// * `cache_ttl` - Maximum cached-list age
    /// * `fetcher` - List fetcher implementation
    #[must_use]
    pub fn new(
        sources: Vec<GroupSource>,
        exclusions: ExclusionSet,
        cache_ttl: Duration,
        fetcher: Arc<dyn EndpointListFetcher>,
    ) -> Self {
        info!(
            groups = sources.len(),
            exclusions = exclusions.len(),
            ttl_secs = cache_ttl.as_secs(),
            "Rotation manager initialized"
        );

        Self {
            sources,
            exclusions,
            cache_ttl,
            fetcher,
            state: Mutex::new(RotationState::new()),
        }
    }

    /// Creates a rotation manager from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings, fetcher: Arc<dyn EndpointListFetcher>) -> Self {
        Self::new(
            settings.group_sources.clone(),
            settings.exclusions.clone(),
            settings.cache_ttl,
            fetcher,
        )
    }
}

// ============================================================================
// RotationManager - Public API
// ============================================================================

impl RotationManager {
    /// Selects the next endpoint and credential group.
    ///
    /// Refreshes cached lists when missing or past the TTL, computes the
    /// deduplicated exclusion-filtered union of all groups' endpoints, rotates
    /// the credential group round robin, restricts to endpoints under the
    /// usage threshold (raising it when exhausted), avoids repeating the
    /// last-used endpoint when alternatives exist, and picks uniformly at
    /// random.
    ///
    /// # Errors
    ///
    /// - [`Error::NoEndpoints`] when exclusion filtering leaves nothing
    /// - [`Error::ListFetch`] / [`Error::NoCredentials`] when a refresh fails
    ///   and no cached lists exist
    pub async fn get_endpoint(&self) -> Result<RotatedEndpoint> {
        self.ensure_fresh_lists().await?;

        let mut state = self.state.lock();

        // Exclusion-filtered union, deduplicated by server string. Computed
        // before any ledger work so an exhausted pool leaves the ledger
        // untouched.
        let eligible = self.eligible_pool(&state.lists);
        if eligible.is_empty() {
            return Err(Error::NoEndpoints);
        }

        // Round robin over the ordered discovery list.
        let group_index = state
            .last_group
            .map_or(0, |index| (index + 1) % self.sources.len());
        let group = self.sources[group_index].group;
        let credentials = state
            .lists
            .iter()
            .find(|list| list.group == group)
            .map(|list| list.credentials.clone())
            .ok_or(Error::no_credentials(group))?;

        // Restrict to endpoints under the usage threshold, raising it until
        // at least one qualifies. The threshold never goes back down.
        let mut candidates: Vec<Endpoint>;
        loop {
            candidates = eligible
                .iter()
                .filter(|endpoint| {
                    state.ledger.get(&endpoint.server()).copied().unwrap_or(0) < state.threshold
                })
                .cloned()
                .collect();
            if !candidates.is_empty() {
                break;
            }
            state.threshold += THRESHOLD_INCREMENT;
            debug!(threshold = state.threshold, "Usage threshold raised");
        }

        // Best-effort anti-repetition; skipped when only one endpoint exists.
        if candidates.len() > 1 {
            if let Some(last) = &state.last_server {
                candidates.retain(|endpoint| &endpoint.server() != last);
            }
        }

        let index = rand::rng().random_range(0..candidates.len());
        let endpoint = candidates[index].clone();
        let server = endpoint.server();

        *state.ledger.entry(server.clone()).or_insert(0) += 1;
        state.last_server = Some(server.clone());
        state.last_group = Some(group_index);

        debug!(
            server = %server,
            group = %group,
            uses = state.ledger[&server],
            "Endpoint selected"
        );

        Ok(RotatedEndpoint {
            endpoint,
            credentials,
            group,
        })
    }

    /// Returns how many times an endpoint has been selected.
    #[inline]
    #[must_use]
    pub fn usage_count(&self, server: &str) -> u32 {
        self.state.lock().ledger.get(server).copied().unwrap_or(0)
    }

    /// Returns the current usage threshold.
    #[inline]
    #[must_use]
    pub fn current_threshold(&self) -> u32 {
        self.state.lock().threshold
    }

    /// Returns the number of configured credential groups.
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.sources.len()
    }
}

// ============================================================================
// RotationManager - Cache Refresh
// ============================================================================

impl RotationManager {
    /// Refreshes cached lists when they are missing or past the TTL.
    ///
    /// A failed refresh is tolerated when any cached data exists; the stale
    /// cache is reused with a warning. With no cache the error propagates.
    async fn ensure_fresh_lists(&self) -> Result<()> {
        let needs_refresh = {
            let state = self.state.lock();
            state.lists.is_empty()
                || state
                    .fetched_at
                    .is_none_or(|at| at.elapsed() > self.cache_ttl)
        };
        if !needs_refresh {
            return Ok(());
        }

        match self.refresh_lists().await {
            Ok(lists) => {
                let endpoint_count: usize = lists.iter().map(|list| list.endpoints.len()).sum();
                debug!(
                    groups = lists.len(),
                    endpoints = endpoint_count,
                    "Endpoint lists refreshed"
                );

                let mut state = self.state.lock();
                state.lists = lists;
                state.fetched_at = Some(Instant::now());
                Ok(())
            }
            Err(error) => {
                let has_cache = !self.state.lock().lists.is_empty();
                if has_cache {
                    warn!(error = %error, "Endpoint list refresh failed, reusing stale cache");
                    Ok(())
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Fetches and parses every group's list concurrently.
    ///
    /// Any single group failing fails the refresh as a whole.
    async fn refresh_lists(&self) -> Result<Vec<GroupList>> {
        let fetches = self.sources.iter().map(|source| async move {
            let text = self
                .fetcher
                .fetch(&source.url)
                .await
                .map_err(|error| Error::list_fetch(source.group, error.to_string()))?;
            GroupList::parse(source.group, &text)
        });

        join_all(fetches).await.into_iter().collect()
    }

    /// Computes the deduplicated, exclusion-filtered union of all groups'
    /// endpoints, in first-seen order.
    fn eligible_pool(&self, lists: &[GroupList]) -> Vec<Endpoint> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut pool = Vec::new();

        for list in lists {
            for endpoint in &list.endpoints {
                if self.exclusions.is_excluded(endpoint) {
                    continue;
                }
                if seen.insert(endpoint.server()) {
                    pool.push(endpoint.clone());
                }
            }
        }

        pool
    }
}

// ============================================================================
// Tests
// ============================================================================
