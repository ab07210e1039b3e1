//! Configuration loading for the broker.
//!
//! Credential groups are discovered dynamically at startup: the loader probes
//! `PROXY_LIST_1_URL`, `PROXY_LIST_2_URL`, … and stops at the first missing
//! key. The resulting ordered list is immutable for the process lifetime.
//!
//! # Keys
//!
//! | Key | Meaning | Default |
//! |-----|---------|---------|
//! | `PROXY_LIST_{n}_URL` | Endpoint-list source of group *n* (1-based) | required, at least one |
//! | `PROXY_EXCLUDED` | Comma-separated `host` / `host:port` exclusions | empty |
//! | `PROXY_CACHE_TTL_SECS` | Maximum cached-list age | 3600 |
//! | `SESSION_IDLE_TIMEOUT_SECS` | Idle time before session teardown | 300 |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::rotation::{ExclusionSet, GroupId};

// ============================================================================
// Constants
// ============================================================================

/// Default maximum age of cached endpoint lists.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default idle time before a pooled session is torn down.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Key prefix/suffix of the sequential group-source keys.
const GROUP_KEY_PREFIX: &str = "PROXY_LIST_";
const GROUP_KEY_SUFFIX: &str = "_URL";

/// Key of the optional exclusion list.
const EXCLUDED_KEY: &str = "PROXY_EXCLUDED";

/// Key of the optional cache TTL override, in seconds.
const CACHE_TTL_KEY: &str = "PROXY_CACHE_TTL_SECS";

/// Key of the optional idle timeout override, in seconds.
const IDLE_TIMEOUT_KEY: &str = "SESSION_IDLE_TIMEOUT_SECS";

// ============================================================================
// GroupSource
// ============================================================================

/// One discovered credential group: its ID and list-source URL.
#[derive(Debug, Clone)]
pub struct GroupSource {
    /// Group identifier, matching the configuration key suffix.
    pub group: GroupId,

    /// Where the group's endpoint list is fetched from.
    pub url: Url,
}

// ============================================================================
// Settings
// ============================================================================

/// Loaded broker configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Ordered group sources, in discovery order.
    pub group_sources: Vec<GroupSource>,

    /// Endpoints that must never be selected.
    pub exclusions: ExclusionSet,

    /// Maximum age of cached endpoint lists.
    pub cache_ttl: Duration,

    /// Idle time before a pooled session is torn down.
    pub idle_timeout: Duration,
}

// ============================================================================
// Settings - Loading
// ============================================================================

impl Settings {
    /// Loads settings from process environment variables.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when no group source is configured or a numeric
    ///   value fails to parse
    /// - [`Error::InvalidUrl`] when a source URL fails to parse
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// The lookup is probed for sequential group keys until one is missing.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let group_sources = discover_groups(&lookup)?;

        let exclusions = lookup(EXCLUDED_KEY)
            .map(|raw| ExclusionSet::parse(&raw))
            .unwrap_or_default();

        let cache_ttl = parse_secs(&lookup, CACHE_TTL_KEY)?.unwrap_or(DEFAULT_CACHE_TTL);
        let idle_timeout = parse_secs(&lookup, IDLE_TIMEOUT_KEY)?.unwrap_or(DEFAULT_IDLE_TIMEOUT);

        Ok(Self {
            group_sources,
            exclusions,
            cache_ttl,
            idle_timeout,
        })
    }
}

// ============================================================================
// Discovery Helpers
// ============================================================================

/// Probes sequential group keys, stopping at the first missing one.
fn discover_groups(lookup: &impl Fn(&str) -> Option<String>) -> Result<Vec<GroupSource>> {
    let mut sources = Vec::new();

    for n in 1u32.. {
        let key = format!("{GROUP_KEY_PREFIX}{n}{GROUP_KEY_SUFFIX}");
        let Some(raw) = lookup(&key) else {
            break;
        };
        let url = Url::parse(raw.trim())?;
        sources.push(GroupSource {
            group: GroupId::new(n),
            url,
        });
    }

    if sources.is_empty() {
        return Err(Error::config(format!(
            "no endpoint-list sources configured; set {GROUP_KEY_PREFIX}1{GROUP_KEY_SUFFIX}"
        )));
    }

    Ok(sources)
}

/// Parses an optional whole-seconds duration value.
fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{key} must be a whole number of seconds: {raw:?}")))?;

    Ok(Some(Duration::from_secs(secs)))
}

// ============================================================================
// Tests
// ============================================================================
