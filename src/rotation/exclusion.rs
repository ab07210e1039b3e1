//! Exclusion set for endpoints that must never be selected.
//!
//! Entries come from a comma-separated configuration string and may name a
//! bare host (excluding every port on it) or an exact `host:port` pair.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;

use super::list::Endpoint;

// ============================================================================
// ExclusionSet
// ============================================================================

/// Set of excluded `host` or `host:port` strings.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    entries: FxHashSet<String>,
}

// ============================================================================
// ExclusionSet - Construction
// ============================================================================

impl ExclusionSet {
    /// Creates an empty exclusion set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated exclusion string.
    ///
    /// Entries are trimmed; empty entries are dropped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        Self { entries }
    }
}

// ============================================================================
// ExclusionSet - Queries
// ============================================================================

impl ExclusionSet {
    /// Returns `true` if the endpoint is excluded.
    ///
    /// Matches on the exact `host:port` string or on the bare host.
    #[must_use]
    pub fn is_excluded(&self, endpoint: &Endpoint) -> bool {
        self.entries.contains(&endpoint.server()) || self.entries.contains(&endpoint.host)
    }

    /// Returns the number of exclusion entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no exclusions are configured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
