//! Endpoint list types and parsing.
//!
//! An endpoint-list source serves plain text, one endpoint per line, in the
//! form `ip:port:user:pass`. All endpoints in one list share a single
//! credential pair, taken from the first well-formed line.
//!
//! # Example
//!
//! ```
//! use browser_broker::rotation::{GroupId, GroupList};
//!
//! let text = "1.1.1.1:8001:alice:secret\n2.2.2.2:8002:alice:secret\n";
//! let list = GroupList::parse(GroupId::new(1), text).unwrap();
//! assert_eq!(list.endpoints.len(), 2);
//! assert_eq!(list.credentials.username, "alice");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// GroupId
// ============================================================================

/// Identifier of a credential group.
///
/// Matches the 1-based numeric suffix of the group's configuration key
/// (`PROXY_LIST_{n}_URL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u32);

impl GroupId {
    /// Creates a group ID from its 1-based configuration suffix.
    #[inline]
    #[must_use]
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    /// Returns the raw numeric suffix.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// One outbound network egress point (proxy host and port).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint hostname or IP.
    pub host: String,

    /// Endpoint port.
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the `host:port` server string.
    ///
    /// This string is the global deduplication and ledger key.
    #[inline]
    #[must_use]
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Username/password pair shared by every endpoint of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Proxy username.
    pub username: String,

    /// Proxy password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// ============================================================================
// GroupList
// ============================================================================

/// Parsed endpoint list of one credential group.
#[derive(Debug, Clone)]
pub struct GroupList {
    /// The group this list belongs to.
    pub group: GroupId,

    /// Credentials taken from the first well-formed line.
    pub credentials: Credentials,

    /// All endpoints in list order.
    pub endpoints: Vec<Endpoint>,
}

// ============================================================================
// GroupList - Parsing
// ============================================================================

impl GroupList {
    /// Parses a raw endpoint list.
    ///
    /// A line must have exactly four colon-delimited fields
    /// (`ip:port:user:pass`) with a numeric port; any other line is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCredentials`] when no line is well-formed.
    pub fn parse(group: GroupId, text: &str) -> Result<Self> {
        let mut credentials: Option<Credentials> = None;
        let mut endpoints = Vec::new();

        for line in text.lines() {
            let Some((endpoint, line_credentials)) = parse_line(line) else {
                continue;
            };
            if credentials.is_none() {
                credentials = Some(line_credentials);
            }
            endpoints.push(endpoint);
        }

        let credentials = credentials.ok_or(Error::no_credentials(group))?;

        Ok(Self {
            group,
            credentials,
            endpoints,
        })
    }
}

// ============================================================================
// Line Parsing
// ============================================================================

/// Parses one `ip:port:user:pass` line.
///
/// Returns `None` for malformed lines (wrong field count, empty host or
/// non-numeric port).
fn parse_line(line: &str) -> Option<(Endpoint, Credentials)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 4 {
        return None;
    }

    let host = fields[0];
    if host.is_empty() {
        return None;
    }
    let port: u16 = fields[1].parse().ok()?;

    Some((
        Endpoint::new(host, port),
        Credentials::new(fields[2], fields[3]),
    ))
}

// ============================================================================
// Tests
// ============================================================================
