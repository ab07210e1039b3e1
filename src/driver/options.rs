//! Browser launch options and proxy settings.
//!
//! Provides a type-safe interface for configuring how the external driver
//! launches a browser: display mode, outbound proxy, and extra command-line
//! arguments.
//!
//! # Example
//!
//! ```
//! use browser_broker::{LaunchOptions, ProxySettings};
//!
//! let options = LaunchOptions::new()
//!     .with_headless(true)
//!     .with_proxy(ProxySettings::new("1.2.3.4:8080").with_credentials("user", "pass"))
//!     .with_arg("--disable-dev-shm-usage");
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// ProxySettings
// ============================================================================

/// Outbound proxy configuration for a browser launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Proxy server as `host:port`.
    pub server: String,

    /// Username for authentication (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for authentication (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ============================================================================
// ProxySettings - Construction
// ============================================================================

impl ProxySettings {
    /// Creates proxy settings without authentication.
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            username: None,
            password: None,
        }
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Returns `true` if authentication is configured.
    #[inline]
    #[must_use]
    pub fn has_auth(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

// ============================================================================
// LaunchOptions
// ============================================================================

/// Browser process configuration handed to the external driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run the browser without a GUI.
    pub headless: bool,

    /// Outbound proxy for the whole browser process.
    pub proxy: Option<ProxySettings>,

    /// Additional driver-specific launch arguments.
    pub extra_args: Vec<String>,
}

// ============================================================================
// LaunchOptions - Construction
// ============================================================================

impl LaunchOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: false,
            proxy: None,
            extra_args: Vec::new(),
        }
    }

    /// Sets headless mode.
    #[inline]
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets the outbound proxy.
    #[inline]
    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Adds a custom launch argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds multiple custom launch arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if headless mode is enabled.
    #[inline]
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        self.headless
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_default() {
        let options = LaunchOptions::new();
        assert!(!options.headless);
        assert!(options.proxy.is_none());
        assert!(options.extra_args.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let options = LaunchOptions::new()
            .with_headless(true)
            .with_proxy(ProxySettings::new("1.2.3.4:8080"))
            .with_args(["--a", "--b"]);

        assert!(options.is_headless());
        assert_eq!(options.proxy.as_ref().map(|p| p.server.as_str()), Some("1.2.3.4:8080"));
        assert_eq!(options.extra_args.len(), 2);
    }

    #[test]
    fn test_proxy_settings_auth() {
        let plain = ProxySettings::new("1.2.3.4:8080");
        assert!(!plain.has_auth());

        let authed = plain.with_credentials("user", "pass");
        assert!(authed.has_auth());
        assert_eq!(authed.username.as_deref(), Some("user"));
        assert_eq!(authed.password.as_deref(), Some("pass"));
    }

    #[test]
    fn test_proxy_settings_serialization() {
        let proxy = ProxySettings::new("1.2.3.4:8080").with_credentials("user", "pass");
        let json = serde_json::to_string(&proxy).unwrap();
        assert!(json.contains(r#""server":"1.2.3.4:8080""#));
        assert!(json.contains(r#""username":"user""#));

        let plain = ProxySettings::new("1.2.3.4:8080");
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("username"));
    }
}
