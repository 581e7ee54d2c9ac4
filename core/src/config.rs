//! Per-client settings applied to every call.
//!
//! # Design
//! Credentials and cookies live on the client instance rather than in
//! process-wide statics. Changing them needs `&mut RestClient`, so a call in
//! flight can never see them change underneath it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// User agent installed when the request does not carry its own.
pub const DEFAULT_USER_AGENT: &str = concat!("restclient-rs/", env!("CARGO_PKG_VERSION"));

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both halves empty means "no authentication".
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings shared by all calls made through one `RestClient`.
///
/// Timeouts left as `None` keep the engine's own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub credentials: Option<Credentials>,
    pub cookies: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            cookies: None,
            connect_timeout_secs: None,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Credentials to send, if any are set and non-empty.
    pub fn active_credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| !c.is_empty())
    }

    /// Cookie string to send, if any is set and non-empty.
    pub fn active_cookies(&self) -> Option<&str> {
        self.cookies.as_deref().filter(|c| !c.is_empty())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
