//! Header and authentication encoding.
//!
//! Turns a request's header map plus the client configuration into the
//! option values the engine needs. The result is plain data so it can be
//! inspected without opening a session; `apply` is the only part that talks
//! to the engine.

use curl::easy::{Auth, Easy2, Handler, List};

use crate::config::{ClientConfig, Credentials};
use crate::http::HeaderMap;

/// Header name whose presence suppresses the default user agent.
pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Engine-ready view of headers, user agent, auth and cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedOptions {
    /// One `"Name: Value"` line per header.
    pub header_lines: Vec<String>,
    /// Set only when the caller did not supply a `User-Agent` header.
    pub user_agent: Option<String>,
    pub credentials: Option<Credentials>,
    pub cookies: Option<String>,
}

/// Encode `headers` against `config`.
pub fn encode(headers: &HeaderMap, config: &ClientConfig) -> EncodedOptions {
    let header_lines = headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();
    let user_agent = if headers.contains_key(USER_AGENT_HEADER) {
        None
    } else {
        Some(config.user_agent.clone())
    };

    EncodedOptions {
        header_lines,
        user_agent,
        credentials: config.active_credentials().cloned(),
        cookies: config.active_cookies().map(str::to_string),
    }
}

impl EncodedOptions {
    /// Build the engine header list, or `None` when there are no headers.
    pub fn header_list(&self) -> Result<Option<List>, curl::Error> {
        if self.header_lines.is_empty() {
            return Ok(None);
        }
        let mut list = List::new();
        for line in &self.header_lines {
            list.append(line)?;
        }
        Ok(Some(list))
    }

    /// Install these options on a handle. The header list moves into the
    /// handle and is freed with it.
    pub(crate) fn apply<H: Handler>(&self, easy: &mut Easy2<H>) -> Result<(), curl::Error> {
        if let Some(credentials) = &self.credentials {
            let mut auth = Auth::new();
            auth.basic(true);
            easy.http_auth(&auth)?;
            easy.username(&credentials.username)?;
            easy.password(&credentials.password)?;
        }
        if let Some(cookies) = &self.cookies {
            easy.cookie(cookies)?;
        }
        if let Some(list) = self.header_list()? {
            easy.http_headers(list)?;
        }
        if let Some(user_agent) = &self.user_agent {
            easy.useragent(user_agent)?;
        }
        Ok(())
    }
}
