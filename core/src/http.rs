//! Request and response descriptors.
//!
//! # Design
//! These are plain data. A `Request` is built by the caller and only read by
//! the session; a `Response` is produced once per call and handed back by
//! value. Engine handles never live here: they belong to the session, which
//! is consumed before the response is returned, so a caller can never observe
//! a half-released handle.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Header name to value. Names are kept exactly as supplied.
pub type HeaderMap = BTreeMap<String, String>;

/// Multipart field name to field value.
pub type FormFields = BTreeMap<String, FormField>;

/// Status before any transfer attempt completed.
pub const STATUS_UNSET: i32 = 0;

/// Status reported when the transfer failed before a protocol status was
/// obtainable.
pub const STATUS_TRANSPORT_FAILURE: i32 = -1;

/// Body reported when the engine transfer fails.
pub const QUERY_FAILED_BODY: &str = "Failed to query.";

/// Body reported when the session could not be configured.
pub const CONFIGURE_FAILED_BODY: &str = "Failed to configure request.";

/// HTTP verb of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Target URL plus the headers to send with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    #[serde(default)]
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Add or replace a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// One multipart entry: literal text, or a file the engine reads itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FormField {
    Text(String),
    File(PathBuf),
}

impl FormField {
    pub fn text(value: impl Into<String>) -> Self {
        FormField::Text(value.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        FormField::File(path.into())
    }
}

/// Outcome of one call.
///
/// `status` is the HTTP status on a completed transfer,
/// [`STATUS_TRANSPORT_FAILURE`] when the engine failed, and never left at
/// [`STATUS_UNSET`] once a call has returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: i32,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl Response {
    /// A response carrying the failure sentinel and a diagnostic body.
    pub fn failure(body: &str) -> Self {
        Self {
            status: STATUS_TRANSPORT_FAILURE,
            body: body.as_bytes().to_vec(),
            headers: HeaderMap::new(),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == STATUS_TRANSPORT_FAILURE
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
