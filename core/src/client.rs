//! Blocking REST client.
//!
//! # Design
//! `RestClient` holds only its `ClientConfig`. Each verb encodes the request,
//! hands a `SessionPlan` to the session module and returns whatever it
//! produces; there is no state carried from one call to the next. Calls that
//! take only a URL (`post`, `put`, `delete`) send a `Content-Type` header
//! where a body exists and otherwise no caller headers.

use std::io::Write;

use crate::body::Payload;
use crate::config::{ClientConfig, Credentials};
use crate::encode::encode;
use crate::http::{FormFields, HeaderMap, HttpMethod, Request, Response};
use crate::progress::ProgressSink;
use crate::session::{self, SessionPlan};

const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Synchronous client; one engine session per call.
#[derive(Debug, Clone, Default)]
pub struct RestClient {
    config: ClientConfig,
}

impl RestClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        curl::init();
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send basic-auth credentials with every following call.
    pub fn set_auth(&mut self, username: &str, password: &str) {
        self.config.credentials = Some(Credentials::new(username, password));
    }

    pub fn clear_auth(&mut self) {
        self.config.credentials = None;
    }

    /// Send `cookies` (e.g. `"a=1; b=2"`) with every following call.
    pub fn set_cookies(&mut self, cookies: &str) {
        self.config.cookies = Some(cookies.to_string());
    }

    pub fn clear_cookies(&mut self) {
        self.config.cookies = None;
    }

    pub fn get(&self, request: &Request) -> Response {
        self.get_with(request, None, None)
    }

    pub fn get_url(&self, url: &str) -> Response {
        self.get(&Request::new(url))
    }

    /// GET, optionally streaming a 200 body into `output` and reporting
    /// progress to `progress`. Neither is closed or flushed here.
    pub fn get_with<'a>(
        &self,
        request: &'a Request,
        output: Option<&'a mut dyn Write>,
        progress: Option<&'a mut dyn ProgressSink>,
    ) -> Response {
        let mut plan = self.plan(HttpMethod::Get, &request.url, &request.headers);
        plan.output = output;
        plan.progress = progress;
        session::execute(plan)
    }

    /// POST `body` as-is with the given content type.
    pub fn post(&self, url: &str, content_type: &str, body: &[u8]) -> Response {
        let headers = content_type_header(content_type);
        let mut plan = self.plan(HttpMethod::Post, url, &headers);
        plan.payload = Payload::Fields(body);
        session::execute(plan)
    }

    /// POST `form` as `multipart/form-data`.
    pub fn post_form(&self, request: &Request, form: &FormFields) -> Response {
        let mut plan = self.plan(HttpMethod::Post, &request.url, &request.headers);
        plan.payload = Payload::Multipart(form);
        session::execute(plan)
    }

    /// PUT `body`, announced up front with its length.
    pub fn put(&self, url: &str, content_type: &str, body: &[u8]) -> Response {
        let headers = content_type_header(content_type);
        let mut plan = self.plan(HttpMethod::Put, url, &headers);
        plan.payload = Payload::Upload(body);
        session::execute(plan)
    }

    pub fn delete(&self, url: &str) -> Response {
        session::execute(self.plan(HttpMethod::Delete, url, &HeaderMap::new()))
    }

    fn plan<'a>(&self, method: HttpMethod, url: &'a str, headers: &HeaderMap) -> SessionPlan<'a> {
        let mut plan = SessionPlan::new(method, url, encode(headers, &self.config));
        plan.connect_timeout = self.config.connect_timeout();
        plan.timeout = self.config.timeout();
        plan
    }
}

fn content_type_header(content_type: &str) -> HeaderMap {
    HeaderMap::from([(CONTENT_TYPE_HEADER.to_string(), content_type.to_string())])
}

/// GET through a default client with no credentials or cookies.
pub fn get(request: &Request) -> Response {
    RestClient::new().get(request)
}

/// POST through a default client with no credentials or cookies.
pub fn post(url: &str, content_type: &str, body: &[u8]) -> Response {
    RestClient::new().post(url, content_type, body)
}

/// PUT through a default client with no credentials or cookies.
pub fn put(url: &str, content_type: &str, body: &[u8]) -> Response {
    RestClient::new().put(url, content_type, body)
}

/// DELETE through a default client with no credentials or cookies.
pub fn delete(url: &str) -> Response {
    RestClient::new().delete(url)
}
