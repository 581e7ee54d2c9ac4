//! Blocking REST client core built on libcurl.
//!
//! # Overview
//! Exposes GET/POST/PUT/DELETE as single blocking calls. Each call opens one
//! engine session, configures it from the request and the client settings,
//! performs the transfer, copies the body and headers out of the engine
//! callbacks, and releases the session before returning.
//!
//! # Design
//! - `RestClient` carries credentials and cookies in its `ClientConfig`;
//!   nothing is process-global.
//! - Every call returns a `Response`. Transport problems never surface as
//!   `Err`: they set `status` to [`STATUS_TRANSPORT_FAILURE`] and put a short
//!   diagnostic in the body.
//! - Engine resources are released by scope on every path.
//! - A 200 body can be streamed into any `io::Write`; other bodies are
//!   buffered so error text is never lost.

pub mod body;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod progress;
mod session;
pub mod sink;

pub use body::UploadSource;
pub use client::{delete, get, post, put, RestClient};
pub use config::{ClientConfig, Credentials, DEFAULT_USER_AGENT};
pub use error::TransferError;
pub use http::{
    FormField, FormFields, HeaderMap, HttpMethod, Request, Response, CONFIGURE_FAILED_BODY,
    QUERY_FAILED_BODY, STATUS_TRANSPORT_FAILURE, STATUS_UNSET,
};
pub use progress::{Progress, ProgressSink};
pub use sink::{parse_header_line, HEADER_PRESENT};
