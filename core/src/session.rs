//! One engine session per call.
//!
//! # Design
//! A call moves through configure → perform → finalize. The engine handle,
//! its header list and any multipart form are owned by `Session`; the list
//! and form move into the handle when installed, so dropping the session
//! releases all three together. Every exit path (configuration failure,
//! transport failure, success) therefore releases exactly once without any
//! per-branch cleanup code.

use std::io::Write;
use std::time::Duration;

use curl::easy::Easy2;
use tracing::{debug, warn};

use crate::body::{build_form, Payload, UploadSource};
use crate::encode::EncodedOptions;
use crate::error::TransferError;
use crate::http::{HttpMethod, Response, CONFIGURE_FAILED_BODY, QUERY_FAILED_BODY};
use crate::progress::ProgressSink;
use crate::sink::ResponseSink;

/// Everything one call needs, borrowed from the caller for its duration.
pub struct SessionPlan<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub options: EncodedOptions,
    pub payload: Payload<'a>,
    pub output: Option<&'a mut dyn Write>,
    pub progress: Option<&'a mut dyn ProgressSink>,
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl<'a> SessionPlan<'a> {
    pub fn new(method: HttpMethod, url: &'a str, options: EncodedOptions) -> Self {
        Self {
            method,
            url,
            options,
            payload: Payload::Empty,
            output: None,
            progress: None,
            connect_timeout: None,
            timeout: None,
        }
    }
}

/// Run one call to completion. Never fails: problems are reported through
/// the failure sentinel on the returned `Response`.
pub fn execute(plan: SessionPlan<'_>) -> Response {
    let span = tracing::debug_span!("transfer", method = plan.method.as_str(), url = plan.url);
    let _enter = span.enter();

    let SessionPlan {
        method,
        url,
        options,
        payload,
        output,
        progress,
        connect_timeout,
        timeout,
    } = plan;

    // Progress is only relayed for GET.
    let progress = progress.filter(|_| method == HttpMethod::Get);
    let relay_progress = progress.is_some();

    let mut sink = ResponseSink::new();
    if let Some(output) = output {
        sink = sink.with_output(output);
    }
    if let Some(progress) = progress {
        sink = sink.with_progress(progress);
    }
    if let Payload::Upload(bytes) = payload {
        sink = sink.with_upload(UploadSource::new(bytes));
    }

    let mut session = Session::open(sink);
    let configured = session
        .configure(method, url, &options, payload, relay_progress)
        .and_then(|()| session.timeouts(connect_timeout, timeout));
    if let Err(err) = configured {
        warn!(error = %err, "session configuration failed");
        return failure_response(&err);
    }
    session.finish()
}

fn failure_response(err: &TransferError) -> Response {
    if err.is_configuration() {
        Response::failure(CONFIGURE_FAILED_BODY)
    } else {
        Response::failure(QUERY_FAILED_BODY)
    }
}

struct Session<'a> {
    easy: Easy2<ResponseSink<'a>>,
}

impl<'a> Session<'a> {
    fn open(sink: ResponseSink<'a>) -> Self {
        debug!("transfer session opened");
        Self {
            easy: Easy2::new(sink),
        }
    }

    fn configure(
        &mut self,
        method: HttpMethod,
        url: &str,
        options: &EncodedOptions,
        payload: Payload<'_>,
        relay_progress: bool,
    ) -> Result<(), TransferError> {
        let easy = &mut self.easy;
        options.apply(easy)?;
        easy.url(url)?;
        // Engine signal handlers are unsafe outside the main thread.
        easy.signal(false)?;

        match method {
            HttpMethod::Get => easy.get(true)?,
            HttpMethod::Delete => easy.custom_request("DELETE")?,
            HttpMethod::Post | HttpMethod::Put => {}
        }
        match payload {
            Payload::Empty if method == HttpMethod::Post => {
                easy.post(true)?;
                easy.post_fields_copy(&[])?;
            }
            Payload::Empty => {}
            Payload::Fields(bytes) => {
                easy.post(true)?;
                easy.post_field_size(bytes.len() as u64)?;
                easy.post_fields_copy(bytes)?;
            }
            Payload::Upload(bytes) => {
                easy.upload(true)?;
                easy.in_filesize(bytes.len() as u64)?;
            }
            Payload::Multipart(fields) if fields.is_empty() => {
                easy.post(true)?;
                easy.post_fields_copy(&[])?;
            }
            Payload::Multipart(fields) => {
                easy.httppost(build_form(fields)?)?;
            }
        }
        if relay_progress {
            easy.progress(true)?;
        }
        debug!("transfer session configured");
        Ok(())
    }

    fn timeouts(
        &mut self,
        connect_timeout: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<(), TransferError> {
        if let Some(connect_timeout) = connect_timeout {
            self.easy.connect_timeout(connect_timeout)?;
        }
        if let Some(timeout) = timeout {
            self.easy.timeout(timeout)?;
        }
        Ok(())
    }

    fn perform(&mut self) -> Result<i32, TransferError> {
        self.easy.perform().map_err(TransferError::Perform)?;
        let code = self.easy.response_code().map_err(TransferError::Status)?;
        Ok(code as i32)
    }

    /// Perform the transfer and turn the outcome into a `Response`. The
    /// session is dropped, and so released, before the response is returned.
    fn finish(mut self) -> Response {
        debug!("transfer started");
        let outcome = self.perform();
        let (body, headers) = self.easy.get_mut().take_parts();
        match outcome {
            Ok(status) => {
                debug!(status, bytes = body.len(), "transfer completed");
                Response {
                    status,
                    body,
                    headers,
                }
            }
            Err(err) => {
                warn!(error = %err, "transfer failed");
                Response {
                    headers,
                    ..failure_response(&err)
                }
            }
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!("transfer session released");
    }
}
