//! Engine callbacks for one call: body chunks, header lines, upload pulls and
//! progress ticks all land on a single `ResponseSink`.
//!
//! # Design
//! The sink is the engine's `Handler`, so the handle owns it for the whole
//! transfer and no raw user-data pointers are involved. The callback logic
//! lives in plain methods that tests drive directly; the `Handler` impl only
//! adapts return types.
//!
//! Body routing: when an output sink is attached, chunks go there only while
//! the latest status line reports 200. Anything else (error pages, interim
//! redirect bodies) is buffered so the caller still gets diagnostic text.

use std::io::Write;

use curl::easy::{Handler, ReadError, WriteError};

use crate::body::UploadSource;
use crate::http::HeaderMap;
use crate::progress::{self, Progress, ProgressSink};

/// Value recorded for header lines that carry no colon.
pub const HEADER_PRESENT: &str = "present";

const STATUS_OK: u32 = 200;

/// Split one raw header line into a map entry.
///
/// Blank lines yield `None`. Lines without a colon are kept whole, trimmed,
/// with the value [`HEADER_PRESENT`]. Otherwise the line splits on the first
/// colon and both halves are trimmed.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    match line.split_once(':') {
        None => {
            let key = line.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), HEADER_PRESENT.to_string()))
            }
        }
        Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
    }
}

/// Status code of an `HTTP/<version> <code> ...` line.
pub fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Per-call callback target.
pub struct ResponseSink<'a> {
    body: Vec<u8>,
    headers: HeaderMap,
    output: Option<&'a mut dyn Write>,
    progress: Option<&'a mut dyn ProgressSink>,
    upload: Option<UploadSource<'a>>,
    last_status: Option<u32>,
}

impl<'a> ResponseSink<'a> {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            headers: HeaderMap::new(),
            output: None,
            progress: None,
            upload: None,
            last_status: None,
        }
    }

    /// Stream successful bodies into `output` instead of buffering them.
    pub fn with_output(mut self, output: &'a mut dyn Write) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_progress(mut self, progress: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_upload(mut self, upload: UploadSource<'a>) -> Self {
        self.upload = Some(upload);
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Status from the most recent status line seen, if any.
    pub fn last_status(&self) -> Option<u32> {
        self.last_status
    }

    pub fn upload(&self) -> Option<&UploadSource<'a>> {
        self.upload.as_ref()
    }

    /// Take the buffered body and headers, leaving the sink empty.
    pub fn take_parts(&mut self) -> (Vec<u8>, HeaderMap) {
        (
            std::mem::take(&mut self.body),
            std::mem::take(&mut self.headers),
        )
    }

    /// Accept one body chunk. Returns how many bytes were consumed; anything
    /// short of `data.len()` makes the engine abort the transfer.
    pub fn on_body(&mut self, data: &[u8]) -> usize {
        match self.output.as_mut() {
            Some(output) if self.last_status == Some(STATUS_OK) => match output.write_all(data) {
                Ok(()) => data.len(),
                Err(err) => {
                    tracing::warn!(error = %err, "output sink rejected body chunk");
                    0
                }
            },
            _ => {
                self.body.extend_from_slice(data);
                data.len()
            }
        }
    }

    /// Record one raw header line.
    pub fn on_header(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        if let Some(status) = parse_status_line(&line) {
            self.last_status = Some(status);
        }
        if let Some((key, value)) = parse_header_line(&line) {
            tracing::trace!(%key, %value, "response header");
            self.headers.insert(key, value);
        }
    }

    /// Fill `buf` from the upload source. Without one there is nothing to
    /// send.
    pub fn on_read(&mut self, buf: &mut [u8]) -> usize {
        self.upload.as_mut().map_or(0, |upload| upload.pull(buf))
    }

    /// Relay a progress tick. Returns whether the transfer should continue.
    pub fn on_progress(&mut self, progress: Progress) -> bool {
        match self.progress.as_mut() {
            Some(sink) => progress::relay(&mut **sink, progress),
            None => true,
        }
    }
}

impl Default for ResponseSink<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ResponseSink<'_> {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        Ok(self.on_body(data))
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize, ReadError> {
        Ok(self.on_read(data))
    }

    fn header(&mut self, data: &[u8]) -> bool {
        self.on_header(data);
        true
    }

    fn progress(&mut self, dltotal: f64, dlnow: f64, ultotal: f64, ulnow: f64) -> bool {
        self.on_progress(Progress::from_engine(dltotal, dlnow, ultotal, ulnow))
    }
}
