//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Output types own their heap data and are released through
//! `restclient_free_response`. Input types are borrowed views the C caller
//! keeps alive for the duration of the call. C callbacks are wrapped in small
//! adapters so the core sees an ordinary `io::Write` and `ProgressSink`.

use std::ffi::{c_void, CStr, CString};
use std::io;
use std::ops::ControlFlow;
use std::os::raw::c_char;

use restclient_core::{FormField, FormFields, HeaderMap, Progress, ProgressSink, Response};

/// Opaque handle to a `RestClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiRestClient {
    pub(crate) inner: restclient_core::RestClient,
}

// ---------------------------------------------------------------------------
// Request inputs (caller-owned, read but never freed by us)
// ---------------------------------------------------------------------------

/// A request header as a pair of borrowed C strings.
#[repr(C)]
pub struct FfiHeaderRef {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Kind of a multipart field.
#[repr(C)]
pub enum FfiFormFieldKind {
    Text = 0,
    File = 1,
}

/// One multipart field. For `File`, `value` is a filesystem path.
#[repr(C)]
pub struct FfiFormField {
    pub name: *const c_char,
    pub kind: FfiFormFieldKind,
    pub value: *const c_char,
}

/// Receives body bytes of a successful GET. Returns how many bytes were
/// consumed; returning fewer than `len` aborts the transfer.
pub type FfiWriteCallback =
    extern "C" fn(data: *const u8, len: usize, user_data: *mut c_void) -> usize;

/// Receives progress counters. A non-zero return aborts the transfer.
pub type FfiProgressCallback = extern "C" fn(
    download_total: u64,
    download_now: u64,
    upload_total: u64,
    upload_now: u64,
    user_data: *mut c_void,
) -> i32;

/// Read a nullable C string. Null and invalid UTF-8 both read as `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Read `len` bytes. A null pointer reads as empty.
///
/// # Safety
/// `ptr` must be null or valid for `len` bytes for the lifetime `'a`.
pub(crate) unsafe fn bytes_arg<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// Collect a header array. Entries with a null or non-UTF-8 key or value
/// are skipped.
///
/// # Safety
/// `ptr` must be null or valid for `len` entries whose strings are valid.
pub(crate) unsafe fn headers_arg(ptr: *const FfiHeaderRef, len: u32) -> HeaderMap {
    if ptr.is_null() || len == 0 {
        return HeaderMap::new();
    }
    let entries = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    entries
        .iter()
        .filter_map(|h| {
            let key = unsafe { str_arg(h.key) }?;
            let value = unsafe { str_arg(h.value) }?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Collect a form field array. Entries with a null or non-UTF-8 name or
/// value are skipped.
///
/// # Safety
/// `ptr` must be null or valid for `len` entries whose strings are valid.
pub(crate) unsafe fn form_arg(ptr: *const FfiFormField, len: u32) -> FormFields {
    if ptr.is_null() || len == 0 {
        return FormFields::new();
    }
    let entries = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    entries
        .iter()
        .filter_map(|f| {
            let name = unsafe { str_arg(f.name) }?;
            let value = unsafe { str_arg(f.value) }?;
            let field = match f.kind {
                FfiFormFieldKind::Text => FormField::text(value),
                FfiFormFieldKind::File => FormField::file(value),
            };
            Some((name.to_string(), field))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Callback adapters
// ---------------------------------------------------------------------------

/// `io::Write` over a C write callback.
pub(crate) struct CallbackWriter {
    pub callback: FfiWriteCallback,
    pub user_data: *mut c_void,
}

impl io::Write for CallbackWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let written = (self.callback)(buf.as_ptr(), buf.len(), self.user_data);
        if written == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write callback consumed no bytes",
            ));
        }
        Ok(written.min(buf.len()))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `ProgressSink` over a C progress callback.
pub(crate) struct CallbackProgress {
    pub callback: FfiProgressCallback,
    pub user_data: *mut c_void,
}

impl ProgressSink for CallbackProgress {
    fn update(&mut self, p: Progress) -> ControlFlow<()> {
        let abort = (self.callback)(
            p.download_total,
            p.download_now,
            p.upload_total,
            p.upload_now,
            self.user_data,
        );
        if abort == 0 {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }
}

// ---------------------------------------------------------------------------
// Response output (heap-allocated by us, freed by restclient_free_response)
// ---------------------------------------------------------------------------

/// A response header as a pair of owned C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// Result of every call.
///
/// `status` is the HTTP status, or -1 when the transfer failed. `body` holds
/// `body_len` bytes and is null when empty; it is not NUL-terminated.
#[repr(C)]
pub struct FfiResponse {
    pub status: i32,
    pub body: *mut u8,
    pub body_len: usize,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiResponse {
    /// Convert a core `Response` into a heap-allocated `FfiResponse`.
    pub(crate) fn from_core(resp: Response) -> *mut Self {
        let body_len = resp.body.len();
        let body = if resp.body.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(resp.body.into_boxed_slice()) as *mut u8
        };

        let headers_len = resp.headers.len() as u32;
        let headers = if resp.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = resp
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: CString::new(k).unwrap_or_default().into_raw(),
                    value: CString::new(v).unwrap_or_default().into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiResponse {
            status: resp.status,
            body,
            body_len,
            headers,
            headers_len,
        }))
    }

    /// A failure response for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        tracing::warn!(argument = name, "null argument");
        Self::from_core(Response::failure(&format!("null argument: {name}")))
    }

    /// A failure response for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::from_core(Response::failure(msg))
    }

    /// Release everything `from_core` allocated.
    ///
    /// # Safety
    /// `ptr` must come from `from_core` and not have been released before.
    pub(crate) unsafe fn release(ptr: *mut Self) {
        let resp = unsafe { Box::from_raw(ptr) };
        if !resp.body.is_null() {
            let body = std::ptr::slice_from_raw_parts_mut(resp.body, resp.body_len);
            drop(unsafe { Box::from_raw(body) });
        }
        if !resp.headers.is_null() {
            let headers =
                std::ptr::slice_from_raw_parts_mut(resp.headers, resp.headers_len as usize);
            let headers = unsafe { Box::from_raw(headers) };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    }
}
