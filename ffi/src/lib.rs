//! C-ABI wrapper around `restclient-core`.
//!
//! # Overview
//! Exposes the blocking REST client through `extern "C"` functions so any
//! language with a C FFI can issue GET/POST/PUT/DELETE calls through libcurl
//! without touching Rust types directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each verb mirrors the core `RestClient` method 1:1 and always returns an
//!   `FfiResponse`; null arguments and caught panics become status -1 with a
//!   diagnostic body, exactly like a transport failure.
//! - Streaming GET takes C callbacks for body chunks and progress.
//! - The C caller owns all returned pointers and must call the matching
//!   `restclient_free_*` function to release them.

pub mod types;

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use restclient_core::{ClientConfig, Request, RestClient};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client. `user_agent` may be null to use the default agent.
///
/// Returns null only if an internal panic occurs.
/// The caller must free the returned pointer with `restclient_free`.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_new(user_agent: *const c_char) -> *mut FfiRestClient {
    catch_unwind(|| {
        let mut config = ClientConfig::default();
        if let Some(agent) = unsafe { str_arg(user_agent) } {
            config.user_agent = agent.to_string();
        }
        let client = RestClient::with_config(config);
        Box::into_raw(Box::new(FfiRestClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `restclient_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_free(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// The User-Agent this client installs when a request carries none.
///
/// Returns null if `client` is null. Free with `restclient_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_user_agent(client: *const FfiRestClient) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        CString::new(client.inner.config().user_agent.as_str())
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Credentials and cookies
// ---------------------------------------------------------------------------

/// Send basic-auth credentials on every following call.
///
/// Returns false if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_set_auth(
    client: *mut FfiRestClient,
    username: *const c_char,
    password: *const c_char,
) -> bool {
    catch_unwind(|| {
        if client.is_null() || username.is_null() || password.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        let username = unsafe { str_arg(username) }.unwrap_or("");
        let password = unsafe { str_arg(password) }.unwrap_or("");
        client.inner.set_auth(username, password);
        true
    })
    .unwrap_or(false)
}

/// Stop sending credentials. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_clear_auth(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            unsafe { &mut *client }.inner.clear_auth();
        });
    }
}

/// Send `cookies` (e.g. `"a=1; b=2"`) on every following call.
///
/// Returns false if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_set_cookies(
    client: *mut FfiRestClient,
    cookies: *const c_char,
) -> bool {
    catch_unwind(|| {
        if client.is_null() || cookies.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        client
            .inner
            .set_cookies(unsafe { str_arg(cookies) }.unwrap_or(""));
        true
    })
    .unwrap_or(false)
}

/// Stop sending cookies. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_clear_cookies(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            unsafe { &mut *client }.inner.clear_cookies();
        });
    }
}

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

/// GET `url` with `headers_len` request headers.
///
/// `headers` may be null when `headers_len` is 0.
/// The caller must free the result with `restclient_free_response`.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_get(
    client: *const FfiRestClient,
    url: *const c_char,
    headers: *const FfiHeaderRef,
    headers_len: u32,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResponse::null_arg("client");
        }
        let Some(url) = (unsafe { str_arg(url) }) else {
            return FfiResponse::null_arg("url");
        };
        let client = unsafe { &*client };
        let mut request = Request::new(url);
        request.headers = unsafe { headers_arg(headers, headers_len) };
        FfiResponse::from_core(client.inner.get(&request))
    })
    .unwrap_or_else(|_| FfiResponse::panic("panic in restclient_get"))
}

/// GET `url`, handing a 200 body to `write` instead of buffering it and
/// reporting progress to `progress`.
///
/// Either callback may be null. Each receives its own `*_user_data` pointer
/// untouched. A non-200 body is still buffered in the returned response.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn restclient_get_streaming(
    client: *const FfiRestClient,
    url: *const c_char,
    headers: *const FfiHeaderRef,
    headers_len: u32,
    write: Option<FfiWriteCallback>,
    write_user_data: *mut c_void,
    progress: Option<FfiProgressCallback>,
    progress_user_data: *mut c_void,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResponse::null_arg("client");
        }
        let Some(url) = (unsafe { str_arg(url) }) else {
            return FfiResponse::null_arg("url");
        };
        let client = unsafe { &*client };
        let mut request = Request::new(url);
        request.headers = unsafe { headers_arg(headers, headers_len) };

        let mut writer = write.map(|callback| CallbackWriter {
            callback,
            user_data: write_user_data,
        });
        let mut relay = progress.map(|callback| CallbackProgress {
            callback,
            user_data: progress_user_data,
        });
        let resp = client.inner.get_with(
            &request,
            writer.as_mut().map(|w| w as &mut dyn std::io::Write),
            relay
                .as_mut()
                .map(|p| p as &mut dyn restclient_core::ProgressSink),
        );
        FfiResponse::from_core(resp)
    })
    .unwrap_or_else(|_| FfiResponse::panic("panic in restclient_get_streaming"))
}

/// POST `body_len` bytes of `body` with the given content type.
///
/// `body` may be null when `body_len` is 0.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_post(
    client: *const FfiRestClient,
    url: *const c_char,
    content_type: *const c_char,
    body: *const u8,
    body_len: usize,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResponse::null_arg("client");
        }
        let Some(url) = (unsafe { str_arg(url) }) else {
            return FfiResponse::null_arg("url");
        };
        let Some(content_type) = (unsafe { str_arg(content_type) }) else {
            return FfiResponse::null_arg("content_type");
        };
        let client = unsafe { &*client };
        let body = unsafe { bytes_arg(body, body_len) };
        FfiResponse::from_core(client.inner.post(url, content_type, body))
    })
    .unwrap_or_else(|_| FfiResponse::panic("panic in restclient_post"))
}

/// POST `fields` as `multipart/form-data`.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_post_form(
    client: *const FfiRestClient,
    url: *const c_char,
    headers: *const FfiHeaderRef,
    headers_len: u32,
    fields: *const FfiFormField,
    fields_len: u32,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResponse::null_arg("client");
        }
        let Some(url) = (unsafe { str_arg(url) }) else {
            return FfiResponse::null_arg("url");
        };
        let client = unsafe { &*client };
        let mut request = Request::new(url);
        request.headers = unsafe { headers_arg(headers, headers_len) };
        let form = unsafe { form_arg(fields, fields_len) };
        FfiResponse::from_core(client.inner.post_form(&request, &form))
    })
    .unwrap_or_else(|_| FfiResponse::panic("panic in restclient_post_form"))
}

/// PUT `body_len` bytes of `body` with the given content type.
///
/// `body` may be null when `body_len` is 0.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_put(
    client: *const FfiRestClient,
    url: *const c_char,
    content_type: *const c_char,
    body: *const u8,
    body_len: usize,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResponse::null_arg("client");
        }
        let Some(url) = (unsafe { str_arg(url) }) else {
            return FfiResponse::null_arg("url");
        };
        let Some(content_type) = (unsafe { str_arg(content_type) }) else {
            return FfiResponse::null_arg("content_type");
        };
        let client = unsafe { &*client };
        let body = unsafe { bytes_arg(body, body_len) };
        FfiResponse::from_core(client.inner.put(url, content_type, body))
    })
    .unwrap_or_else(|_| FfiResponse::panic("panic in restclient_put"))
}

/// DELETE `url`.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_delete(
    client: *const FfiRestClient,
    url: *const c_char,
) -> *mut FfiResponse {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResponse::null_arg("client");
        }
        let Some(url) = (unsafe { str_arg(url) }) else {
            return FfiResponse::null_arg("url");
        };
        let client = unsafe { &*client };
        FfiResponse::from_core(client.inner.delete(url))
    })
    .unwrap_or_else(|_| FfiResponse::panic("panic in restclient_delete"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResponse` returned by any verb. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_free_response(resp: *mut FfiResponse) {
    if resp.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiResponse::release(resp) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restclient_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
