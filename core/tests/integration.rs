//! End-to-end calls against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread
//! and drives the real client at it, so every request goes through libcurl
//! and every assertion is about what actually crossed the wire.

use std::io::Write;
use std::net::SocketAddr;
use std::ops::ControlFlow;

use mock_server::{Echo, FormEcho};
use restclient_core::{
    FormField, FormFields, Progress, Request, RestClient, DEFAULT_USER_AGENT,
    STATUS_TRANSPORT_FAILURE,
};

/// Start the mock server on a random loopback port.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn echo(resp: &restclient_core::Response) -> Echo {
    serde_json::from_slice(&resp.body).expect("echo body is JSON")
}

// --- get ---

#[test]
fn get_returns_status_body_and_headers() {
    let addr = start_server();
    let resp = RestClient::new().get(&Request::new(format!("http://{addr}/ok")));

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "hello");
    assert_eq!(resp.header("HTTP/1.1 200 OK"), Some("present"));
    assert_eq!(resp.header("content-length"), Some("5"));
}

#[test]
fn get_refused_connection_reports_failure() {
    let resp = RestClient::new().get(&Request::new("http://127.0.0.1:1/ok"));

    assert_eq!(resp.status, STATUS_TRANSPORT_FAILURE);
    assert_eq!(resp.body_text(), "Failed to query.");
}

#[test]
fn get_non_success_status_is_returned_as_data() {
    let addr = start_server();
    let resp = RestClient::new().get_url(&format!("http://{addr}/status/404"));

    assert_eq!(resp.status, 404);
    assert_eq!(resp.body_text(), "status 404");
}

#[test]
fn get_sends_default_user_agent() {
    let addr = start_server();
    let resp = RestClient::new().get(&Request::new(format!("http://{addr}/echo")));

    assert_eq!(resp.status, 200);
    let echo = echo(&resp);
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.headers["user-agent"], DEFAULT_USER_AGENT);
}

#[test]
fn get_preserves_caller_user_agent_and_headers() {
    let addr = start_server();
    let request = Request::new(format!("http://{addr}/echo"))
        .header("User-Agent", "probe/1.0")
        .header("X-Trace", "abc123");
    let resp = RestClient::new().get(&request);

    let echo = echo(&resp);
    assert_eq!(echo.headers["user-agent"], "probe/1.0");
    assert_eq!(echo.headers["x-trace"], "abc123");
}

#[test]
fn module_level_get_uses_default_client() {
    let addr = start_server();
    let resp = restclient_core::get(&Request::new(format!("http://{addr}/ok")));

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"hello");
}

// --- streaming and progress ---

#[test]
fn get_streams_ok_body_into_output() {
    let addr = start_server();
    let request = Request::new(format!("http://{addr}/ok"));
    let mut out = Vec::new();
    let resp = RestClient::new().get_with(&request, Some(&mut out), None);

    assert_eq!(resp.status, 200);
    assert!(resp.body.is_empty());
    assert_eq!(out, b"hello");
}

#[test]
fn get_buffers_error_body_despite_output() {
    let addr = start_server();
    let request = Request::new(format!("http://{addr}/status/500"));
    let mut out = Vec::new();
    let resp = RestClient::new().get_with(&request, Some(&mut out), None);

    assert_eq!(resp.status, 500);
    assert_eq!(resp.body_text(), "status 500");
    assert!(out.is_empty());
}

#[test]
fn get_streams_into_file() {
    let addr = start_server();
    let request = Request::new(format!("http://{addr}/bytes/4096"));
    let mut file = tempfile::tempfile().unwrap();
    let resp = RestClient::new().get_with(&request, Some(&mut file), None);
    file.flush().unwrap();

    assert_eq!(resp.status, 200);
    assert!(resp.body.is_empty());
    assert_eq!(file.metadata().unwrap().len(), 4096);
}

#[test]
fn get_reports_progress() {
    let addr = start_server();
    let request = Request::new(format!("http://{addr}/bytes/65536"));
    let mut ticks: Vec<Progress> = Vec::new();
    let mut sink = |p: Progress| -> ControlFlow<()> {
        ticks.push(p);
        ControlFlow::Continue(())
    };
    let resp = RestClient::new().get_with(&request, None, Some(&mut sink));

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.len(), 65536);
    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|p| p.download_now <= 65536));
}

#[test]
fn get_progress_abort_reports_failure() {
    let addr = start_server();
    let request = Request::new(format!("http://{addr}/bytes/8388608"));
    let mut abort = |_p: Progress| -> ControlFlow<()> { ControlFlow::Break(()) };
    let resp = RestClient::new().get_with(&request, None, Some(&mut abort));

    assert_eq!(resp.status, STATUS_TRANSPORT_FAILURE);
    assert_eq!(resp.body_text(), "Failed to query.");
}

// --- post ---

#[test]
fn post_sends_body_with_content_type() {
    let addr = start_server();
    let resp = RestClient::new().post(
        &format!("http://{addr}/echo"),
        "application/json",
        br#"{"title":"Buy milk"}"#,
    );

    assert_eq!(resp.status, 200);
    let echo = echo(&resp);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.headers["user-agent"], DEFAULT_USER_AGENT);
    assert_eq!(echo.body, r#"{"title":"Buy milk"}"#);
}

#[test]
fn post_form_uploads_file_and_text_fields() {
    let addr = start_server();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "file contents").unwrap();

    let mut form = FormFields::new();
    form.insert("file1".to_string(), FormField::file(&path));
    form.insert("note".to_string(), FormField::text("hello form"));
    let resp = RestClient::new().post_form(&Request::new(format!("http://{addr}/form")), &form);

    assert_eq!(resp.status, 200);
    assert!(resp.body_text().contains("file1"));

    let echo: FormEcho = serde_json::from_slice(&resp.body).unwrap();
    let file = echo.fields.iter().find(|f| f.name == "file1").unwrap();
    assert_eq!(file.file_name.as_deref(), Some("a.txt"));
    assert_eq!(file.content, "file contents");
    let note = echo.fields.iter().find(|f| f.name == "note").unwrap();
    assert!(note.file_name.is_none());
    assert_eq!(note.content, "hello form");
}

#[test]
fn post_form_with_missing_file_is_transport_failure() {
    let addr = start_server();
    let mut form = FormFields::new();
    form.insert(
        "file1".to_string(),
        FormField::file("/nonexistent/restclient/missing.txt"),
    );
    let resp = RestClient::new().post_form(&Request::new(format!("http://{addr}/form")), &form);

    assert_eq!(resp.status, STATUS_TRANSPORT_FAILURE);
}

// --- put ---

#[test]
fn put_uploads_exact_bytes() {
    let addr = start_server();
    let payload = "x".repeat(100_000);
    let resp = RestClient::new().put(&format!("http://{addr}/echo"), "text/plain", payload.as_bytes());

    assert_eq!(resp.status, 200);
    let echo = echo(&resp);
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.headers["content-type"], "text/plain");
    assert_eq!(echo.headers["content-length"], "100000");
    assert_eq!(echo.body, payload);
}

#[test]
fn put_empty_body() {
    let addr = start_server();
    let resp = RestClient::new().put(&format!("http://{addr}/echo"), "text/plain", b"");

    assert_eq!(resp.status, 200);
    let echo = echo(&resp);
    assert_eq!(echo.method, "PUT");
    assert!(echo.body.is_empty());
}

// --- delete ---

#[test]
fn delete_uses_delete_verb() {
    let addr = start_server();
    let resp = RestClient::new().delete(&format!("http://{addr}/echo"));

    assert_eq!(resp.status, 200);
    let echo = echo(&resp);
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.headers["user-agent"], DEFAULT_USER_AGENT);
}

// --- auth and cookies ---

#[test]
fn auth_is_sent_until_cleared() {
    let addr = start_server();
    let url = format!("http://{addr}/echo");
    let mut client = RestClient::new();

    client.set_auth("alice", "secret");
    let echo_with = echo(&client.get_url(&url));
    assert_eq!(echo_with.headers["authorization"], "Basic YWxpY2U6c2VjcmV0");

    client.clear_auth();
    let echo_without = echo(&client.get_url(&url));
    assert!(!echo_without.headers.contains_key("authorization"));
}

#[test]
fn cookies_are_sent_until_cleared() {
    let addr = start_server();
    let url = format!("http://{addr}/echo");
    let mut client = RestClient::new();

    client.set_cookies("a=1; b=2");
    let echo_with = echo(&client.delete(&url));
    assert_eq!(echo_with.headers["cookie"], "a=1; b=2");

    client.clear_cookies();
    let echo_without = echo(&client.delete(&url));
    assert!(!echo_without.headers.contains_key("cookie"));
}
