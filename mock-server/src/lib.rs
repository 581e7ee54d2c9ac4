//! Loopback HTTP server used to exercise the REST client end to end.
//!
//! Every route reflects what it received so tests can assert on the exact
//! method, headers, and body the client put on the wire.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// One multipart part as received by `/form`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceivedField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub content: String,
}

/// Body returned by `/form`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormEcho {
    pub fields: Vec<ReceivedField>,
}

pub fn app() -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/echo", any(echo))
        .route("/form", post(form))
        .route("/status/{code}", get(status))
        .route("/bytes/{len}", get(bytes))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    tracing::info!(addr = ?listener.local_addr().ok(), "mock server listening");
    axum::serve(listener, app()).await
}

async fn ok() -> &'static str {
    "hello"
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn form(mut multipart: Multipart) -> Result<Json<FormEcho>, StatusCode> {
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        fields.push(ReceivedField {
            name,
            file_name,
            content: String::from_utf8_lossy(&content).into_owned(),
        });
    }
    tracing::debug!(count = fields.len(), "form received");
    Ok(Json(FormEcho { fields }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn bytes(Path(len): Path<usize>) -> Vec<u8> {
    vec![b'x'; len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            headers: BTreeMap::from([("accept".to_string(), "*/*".to_string())]),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["headers"]["accept"], "*/*");
        assert_eq!(json["body"], "");
    }

    #[test]
    fn received_field_omits_missing_file_name() {
        let field = ReceivedField {
            name: "greeting".to_string(),
            file_name: None,
            content: "hi".to_string(),
        };
        let json = serde_json::to_value(&field).unwrap();
        assert!(json.get("file_name").is_none());
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn form_echo_accepts_missing_file_name() {
        let echo: FormEcho =
            serde_json::from_str(r#"{"fields":[{"name":"a","content":"b"}]}"#).unwrap();
        assert_eq!(echo.fields.len(), 1);
        assert!(echo.fields[0].file_name.is_none());
    }
}
