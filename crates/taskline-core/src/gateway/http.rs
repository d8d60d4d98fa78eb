//! REST gateway over reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::EntryGateway;
use crate::config::Config;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Entry, EntryChanges, EntryId, NewEntry};

/// Error body the backend sends alongside non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gateway talking to the REST backend
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    /// Base URL without trailing slash, e.g. `http://localhost:3000/api`
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for the given base URL
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a gateway with an optional per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> GatewayResult<Self> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    /// Create a gateway from configuration
    pub fn from_config(config: &Config) -> GatewayResult<Self> {
        Self::with_timeout(&config.api_url, config.request_timeout())
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/entries", self.base_url)
    }

    fn entry_url(&self, id: &EntryId) -> String {
        format!("{}/entries/{}", self.base_url, id)
    }

    async fn send(&self, request: RequestBuilder, id: Option<&EntryId>) -> GatewayResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(GatewayError::NotFound { id: id.clone() });
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl EntryGateway for HttpGateway {
    async fn list(&self) -> GatewayResult<Vec<Entry>> {
        let url = self.collection_url();
        debug!("GET {}", url);
        let response = self.send(self.client.get(&url), None).await?;
        Self::decode(response).await
    }

    async fn get(&self, id: &EntryId) -> GatewayResult<Entry> {
        let url = self.entry_url(id);
        debug!("GET {}", url);
        let response = self.send(self.client.get(&url), Some(id)).await?;
        Self::decode(response).await
    }

    async fn create(&self, entry: &NewEntry) -> GatewayResult<Entry> {
        let url = self.collection_url();
        debug!("POST {}", url);
        let response = self.send(self.client.post(&url).json(entry), None).await?;
        Self::decode(response).await
    }

    async fn update(&self, id: &EntryId, changes: &EntryChanges) -> GatewayResult<Entry> {
        let url = self.entry_url(id);
        debug!("PUT {}", url);
        let response = self
            .send(self.client.put(&url).json(changes), Some(id))
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &EntryId) -> GatewayResult<Option<Entry>> {
        let url = self.entry_url(id);
        debug!("DELETE {}", url);
        let response = self.send(self.client.delete(&url), Some(id)).await?;

        // Some backends answer with the deleted entry, others with nothing
        // or an acknowledgement; the delete succeeded either way
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                debug!("Delete of {} answered without an entry: {}", id, e);
                Ok(None)
            }
        }
    }
}

/// Validate a base URL and strip any trailing slash
fn normalize_base_url(url: &str) -> GatewayResult<String> {
    let trimmed = url.trim().trim_end_matches('/');

    if trimmed.is_empty() {
        return Err(GatewayError::InvalidUrl {
            url: url.to_string(),
            details: "URL is empty".to_string(),
        });
    }

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(GatewayError::InvalidUrl {
            url: url.to_string(),
            details: "URL must start with http:// or https://".to_string(),
        });
    }

    Ok(trimmed.to_string())
}

/// Pick the most useful message out of an error response
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryStatus;
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Request as seen by the test backend
    struct Received {
        request_line: String,
        body: String,
    }

    /// Serve exactly one request with a canned response
    async fn serve_once(status: &str, body: &str) -> (HttpGateway, JoinHandle<Received>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            Received {
                request_line: head.lines().next().unwrap_or_default().to_string(),
                body: String::from_utf8_lossy(&buf[header_end..header_end + content_length])
                    .to_string(),
            }
        });

        let gateway = HttpGateway {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url: format!("http://{}/api", addr),
        };
        (gateway, handle)
    }

    const MILK_JSON: &str =
        r#"{"_id":"1","description":"buy milk","status":"pending","createdAt":1000}"#;

    fn milk() -> Entry {
        Entry::new("1", "buy milk", EntryStatus::Pending, 1000)
    }

    #[tokio::test]
    async fn test_list_request() {
        let body = format!("[{}]", MILK_JSON);
        let (gateway, server) = serve_once("200 OK", &body).await;

        let entries = gateway.list().await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "GET /api/entries HTTP/1.1");
        assert!(received.body.is_empty());
        assert_eq!(entries, vec![milk()]);
    }

    #[tokio::test]
    async fn test_get_request() {
        let (gateway, server) = serve_once("200 OK", MILK_JSON).await;

        let entry = gateway.get(&EntryId::new("1")).await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "GET /api/entries/1 HTTP/1.1");
        assert_eq!(entry, milk());
    }

    #[tokio::test]
    async fn test_create_sends_description_only() {
        let (gateway, server) = serve_once("201 Created", MILK_JSON).await;

        let entry = gateway.create(&NewEntry::new("buy milk")).await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "POST /api/entries HTTP/1.1");
        let sent: Value = serde_json::from_str(&received.body).unwrap();
        assert_eq!(sent, json!({ "description": "buy milk" }));
        assert_eq!(entry, milk());
    }

    #[tokio::test]
    async fn test_update_sends_description_and_status() {
        let reply =
            r#"{"_id":"1","description":"buy milk","status":"in-progress","createdAt":1000}"#;
        let (gateway, server) = serve_once("200 OK", reply).await;

        let changed = milk().with_status(EntryStatus::InProgress);
        let entry = gateway
            .update(&changed.id, &changed.changes())
            .await
            .unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "PUT /api/entries/1 HTTP/1.1");
        let sent: Value = serde_json::from_str(&received.body).unwrap();
        assert_eq!(
            sent,
            json!({ "description": "buy milk", "status": "in-progress" })
        );
        assert_eq!(entry, changed);
    }

    #[tokio::test]
    async fn test_delete_sends_no_body() {
        let (gateway, server) = serve_once("200 OK", MILK_JSON).await;

        let deleted = gateway.delete(&EntryId::new("1")).await.unwrap();
        let received = server.await.unwrap();

        assert_eq!(received.request_line, "DELETE /api/entries/1 HTTP/1.1");
        assert!(received.body.is_empty());
        assert_eq!(deleted, Some(milk()));
    }

    #[tokio::test]
    async fn test_delete_with_empty_body() {
        let (gateway, server) = serve_once("204 No Content", "").await;

        let deleted = gateway.delete(&EntryId::new("1")).await.unwrap();
        server.await.unwrap();

        assert_eq!(deleted, None);
    }

    #[tokio::test]
    async fn test_delete_with_acknowledgement_body() {
        let (gateway, server) = serve_once("200 OK", r#"{"message":"deleted"}"#).await;

        let deleted = gateway.delete(&EntryId::new("1")).await.unwrap();
        server.await.unwrap();

        assert_eq!(deleted, None);
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let (gateway, server) =
            serve_once("404 Not Found", r#"{"message":"Entry not found"}"#).await;

        let err = gateway.get(&EntryId::new("42")).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, GatewayError::NotFound { id } if id.as_str() == "42"));
    }

    #[tokio::test]
    async fn test_rejection_carries_backend_message() {
        let (gateway, server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"message":"description is required"}"#,
        )
        .await;

        let err = gateway.create(&NewEntry::new("")).await.unwrap_err();
        server.await.unwrap();

        match err {
            GatewayError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "description is required");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_list_is_decode_error() {
        let (gateway, server) = serve_once("200 OK", "<html>oops</html>").await;

        let err = gateway.list().await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_urls() {
        let gateway = HttpGateway::new("http://localhost:3000/api/").unwrap();

        assert_eq!(gateway.base_url(), "http://localhost:3000/api");
        assert_eq!(
            gateway.collection_url(),
            "http://localhost:3000/api/entries"
        );
        assert_eq!(
            gateway.entry_url(&EntryId::new("64b7")),
            "http://localhost:3000/api/entries/64b7"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpGateway::new("localhost:3000").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl { .. }));

        let err = HttpGateway::new("   ").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl { .. }));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            api_url: "https://tasks.example.com/api".to_string(),
            request_timeout_secs: Some(5),
            ..Config::default()
        };

        let gateway = HttpGateway::from_config(&config).unwrap();
        assert_eq!(gateway.base_url(), "https://tasks.example.com/api");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Invalid status"}"#),
            "Invalid status"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "boom"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, ""),
            "Bad Request"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is essentially never served on loopback
        let gateway = HttpGateway::with_timeout(
            "http://127.0.0.1:9/api",
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        let err = gateway.list().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
