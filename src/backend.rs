use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::BackendError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Something that answers a user query
#[async_trait]
pub trait Backend: Send + Sync {
    async fn ask(&self, query: &str) -> Result<String, BackendError>;
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// HTTP client for the assistant's `/api/query` endpoint
#[derive(Clone)]
pub struct QueryClient {
    client: Client,
    base_url: String,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/query", self.base_url)
    }

    pub async fn query(&self, query: &str) -> Result<String, BackendError> {
        let url = self.endpoint();
        debug!(%url, chars = query.chars().count(), "sending query");

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest { query })
            .send()
            .await?;

        // The answer is taken from the body whatever the status says
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            warn!(%status, bytes = body.len(), "assistant backend returned an error status");
        }

        let answer = parse_answer(&body)?;
        debug!(chars = answer.chars().count(), "received answer");
        Ok(answer)
    }
}

/// Pull the `answer` string out of a response body
fn parse_answer(body: &[u8]) -> Result<String, BackendError> {
    let value: Value = serde_json::from_slice(body)?;
    match value.get("answer") {
        Some(Value::String(answer)) => Ok(answer.clone()),
        _ => Err(BackendError::MalformedResponse(value.to_string())),
    }
}

#[async_trait]
impl Backend for QueryClient {
    async fn ask(&self, query: &str) -> Result<String, BackendError> {
        self.query(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Captured = Arc<Mutex<Option<(String, String)>>>;

    /// Serve one canned HTTP response and record the request line and body
    async fn serve_once(status: &'static str, body: &'static str) -> (String, Captured) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("local addr should resolve");
        let captured: Captured = Arc::new(Mutex::new(None));
        let captured_for_server = Arc::clone(&captured);

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let (request_line, request_body) = read_request(&mut stream).await;
            *captured_for_server.lock().unwrap() = Some((request_line, request_body));

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.expect("write");
            stream.shutdown().await.ok();
        });

        (format!("http://{addr}"), captured)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> (String, String) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let text = String::from_utf8_lossy(&buf).to_string();
        let (head, body) = text.split_once("\r\n\r\n").unwrap_or((&text, ""));
        let request_line = head.lines().next().unwrap_or_default().to_string();
        (request_line, body.to_string())
    }

    #[tokio::test]
    async fn posts_query_and_returns_answer() {
        let (base_url, captured) = serve_once("200 OK", r#"{"answer":"hi there"}"#).await;
        let client = QueryClient::new(&base_url);

        let answer = client.ask("hello").await.unwrap();
        assert_eq!(answer, "hi there");

        let (request_line, body) = captured.lock().unwrap().clone().unwrap();
        assert_eq!(request_line, "POST /api/query HTTP/1.1");
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "query": "hello" }));
    }

    #[tokio::test]
    async fn missing_answer_is_malformed() {
        let (base_url, _) = serve_once("200 OK", r#"{"detail":"nope"}"#).await;
        let client = QueryClient::new(&base_url);

        let err = client.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn error_status_still_uses_the_answer() {
        let (base_url, _) = serve_once("500 Internal Server Error", r#"{"answer":"x"}"#).await;
        let client = QueryClient::new(&base_url);

        assert_eq!(client.ask("hello").await.unwrap(), "x");
    }

    #[tokio::test]
    async fn error_status_without_answer_is_malformed() {
        let (base_url, _) =
            serve_once("422 Unprocessable Entity", r#"{"detail":"query is required"}"#).await;
        let client = QueryClient::new(&base_url);

        let err = client.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn error_status_with_html_body_is_a_decode_error() {
        let (base_url, _) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        let client = QueryClient::new(&base_url);

        let err = client.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
        assert_eq!(err.user_message(), crate::error::UNREACHABLE_WARNING);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = QueryClient::new(&format!("http://{addr}"));
        let err = client.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[test]
    fn parse_answer_rejects_non_string_answer() {
        assert!(matches!(
            parse_answer(br#"{"answer":42}"#),
            Err(BackendError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_answer(b"not json"),
            Err(BackendError::Decode(_))
        ));
        assert_eq!(parse_answer(br#"{"answer":""}"#).unwrap(), "");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = QueryClient::new("http://localhost:8000/");
        assert_eq!(client.endpoint(), "http://localhost:8000/api/query");
    }
}
