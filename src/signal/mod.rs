//! Client for the conversion signal endpoint.
//!
//! One request shape: `GET <endpoint>/api/signal?base=X&target=Y`. The
//! server answers either a signal record or `{"error": "..."}` with a
//! non-success status. Nothing here touches the UI; the app maps results
//! into a [`crate::status::Status`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categorical verdict computed server-side from the rate history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Green,
    Amber,
    Red,
    /// Client-side interim state ("Checking...", idle); never sent by the server.
    Neutral,
    #[serde(other)]
    Unknown,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Green => "green",
            SignalKind::Amber => "amber",
            SignalKind::Red => "red",
            SignalKind::Neutral => "neutral",
            SignalKind::Unknown => "unknown",
        }
    }
}

/// Successful response body.
///
/// Everything past `signal` is optional: the no-data path answers
/// `{"signal": "unknown", "latest": null}` with no label or statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    pub signal: SignalKind,
    #[serde(default)]
    pub label: String,
    pub latest: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub days: Option<u32>,
}

/// Error body accompanying a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Error)]
pub enum SignalError {
    /// The endpoint rejected the request; carries the server's message.
    #[error("{0}")]
    Api(String),

    /// Transport failure or undecodable response.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Thin wrapper around a reqwest client pinned to one endpoint.
#[derive(Debug, Clone)]
pub struct SignalClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SignalClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Perform one signal check. Exactly one request; no retries.
    pub async fn fetch(&self, base: &str, target: &str) -> Result<SignalResponse, SignalError> {
        let url = format!("{}/api/signal", self.endpoint);
        tracing::debug!("GET {} base={} target={}", url, base, target);

        let response = self
            .client
            .get(&url)
            .query(&[("base", base), ("target", target)])
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(SignalError::Api(message));
        }

        Ok(response.json::<SignalResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serve one canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_decodes_full_response() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"signal":"green","label":"Great time to convert","latest":1.2345,"p50":1.2,"p75":1.25,"days":30}"#,
        )
        .await;

        let resp = SignalClient::new(endpoint).fetch("USD", "EUR").await.unwrap();
        assert_eq!(resp.signal, SignalKind::Green);
        assert_eq!(resp.label, "Great time to convert");
        assert_eq!(resp.latest, Some(1.2345));
        assert_eq!(resp.days, Some(30));
    }

    #[tokio::test]
    async fn test_decodes_no_data_response() {
        // The server omits label and statistics entirely on the no-data path
        let endpoint = serve_once("200 OK", r#"{"signal":"unknown","latest":null}"#).await;

        let resp = SignalClient::new(endpoint).fetch("USD", "EUR").await.unwrap();
        assert_eq!(resp.signal, SignalKind::Unknown);
        assert!(resp.label.is_empty());
        assert_eq!(resp.latest, None);
        assert_eq!(resp.p50, None);
    }

    #[tokio::test]
    async fn test_surfaces_server_error_message() {
        let endpoint = serve_once("400 Bad Request", r#"{"error":"bad pair"}"#).await;

        let err = SignalClient::new(endpoint).fetch("USD", "USD").await.unwrap_err();
        assert_eq!(err.to_string(), "bad pair");
    }

    #[tokio::test]
    async fn test_falls_back_to_generic_message_on_empty_error_body() {
        let endpoint = serve_once("500 Internal Server Error", "{}").await;

        let err = SignalClient::new(endpoint).fetch("USD", "EUR").await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed");
    }

    #[tokio::test]
    async fn test_connection_refused_is_reported() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = SignalClient::new(format!("http://{}", addr))
            .fetch("USD", "EUR")
            .await
            .unwrap_err();
        assert!(matches!(err, SignalError::Http(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = SignalClient::new("http://localhost:8000/");
        assert_eq!(client.endpoint(), "http://localhost:8000");
    }
}
