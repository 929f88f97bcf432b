//! HTTP client for the IndexNow submission API
//!
//! Sends one payload per request and classifies the outcome. Anything below
//! 400 counts as accepted (IndexNow answers 200 or 202); transport failures
//! and statuses of 400 and above become [`Error::Transport`] and
//! [`Error::Rejected`], whose messages are shown to operators verbatim.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};

use crate::config::IndexNowConfig;
use crate::error::{Error, Result};
use crate::hooks::RequestOptions;
use crate::payload::SubmissionPayload;

/// Content type of every submission
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Result of checking the published key file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFileStatus {
    /// File reachable and contains the key
    Valid,
    /// File reachable but its content differs from the key
    Mismatch,
    /// File could not be fetched
    Unreachable(String),
}

/// HTTP client for IndexNow
#[derive(Debug, Clone)]
pub struct IndexNowClient {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl IndexNowClient {
    /// Create a client from configuration
    pub fn new(config: &IndexNowConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("indexping/", env!("CARGO_PKG_VERSION"))),
        );

        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    /// Default request options for this client
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new(self.timeout)
    }

    /// POST a payload to `endpoint`
    ///
    /// Returns the response status when it is below 400. The response body is
    /// never read.
    pub async fn submit(
        &self,
        endpoint: &str,
        payload: &SubmissionPayload,
        options: &RequestOptions,
    ) -> Result<u16> {
        let body = serde_json::to_vec(payload)?;

        let mut request = self
            .http_client
            .post(endpoint)
            .timeout(options.timeout)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(Error::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(status.as_u16())
    }

    /// Fetch the key file and compare its content with `key`
    ///
    /// Advisory only: submissions never depend on the result.
    pub async fn check_key_file(&self, url: &str, key: &str) -> KeyFileStatus {
        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return KeyFileStatus::Unreachable(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return KeyFileStatus::Unreachable(format!("HTTP status {}", status));
        }

        match response.text().await {
            Ok(body) if body.trim() == key.trim() => KeyFileStatus::Valid,
            Ok(_) => KeyFileStatus::Mismatch,
            Err(e) => KeyFileStatus::Unreachable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            host: "example.com".to_string(),
            key: "0123456789abcdef0123456789abcdef".to_string(),
            url_list: vec!["https://example.com/a/".to_string()],
            key_location: None,
        }
    }

    fn client() -> IndexNowClient {
        IndexNowClient::new(&IndexNowConfig::default()).unwrap()
    }

    #[test]
    fn test_default_request_options() {
        let options = client().request_options();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert!(options.headers.is_empty());
    }

    #[tokio::test]
    async fn test_submit_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/indexnow")
            .match_header("content-type", JSON_CONTENT_TYPE)
            .match_header("x-trace", "abc")
            .match_body(Matcher::Json(serde_json::json!({
                "host": "example.com",
                "key": "0123456789abcdef0123456789abcdef",
                "urlList": ["https://example.com/a/"],
            })))
            .with_status(202)
            .create_async()
            .await;

        let mut options = client().request_options();
        options.headers.push(("X-Trace".to_string(), "abc".to_string()));

        let status = client()
            .submit(&format!("{}/indexnow", server.url()), &payload(), &options)
            .await
            .unwrap();
        assert_eq!(status, 202);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/indexnow")
            .with_status(422)
            .create_async()
            .await;

        let err = client()
            .submit(
                &format!("{}/indexnow", server.url()),
                &payload(),
                &client().request_options(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "IndexNow request failed with HTTP status 422: Unprocessable Entity."
        );
    }

    #[tokio::test]
    async fn test_submit_transport_failure() {
        // Nothing listens on port 9 (discard) on loopback in test environments
        let err = client()
            .submit(
                "http://127.0.0.1:9/indexnow",
                &payload(),
                &client().request_options(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.to_string().starts_with("IndexNow request failed: "));
    }

    #[tokio::test]
    async fn test_check_key_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/good.txt")
            .with_status(200)
            .with_body("good-key-123\n")
            .create_async()
            .await;
        server
            .mock("GET", "/stale.txt")
            .with_status(200)
            .with_body("something-else")
            .create_async()
            .await;
        server
            .mock("GET", "/missing.txt")
            .with_status(404)
            .create_async()
            .await;

        let client = client();
        assert_eq!(
            client
                .check_key_file(&format!("{}/good.txt", server.url()), "good-key-123")
                .await,
            KeyFileStatus::Valid
        );
        assert_eq!(
            client
                .check_key_file(&format!("{}/stale.txt", server.url()), "good-key-123")
                .await,
            KeyFileStatus::Mismatch
        );
        assert!(matches!(
            client
                .check_key_file(&format!("{}/missing.txt", server.url()), "good-key-123")
                .await,
            KeyFileStatus::Unreachable(reason) if reason.contains("404")
        ));
    }
}
