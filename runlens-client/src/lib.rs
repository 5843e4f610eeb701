//! Runlens HTTP Client
//!
//! A small, type-safe HTTP client for the pipeline platform's REST API.
//!
//! The client fetches run documents, builds `RunManifest` snapshots from
//! them, and serves as the artifact fetcher those snapshots pull logs and
//! outputs through.
//!
//! # Example
//!
//! ```no_run
//! use runlens_client::{PlatformClient, WaitOptions};
//! use runlens_core::ManifestSchema;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlatformClient::new("http://localhost:8888");
//!
//!     let run = client
//!         .wait_for_completion("3f2c9a4e-...", &ManifestSchema::kfp_v1(), &WaitOptions::default(), |snapshot| {
//!             println!("{}", snapshot);
//!         })
//!         .await?;
//!
//!     for node in run.get_nodes("runtime-exception") {
//!         println!("{}", run.pull_logs(node).await?);
//!     }
//!     Ok(())
//! }
//! ```

mod artifacts;
pub mod error;
mod runs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use runs::WaitOptions;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the pipeline platform API
///
/// Endpoints are grouped by resource:
/// - Runs (get, list, v2 task view)
/// - Artifacts (read a node artifact)
/// - Snapshots and the completion wait built on top of them
#[derive(Debug, Clone)]
pub struct PlatformClient {
    /// Base URL of the platform API (e.g., "http://localhost:8888")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl PlatformClient {
    /// Create a new platform client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the platform API (e.g., "http://localhost:8888")
    ///
    /// # Example
    /// ```
    /// use runlens_client::PlatformClient;
    ///
    /// let client = PlatformClient::new("http://localhost:8888");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new platform client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, auth headers, etc.
    ///
    /// # Example
    /// ```
    /// use runlens_client::PlatformClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = PlatformClient::with_client("http://localhost:8888", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the platform
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod test_server;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PlatformClient::new("http://localhost:8888");
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = PlatformClient::new("http://localhost:8888/");
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = PlatformClient::with_client("http://localhost:8888", http_client);
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let server = test_server::serve(vec![(404, "run not found".to_string())]).await;
        let client = PlatformClient::new(server.url());

        let err = client.get_run("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, ClientError::ApiError { ref message, .. } if message == "run not found"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = test_server::serve(vec![(200, "not json".to_string())]).await;
        let client = PlatformClient::new(server.url());

        let err = client.get_run("r").await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}
