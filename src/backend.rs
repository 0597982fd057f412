use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::cart::CartSnapshot;
use crate::domain::recommendation::Recommendation;

/// How a backend call can go wrong. The reconciler keys its user-facing
/// messages off these variants, so the partition matters more than the text:
/// `Rejected` is the backend saying "no such product", everything else means
/// we never got a usable answer.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{message}")]
    Rejected { message: String },

    #[error("Server error: {code} - {message}")]
    Status { code: u16, message: String },

    #[error("Network error: no response from server ({detail})")]
    Unreachable { detail: String },

    #[error("Unexpected backend failure: {detail}")]
    Unexpected { detail: String },
}

impl BackendError {
    /// Transport-level failures (could not reach the backend, or it answered
    /// outside the contract). Domain rejections are not transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BackendError::Status { .. } | BackendError::Unreachable { .. }
        )
    }
}

/// The HTTP surface this client consumes - allows for mocking in tests.
#[automock]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// GET /get-scanned-items - the authoritative cart.
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError>;

    /// GET /recommended.
    async fn fetch_recommendations(&self) -> Result<Vec<Recommendation>, BackendError>;

    /// POST /scan-item with the decoded barcode. Returns the product name
    /// the backend recognized.
    async fn submit_scan(&self, barcode: &str) -> Result<String, BackendError>;

    /// Where the printable bill view lives. Fire-and-forget; nothing comes
    /// back into this client from it.
    fn bill_url(&self) -> String;
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    barcode: &'a str,
}

#[derive(Deserialize)]
struct ScanReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    product: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Real backend client over reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Errors from `send()` mean no usable response was obtained.
    fn no_response(err: reqwest::Error) -> BackendError {
        BackendError::Unreachable {
            detail: err.to_string(),
        }
    }

    /// Converts a non-2xx response into a `Status` error, pulling the
    /// backend's `message` field out of the body when there is one.
    async fn status_error(response: reqwest::Response) -> BackendError {
        let code = response.status().as_u16();
        let reason = response
            .status()
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
        let body: ErrorBody = response.json().await.unwrap_or_default();

        BackendError::Status {
            code,
            message: body.message.unwrap_or(reason),
        }
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError> {
        let response = self
            .client
            .get(self.url("/get-scanned-items"))
            .send()
            .await
            .map_err(Self::no_response)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json::<CartSnapshot>()
            .await
            .map_err(|e| BackendError::Unexpected {
                detail: e.to_string(),
            })
    }

    async fn fetch_recommendations(&self) -> Result<Vec<Recommendation>, BackendError> {
        let response = self
            .client
            .get(self.url("/recommended"))
            .send()
            .await
            .map_err(Self::no_response)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json::<Vec<Recommendation>>()
            .await
            .map_err(|e| BackendError::Unexpected {
                detail: e.to_string(),
            })
    }

    async fn submit_scan(&self, barcode: &str) -> Result<String, BackendError> {
        debug!(barcode, "posting scan to backend");

        let response = self
            .client
            .post(self.url("/scan-item"))
            .json(&ScanRequest { barcode })
            .send()
            .await
            .map_err(Self::no_response)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let reply: ScanReply =
            response
                .json()
                .await
                .map_err(|e| BackendError::Unexpected {
                    detail: e.to_string(),
                })?;

        if reply.status == "success" {
            Ok(reply.product)
        } else {
            Err(BackendError::Rejected {
                message: reply
                    .message
                    .unwrap_or_else(|| "Product not found".to_string()),
            })
        }
    }

    fn bill_url(&self) -> String {
        self.url("/bill")
    }
}
