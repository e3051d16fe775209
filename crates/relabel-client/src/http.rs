//! HTTP client for posting messages to a classification endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON body POSTed to a classification endpoint.
#[derive(Debug, Serialize)]
pub struct ClassifyRequest<'a> {
    /// Fixed per-profile literal the endpoint expects; not row identity.
    pub id: &'a str,
    pub message: &'a str,
}

/// JSON body returned by a classification endpoint on success.
///
/// Fields other than `message_type` are ignored.
#[derive(Debug, Deserialize)]
pub struct ClassifyResponse {
    pub message_type: Option<String>,
}

/// Client for one classification endpoint URL.
pub struct ClassifyClient {
    client: reqwest::Client,
    url: String,
}

impl ClassifyClient {
    /// Create a client posting to `url` with reqwest's default timeouts.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Classify a single message, returning the predicted `message_type`
    /// (`None` when the endpoint omits the field).
    ///
    /// Success means HTTP 200 exactly; any other status, other 2xx codes
    /// included, is an [`ClassifyError::Endpoint`] carrying the raw response
    /// body.
    pub async fn classify(
        &self,
        request_id: &str,
        message: &str,
    ) -> Result<Option<String>, ClassifyError> {
        let request = ClassifyRequest {
            id: request_id,
            message,
        };

        let resp = self.client.post(&self.url).json(&request).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifyError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: ClassifyResponse = serde_json::from_str(&body)?;
        debug!(message_type = ?parsed.message_type, "classified message");
        Ok(parsed.message_type)
    }
}
