//! Artifact retrieval. No retries: any failure is returned to the caller.

use std::time::Duration;

use loom_config::LoaderConfig;

use crate::error::FetchError;

/// Content types accepted as executable module text.
const EXECUTABLE_TYPES: &[&str] = &[
    "application/javascript",
    "text/javascript",
    "application/x-javascript",
    "application/ecmascript",
    "text/ecmascript",
];

/// HTTP client for compiled artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    http: reqwest::Client,
}

impl ArtifactFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &LoaderConfig) -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent("loom/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                address: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Fetch the module text at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on timeout, transport failure, a non-2xx status,
    /// or a content type that is not JavaScript.
    pub async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    address: address.to_string(),
                }
            } else {
                FetchError::Transport {
                    address: address.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let resp = self.http.get(address).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_executable(&content_type) {
            return Err(FetchError::ContentType {
                address: address.to_string(),
                content_type,
            });
        }

        let text = resp.text().await.map_err(transport)?;
        tracing::debug!(address, bytes = text.len(), "artifact fetched");
        Ok(text)
    }
}

fn is_executable(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    EXECUTABLE_TYPES.contains(&essence.as_str())
}
