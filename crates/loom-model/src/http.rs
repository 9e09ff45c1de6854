//! Shared HTTP response checks.

use crate::error::ModelError;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Return the response unchanged on success; map 429 to
/// [`ModelError::RateLimited`] and other failures to [`ModelError::Api`].
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    if resp.status() == 429 {
        return Err(ModelError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(ModelError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
