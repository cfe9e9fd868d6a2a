//! Shared HTTP plumbing for the remote clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::{HuginnError, Result};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the connection pool shared by a client's calls.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("huginn/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Map a non-success status onto the error taxonomy.
///
/// 404 is "not found", 403 and 429 are rate limits (GitHub signals primary
/// limits with 403), everything else is a generic API error.
pub fn handle_response_errors(response: &Response, resource: &str) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::NOT_FOUND => Err(HuginnError::NotFound(resource.to_string())),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(HuginnError::RateLimited { retry_after })
        }
        code => Err(HuginnError::Api {
            status: code.as_u16(),
            message: format!("{resource}: {code}"),
        }),
    }
}
