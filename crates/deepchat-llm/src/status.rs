//! Service status page lookup.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::client::handle_error_response;
use crate::error::{LlmError, Result};
use crate::types::{ServiceStatus, StatusPage};

/// Fetch the overall service status from a Statuspage-style `status.json`.
///
/// Needs no credential. A non-success status is [`LlmError::Api`].
pub async fn fetch_service_status(url: &str, timeout: Duration) -> Result<ServiceStatus> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Internal(format!("Failed to create HTTP client: {}", e)))?;

    debug!(url = %url, "Fetching service status");
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(handle_error_response(response).await);
    }

    let body = response.text().await?;
    let page: StatusPage = serde_json::from_str(&body)?;
    Ok(page.status)
}
