//! Status command - query the public service status page.

use anyhow::{Result, bail};
use deepchat_llm::{LlmError, fetch_service_status};

use super::Context;

/// Run the status command. Needs no API key.
pub async fn run(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;

    match fetch_service_status(&settings.status_url, settings.request_timeout()).await {
        Ok(status) => {
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Service Status: {}", status);
            }
            Ok(())
        }
        Err(LlmError::Api { status, .. }) => {
            bail!("Failed to get service status: HTTP {}", status)
        }
        Err(e) => bail!("Error fetching service status: {}", e),
    }
}
