//! Models command - list model IDs available to the API key.

use anyhow::{Result, bail};
use deepchat_llm::{ChatBackend, LlmError};

use super::Context;

/// Run the models command.
pub async fn run(ctx: &Context) -> Result<()> {
    let secret = ctx.api_key()?;
    let client = ctx.client(&secret)?;

    match client.list_models().await {
        Ok(models) => {
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&models)?);
            } else {
                println!("Available model IDs:");
                for id in models.ids() {
                    println!("{}", id);
                }
            }
            Ok(())
        }
        Err(LlmError::Api { status, body }) => {
            println!("Response: {}", body);
            bail!("model listing failed with HTTP {}", status)
        }
        Err(e) => Err(e.into()),
    }
}
