use mongodb::{Client, options::ClientOptions};
use anyhow::{Result, Context};
use tracing::{debug, info};

use crate::security::credentials::redact_uri;

pub async fn connect(uri: &str, app_name: &str) -> Result<Client> {
    debug!(uri = %redact_uri(uri), "parsing connection string");

    let mut options = ClientOptions::parse(uri)
        .await
        .context("Failed to parse MongoDB connection URI")?;

    options.app_name = Some(app_name.to_string());

    let client = Client::with_options(options)
        .context("Failed to create MongoDB client with options")?;

    // The driver connects lazily; ping so a bad URI fails here and not mid-sequence.
    client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1}, None)
        .await
        .with_context(|| format!("Failed to ping MongoDB at {}", redact_uri(uri)))?;

    info!(uri = %redact_uri(uri), "connected to MongoDB");
    Ok(client)
}

pub async fn disconnect(client: Client) {
    client.shutdown().await;
    debug!("MongoDB client shut down");
}
