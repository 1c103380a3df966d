//! Contactbook Server - HTTP REST API for contact management
//!
//! This binary loads configuration from the environment (and an optional
//! `.env` file), connects to MongoDB, and serves the contact API.

use contactbook::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment variables from a local .env file, if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    contactbook::start_server(config).await?;

    Ok(())
}
