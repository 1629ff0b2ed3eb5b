use color_eyre::eyre::Result;
use dotenv::dotenv;
use padelup_api::config::ApiConfig;
use padelup_client::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    let client_config = ClientConfig::from_env()?;

    // Connect to the booking service
    let sessions = padelup_client::session_store(&client_config);
    let api = padelup_client::connect(client_config)?;

    // Start API server
    padelup_api::start_server(config, api, sessions).await?;

    Ok(())
}
