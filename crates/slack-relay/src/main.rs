use slack_relay::env::SystemEnv;
use slack_relay::{GiphyClient, RelayConfig, SlackClient, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RelayConfig::from_env(&SystemEnv)?;
    tracing::debug!(?config, "Configuration loaded");

    let http = reqwest::Client::new();
    let slack = SlackClient::new(
        http.clone(),
        config.bot_token.clone(),
        config.slack_api_base.clone(),
    );
    let media = GiphyClient::new(
        http,
        config.giphy_api_key.clone(),
        config.giphy_api_base.clone(),
    );

    serve(config, slack, media).await
}
