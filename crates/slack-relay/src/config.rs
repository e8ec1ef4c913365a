use std::fmt;

use crate::env::ReadEnv;
use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 4390;
const DEFAULT_SLACK_API_BASE: &str = "https://slack.com";
const DEFAULT_GIPHY_API_BASE: &str = "https://api.giphy.com";
const DEFAULT_GIPHY_TAG: &str = "deploy";
const DEFAULT_GIPHY_RATING: &str = "g";

/// What `POST /command` answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandMode {
    /// Fetch a random GIF and reply in-channel with it.
    #[default]
    Giphy,
    /// Reply with a fixed confirmation string, no outbound call.
    Static,
}

impl CommandMode {
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => Self::Static,
            _ => Self::Giphy,
        }
    }
}

/// Configuration for the relay server.
///
/// Resolved from environment variables:
/// - `PORT`: HTTP listening port (default: 4390)
/// - `CLIENT_ID`: Slack app client id (required)
/// - `CLIENT_SECRET`: Slack app client secret (required; `CLIENT_SERCRET` is accepted for older deployments)
/// - `SLACK_BOT_TOKEN`: bot token used for `chat.postMessage` (required)
/// - `GIPHY_API_KEY`: Giphy API key (required)
/// - `SLACK_API_BASE`: Slack API base URL (default: `https://slack.com`)
/// - `GIPHY_API_BASE`: Giphy API base URL (default: `https://api.giphy.com`)
/// - `GIPHY_TAG`: tag passed to the random endpoint (default: `deploy`)
/// - `GIPHY_RATING`: content rating (default: `g`)
/// - `COMMAND_MODE`: `giphy` or `static` (default: `giphy`)
#[derive(Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub client_id: String,
    pub client_secret: String,
    pub bot_token: String,
    pub giphy_api_key: String,
    pub slack_api_base: String,
    pub giphy_api_base: String,
    pub giphy_tag: String,
    pub giphy_rating: String,
    pub command_mode: CommandMode,
}

impl RelayConfig {
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        let client_id = required(env, "CLIENT_ID")?;
        let client_secret = required(env, "CLIENT_SECRET")
            .or_else(|_| required(env, "CLIENT_SERCRET"))
            .map_err(|_| ConfigError::Missing("CLIENT_SECRET"))?;
        let bot_token = required(env, "SLACK_BOT_TOKEN")?;
        let giphy_api_key = required(env, "GIPHY_API_KEY")?;

        Ok(Self {
            port: env
                .var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            client_id,
            client_secret,
            bot_token,
            giphy_api_key,
            slack_api_base: optional(env, "SLACK_API_BASE", DEFAULT_SLACK_API_BASE),
            giphy_api_base: optional(env, "GIPHY_API_BASE", DEFAULT_GIPHY_API_BASE),
            giphy_tag: optional(env, "GIPHY_TAG", DEFAULT_GIPHY_TAG),
            giphy_rating: optional(env, "GIPHY_RATING", DEFAULT_GIPHY_RATING),
            command_mode: env
                .var("COMMAND_MODE")
                .map(|v| CommandMode::from_env_value(&v))
                .unwrap_or_default(),
        })
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("giphy_api_key", &"<redacted>")
            .field("slack_api_base", &self.slack_api_base)
            .field("giphy_api_base", &self.giphy_api_base)
            .field("giphy_tag", &self.giphy_tag)
            .field("giphy_rating", &self.giphy_rating)
            .field("command_mode", &self.command_mode)
            .finish()
    }
}

fn required<E: ReadEnv>(env: &E, key: &'static str) -> Result<String, ConfigError> {
    env.var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn optional<E: ReadEnv>(env: &E, key: &str, default: &str) -> String {
    env.var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
