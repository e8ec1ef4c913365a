//! # slack-relay
//!
//! Slack webhook relay that answers slash commands and message events with
//! a random "deploy" GIF from Giphy, and completes the app's OAuth install.
//!
//! ## Routes
//!
//! | Method | Path | Behaviour |
//! |---|---|---|
//! | `GET` | `/` | Static greeting, doubles as a health check |
//! | `GET` | `/oauth` | Exchanges `?code=` with Slack `oauth.access`, forwards the body |
//! | `POST` | `/command` | Slash command: replies in-channel with a GIF (or a fixed text) |
//! | `POST` | `/event` | Events API: echoes `challenge`; messages containing `deploy` get a GIF posted back |
//!
//! Every route sends a response. The `/event` post to Slack runs in a
//! detached task after the 200 has gone out, and its result is only logged.
//!
//! ## Configuration (env vars)
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `PORT` | `4390` | HTTP listening port |
//! | `CLIENT_ID` | — | Slack app client id (required) |
//! | `CLIENT_SECRET` | — | Slack app client secret (required) |
//! | `SLACK_BOT_TOKEN` | — | Bot token for `chat.postMessage` (required) |
//! | `GIPHY_API_KEY` | — | Giphy API key (required) |
//! | `SLACK_API_BASE` | `https://slack.com` | Slack API base URL |
//! | `GIPHY_API_BASE` | `https://api.giphy.com` | Giphy API base URL |
//! | `GIPHY_TAG` | `deploy` | Tag for the random GIF |
//! | `GIPHY_RATING` | `g` | Content rating |
//! | `COMMAND_MODE` | `giphy` | `giphy` or `static` |

pub mod config;
pub mod env;
pub mod error;
pub mod format;
pub mod giphy;
#[cfg(any(test, feature = "test-support"))]
pub mod mocks;
pub mod server;
pub mod signal;
pub mod slack;
pub mod traits;

pub use config::{CommandMode, RelayConfig};
pub use error::{ConfigError, RelayError};
pub use giphy::GiphyClient;
pub use server::{AppState, router, serve};
pub use slack::SlackClient;
pub use traits::{MediaSearch, SlackApi};
