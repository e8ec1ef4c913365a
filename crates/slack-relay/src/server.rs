use crate::config::{CommandMode, RelayConfig};
use crate::error::Result as RelayResult;
use crate::format::{TextReply, build_message};
use crate::signal::shutdown_signal;
use crate::slack::PostedMessage;
use crate::traits::{MediaSearch, SlackApi};
use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, instrument, warn};

pub const GREETING: &str = "Hello world!";
pub const DEPLOY_TEXT: &str = "Deploy!";
pub const STATIC_COMMAND_REPLY: &str = "Deploy command received!";
/// Case-sensitive substring that makes a message event trigger a GIF post.
pub const TRIGGER_WORD: &str = "deploy";

const MISSING_CODE: &str = "Looks like we're not getting code.";
const MEDIA_UNAVAILABLE: &str = "Couldn't find a deploy GIF right now, try again in a bit.";
const MEDIA_FORMAT: &str = "json";

#[derive(Clone)]
pub struct AppState<S, M> {
    pub slack: S,
    pub media: M,
    pub client_id: String,
    pub client_secret: String,
    pub media_tag: String,
    pub media_rating: String,
    pub command_mode: CommandMode,
}

impl<S: SlackApi, M: MediaSearch> AppState<S, M> {
    pub fn new(config: &RelayConfig, slack: S, media: M) -> Self {
        Self {
            slack,
            media,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            media_tag: config.giphy_tag.clone(),
            media_rating: config.giphy_rating.clone(),
            command_mode: config.command_mode,
        }
    }
}

/// Build the relay's route table.
pub fn router<S: SlackApi, M: MediaSearch>(state: AppState<S, M>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/oauth", get(handle_oauth::<S, M>))
        .route("/command", post(handle_command::<S, M>))
        .route("/event", post(handle_event::<S, M>))
        .with_state(state)
}

/// Starts the relay HTTP server and runs until Ctrl+C or SIGTERM.
pub async fn serve<S: SlackApi, M: MediaSearch>(
    config: RelayConfig,
    slack: S,
    media: M,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(AppState::new(&config, slack, media));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, mode = ?config.command_mode, "Slack relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Slack relay stopped");
    Ok(())
}

async fn handle_root() -> &'static str {
    GREETING
}

#[derive(Debug, Deserialize)]
struct OAuthParams {
    code: Option<String>,
}

async fn handle_oauth<S: SlackApi, M: MediaSearch>(
    State(state): State<AppState<S, M>>,
    query: Result<Query<OAuthParams>, QueryRejection>,
) -> Response {
    let code = match query {
        Ok(Query(params)) => params.code.filter(|c| !c.is_empty()),
        Err(e) => {
            warn!(error = %e, "Unparseable OAuth callback query");
            None
        }
    };
    let Some(code) = code else {
        warn!("OAuth callback without a code parameter");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "Error": MISSING_CODE })),
        )
            .into_response();
    };

    match state
        .slack
        .exchange_code(&code, &state.client_id, &state.client_secret)
        .await
    {
        Ok(body) => {
            info!("OAuth code exchanged");
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            error!(error = %e, "OAuth code exchange failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "Error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// The fields of a slash-command POST we log. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct SlashCommand {
    command: Option<String>,
    user_name: Option<String>,
    channel_id: Option<String>,
}

async fn handle_command<S: SlackApi, M: MediaSearch>(
    State(state): State<AppState<S, M>>,
    form: Result<Form<SlashCommand>, FormRejection>,
) -> Response {
    let command = form.map(|Form(c)| c).unwrap_or_default();
    info!(
        command = command.command.as_deref().unwrap_or_default(),
        user = command.user_name.as_deref().unwrap_or_default(),
        channel = command.channel_id.as_deref().unwrap_or_default(),
        "Slash command received"
    );

    match state.command_mode {
        CommandMode::Static => STATIC_COMMAND_REPLY.into_response(),
        CommandMode::Giphy => match state
            .media
            .random_media(&state.media_tag, &state.media_rating, MEDIA_FORMAT)
            .await
        {
            Ok(item) => {
                debug!(url = %item.url, "Replying with GIF");
                Json(build_message(&item.url, DEPLOY_TEXT, None)).into_response()
            }
            Err(e) => {
                error!(error = %e, "GIF lookup failed");
                Json(TextReply::ephemeral(MEDIA_UNAVAILABLE)).into_response()
            }
        },
    }
}

/// True when `text` should trigger a GIF post.
pub fn mentions_trigger(text: &str) -> bool {
    text.contains(TRIGGER_WORD)
}

#[instrument(
    name = "slack.event",
    skip_all,
    fields(channel = tracing::field::Empty)
)]
async fn handle_event<S: SlackApi, M: MediaSearch>(
    State(state): State<AppState<S, M>>,
    body: Bytes,
) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Failed to parse event body as JSON");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    // URL verification handshake, sent once when the endpoint is registered.
    // Echoed back unchanged, whatever its JSON type.
    if let Some(challenge) = payload.get("challenge").filter(|c| !c.is_null()) {
        info!("Answering URL verification challenge");
        return Json(json!({ "challenge": challenge })).into_response();
    }

    // Other event types (e.g. `channel_created`) carry `channel` as an object.
    let event = &payload["event"];
    if event.is_null() {
        debug!("Event payload has neither challenge nor event");
        return StatusCode::OK.into_response();
    }

    if !event["text"].as_str().is_some_and(mentions_trigger) {
        return StatusCode::OK.into_response();
    }

    let Some(channel) = event["channel"].as_str() else {
        warn!("Triggering message has no channel id, nothing to post to");
        return StatusCode::OK.into_response();
    };

    tracing::Span::current().record("channel", channel);
    spawn_media_post(state, channel.to_string());
    StatusCode::OK.into_response()
}

/// Fetch a GIF and post it to `channel` in the background.
///
/// The HTTP response has already been sent by the time this finishes, so the
/// outcome only ends up in the logs.
fn spawn_media_post<S: SlackApi, M: MediaSearch>(
    state: AppState<S, M>,
    channel: String,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            match post_media(&state, &channel).await {
                Ok(posted) => {
                    info!(channel = %posted.channel, ts = %posted.ts, "Posted deploy GIF");
                }
                Err(e) => {
                    error!(channel = %channel, error = %e, "Failed to post deploy GIF");
                }
            }
        }
        .in_current_span(),
    )
}

async fn post_media<S: SlackApi, M: MediaSearch>(
    state: &AppState<S, M>,
    channel: &str,
) -> RelayResult<PostedMessage> {
    let item = state
        .media
        .random_media(&state.media_tag, &state.media_rating, MEDIA_FORMAT)
        .await?;
    let message = build_message(&item.url, DEPLOY_TEXT, Some(channel));
    state.slack.post_message(&message).await
}
