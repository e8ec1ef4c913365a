use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::format::OutgoingMessage;
use crate::traits::SlackApi;

/// Slack's acknowledgement of a `chat.postMessage` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
    pub message: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
    #[serde(default)]
    message: serde_json::Value,
}

/// Minimal Slack Web API client over plain HTTP.
#[derive(Clone)]
pub struct SlackClient {
    http: HttpClient,
    bot_token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(
        http: HttpClient,
        bot_token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            bot_token: bot_token.into(),
            api_base: api_base.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/api/{method}", self.api_base.trim_end_matches('/'))
    }
}

impl SlackApi for SlackClient {
    async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        let response = self
            .http
            .get(self.endpoint("oauth.access"))
            .query(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                service: "slack oauth.access",
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage> {
        let response = self
            .http
            .post(self.endpoint("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                service: "slack chat.postMessage",
                status: status.as_u16(),
            });
        }

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(RelayError::SlackApi(
                body.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        match (body.channel, body.ts) {
            (Some(channel), Some(ts)) => Ok(PostedMessage {
                channel,
                ts,
                message: body.message,
            }),
            _ => Err(RelayError::MalformedResponse(
                "chat.postMessage response is missing channel or ts".to_string(),
            )),
        }
    }
}
