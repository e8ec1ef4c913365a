//! Slack message payloads built from a GIF URL and display text.

use serde::Serialize;

/// Slack's `parse` mode: link channel names and usernames automatically.
pub const PARSE_FULL: &str = "full";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Body for a slash-command response or a `chat.postMessage` call.
///
/// `channel` is only set for proactive posts; inline slash-command replies
/// go to the channel the command came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub attachments: Vec<Attachment>,
    pub parse: &'static str,
    pub response_type: ResponseType,
    pub text: String,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

/// Text-only reply, used when there is no GIF to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextReply {
    pub response_type: ResponseType,
    pub text: String,
}

impl TextReply {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }
}

/// Build the in-channel message carrying `image_url` as its only attachment.
///
/// When `channel` is given the message is meant for `chat.postMessage`, so
/// the channel is included and the attachment gets `text` as its fallback.
pub fn build_message(image_url: &str, text: &str, channel: Option<&str>) -> OutgoingMessage {
    OutgoingMessage {
        channel: channel.map(str::to_string),
        attachments: vec![Attachment {
            image_url: image_url.to_string(),
            fallback: channel.map(|_| text.to_string()),
        }],
        parse: PARSE_FULL,
        response_type: ResponseType::InChannel,
        text: text.to_string(),
        unfurl_links: true,
        unfurl_media: true,
    }
}
