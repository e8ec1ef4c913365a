use reqwest::Client as HttpClient;

use crate::error::{RelayError, Result};
use crate::traits::MediaSearch;

/// A single GIF returned by the random endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub url: String,
}

/// Giphy REST client for `GET /v1/gifs/random`.
#[derive(Clone)]
pub struct GiphyClient {
    http: HttpClient,
    api_key: String,
    api_base: String,
}

impl GiphyClient {
    pub fn new(http: HttpClient, api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_base: api_base.into(),
        }
    }
}

impl MediaSearch for GiphyClient {
    async fn random_media(&self, tag: &str, rating: &str, format: &str) -> Result<MediaItem> {
        let url = format!("{}/v1/gifs/random", self.api_base.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("tag", tag),
                ("rating", rating),
                ("fmt", format),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                service: "giphy",
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        media_from_response(&body)
    }
}

/// Pull the GIF URL out of a random-endpoint payload.
///
/// Prefers the direct image (`data.images.original.url`) so Slack can render
/// it as an attachment, falling back to the page URL in `data.url`. Giphy
/// answers `"data": []` when nothing matches the tag.
fn media_from_response(body: &serde_json::Value) -> Result<MediaItem> {
    let data = &body["data"];
    data["images"]["original"]["url"]
        .as_str()
        .or_else(|| data["url"].as_str())
        .filter(|url| !url.is_empty())
        .map(|url| MediaItem {
            url: url.to_string(),
        })
        .ok_or_else(|| RelayError::MalformedResponse("giphy payload has no data.url".to_string()))
}
