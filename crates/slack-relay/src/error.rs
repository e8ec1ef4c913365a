use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failures talking to Slack or Giphy.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("{service} responded with status {status}")]
    UpstreamStatus { service: &'static str, status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Slack API error: {0}")]
    SlackApi(String),
}

// Request URLs carry `client_secret` and `api_key` in the query string.
impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Failures resolving [`RelayConfig`](crate::config::RelayConfig) from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_display() {
        let err = RelayError::UpstreamStatus {
            service: "giphy",
            status: 503,
        };
        assert_eq!(err.to_string(), "giphy responded with status 503");
    }

    #[test]
    fn slack_api_display() {
        let err = RelayError::SlackApi("channel_not_found".to_string());
        assert_eq!(err.to_string(), "Slack API error: channel_not_found");
    }

    #[tokio::test]
    async fn http_error_display_omits_query_credentials() {
        let e = reqwest::Client::new()
            .get("http://127.0.0.1:1/api/oauth.access?client_secret=hunter2")
            .send()
            .await
            .unwrap_err();
        let err = RelayError::from(e);

        assert!(matches!(err, RelayError::Http(_)));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn missing_config_display() {
        assert_eq!(
            ConfigError::Missing("GIPHY_API_KEY").to_string(),
            "GIPHY_API_KEY must be set"
        );
    }
}
