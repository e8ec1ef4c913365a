//! Recording doubles for [`SlackApi`] and [`MediaSearch`], for exercising the
//! router without talking to Slack or Giphy.
//!
//! Enabled with the `test-support` feature:
//!
//! ```toml
//! [dev-dependencies]
//! slack-relay = { path = "...", features = ["test-support"] }
//! ```

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::error::{RelayError, Result};
use crate::format::OutgoingMessage;
use crate::giphy::MediaItem;
use crate::slack::PostedMessage;
use crate::traits::{MediaSearch, SlackApi};

// ── CallLog ───────────────────────────────────────────────────────────────────

/// Ordered record of outbound calls, shareable between several mocks so a
/// test can check the sequence across services.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

// ── MockSlackApi ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExchange {
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Records every exchange and post. Succeeds unless told to fail.
#[derive(Clone)]
pub struct MockSlackApi {
    exchange_body: Arc<Mutex<String>>,
    exchanges: Arc<Mutex<Vec<CodeExchange>>>,
    posts: Arc<Mutex<Vec<OutgoingMessage>>>,
    fail: Arc<AtomicBool>,
    call_log: CallLog,
}

impl Default for MockSlackApi {
    fn default() -> Self {
        Self {
            exchange_body: Arc::new(Mutex::new(r#"{"ok":true}"#.to_string())),
            exchanges: Arc::default(),
            posts: Arc::default(),
            fail: Arc::default(),
            call_log: CallLog::default(),
        }
    }
}

impl MockSlackApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exchange_body(self, body: impl Into<String>) -> Self {
        *self.exchange_body.lock().unwrap() = body.into();
        self
    }

    pub fn with_call_log(mut self, call_log: CallLog) -> Self {
        self.call_log = call_log;
        self
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn exchanges(&self) -> Vec<CodeExchange> {
        self.exchanges.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<OutgoingMessage> {
        self.posts.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl SlackApi for MockSlackApi {
    async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        self.call_log.push("slack.exchange_code");
        self.exchanges.lock().unwrap().push(CodeExchange {
            code: code.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::MalformedResponse("mock exchange failure".to_string()));
        }
        Ok(self.exchange_body.lock().unwrap().clone())
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage> {
        self.call_log.push("slack.post_message");
        self.posts.lock().unwrap().push(message.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::SlackApi("mock post failure".to_string()));
        }
        Ok(PostedMessage {
            channel: message.channel.clone().unwrap_or_default(),
            ts: "1700000000.000100".to_string(),
            message: serde_json::json!({ "text": message.text }),
        })
    }
}

// ── MockMediaSearch ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    pub tag: String,
    pub rating: String,
    pub format: String,
}

/// Returns a fixed URL for every query, or an error once `set_fail(true)` is called.
#[derive(Clone)]
pub struct MockMediaSearch {
    url: String,
    queries: Arc<Mutex<Vec<MediaQuery>>>,
    fail: Arc<AtomicBool>,
    call_log: CallLog,
}

impl MockMediaSearch {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            queries: Arc::default(),
            fail: Arc::default(),
            call_log: CallLog::default(),
        }
    }

    pub fn with_call_log(mut self, call_log: CallLog) -> Self {
        self.call_log = call_log;
        self
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<MediaQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl MediaSearch for MockMediaSearch {
    async fn random_media(&self, tag: &str, rating: &str, format: &str) -> Result<MediaItem> {
        self.call_log.push("giphy.random_media");
        self.queries.lock().unwrap().push(MediaQuery {
            tag: tag.to_string(),
            rating: rating.to_string(),
            format: format.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::MalformedResponse("mock search failure".to_string()));
        }
        Ok(MediaItem {
            url: self.url.clone(),
        })
    }
}
