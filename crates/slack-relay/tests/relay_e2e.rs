//! End-to-end tests: the relay runs on a real port with the production
//! Slack and Giphy clients, both pointed at wiremock servers.
//!
//! Run with:
//!   cargo test -p slack-relay --test relay_e2e

use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use serde_json::json;
use slack_relay::{CommandMode, GiphyClient, RelayConfig, SlackClient, serve};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GIF: &str = "https://media.giphy.com/media/abc/giphy.gif";

// ── Helpers ───────────────────────────────────────────────────────────────────

static PORT_COUNTER: AtomicU16 = AtomicU16::new(29400);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

async fn wait_for_port(port: u16, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match tokio::net::TcpStream::connect(format!("127.0.0.1:{port}")).await {
            Ok(_) => return,
            Err(_) => {
                if tokio::time::Instant::now() >= deadline {
                    panic!("Port {port} not ready within {timeout:?}");
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

fn make_config(port: u16, slack: &MockServer, giphy: &MockServer) -> RelayConfig {
    RelayConfig {
        port,
        client_id: "123456789.123456789".to_string(),
        client_secret: "11111a2222b3333c44444e".to_string(),
        bot_token: "xoxb-e2e".to_string(),
        giphy_api_key: "giphy-e2e".to_string(),
        slack_api_base: slack.uri(),
        giphy_api_base: giphy.uri(),
        giphy_tag: "deploy".to_string(),
        giphy_rating: "g".to_string(),
        command_mode: CommandMode::Giphy,
    }
}

/// Start the relay in a background task and return its base URL.
async fn spawn_relay(slack: &MockServer, giphy: &MockServer) -> String {
    let port = next_port();
    let config = make_config(port, slack, giphy);
    let http = reqwest::Client::new();
    let slack_client = SlackClient::new(http.clone(), config.bot_token.clone(), slack.uri());
    let giphy_client = GiphyClient::new(http, config.giphy_api_key.clone(), giphy.uri());

    tokio::spawn(async move {
        serve(config, slack_client, giphy_client)
            .await
            .expect("relay error");
    });

    wait_for_port(port, Duration::from_secs(5)).await;
    format!("http://127.0.0.1:{port}")
}

async fn mount_random_gif(giphy: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/gifs/random"))
        .and(query_param("api_key", "giphy-e2e"))
        .and(query_param("tag", "deploy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "url": "https://giphy.com/gifs/deploy-abc",
                "images": { "original": { "url": GIF } }
            }
        })))
        .mount(giphy)
        .await;
}

async fn wait_for_requests(server: &MockServer, path_suffix: &str, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let seen = server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().ends_with(path_suffix))
            .count();
        if seen >= count {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("expected {count} request(s) to {path_suffix}, saw {seen}");
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn root_greets() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    let base = spawn_relay(&slack, &giphy).await;

    let resp = reqwest::get(format!("{base}/")).await.unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "Hello world!");
}

#[tokio::test]
async fn oauth_code_is_exchanged_with_app_credentials() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    let upstream = r#"{"ok":true,"access_token":"xoxp-installed","team_name":"Acme"}"#;

    Mock::given(method("GET"))
        .and(path("/api/oauth.access"))
        .and(query_param("code", "install-code"))
        .and(query_param("client_id", "123456789.123456789"))
        .and(query_param("client_secret", "11111a2222b3333c44444e"))
        .respond_with(ResponseTemplate::new(200).set_body_string(upstream))
        .expect(1)
        .mount(&slack)
        .await;

    let base = spawn_relay(&slack, &giphy).await;
    let resp = reqwest::get(format!("{base}/oauth?code=install-code"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), upstream);
}

#[tokio::test]
async fn oauth_without_code_is_500() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    let base = spawn_relay(&slack, &giphy).await;

    let resp = reqwest::get(format!("{base}/oauth")).await.unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body.get("Error").is_some());
    assert!(slack.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn slash_command_gets_inline_gif() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    mount_random_gif(&giphy).await;
    let base = spawn_relay(&slack, &giphy).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/command"))
        .form(&[("command", "/deploy"), ("user_name", "alice")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["attachments"][0]["image_url"], GIF);
    assert_eq!(body["parse"], "full");
    assert_eq!(body["response_type"], "in_channel");
    assert_eq!(body["text"], "Deploy!");
    assert_eq!(body["unfurl_links"], true);
    assert_eq!(body["unfurl_media"], true);
}

#[tokio::test]
async fn url_verification_challenge_is_echoed() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    let base = spawn_relay(&slack, &giphy).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/event"))
        .json(&json!({ "type": "url_verification", "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        r#"{"challenge":"3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"}"#
    );
    assert!(giphy.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn deploy_message_event_posts_gif_to_channel() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    mount_random_gif(&giphy).await;

    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-e2e"))
        .and(body_partial_json(json!({
            "channel": "C1",
            "text": "Deploy!",
            "attachments": [{ "image_url": GIF, "fallback": "Deploy!" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "channel": "C1",
            "ts": "1700000000.000200",
            "message": { "text": "Deploy!" }
        })))
        .expect(1)
        .mount(&slack)
        .await;

    let base = spawn_relay(&slack, &giphy).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/event"))
        .json(&json!({
            "type": "event_callback",
            "event": { "type": "message", "text": "please deploy now", "channel": "C1" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    wait_for_requests(&slack, "/chat.postMessage", 1).await;
    wait_for_requests(&giphy, "/v1/gifs/random", 1).await;
}

#[tokio::test]
async fn ordinary_message_event_makes_no_outbound_calls() {
    let (slack, giphy) = (MockServer::start().await, MockServer::start().await);
    let base = spawn_relay(&slack, &giphy).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/event"))
        .json(&json!({ "event": { "text": "hello" } }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(giphy.received_requests().await.unwrap_or_default().is_empty());
    assert!(slack.received_requests().await.unwrap_or_default().is_empty());
}
