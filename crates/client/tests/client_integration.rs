//! End-to-end tests for the Colloquy client
//!
//! Runs full chat-session scenarios against a mock HTTP server: session
//! expiry mid-conversation, concurrent expiry storms, and file-driven
//! configuration.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use colloquy_client::{ClientConfig, ColloquyClient};

/// Matches requests that carry a session cookie.
struct HasSessionCookie;

impl wiremock::Match for HasSessionCookie {
    fn matches(&self, request: &wiremock::Request) -> bool {
        request
            .headers
            .get("cookie")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|cookies| cookies.contains("session="))
    }
}

/// Matches requests without a session cookie.
struct MissingSessionCookie;

impl wiremock::Match for MissingSessionCookie {
    fn matches(&self, request: &wiremock::Request) -> bool {
        !HasSessionCookie.matches(request)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
struct MessageList {
    messages: Vec<String>,
}

/// Validates recovery from a session that expires mid-conversation.
///
/// A chat view polls the same endpoint repeatedly. The first poll lands
/// while the session is valid; the session then expires server-side, so
/// the next poll gets a 401. The client must refresh once, replay, and
/// hand back the new messages as if nothing happened.
///
/// # Test Steps
/// 1. Serve the first poll normally (single-use mock)
/// 2. Answer the second poll with 401 while no fresh cookie is present
/// 3. Mint a session cookie on the refresh endpoint
/// 4. Serve the replayed poll once the fresh cookie is attached
/// 5. Verify both polls returned their payloads and the slot is idle
#[tokio::test]
async fn test_chat_session_recovers_mid_conversation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rooms/42/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MessageList { messages: vec!["hello".to_string()] }),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rooms/42/messages"))
        .and(MissingSessionCookie)
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "session=fresh; Path=/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rooms/42/messages"))
        .and(HasSessionCookie)
        .respond_with(ResponseTemplate::new(200).set_body_json(MessageList {
            messages: vec!["hello".to_string(), "welcome back".to_string()],
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        ColloquyClient::new(ClientConfig::new(mock_server.uri())).expect("client should build");

    let first: MessageList =
        client.get("/rooms/42/messages").await.expect("first poll should succeed");
    assert_eq!(first.messages, vec!["hello".to_string()]);

    let second: MessageList =
        client.get("/rooms/42/messages").await.expect("second poll should recover");
    assert_eq!(second.messages, vec!["hello".to_string(), "welcome back".to_string()]);

    assert!(!client.is_refreshing());
}

/// Validates that an expiry storm across different endpoints produces a
/// single refresh call on the wire.
///
/// Five views poll five different rooms when the session dies. Whatever
/// the interleaving, the refresh endpoint must be called exactly once;
/// the mock's `expect(1)` enforces that when the server shuts down.
///
/// # Test Steps
/// 1. Answer all cookie-less polls with 401
/// 2. Delay the refresh response so every failure joins the same cycle
/// 3. Fire five polls concurrently
/// 4. Verify every poll recovers with the replayed payload
/// 5. Mock verification asserts exactly one refresh call
#[tokio::test]
async fn test_expiry_storm_shares_one_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/rooms/\d+/messages$"))
        .and(MissingSessionCookie)
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=fresh; Path=/")
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/rooms/\d+/messages$"))
        .and(HasSessionCookie)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MessageList { messages: vec!["shared".to_string()] }),
        )
        .mount(&mock_server)
        .await;

    let client =
        ColloquyClient::new(ClientConfig::new(mock_server.uri())).expect("client should build");

    let (one, two, three, four, five) = tokio::join!(
        client.get::<MessageList>("/rooms/1/messages"),
        client.get::<MessageList>("/rooms/2/messages"),
        client.get::<MessageList>("/rooms/3/messages"),
        client.get::<MessageList>("/rooms/4/messages"),
        client.get::<MessageList>("/rooms/5/messages"),
    );

    for result in [one, two, three, four, five] {
        let list = result.expect("poll should recover");
        assert_eq!(list.messages, vec!["shared".to_string()]);
    }

    assert!(!client.is_refreshing());
}

/// Validates the config-file path end to end, including a non-default
/// refresh endpoint.
///
/// # Test Steps
/// 1. Write a TOML config pointing at the mock server with a custom
///    refresh path
/// 2. Load it with `ClientConfig::load_from_file` and build a client
/// 3. Expire the session and verify recovery goes through the custom
///    refresh endpoint
#[tokio::test]
async fn test_client_built_from_config_file_uses_custom_refresh_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(MissingSessionCookie)
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/renew"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "session=fresh; Path=/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(HasSessionCookie)
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "rk"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let toml_content = format!(
        r#"
base_url = "{}"
refresh_path = "/session/renew"
"#,
        mock_server.uri()
    );

    let mut temp_file = NamedTempFile::new().expect("temp file should be created");
    temp_file.write_all(toml_content.as_bytes()).expect("config should be written");
    let config_path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &config_path).expect("config should be copied");

    let config = ClientConfig::load_from_file(Some(config_path.clone()))
        .expect("config should load from file");
    let client = ColloquyClient::new(config).expect("client should build");

    let profile: serde_json::Value =
        client.get("/profile").await.expect("request should recover");
    assert_eq!(profile["name"], "rk");

    std::fs::remove_file(config_path).ok();
}
