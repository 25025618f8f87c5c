use std::time::Duration;

use banter::api::{ApiError, ChatBackend, HttpBackend, Message, Role, TranscriptEntry};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), Duration::from_secs(5)).expect("client builds")
}

fn two_turns() -> Vec<Message> {
    vec![Message::user("hello"), Message::system("hi there")]
}

// ============================================================================
// Transcript Store
// ============================================================================

#[tokio::test]
async fn test_list_transcripts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat-files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"filename": "2025-0412-091500.json"},
            {"filename": "2025-0411-183000.json"},
        ])))
        .mount(&mock_server)
        .await;

    let entries = backend(&mock_server).list_transcripts().await.unwrap();

    assert_eq!(
        entries,
        vec![
            TranscriptEntry {
                filename: "2025-0412-091500.json".to_string()
            },
            TranscriptEntry {
                filename: "2025-0411-183000.json".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_read_transcript() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/2025-0412-091500.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"role": "user", "content": "hello"},
            {"role": "system", "content": "hi there"},
        ])))
        .mount(&mock_server)
        .await;

    let messages = backend(&mock_server)
        .read_transcript("2025-0412-091500.json")
        .await
        .unwrap();

    assert_eq!(messages, two_turns());
}

#[tokio::test]
async fn test_read_missing_transcript_maps_to_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/nope.json"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Chat file not found"})),
        )
        .mount(&mock_server)
        .await;

    let result = backend(&mock_server).read_transcript("nope.json").await;

    assert!(matches!(result, Err(ApiError::Api { status: 404, .. })));
}

#[tokio::test]
async fn test_create_transcript_posts_full_history_and_returns_identity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/new-chat"))
        .and(body_json(json!({
            "messages": [
                {"role": "user", "content": "hello"},
                {"role": "system", "content": "hi there"},
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"filename": "2025-0412-091500.json"})),
        )
        .mount(&mock_server)
        .await;

    let assigned = backend(&mock_server)
        .create_transcript(&two_turns())
        .await
        .unwrap();

    assert_eq!(assigned, "2025-0412-091500.json");
}

#[tokio::test]
async fn test_replace_transcript_puts_full_history() {
    let mock_server = MockServer::start().await;

    // Full-replace semantics: the whole post-reply history goes up, not a delta.
    Mock::given(method("PUT"))
        .and(path("/chat/2025-0412-091500.json"))
        .and(body_json(json!({
            "messages": [
                {"role": "user", "content": "hello"},
                {"role": "system", "content": "hi there"},
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "updated"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    backend(&mock_server)
        .replace_transcript("2025-0412-091500.json", &two_turns())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_transcript() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/chat/2025-0412-091500.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "deleted"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    backend(&mock_server)
        .delete_transcript("2025-0412-091500.json")
        .await
        .unwrap();
}

// ============================================================================
// Completion Client
// ============================================================================

#[tokio::test]
async fn test_complete_sends_history_and_model() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "hello"}],
            "model": "llama-3.3-70b-versatile",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"role": "system", "content": "hi there"})),
        )
        .mount(&mock_server)
        .await;

    let reply = backend(&mock_server)
        .complete(&[Message::user("hello")], "llama-3.3-70b-versatile")
        .await
        .unwrap();

    assert_eq!(reply.role, Role::System, "replies are always system turns");
    assert_eq!(reply.content, "hi there");
}

#[tokio::test]
async fn test_complete_backend_error_surfaces() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model exploded"))
        .mount(&mock_server)
        .await;

    let result = backend(&mock_server)
        .complete(&[Message::user("hello")], "m")
        .await;

    match result {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("model exploded"));
        }
        other => panic!("expected Api error, got {:?}", other.map(|m| m.content)),
    }
}

#[tokio::test]
async fn test_undecodable_body_maps_to_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat-files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = backend(&mock_server).list_transcripts().await;

    assert!(matches!(result, Err(ApiError::Parse(_))));
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_network_error() {
    // Nothing listens here; the connection is refused immediately.
    let backend = HttpBackend::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

    let result = backend.list_transcripts().await;

    assert!(matches!(result, Err(ApiError::Network(_))));
}

// ============================================================================
// Store round trip (spec §8: store(messages) → read(id) == messages)
// ============================================================================

#[tokio::test]
async fn test_store_round_trip_preserves_history_exactly() {
    let mock_server = MockServer::start().await;
    let history = two_turns();

    Mock::given(method("POST"))
        .and(path("/new-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"filename": "rt.json"})))
        .mount(&mock_server)
        .await;

    // The mock echoes back exactly what a faithful store would return for
    // the created transcript.
    Mock::given(method("GET"))
        .and(path("/chat/rt.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::to_value(&history).unwrap()),
        )
        .mount(&mock_server)
        .await;

    let client = backend(&mock_server);
    let id = client.create_transcript(&history).await.unwrap();
    let read_back = client.read_transcript(&id).await.unwrap();

    assert_eq!(read_back, history);
}
