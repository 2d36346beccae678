//! Slack event relay integration tests

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{body_text, slack_request, RelayTestApp};

fn mention(ts: &str, thread_ts: Option<&str>) -> Value {
    let mut event = json!({
        "type": "app_mention",
        "text": "<@UBOT> hello",
        "user": "U1",
        "channel": "C1",
        "ts": ts
    });
    if let Some(root) = thread_ts {
        event["thread_ts"] = json!(root);
    }
    json!({"type": "event_callback", "event": event})
}

async fn mount_slack_ok(app: &RelayTestApp) {
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&app.slack)
        .await;
}

async fn mount_lookup(app: &RelayTestApp, thread_key: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/conversation_threads"))
        .and(query_param("slack_thread_ts", format!("eq.{}", thread_key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&app.supabase)
        .await;
}

#[tokio::test]
async fn test_first_message_creates_mapping_and_replies() {
    let app = RelayTestApp::new().await.unwrap();
    mount_lookup(&app, "100.1", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/conversation_threads"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "hi", "conversation_id": "conv-9"})),
        )
        .expect(1)
        .mount(&app.dify)
        .await;
    mount_slack_ok(&app).await;

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&mention("100.1", None), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let dify_calls = RelayTestApp::received_json(&app.dify, "/v1/chat-messages").await;
    assert_eq!(
        dify_calls,
        vec![json!({
            "inputs": {},
            "query": "hello",
            "conversation_id": null,
            "user": "U1",
            "response_mode": "blocking"
        })]
    );

    let upserts = RelayTestApp::received_json(&app.supabase, "/rest/v1/conversation_threads").await;
    assert_eq!(
        upserts,
        vec![json!({"slack_thread_ts": "100.1", "conversation_id": "conv-9", "user_id": "U1"})]
    );

    let posts = RelayTestApp::received_json(&app.slack, "/api/chat.postMessage").await;
    assert_eq!(
        posts,
        vec![json!({"channel": "C1", "text": "hi", "thread_ts": "100.1"})]
    );
}

#[tokio::test]
async fn test_reply_in_thread_reuses_conversation() {
    let app = RelayTestApp::new().await.unwrap();
    mount_lookup(&app, "100.1", json!([{"conversation_id": "conv-9"}])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/conversation_threads"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(body_partial_json(json!({"conversation_id": "conv-9"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "still here", "conversation_id": "conv-9"})),
        )
        .expect(1)
        .mount(&app.dify)
        .await;
    mount_slack_ok(&app).await;

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&mention("100.7", Some("100.1")), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let posts = RelayTestApp::received_json(&app.slack, "/api/chat.postMessage").await;
    assert_eq!(posts[0]["thread_ts"], "100.1");
    assert_eq!(posts[0]["text"], "still here");
}

#[tokio::test]
async fn test_backend_failure_posts_fallback() {
    let app = RelayTestApp::new().await.unwrap();
    mount_lookup(&app, "100.1", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "internal_server_error",
            "message": "Internal Server Error"
        })))
        .mount(&app.dify)
        .await;
    mount_slack_ok(&app).await;

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&mention("100.1", None), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let posts = RelayTestApp::received_json(&app.slack, "/api/chat.postMessage").await;
    assert_eq!(posts[0]["text"], "no answer available");

    let upserts = RelayTestApp::received_json(&app.supabase, "/rest/v1/conversation_threads").await;
    assert!(upserts.is_empty());
}

#[tokio::test]
async fn test_store_outage_does_not_block_reply() {
    let app = RelayTestApp::new().await.unwrap();
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&app.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "hi", "conversation_id": "conv-1"})),
        )
        .mount(&app.dify)
        .await;
    mount_slack_ok(&app).await;

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&mention("100.1", None), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let posts = RelayTestApp::received_json(&app.slack, "/api/chat.postMessage").await;
    assert_eq!(posts[0]["text"], "hi");
}

#[tokio::test]
async fn test_slack_rejection_still_acknowledged() {
    let app = RelayTestApp::new().await.unwrap();
    mount_lookup(&app, "100.1", json!([{"conversation_id": "conv-9"}])).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "hi"})))
        .mount(&app.dify)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": false, "error": "channel_not_found"})),
        )
        .expect(1)
        .mount(&app.slack)
        .await;

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&mention("100.1", None), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_retry_makes_no_upstream_calls() {
    let app = RelayTestApp::new().await.unwrap();

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&mention("100.1", None), Some("2")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Retry ignored");

    for server in [&app.supabase, &app.dify, &app.slack] {
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}

#[tokio::test]
async fn test_url_verification_handshake() {
    let app = RelayTestApp::new().await.unwrap();
    let body = json!({
        "token": "Jhj5dZrVaK7ZwHHjRyZWjbDl",
        "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P",
        "type": "url_verification"
    });

    let resp = app
        .router()
        .await
        .unwrap()
        .oneshot(slack_request(&body, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_text(resp).await,
        "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"
    );
}
