//! Common test utilities and fixtures for integration tests
//!
//! Every upstream (Supabase REST, Dify, Slack Web API) is a wiremock server;
//! the application under test is the real router built by `create_app`.

use std::collections::HashMap;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use serde_json::Value;
use threadbridge_common::Config;
use wiremock::MockServer;

/// Test application wired to three mock upstreams
pub struct RelayTestApp {
    pub supabase: MockServer,
    pub dify: MockServer,
    pub slack: MockServer,
    pub config: Config,
}

impl RelayTestApp {
    pub async fn new() -> Result<Self> {
        let supabase = MockServer::start().await;
        let dify = MockServer::start().await;
        let slack = MockServer::start().await;

        let vars: HashMap<&str, String> = HashMap::from([
            ("SUPABASE_URL", supabase.uri()),
            ("SUPABASE_ANON_KEY", "test-anon-key".to_string()),
            ("DIFY_API_KEY", "test-dify-key".to_string()),
            ("DIFY_BASE_URL", dify.uri()),
            ("DIFY_TIMEOUT_SECS", "5".to_string()),
            ("SLACK_BOT_TOKEN", "xoxb-test".to_string()),
            ("SLACK_API_BASE_URL", slack.uri()),
            ("FALLBACK_REPLY", "no answer available".to_string()),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).cloned())?;

        Ok(Self {
            supabase,
            dify,
            slack,
            config,
        })
    }

    /// Fresh router over the configured upstreams
    pub async fn router(&self) -> Result<Router> {
        Ok(threadbridge_app::create_app(&self.config).await?)
    }

    /// Requests received by one mock server, with JSON bodies decoded
    pub async fn received_json(server: &MockServer, path: &str) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}

/// Build a Slack Events API delivery
pub fn slack_request(body: &Value, retry_num: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/slack/events")
        .header("content-type", "application/json");
    if let Some(n) = retry_num {
        builder = builder.header("x-slack-retry-num", n);
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Read a response body as UTF-8
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
