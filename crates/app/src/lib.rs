//! Threadbridge application composition root
//!
//! Builds the upstream clients from configuration and mounts the relay
//! routes next to the infrastructure routes.

use std::sync::Arc;

use axum::{routing::get, Router};
use threadbridge_common::{Config, Error, Result};
use threadbridge_llm::{DifyClient, DifyConfig};
use threadbridge_relay::{EventRouter, MentionFilter, RelayState};
use threadbridge_slack::{SlackClient, SlackConfig};
use threadbridge_threads::{StoreConfig, ThreadStoreFactory};

/// Build the event router with production clients
pub async fn build_event_router(config: &Config) -> Result<EventRouter> {
    let store = ThreadStoreFactory::create(StoreConfig::from(config))
        .await
        .map_err(|e| Error::Setup(e.to_string()))?;

    let backend =
        DifyClient::new(DifyConfig::from(config)).map_err(|e| Error::Setup(e.to_string()))?;

    let notifier = SlackClient::new(SlackConfig::from(config));

    let mentions = MentionFilter::new(config.slack_bot_user_id.as_deref())
        .map_err(|e| Error::Setup(format!("Invalid bot user id: {}", e)))?;

    if config.dify_timeout_secs.is_none() {
        tracing::warn!("DIFY_TIMEOUT_SECS not set; AI backend calls are not time-bounded");
    }

    Ok(EventRouter::new(
        Arc::from(store),
        Arc::new(backend),
        Arc::new(notifier),
        mentions,
        config.fallback_reply.clone(),
    ))
}

/// Create the main application router with all routes
pub async fn create_app(config: &Config) -> Result<Router> {
    let router = build_event_router(config).await?;
    Ok(app_router(RelayState::new(router)))
}

/// Compose infrastructure routes with the relay routes
pub fn app_router(state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(|| async { "Threadbridge relay v0.1.0" }))
        .merge(threadbridge_relay::routes().with_state(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn config(provider: &str) -> Config {
        Config::from_lookup(|k| match k {
            "SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Some("anon".to_string()),
            "DIFY_API_KEY" => Some("app-key".to_string()),
            "SLACK_BOT_TOKEN" => Some("xoxb".to_string()),
            "THREAD_STORE_PROVIDER" => Some(provider.to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_app(&config("memory")).await.unwrap();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_challenge_through_full_app() {
        let app = create_app(&config("supabase")).await.unwrap();
        let req = Request::post("/slack/events")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"type": "url_verification", "challenge": "xyz"}).to_string(),
            ))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"xyz");
    }

    #[tokio::test]
    async fn test_unknown_store_provider_fails_setup() {
        let err = match create_app(&config("dynamo")).await {
            Err(e) => e,
            Ok(_) => panic!("Expected setup error"),
        };
        assert!(matches!(err, Error::Setup(ref m) if m.contains("dynamo")));
    }
}
