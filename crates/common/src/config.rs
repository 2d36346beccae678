//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. The four upstream secrets are
//! mandatory; everything else has a default.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Secrets the relay cannot start without, in reporting order.
pub const REQUIRED_VARS: [&str; 4] = [
    "SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "DIFY_API_KEY",
    "SLACK_BOT_TOKEN",
];

/// Reply posted when the AI backend fails or answers nothing.
pub const DEFAULT_FALLBACK_REPLY: &str = "申し訳ありません、回答が得られませんでした。";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DIFY_BASE_URL: &str = "https://api.dify.ai";
const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com";
const DEFAULT_STORE_PROVIDER: &str = "supabase";
const DEFAULT_STORE_TABLE: &str = "conversation_threads";

/// Startup configuration failures. Always fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Clone)]
pub struct Config {
    /// Supabase project URL (conversation store endpoint)
    pub supabase_url: String,
    /// Supabase access key sent as `apikey` and bearer token
    pub supabase_anon_key: String,

    /// Dify application API key
    pub dify_api_key: String,
    pub dify_base_url: String,
    /// Upper bound for a blocking Dify call; `None` waits indefinitely
    pub dify_timeout_secs: Option<u64>,

    /// Slack bot token (`xoxb-...`)
    pub slack_bot_token: String,
    pub slack_api_base_url: String,
    /// When set, only mentions of this user id are stripped from inbound text
    pub slack_bot_user_id: Option<String>,

    /// Conversation store backend (supabase, postgres, memory)
    pub store_provider: String,
    pub store_table: String,
    /// Only consulted by the postgres store
    pub database_url: Option<String>,

    pub fallback_reply: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[REDACTED]")
            .field("dify_api_key", &"[REDACTED]")
            .field("dify_base_url", &self.dify_base_url)
            .field("dify_timeout_secs", &self.dify_timeout_secs)
            .field("slack_bot_token", &"[REDACTED]")
            .field("slack_api_base_url", &self.slack_api_base_url)
            .field("slack_bot_user_id", &self.slack_bot_user_id)
            .field("store_provider", &self.store_provider)
            .field("store_table", &self.store_table)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("fallback_reply", &self.fallback_reply)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values count as absent. Every missing required variable is
    /// reported at once rather than failing on the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required =
            |name: &str| get(name).ok_or_else(|| ConfigError::Missing(vec![name.to_string()]));

        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,

            dify_api_key: required("DIFY_API_KEY")?,
            dify_base_url: get("DIFY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DIFY_BASE_URL.to_string()),
            dify_timeout_secs: parse_optional(get("DIFY_TIMEOUT_SECS"), "DIFY_TIMEOUT_SECS")?,

            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_api_base_url: get("SLACK_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.to_string()),
            slack_bot_user_id: get("SLACK_BOT_USER_ID"),

            store_provider: get("THREAD_STORE_PROVIDER")
                .unwrap_or_else(|| DEFAULT_STORE_PROVIDER.to_string()),
            store_table: get("THREAD_STORE_TABLE")
                .unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string()),
            database_url: get("DATABASE_URL"),

            fallback_reply: get("FALLBACK_REPLY")
                .unwrap_or_else(|| DEFAULT_FALLBACK_REPLY.to_string()),
            port: parse_optional(get("PORT"), "PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }
}

fn parse_optional<T>(raw: Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name: name.to_string(),
            reason: format!("'{}': {}", value, e),
        })
    })
    .transpose()
}
