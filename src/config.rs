use serde::Deserialize;
use std::env;

use crate::constants::{DEFAULT_AGENT_RUN_TIMEOUT_MS, DEFAULT_GEMINI_MODEL};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database (optional; falls back to the in-memory store)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Sui
    pub sui_rpc_url: String,
    pub sui_network: String,

    // LLM (Gemini)
    pub google_ai_api_key: Option<String>,
    pub gemini_model: String,

    // Agent
    pub agent_run_timeout_ms: u64,
    pub agent_api_secret: Option<String>,

    // CORS
    pub cors_allowed_origins: String,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: non_empty_var("DATABASE_URL"),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            sui_rpc_url: env::var("SUI_RPC_URL")
                .unwrap_or_else(|_| "https://fullnode.testnet.sui.io:443".to_string()),
            sui_network: env::var("SUI_NETWORK").unwrap_or_else(|_| "testnet".to_string()),

            google_ai_api_key: non_empty_var("GOOGLE_AI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),

            agent_run_timeout_ms: env::var("AGENT_RUN_TIMEOUT_MS")
                .unwrap_or_else(|_| DEFAULT_AGENT_RUN_TIMEOUT_MS.to_string())
                .parse()?,
            agent_api_secret: non_empty_var("AGENT_API_SECRET"),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sui_rpc_url.trim().is_empty() {
            anyhow::bail!("SUI_RPC_URL is empty");
        }
        if !self.sui_rpc_url.starts_with("http://") && !self.sui_rpc_url.starts_with("https://") {
            anyhow::bail!("SUI_RPC_URL must be an http(s) URL");
        }
        if self.agent_run_timeout_ms == 0 {
            anyhow::bail!("AGENT_RUN_TIMEOUT_MS must be > 0");
        }
        if self.database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be > 0");
        }

        if self.database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; contacts and history live in memory only");
        }
        if self.google_ai_api_key.is_none() {
            tracing::warn!("GOOGLE_AI_API_KEY not set; agent runs on keyword and pattern fallbacks");
        }
        if self.agent_api_secret.is_none() && !self.is_development() {
            tracing::warn!("AGENT_API_SECRET not set; agent endpoint is unauthenticated");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "testnet"
    }

    pub fn has_llm_provider(&self) -> bool {
        self.google_ai_api_key.is_some()
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3001,
        environment: "development".to_string(),
        database_url: None,
        database_max_connections: 1,
        sui_rpc_url: "http://localhost:9000".to_string(),
        sui_network: "testnet".to_string(),
        google_ai_api_key: None,
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        agent_run_timeout_ms: 2_000,
        agent_api_secret: None,
        cors_allowed_origins: "*".to_string(),
    }
}
