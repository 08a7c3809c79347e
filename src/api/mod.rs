// src/api/mod.rs

pub mod agent;
pub mod health;

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::Config;
use crate::db::WalletStore;
use crate::error::{AppError, Result};
use crate::services::agent::AgentPipeline;

pub const AGENT_SECRET_HEADER: &str = "x-agent-secret";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AgentPipeline>,
    pub store: Arc<dyn WalletStore>,
    pub config: Config,
    pub llm_provider: &'static str,
}

/// Checks the shared secret when one is configured; open otherwise.
pub fn require_agent_secret(headers: &HeaderMap, state: &AppState) -> Result<()> {
    let Some(expected) = state.config.agent_api_secret.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(AGENT_SECRET_HEADER)
        .ok_or_else(|| AppError::AuthError(format!("Missing {} header", AGENT_SECRET_HEADER)))?
        .to_str()
        .map_err(|_| AppError::AuthError(format!("Invalid {} header", AGENT_SECRET_HEADER)))?;
    if provided.trim() != expected {
        return Err(AppError::AuthError("Invalid agent secret".to_string()));
    }
    Ok(())
}
