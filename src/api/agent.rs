use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;

use super::{require_agent_secret, AppState};
use crate::constants::{CHAT_HISTORY_TURNS, MAX_MESSAGE_CHARS};
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, ChatRole};
use crate::services::agent::envelope::Envelope;

#[derive(Debug, Deserialize)]
pub struct AgentMessageRequest {
    pub caller_id: String,
    pub text: String,
}

/// POST /api/v1/agent/message
pub async fn handle_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AgentMessageRequest>,
) -> Result<Json<ApiResponse<Envelope>>> {
    require_agent_secret(&headers, &state)?;

    let caller_id = req.caller_id.trim();
    if caller_id.is_empty() {
        return Err(AppError::BadRequest("caller_id is required".to_string()));
    }
    let text = req.text.trim();
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::BadRequest(format!(
            "text exceeds {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    // Wallet comes from our own store, never from the request body.
    let wallet = state.store.get_user_wallet(caller_id).await?;
    let history = state
        .store
        .get_conversation_history(caller_id, CHAT_HISTORY_TURNS)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("Failed to load history for {}: {}", caller_id, err);
            Vec::new()
        });

    let envelope = state
        .pipeline
        .run_with_history(text, caller_id, wallet.as_deref(), &history)
        .await;

    for (role, content) in [(ChatRole::User, text), (ChatRole::Assistant, envelope.text.as_str())] {
        if let Err(err) = state.store.add_to_conversation(caller_id, role, content).await {
            tracing::warn!("Failed to store conversation turn for {}: {}", caller_id, err);
        }
    }

    Ok(Json(ApiResponse::success(envelope)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AGENT_SECRET_HEADER;
    use crate::config::test_config;
    use crate::constants::NO_WALLET_MESSAGE;
    use crate::db::{MemoryStore, WalletStore};
    use crate::integrations::sui::fake::StaticChain;
    use crate::services::agent::llm::DisabledModel;
    use crate::services::agent::AgentPipeline;
    use crate::services::wallet_actions::{build_registry, domain_action_map};
    use std::sync::Arc;
    use std::time::Duration;

    const WALLET: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn state(store: Arc<MemoryStore>, secret: Option<&str>) -> AppState {
        let registry = build_registry(store.clone(), Arc::new(StaticChain::default())).unwrap();
        let pipeline = AgentPipeline::new(
            Arc::new(DisabledModel),
            Arc::new(registry),
            Arc::new(domain_action_map()),
            Duration::from_secs(2),
        )
        .unwrap();
        let mut config = test_config();
        config.agent_api_secret = secret.map(str::to_string);
        AppState {
            pipeline: Arc::new(pipeline),
            store,
            config,
            llm_provider: "disabled",
        }
    }

    fn request(caller_id: &str, text: &str) -> Json<AgentMessageRequest> {
        Json(AgentMessageRequest {
            caller_id: caller_id.to_string(),
            text: text.to_string(),
        })
    }

    #[tokio::test]
    async fn uses_stored_wallet_and_records_history() {
        let store = Arc::new(MemoryStore::new());
        store.link_wallet("u1", WALLET).await;
        let app = state(store.clone(), None);

        let Json(response) = handle_message(State(app), HeaderMap::new(), request("u1", "balance"))
            .await
            .unwrap();
        assert!(response.success);
        assert!(response.data.text.starts_with("💰 Balance: 1.5000 SUI"));

        let history = store.get_conversation_history("u1", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].text, response.data.text);
    }

    #[tokio::test]
    async fn unlinked_caller_is_gated() {
        let app = state(Arc::new(MemoryStore::new()), None);
        let Json(response) = handle_message(State(app), HeaderMap::new(), request("u2", "balance"))
            .await
            .unwrap();
        assert_eq!(response.data.text, NO_WALLET_MESSAGE);
    }

    #[tokio::test]
    async fn secret_is_enforced_when_configured() {
        let app = state(Arc::new(MemoryStore::new()), Some("s3cret"));
        let denied = handle_message(State(app.clone()), HeaderMap::new(), request("u1", "help")).await;
        assert!(matches!(denied, Err(AppError::AuthError(_))));

        let mut headers = HeaderMap::new();
        headers.insert(AGENT_SECRET_HEADER, "s3cret".parse().unwrap());
        assert!(handle_message(State(app), headers, request("u1", "help")).await.is_ok());
    }

    #[tokio::test]
    async fn blank_caller_is_rejected() {
        let app = state(Arc::new(MemoryStore::new()), None);
        let result = handle_message(State(app), HeaderMap::new(), request("  ", "hi")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
