use std::sync::Arc;

use super::llm::LanguageModel;
use super::prompts::conversation_prompt;
use crate::constants::CHAT_FALLBACK_MESSAGE;
use crate::models::ChatTurn;

/// Free-form replies for the conversation domain. Never fails.
pub struct ConversationResponder {
    llm: Arc<dyn LanguageModel>,
}

impl ConversationResponder {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn respond(&self, text: &str, has_wallet: bool, history: &[ChatTurn]) -> String {
        match self
            .llm
            .generate(&conversation_prompt(has_wallet), history, text)
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Conversation model returned an empty reply");
                CHAT_FALLBACK_MESSAGE.to_string()
            }
            Err(err) => {
                tracing::error!("Conversation reply failed: {}", err);
                CHAT_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}
