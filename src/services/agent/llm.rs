use serde::Deserialize;
use serde_json::{Map, Value};

use super::domain::Domain;
use super::registry::ActionSpec;
use crate::error::{AppError, Result};
use crate::models::ChatTurn;

/// Raw structured answer of the semantic classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDecision {
    pub domain: Domain,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub requires_wallet: Option<bool>,
}

/// One action chosen by constrained selection, with untrusted arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub args: Map<String, Value>,
}

/// The three model capabilities the pipeline consumes.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Structured domain classification.
    async fn classify(&self, system_prompt: &str, text: &str) -> Result<ModelDecision>;

    /// Forced function-calling restricted to `tools`. `Ok(None)` means the model picked nothing.
    async fn select_tool(
        &self,
        system_prompt: &str,
        text: &str,
        tools: &[&ActionSpec],
    ) -> Result<Option<ToolCall>>;

    /// Free text generation.
    async fn generate(&self, system_prompt: &str, history: &[ChatTurn], text: &str)
        -> Result<String>;
}

/// Stand-in when no provider key is configured; every call fails so the
/// deterministic paths take over.
pub struct DisabledModel;

#[async_trait::async_trait]
impl LanguageModel for DisabledModel {
    fn provider_name(&self) -> &'static str {
        "disabled"
    }

    async fn classify(&self, _system_prompt: &str, _text: &str) -> Result<ModelDecision> {
        Err(AppError::ExternalAPI("LLM provider not configured".into()))
    }

    async fn select_tool(
        &self,
        _system_prompt: &str,
        _text: &str,
        _tools: &[&ActionSpec],
    ) -> Result<Option<ToolCall>> {
        Err(AppError::ExternalAPI("LLM provider not configured".into()))
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        _history: &[ChatTurn],
        _text: &str,
    ) -> Result<String> {
        Err(AppError::ExternalAPI("LLM provider not configured".into()))
    }
}
