use std::sync::Arc;

use serde_json::Map;

use super::domain::Domain;
use super::fallback::{self, FallbackOutcome};
use super::llm::{LanguageModel, ToolCall};
use super::prompts::TOOL_SELECTION_PROMPT;
use super::registry::{ActionRegistry, ActionSpec, DomainActionMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Chosen {
        call: ToolCall,
        source: SelectionSource,
    },
    /// A required field is missing from the text; `prompt` asks the user for it.
    NeedsInfo {
        field: &'static str,
        prompt: &'static str,
    },
    /// The domain exposes no actions.
    NoAction,
    Unresolved,
}

/// Picks one action for a classified domain: constrained model call first,
/// deterministic extraction second.
pub struct ToolSelector {
    llm: Arc<dyn LanguageModel>,
    registry: Arc<ActionRegistry>,
    domains: Arc<DomainActionMap>,
}

impl ToolSelector {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        registry: Arc<ActionRegistry>,
        domains: Arc<DomainActionMap>,
    ) -> Self {
        Self {
            llm,
            registry,
            domains,
        }
    }

    pub async fn select(&self, domain: Domain, text: &str) -> Selection {
        let allowed = self.domains.actions_for(domain);
        if allowed.is_empty() {
            return Selection::NoAction;
        }

        let tools: Vec<&ActionSpec> = allowed
            .iter()
            .filter_map(|name| self.registry.get(name))
            .map(|action| action.spec())
            .collect();

        match self.llm.select_tool(TOOL_SELECTION_PROMPT, text, &tools).await {
            Ok(Some(call)) if self.domains.allows(domain, &call.name) => {
                tracing::info!("Tool selected by model: {}", call.name);
                let call = self.keep_declared_args(call);
                return Selection::Chosen {
                    call,
                    source: SelectionSource::Model,
                };
            }
            Ok(Some(call)) => {
                tracing::warn!(
                    "Model picked `{}` outside domain {}; using fallback",
                    call.name,
                    domain
                );
            }
            Ok(None) => {
                tracing::warn!("Model selected no tool for domain {}; using fallback", domain);
            }
            Err(err) => {
                tracing::error!("Tool selection failed: {}", err);
            }
        }

        match fallback::select(domain, text, allowed) {
            FallbackOutcome::Selected(call) => {
                tracing::info!("Tool selected by fallback: {}", call.name);
                Selection::Chosen {
                    call,
                    source: SelectionSource::Fallback,
                }
            }
            FallbackOutcome::MissingField { field, prompt } => {
                tracing::info!("Fallback needs `{}` for domain {}", field, domain);
                Selection::NeedsInfo { field, prompt }
            }
            FallbackOutcome::Unresolved => Selection::Unresolved,
        }
    }

    // Model arguments are untrusted: anything the action doesn't declare is dropped.
    fn keep_declared_args(&self, call: ToolCall) -> ToolCall {
        let Some(action) = self.registry.get(&call.name) else {
            return call;
        };
        let spec = action.spec();
        let args: Map<_, _> = call
            .args
            .into_iter()
            .filter(|(key, _)| spec.declares(key))
            .collect();
        ToolCall {
            name: call.name,
            args,
        }
    }
}
