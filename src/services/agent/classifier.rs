use std::sync::Arc;

use super::domain::{keyword_domain, Domain, DomainDecision};
use super::llm::{LanguageModel, ModelDecision};
use super::prompts::classification_prompt;
use crate::error::Result;

const KEYWORD_OVERRIDE_CONFIDENCE: f64 = 0.8;
const KEYWORD_FALLBACK_CONFIDENCE: f64 = 0.7;
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Two-tier classifier: semantic model first, keyword table as override and fallback.
pub struct DomainClassifier {
    llm: Arc<dyn LanguageModel>,
}

impl DomainClassifier {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn classify(&self, text: &str, has_wallet: bool) -> DomainDecision {
        let primary = self
            .llm
            .classify(&classification_prompt(has_wallet), text)
            .await;
        let decision = resolve_decision(primary, text);
        tracing::info!(
            "Classified: {} (conf={:.2}): {}",
            decision.domain,
            decision.confidence,
            decision.reason
        );
        decision
    }
}

/// Combines the model answer with the keyword table. Pure so it can be tested directly.
pub fn resolve_decision(primary: Result<ModelDecision>, text: &str) -> DomainDecision {
    match primary {
        Ok(model) => {
            if model.domain == Domain::Conversation {
                // A false "conversation" is the failure mode worth correcting.
                if let Some(domain) = keyword_domain(text) {
                    return DomainDecision::new(domain, KEYWORD_OVERRIDE_CONFIDENCE, "keyword match");
                }
            }
            if let Some(flag) = model.requires_wallet {
                if flag != model.domain.requires_wallet() {
                    tracing::debug!(
                        "Ignoring model requires_wallet={} for domain {}",
                        flag,
                        model.domain
                    );
                }
            }
            DomainDecision::new(model.domain, model.confidence, model.reason)
        }
        Err(err) => {
            tracing::error!("Domain classification failed: {}", err);
            match keyword_domain(text) {
                Some(domain) => {
                    DomainDecision::new(domain, KEYWORD_FALLBACK_CONFIDENCE, "keyword fallback")
                }
                None => DomainDecision::new(
                    Domain::Conversation,
                    DEFAULT_CONFIDENCE,
                    "classification error",
                ),
            }
        }
    }
}
