pub mod classifier;
pub mod conversation;
pub mod domain;
pub mod envelope;
pub mod executor;
pub mod fallback;
pub mod gate;
pub mod injector;
pub mod llm;
pub mod prompts;
pub mod registry;
pub mod selector;

use std::sync::Arc;
use std::time::Duration;

use classifier::DomainClassifier;
use conversation::ConversationResponder;
use domain::{Domain, DomainDecision};
use envelope::{Envelope, Reply};
use executor::ActionExecutor;
use injector::{Injection, RequestContext};
use llm::LanguageModel;
use registry::{ActionArgs, ActionRegistry, DomainActionMap};
use selector::{Selection, ToolSelector};

use crate::constants::{NO_WALLET_MESSAGE, TIMEOUT_MESSAGE};
use crate::error::Result;
use crate::models::ChatTurn;

/// Request-scoped accumulator threaded through the stages.
#[derive(Debug)]
pub struct PipelineState {
    pub text: String,
    pub context: RequestContext,
    pub decision: Option<DomainDecision>,
    pub action: Option<String>,
    pub args: Option<ActionArgs>,
    pub envelope: Option<Envelope>,
}

impl PipelineState {
    fn new(text: &str, context: RequestContext) -> Self {
        Self {
            text: text.to_string(),
            context,
            decision: None,
            action: None,
            args: None,
            envelope: None,
        }
    }

    fn finish(mut self, envelope: Envelope) -> Envelope {
        let envelope = self.envelope.insert(envelope).clone();
        tracing::debug!(
            "Pipeline finished: domain={:?} action={:?} args={:?} needs_signing={}",
            self.decision.as_ref().map(|decision| decision.domain),
            self.action,
            self.args.as_ref().map(|args| args.keys().collect::<Vec<_>>()),
            envelope.needs_signing
        );
        envelope
    }
}

/// Routes one message through classify → gate → select → inject → execute,
/// or to the conversation responder when no action applies.
pub struct AgentPipeline {
    classifier: DomainClassifier,
    selector: ToolSelector,
    responder: ConversationResponder,
    registry: Arc<ActionRegistry>,
    run_timeout: Duration,
}

impl AgentPipeline {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        registry: Arc<ActionRegistry>,
        domains: Arc<DomainActionMap>,
        run_timeout: Duration,
    ) -> Result<Self> {
        domains.validate(&registry)?;
        tracing::info!(
            "Agent pipeline ready: {} actions, provider={}",
            registry.names().len(),
            llm.provider_name()
        );
        tracing::debug!("Registered actions: {:?}", registry.names());
        Ok(Self {
            classifier: DomainClassifier::new(llm.clone()),
            selector: ToolSelector::new(llm.clone(), registry.clone(), domains),
            responder: ConversationResponder::new(llm),
            registry,
            run_timeout,
        })
    }

    pub async fn run(&self, text: &str, caller_id: &str, wallet_address: Option<&str>) -> Envelope {
        self.run_with_history(text, caller_id, wallet_address, &[])
            .await
    }

    pub async fn run_with_history(
        &self,
        text: &str,
        caller_id: &str,
        wallet_address: Option<&str>,
        history: &[ChatTurn],
    ) -> Envelope {
        let context = RequestContext::new(caller_id, wallet_address);
        match tokio::time::timeout(self.run_timeout, self.route(text, context, history)).await {
            Ok(envelope) => envelope,
            Err(_) => {
                tracing::warn!(
                    "Agent run timed out after {}ms for caller {}",
                    self.run_timeout.as_millis(),
                    caller_id
                );
                Envelope::text(TIMEOUT_MESSAGE)
            }
        }
    }

    async fn route(&self, text: &str, context: RequestContext, history: &[ChatTurn]) -> Envelope {
        let mut state = PipelineState::new(text, context);

        let decision = self
            .classifier
            .classify(&state.text, state.context.has_wallet())
            .await;
        let domain = decision.domain;
        let gate = gate::check_wallet(&decision, state.context.wallet_address.as_deref());
        state.decision = Some(decision);
        if let Some(envelope) = gate {
            return state.finish(envelope);
        }

        let call = match self.selector.select(domain, &state.text).await {
            Selection::Chosen { call, .. } => call,
            Selection::NeedsInfo { prompt, .. } => return state.finish(Envelope::text(prompt)),
            Selection::NoAction => {
                let reply = self
                    .responder
                    .respond(&state.text, state.context.has_wallet(), history)
                    .await;
                return state.finish(Envelope::text(reply));
            }
            Selection::Unresolved => {
                return state.finish(Envelope::text(unresolved_message(domain)));
            }
        };

        let Some(action) = self.registry.get(&call.name) else {
            tracing::error!("Selected action {} is not registered", call.name);
            let envelope = Envelope::text(format!("❌ Unknown action: {}", call.name));
            return state.finish(envelope);
        };
        state.action = Some(call.name.clone());

        let args = match injector::inject(action.spec(), call.args, &state.context) {
            Injection::Ready(args) => args,
            Injection::MissingWallet => {
                tracing::info!("Action {} blocked: no linked wallet", call.name);
                return state.finish(Envelope::text(NO_WALLET_MESSAGE));
            }
        };

        let reply: Reply = ActionExecutor::execute(action.as_ref(), &args).await;
        state.args = Some(args);
        let envelope = Envelope::from_reply(reply, Some(action.spec().name));
        state.finish(envelope)
    }
}

fn unresolved_message(domain: Domain) -> String {
    format!(
        "I understood you want help with {}, but I couldn't determine the specific action. Please try again.",
        domain
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHAT_FALLBACK_MESSAGE;
    use crate::services::agent::registry::tests::EchoAction;
    use crate::db::{MemoryStore, WalletStore};
    use crate::integrations::sui::fake::StaticChain;
    use crate::services::agent::llm::fake::ScriptedModel;
    use crate::services::agent::llm::DisabledModel;
    use crate::services::wallet_actions::{build_registry, domain_action_map, names};
    use serde_json::json;

    const ADDR_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const ADDR_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const ADDR_C: &str = "0xcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

    async fn pipeline_with(model: Arc<dyn LanguageModel>) -> (AgentPipeline, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .add_contact("user-1", "alice", ADDR_B)
            .await
            .unwrap();
        let registry = build_registry(store.clone(), Arc::new(StaticChain::default())).unwrap();
        let pipeline = AgentPipeline::new(
            model,
            Arc::new(registry),
            Arc::new(domain_action_map()),
            Duration::from_secs(5),
        )
        .unwrap();
        (pipeline, store)
    }

    #[tokio::test]
    async fn balance_without_wallet_is_gated() {
        let (pipeline, _) = pipeline_with(Arc::new(DisabledModel)).await;
        let envelope = pipeline.run("what's my balance?", "user-1", None).await;
        assert_eq!(envelope.text, NO_WALLET_MESSAGE);
        assert!(envelope.action.is_none());
        assert!(!envelope.needs_signing);
    }

    #[tokio::test]
    async fn send_to_contact_prepares_signing() {
        let (pipeline, _) = pipeline_with(Arc::new(DisabledModel)).await;
        let envelope = pipeline
            .run("send 1 SUI to alice", "user-1", Some(ADDR_A))
            .await;
        assert_eq!(envelope.action.as_deref(), Some(names::SEND_SUI));
        assert!(envelope.needs_signing);
        let tx = envelope.tx_data.expect("signing payload");
        assert_eq!(tx["recipient"], ADDR_B);
        assert_eq!(tx["amount"], 1.0);
        assert_eq!(tx["sender"], ADDR_A);
    }

    #[tokio::test]
    async fn greeting_goes_to_conversation() {
        let model = ScriptedModel::classifying(Domain::Conversation).with_chat("Hey! How can I help?");
        let (pipeline, _) = pipeline_with(Arc::new(model)).await;
        let envelope = pipeline.run("hello", "user-1", None).await;
        assert_eq!(envelope.text, "Hey! How can I help?");
        assert!(envelope.action.is_none());
    }

    #[tokio::test]
    async fn greeting_without_model_still_replies() {
        let (pipeline, _) = pipeline_with(Arc::new(DisabledModel)).await;
        let envelope = pipeline.run("hello", "user-1", None).await;
        assert_eq!(envelope.text, CHAT_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn add_contact_from_text() {
        let (pipeline, store) = pipeline_with(Arc::new(DisabledModel)).await;
        let text = format!("add contact bob {ADDR_C}");
        let envelope = pipeline.run(&text, "user-1", None).await;
        assert_eq!(envelope.action.as_deref(), Some(names::ADD_CONTACT));
        let resolved = store.resolve_contact("user-1", "bob").await.unwrap();
        assert_eq!(resolved.as_deref(), Some(ADDR_C));
    }

    #[tokio::test]
    async fn payment_without_amount_prompts() {
        let model = ScriptedModel::classifying(Domain::Payments);
        let (pipeline, _) = pipeline_with(Arc::new(model)).await;
        let envelope = pipeline
            .run("send some sui to alice", "user-1", Some(ADDR_A))
            .await;
        assert_eq!(envelope.text, fallback::PROMPT_MISSING_AMOUNT);
        assert!(envelope.action.is_none());
        assert!(!envelope.needs_signing);
    }

    #[tokio::test]
    async fn model_cannot_spoof_sender_wallet() {
        let model = ScriptedModel::classifying(Domain::Payments).with_tool(
            names::SEND_SUI,
            json!({ "recipient": "alice", "amount": 2, "wallet_address": "0xEVIL" }),
        );
        let (pipeline, _) = pipeline_with(Arc::new(model)).await;
        let envelope = pipeline.run("send 2 to alice", "user-1", Some(ADDR_A)).await;
        let tx = envelope.tx_data.expect("signing payload");
        assert_eq!(tx["sender"], ADDR_A);
    }

    #[tokio::test]
    async fn keyword_override_routes_to_action() {
        let model = ScriptedModel::classifying(Domain::Conversation);
        let (pipeline, _) = pipeline_with(Arc::new(model)).await;
        let envelope = pipeline.run("what's my balance?", "user-1", Some(ADDR_A)).await;
        assert_eq!(envelope.action.as_deref(), Some(names::GET_BALANCE));
        assert!(envelope.text.contains("SUI"));
    }

    #[tokio::test]
    async fn every_run_has_text() {
        let (pipeline, _) = pipeline_with(Arc::new(DisabledModel)).await;
        for text in ["", "???", "send", "nfts", "history", "help", "remove contact"] {
            for wallet in [None, Some(ADDR_A)] {
                let envelope = pipeline.run(text, "user-1", wallet).await;
                assert!(!envelope.text.trim().is_empty(), "empty reply for {:?}", text);
            }
        }
    }

    #[tokio::test]
    async fn stalled_model_hits_run_timeout() {
        let model = ScriptedModel::classifying(Domain::Balance).stalling(Duration::from_secs(30));
        let store = Arc::new(MemoryStore::new());
        let registry = build_registry(store, Arc::new(StaticChain::default())).unwrap();
        let pipeline = AgentPipeline::new(
            Arc::new(model),
            Arc::new(registry),
            Arc::new(domain_action_map()),
            Duration::from_millis(50),
        )
        .unwrap();

        let envelope = pipeline.run("balance", "user-1", Some(ADDR_A)).await;
        assert_eq!(envelope.text, TIMEOUT_MESSAGE);
        assert!(envelope.action.is_none());
    }

    #[tokio::test]
    async fn selection_missing_from_registry_is_reported() {
        let model: Arc<dyn LanguageModel> = Arc::new(DisabledModel);
        let mut selectable = ActionRegistry::new();
        selectable
            .register(Arc::new(EchoAction::new(names::GET_HELP)))
            .unwrap();
        let domains = Arc::new(DomainActionMap::new().with(Domain::Help, &[names::GET_HELP]));
        let pipeline = AgentPipeline {
            classifier: DomainClassifier::new(model.clone()),
            selector: ToolSelector::new(model.clone(), Arc::new(selectable), domains),
            responder: ConversationResponder::new(model),
            registry: Arc::new(ActionRegistry::new()),
            run_timeout: Duration::from_secs(5),
        };

        let envelope = pipeline.run("help", "user-1", None).await;
        assert_eq!(envelope.text, format!("❌ Unknown action: {}", names::GET_HELP));
        assert!(envelope.action.is_none());
    }
}
