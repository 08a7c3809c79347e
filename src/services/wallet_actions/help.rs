use std::sync::Arc;

use super::names;
use crate::constants::PARAM_USER_ID;
use crate::db::WalletStore;
use crate::error::{AppError, Result};
use crate::services::agent::registry::{ActionArgs, ActionOutput, ActionSpec, WalletAction};

pub const HELP_TEXT: &str = r#"💡 Here's what I can do:

🔗 Connect: Use /start to link your Sui wallet
💰 Balance: "what's my balance?" or /balance
✉️ Send: "send 1 SUI to alice" or /send
👥 Contacts: "show contacts" or /contacts
🧾 History: "show my transactions" or /history
🖼️ NFTs: "show my NFTs"

🔄 Reset Options:
• "reset" - Clear conversation history
• "disconnect wallet" - Unlink your wallet
• "full reset" - Remove wallet, history & contacts

Just chat naturally - I understand!"#;

fn caller(args: &ActionArgs) -> Result<&str> {
    args.get_str(PARAM_USER_ID)
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))
}

pub struct GetHelp {
    spec: ActionSpec,
}

impl GetHelp {
    pub fn new() -> Self {
        Self {
            spec: ActionSpec::new(
                names::GET_HELP,
                "Show what the assistant can do. Use for 'help', 'commands', 'what can you do'.",
            ),
        }
    }
}

impl Default for GetHelp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WalletAction for GetHelp {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, _args: &ActionArgs) -> Result<ActionOutput> {
        Ok(ActionOutput::Text(HELP_TEXT.to_string()))
    }
}

pub struct ResetConversation {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl ResetConversation {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::RESET_CONVERSATION,
                "Clear the conversation history. Use for 'reset', 'start over', 'clear history'.",
            )
            .with_caller(),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for ResetConversation {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let cleared = self.store.clear_conversation_history(caller(args)?).await?;
        tracing::debug!("Cleared {} conversation turns", cleared);
        Ok(ActionOutput::Text(
            "🔄 Conversation reset! How can I help you?".to_string(),
        ))
    }
}

pub struct DisconnectWallet {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl DisconnectWallet {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::DISCONNECT_WALLET,
                "Unlink the wallet from this account. Use for 'disconnect wallet', 'unlink wallet'.",
            )
            .with_caller(),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for DisconnectWallet {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        if self.store.unlink_wallet(caller(args)?).await? {
            Ok(ActionOutput::Text(
                "🔓 Wallet disconnected! Use /start to link a new wallet.".to_string(),
            ))
        } else {
            Ok(ActionOutput::Text(
                "❌ No wallet was linked to disconnect.".to_string(),
            ))
        }
    }
}

pub struct FullReset {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl FullReset {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::FULL_RESET,
                "Remove linked wallet, history and contacts. Use for 'full reset', 'delete everything'.",
            )
            .with_caller(),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for FullReset {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let user_id = caller(args)?;
        let summary = self.store.full_account_reset(user_id).await?;
        tracing::info!("Full reset for user {}: {:?}", user_id, summary);
        Ok(ActionOutput::Text(format!(
            "🗑️ Account fully reset!\n\n\
             • Wallets removed: {}\n\
             • Conversations cleared: {}\n\
             • Contacts removed: {}\n\n\
             Use /start to set up your account again.",
            summary.wallets, summary.conversations, summary.contacts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ChatRole;

    fn user() -> ActionArgs {
        ActionArgs::new().with(PARAM_USER_ID, "u1")
    }

    fn text(output: ActionOutput) -> String {
        match output {
            ActionOutput::Text(text) => text,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn help_is_static() {
        let output = GetHelp::new().invoke(&ActionArgs::new()).await.unwrap();
        assert_eq!(text(output), HELP_TEXT);
    }

    #[tokio::test]
    async fn disconnect_reports_missing_wallet() {
        let store = Arc::new(MemoryStore::new());
        store.link_wallet("u1", "0xabc").await;
        let action = DisconnectWallet::new(store.clone());

        assert!(text(action.invoke(&user()).await.unwrap()).starts_with("🔓"));
        assert!(text(action.invoke(&user()).await.unwrap()).starts_with("❌"));
        assert!(store.get_user_wallet("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_reset_reports_counts() {
        let store = Arc::new(MemoryStore::new());
        store.link_wallet("u1", "0xabc").await;
        store.add_contact("u1", "bob", "0xbob").await.unwrap();
        store
            .add_to_conversation("u1", ChatRole::User, "hi")
            .await
            .unwrap();

        let reply = text(FullReset::new(store.clone()).invoke(&user()).await.unwrap());
        assert!(reply.contains("Wallets removed: 1"));
        assert!(reply.contains("Conversations cleared: 1"));
        assert!(reply.contains("Contacts removed: 1"));
        assert!(store.get_contacts("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_conversation_clears_history() {
        let store = Arc::new(MemoryStore::new());
        store
            .add_to_conversation("u1", ChatRole::User, "hi")
            .await
            .unwrap();
        ResetConversation::new(store.clone())
            .invoke(&user())
            .await
            .unwrap();
        assert!(store
            .get_conversation_history("u1", 10)
            .await
            .unwrap()
            .is_empty());
    }
}
