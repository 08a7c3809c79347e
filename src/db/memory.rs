use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use super::WalletStore;
use crate::{
    error::Result,
    models::{ChatRole, ChatTurn, Contact, ResetSummary},
};

#[derive(Default)]
struct UserRecord {
    wallets: Vec<String>,
    // keyed by lowercased alias
    contacts: BTreeMap<String, Contact>,
    history: Vec<ChatTurn>,
}

/// Process-local store used when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn link_wallet(&self, user_id: &str, address: &str) {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_default();
        record.wallets.retain(|existing| existing != address);
        record.wallets.push(address.to_string());
    }
}

#[async_trait::async_trait]
impl WalletStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_user_wallet(&self, user_id: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|record| record.wallets.last().cloned()))
    }

    async fn unlink_wallet(&self, user_id: &str) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let had_wallet = !record.wallets.is_empty();
        record.wallets.clear();
        Ok(had_wallet)
    }

    async fn get_contacts(&self, user_id: &str) -> Result<Vec<Contact>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|record| record.contacts.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_contact(&self, user_id: &str, alias: &str, address: &str) -> Result<()> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_default();
        record.contacts.insert(
            alias.to_lowercase(),
            Contact {
                alias: alias.to_string(),
                address: address.to_string(),
            },
        );
        Ok(())
    }

    async fn remove_contact(&self, user_id: &str, alias: &str) -> Result<bool> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(user_id)
            .map(|record| record.contacts.remove(&alias.to_lowercase()).is_some())
            .unwrap_or(false))
    }

    async fn resolve_contact(&self, user_id: &str, alias: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|record| record.contacts.get(&alias.to_lowercase()))
            .map(|contact| contact.address.clone()))
    }

    async fn get_conversation_history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatTurn>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|record| {
                let start = record.history.len().saturating_sub(limit);
                record.history[start..].to_vec()
            })
            .unwrap_or_default())
    }

    async fn add_to_conversation(
        &self,
        user_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .history
            .push(ChatTurn {
                role,
                text: content.to_string(),
            });
        Ok(())
    }

    async fn clear_conversation_history(&self, user_id: &str) -> Result<u64> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(user_id)
            .map(|record| std::mem::take(&mut record.history).len() as u64)
            .unwrap_or(0))
    }

    async fn full_account_reset(&self, user_id: &str) -> Result<ResetSummary> {
        let mut users = self.users.write().await;
        let summary = users
            .remove(user_id)
            .map(|record| ResetSummary {
                wallets: record.wallets.len() as u64,
                conversations: record.history.len() as u64,
                contacts: record.contacts.len() as u64,
            })
            .unwrap_or_default();
        Ok(summary)
    }
}
