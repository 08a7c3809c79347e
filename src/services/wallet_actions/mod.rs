//! Concrete wallet actions and their domain wiring.

pub mod balance;
pub mod contacts;
pub mod help;
pub mod history;
pub mod nfts;
pub mod payments;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::WalletStore;
use crate::error::Result;
use crate::integrations::sui::ChainReader;
use crate::services::agent::domain::Domain;
use crate::services::agent::registry::{ActionRegistry, DomainActionMap};

pub mod names {
    pub const GET_BALANCE: &str = "get_balance";
    pub const SEND_SUI: &str = "send_sui";
    pub const LIST_CONTACTS: &str = "list_contacts";
    pub const ADD_CONTACT: &str = "add_contact";
    pub const DELETE_CONTACT: &str = "delete_contact";
    pub const GET_TRANSACTION_HISTORY: &str = "get_transaction_history";
    pub const GET_NFTS: &str = "get_nfts";
    pub const GET_HELP: &str = "get_help";
    pub const RESET_CONVERSATION: &str = "reset_conversation";
    pub const DISCONNECT_WALLET: &str = "disconnect_wallet";
    pub const FULL_RESET: &str = "full_reset";

    pub const ALL: [&str; 11] = [
        GET_BALANCE,
        SEND_SUI,
        LIST_CONTACTS,
        ADD_CONTACT,
        DELETE_CONTACT,
        GET_TRANSACTION_HISTORY,
        GET_NFTS,
        GET_HELP,
        RESET_CONVERSATION,
        DISCONNECT_WALLET,
        FULL_RESET,
    ];
}

static SUI_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40,64}$").expect("valid sui address regex"));

pub fn is_valid_sui_address(address: &str) -> bool {
    SUI_ADDRESS_RE.is_match(address)
}

/// `0x12345678...abcdef` form used in replies.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn build_registry(
    store: Arc<dyn WalletStore>,
    chain: Arc<dyn ChainReader>,
) -> Result<ActionRegistry> {
    let mut registry = ActionRegistry::new();
    registry.register(Arc::new(balance::GetBalance::new(chain.clone())))?;
    registry.register(Arc::new(payments::SendSui::new(store.clone())))?;
    registry.register(Arc::new(contacts::ListContacts::new(store.clone())))?;
    registry.register(Arc::new(contacts::AddContact::new(store.clone())))?;
    registry.register(Arc::new(contacts::DeleteContact::new(store.clone())))?;
    registry.register(Arc::new(history::GetTransactionHistory::new(chain.clone())))?;
    registry.register(Arc::new(nfts::GetNfts::new(chain)))?;
    registry.register(Arc::new(help::GetHelp::new()))?;
    registry.register(Arc::new(help::ResetConversation::new(store.clone())))?;
    registry.register(Arc::new(help::DisconnectWallet::new(store.clone())))?;
    registry.register(Arc::new(help::FullReset::new(store)))?;
    Ok(registry)
}

pub fn domain_action_map() -> DomainActionMap {
    DomainActionMap::new()
        .with(Domain::Balance, &[names::GET_BALANCE])
        .with(Domain::Payments, &[names::SEND_SUI])
        .with(
            Domain::Contacts,
            &[names::LIST_CONTACTS, names::ADD_CONTACT, names::DELETE_CONTACT],
        )
        .with(Domain::History, &[names::GET_TRANSACTION_HISTORY])
        .with(Domain::Nfts, &[names::GET_NFTS])
        .with(
            Domain::Help,
            &[
                names::GET_HELP,
                names::RESET_CONVERSATION,
                names::DISCONNECT_WALLET,
                names::FULL_RESET,
            ],
        )
        .with(Domain::Conversation, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::integrations::sui::fake::StaticChain;

    #[test]
    fn registry_and_domain_map_agree() {
        let registry =
            build_registry(Arc::new(MemoryStore::new()), Arc::new(StaticChain::default())).unwrap();
        assert_eq!(registry.names().len(), names::ALL.len());
        assert!(domain_action_map().validate(&registry).is_ok());
        assert!(domain_action_map().actions_for(Domain::Conversation).is_empty());
    }

    #[test]
    fn wallet_bound_actions_match_wallet_domains() {
        let registry =
            build_registry(Arc::new(MemoryStore::new()), Arc::new(StaticChain::default())).unwrap();
        let map = domain_action_map();
        for domain in Domain::ALL {
            for name in map.actions_for(domain) {
                let spec = registry.get(name).unwrap().spec();
                assert_eq!(spec.needs_wallet(), domain.requires_wallet(), "{}", name);
            }
        }
    }

    #[test]
    fn address_validation_and_shortening() {
        let address = format!("0x{}", "ab".repeat(32));
        assert!(is_valid_sui_address(&address));
        assert!(!is_valid_sui_address("0x1234"));
        assert!(!is_valid_sui_address(&format!("{} ", address)));
        assert_eq!(short_address(&address), "0xabababab...ababab");
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
