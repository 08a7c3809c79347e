use super::domain::DomainDecision;
use super::envelope::Envelope;
use crate::constants::NO_WALLET_MESSAGE;

/// Stops wallet-bound domains early when the caller has no linked wallet.
pub fn check_wallet(decision: &DomainDecision, wallet_address: Option<&str>) -> Option<Envelope> {
    let has_wallet = wallet_address.is_some_and(|address| !address.trim().is_empty());
    if decision.requires_wallet && decision.domain.requires_wallet() && !has_wallet {
        tracing::info!("Wallet gate: domain {} needs a linked wallet", decision.domain);
        return Some(Envelope::text(NO_WALLET_MESSAGE));
    }
    None
}
