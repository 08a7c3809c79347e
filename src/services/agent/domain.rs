use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of request categories; each one selects a slice of the action registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Payments,
    Balance,
    Contacts,
    History,
    Nfts,
    Help,
    Conversation,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Payments,
        Domain::Balance,
        Domain::Contacts,
        Domain::History,
        Domain::Nfts,
        Domain::Help,
        Domain::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Payments => "payments",
            Domain::Balance => "balance",
            Domain::Contacts => "contacts",
            Domain::History => "history",
            Domain::Nfts => "nfts",
            Domain::Help => "help",
            Domain::Conversation => "conversation",
        }
    }

    /// Domains that cannot do anything useful without a linked wallet.
    pub fn requires_wallet(&self) -> bool {
        matches!(
            self,
            Domain::Balance | Domain::Payments | Domain::History | Domain::Nfts
        )
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == normalized)
            .ok_or_else(|| format!("unknown domain: {raw}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainDecision {
    pub domain: Domain,
    pub confidence: f64,
    pub reason: String,
    pub requires_wallet: bool,
}

impl DomainDecision {
    /// `requires_wallet` is always derived from the domain, never taken from a model.
    pub fn new(domain: Domain, confidence: f64, reason: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            domain,
            confidence,
            reason: reason.into(),
            requires_wallet: domain.requires_wallet(),
        }
    }
}

// Scan order matters: the first domain with a matching substring wins.
// Past-tense transfer phrases come before payments so "what did i send"
// reads as history. Help sits before balance/history so "clear history" or
// "disconnect wallet" resolve to the account utilities.
const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (
        Domain::History,
        &[
            "what did i send",
            "what have i sent",
            "transfer history",
            "payment history",
            "transaction history",
            "sent history",
        ],
    ),
    (
        Domain::Payments,
        &["send", "transfer", "pay ", "pay\t", "give ", "tip "],
    ),
    (
        Domain::Contacts,
        &["contact", "address book", "save address", "saved addresses"],
    ),
    (
        Domain::Help,
        &[
            "help",
            "what can you do",
            "commands",
            "how do i",
            "reset",
            "start over",
            "clear history",
            "disconnect",
            "unlink",
        ],
    ),
    (
        Domain::Balance,
        &["balance", "how much", "funds", "my wallet", "how many sui"],
    ),
    (
        Domain::History,
        &["history", "transaction", "recent activity", "activity"],
    ),
    (
        Domain::Nfts,
        &["nft", "collectible", "digital art"],
    ),
];

// Internal helper that supports `keyword_domain` operations.
fn contains_any_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Deterministic keyword lookup used to correct or replace the semantic classifier.
pub fn keyword_domain(text: &str) -> Option<Domain> {
    // Pad so keywords with trailing whitespace also match at end of input.
    let normalized = format!("{} ", text.to_lowercase());
    DOMAIN_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any_keyword(&normalized, keywords))
        .map(|(domain, _)| *domain)
}
