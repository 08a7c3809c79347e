use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TokenBalance {
    pub coin_type: String,
    pub symbol: String,
    pub total_balance: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletBalances {
    pub address: String,
    pub sui_mist: u128,
    pub sui: Decimal,
    pub tokens: Vec<TokenBalance>,
}

impl WalletBalances {
    pub fn sui_formatted(&self) -> String {
        format!("{:.4} SUI", self.sui)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionSummary {
    pub digest: String,
    pub timestamp_ms: Option<u64>,
    pub kind: TransferKind,
    pub status: String,
    pub explorer_url: String,
}

impl TransactionSummary {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub items: Vec<TransactionSummary>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedObject {
    pub object_id: String,
    pub object_type: Option<String>,
    pub name: Option<String>,
}
