use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::names;
use crate::constants::{HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT, PARAM_WALLET_ADDRESS};
use crate::error::{AppError, Result};
use crate::integrations::sui::ChainReader;
use crate::models::chain::TransferKind;
use crate::models::TransactionSummary;
use crate::services::agent::registry::{ActionArgs, ActionOutput, ActionSpec, ParamKind, WalletAction};

pub struct GetTransactionHistory {
    spec: ActionSpec,
    chain: Arc<dyn ChainReader>,
}

impl GetTransactionHistory {
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::GET_TRANSACTION_HISTORY,
                "Show recent transactions. Use for 'history', 'transactions', 'recent activity'.",
            )
            .with_wallet()
            .optional(
                "limit",
                ParamKind::Integer,
                "Number of transactions (default 5, max 20)",
            ),
            chain,
        }
    }
}

/// Reads `limit`, falling back to `default` and clamping to `1..=max`.
pub fn clamp_limit(args: &ActionArgs, default: u64, max: u64) -> u64 {
    args.get_u64("limit").unwrap_or(default).clamp(1, max)
}

#[async_trait::async_trait]
impl WalletAction for GetTransactionHistory {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let address = args
            .get_str(PARAM_WALLET_ADDRESS)
            .ok_or_else(|| AppError::BadRequest("wallet_address is required".to_string()))?;
        let limit = clamp_limit(args, HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT);

        let page = self.chain.get_transaction_history(address, limit).await?;
        if page.items.is_empty() {
            return Ok(ActionOutput::Text("📭 No transactions found yet.".to_string()));
        }

        let mut text = String::from("🧾 Recent Transactions:\n");
        for tx in &page.items {
            text.push('\n');
            text.push_str(&render_line(tx));
        }
        if page.has_next_page {
            text.push_str("\n\nShowing the latest only. Ask for more with e.g. \"last 20 transactions\".");
        }
        Ok(ActionOutput::Text(text))
    }
}

fn render_line(tx: &TransactionSummary) -> String {
    let icon = match tx.kind {
        TransferKind::Sent => "📤",
        TransferKind::Received => "📥",
    };
    let status = if tx.succeeded() { "✅" } else { "❌" };
    let digest: String = tx.digest.chars().take(8).collect();
    let when = tx
        .timestamp_ms
        .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single())
        .map(|ts| format!(" {}", ts.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!("{} {}{} {}... {}", icon, status, when, digest, tx.explorer_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::sui::fake::StaticChain;

    fn tx(digest: &str, kind: TransferKind, status: &str) -> TransactionSummary {
        TransactionSummary {
            digest: digest.to_string(),
            timestamp_ms: Some(1_700_000_000_000),
            kind,
            status: status.to_string(),
            explorer_url: format!("https://suiscan.xyz/testnet/tx/{digest}"),
        }
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(&ActionArgs::new(), 5, 20), 5);
        assert_eq!(clamp_limit(&ActionArgs::new().with("limit", 0), 5, 20), 1);
        assert_eq!(clamp_limit(&ActionArgs::new().with("limit", 500), 5, 20), 20);
        assert_eq!(clamp_limit(&ActionArgs::new().with("limit", "7"), 5, 20), 7);
    }

    #[tokio::test]
    async fn renders_transactions_with_icons() {
        let chain = StaticChain {
            transactions: vec![
                tx("AAAAAAAAAAAA", TransferKind::Sent, "success"),
                tx("BBBBBBBBBBBB", TransferKind::Received, "failure"),
            ],
            ..StaticChain::default()
        };
        let action = GetTransactionHistory::new(Arc::new(chain));
        let args = ActionArgs::new().with(PARAM_WALLET_ADDRESS, "0xabc");
        match action.invoke(&args).await.unwrap() {
            ActionOutput::Text(text) => {
                assert!(text.contains("📤 ✅ 2023-11-14 22:13 AAAAAAAA..."));
                assert!(text.contains("📥 ❌"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_history_message() {
        let action = GetTransactionHistory::new(Arc::new(StaticChain::default()));
        let args = ActionArgs::new().with(PARAM_WALLET_ADDRESS, "0xabc");
        assert_eq!(
            action.invoke(&args).await.unwrap(),
            ActionOutput::Text("📭 No transactions found yet.".to_string())
        );
    }
}
