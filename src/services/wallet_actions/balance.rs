use std::sync::Arc;

use super::names;
use crate::constants::{BALANCE_MAX_TOKENS_SHOWN, PARAM_WALLET_ADDRESS};
use crate::error::{AppError, Result};
use crate::integrations::sui::ChainReader;
use crate::models::WalletBalances;
use crate::services::agent::registry::{ActionArgs, ActionOutput, ActionSpec, WalletAction};

pub struct GetBalance {
    spec: ActionSpec,
    chain: Arc<dyn ChainReader>,
}

impl GetBalance {
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::GET_BALANCE,
                "Get the SUI and token balances of the linked wallet. Use for 'balance', 'how much SUI', 'my funds'.",
            )
            .with_wallet(),
            chain,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for GetBalance {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let address = args
            .get_str(PARAM_WALLET_ADDRESS)
            .ok_or_else(|| AppError::BadRequest("wallet_address is required".to_string()))?;
        let balances = self.chain.get_all_balances(address).await?;
        Ok(ActionOutput::Text(render_balances(&balances)))
    }
}

fn render_balances(balances: &WalletBalances) -> String {
    let mut text = format!("💰 Balance: {}", balances.sui_formatted());
    if !balances.tokens.is_empty() {
        text.push_str("\n\nOther tokens:");
        for token in balances.tokens.iter().take(BALANCE_MAX_TOKENS_SHOWN) {
            text.push_str(&format!("\n• {}: {}", token.symbol, token.total_balance));
        }
    }
    text
}
