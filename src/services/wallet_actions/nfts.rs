use std::sync::Arc;

use super::history::clamp_limit;
use super::{names, short_address};
use crate::constants::{NFT_DEFAULT_LIMIT, NFT_MAX_LIMIT, PARAM_WALLET_ADDRESS};
use crate::error::{AppError, Result};
use crate::integrations::sui::ChainReader;
use crate::services::agent::registry::{ActionArgs, ActionOutput, ActionSpec, ParamKind, WalletAction};

pub struct GetNfts {
    spec: ActionSpec,
    chain: Arc<dyn ChainReader>,
}

impl GetNfts {
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::GET_NFTS,
                "List NFTs owned by the wallet. Use for 'NFTs', 'collectibles', 'digital art'.",
            )
            .with_wallet()
            .optional("limit", ParamKind::Integer, "Number of NFTs (default 10, max 50)"),
            chain,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for GetNfts {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let address = args
            .get_str(PARAM_WALLET_ADDRESS)
            .ok_or_else(|| AppError::BadRequest("wallet_address is required".to_string()))?;
        let limit = clamp_limit(args, NFT_DEFAULT_LIMIT, NFT_MAX_LIMIT);

        let objects = match self.chain.get_owned_objects(address, limit).await {
            Ok(objects) => objects,
            Err(err) => {
                tracing::warn!("NFT lookup failed for {}: {}", short_address(address), err);
                return Ok(ActionOutput::error(format!("Failed to fetch NFTs: {}", err)));
            }
        };
        if objects.is_empty() {
            return Ok(ActionOutput::Text("📭 No NFTs found in your wallet.".to_string()));
        }

        let mut text = String::from("🖼️ Your NFTs:\n");
        for object in objects.iter().take(limit as usize) {
            let name = object.name.as_deref().unwrap_or("Unnamed");
            text.push_str(&format!("\n• {} ({})", name, short_address(&object.object_id)));
        }
        Ok(ActionOutput::Text(text))
    }
}
