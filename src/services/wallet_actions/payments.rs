use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::json;

use super::{is_valid_sui_address, names, short_address};
use crate::constants::{MIST_PER_SUI, PARAM_USER_ID, PARAM_WALLET_ADDRESS};
use crate::db::WalletStore;
use crate::error::{AppError, Result};
use crate::services::agent::registry::{ActionArgs, ActionOutput, ActionSpec, ParamKind, WalletAction};

/// Prepares an unsigned SUI transfer. Signing happens client-side.
pub struct SendSui {
    spec: ActionSpec,
    store: Arc<dyn WalletStore>,
}

impl SendSui {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self {
            spec: ActionSpec::new(
                names::SEND_SUI,
                "Prepare a SUI transfer. Use for 'send', 'transfer', 'pay', 'give SUI to'.",
            )
            .required(
                "recipient",
                ParamKind::String,
                "Sui address (0x...) or a saved contact name like alice",
            )
            .required("amount", ParamKind::Number, "Amount of SUI to send, e.g. 0.5, 1, 10")
            .with_wallet()
            .with_caller(),
            store,
        }
    }
}

#[async_trait::async_trait]
impl WalletAction for SendSui {
    fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput> {
        let Some(amount) = args.get_f64("amount").filter(|amount| *amount > 0.0) else {
            return Ok(ActionOutput::error("Amount must be greater than zero."));
        };
        let Some(recipient) = args.get_str("recipient") else {
            return Ok(ActionOutput::error("Recipient is required."));
        };
        let sender = args
            .get_str(PARAM_WALLET_ADDRESS)
            .ok_or_else(|| AppError::BadRequest("wallet_address is required".to_string()))?;
        let user_id = args.get_str(PARAM_USER_ID).unwrap_or_default();

        let recipient = if recipient.starts_with("0x") {
            if !is_valid_sui_address(recipient) {
                return Ok(ActionOutput::error(format!(
                    "Invalid recipient address {}.",
                    short_address(recipient)
                )));
            }
            recipient.to_string()
        } else {
            match self.store.resolve_contact(user_id, recipient).await? {
                Some(address) => address,
                None => {
                    return Ok(ActionOutput::error(format!(
                        "Contact \"{}\" not found. Add with: /contacts add {} 0x...",
                        recipient, recipient
                    )))
                }
            }
        };

        let Some(amount_mist) = amount_to_mist(amount) else {
            return Ok(ActionOutput::error(format!("Amount {} SUI is too large.", amount)));
        };

        tracing::info!(
            "Prepared transfer of {} SUI from {} to {}",
            amount,
            short_address(sender),
            short_address(&recipient)
        );

        Ok(ActionOutput::Structured(json!({
            "action": names::SEND_SUI,
            "recipient": recipient,
            "amount": amount,
            "amount_mist": amount_mist.to_string(),
            "sender": sender,
            "needs_signing": true,
            "message": format!("📋 Ready to send {} SUI to {}", amount, short_address(&recipient)),
            "prepared_at": Utc::now().to_rfc3339(),
        })))
    }
}

pub fn amount_to_mist(amount: f64) -> Option<u64> {
    let sui = Decimal::from_f64(amount)?;
    sui.checked_mul(Decimal::from(MIST_PER_SUI))?.trunc().to_u64()
}
