use serde_json::Map;

use super::registry::{ActionArgs, ActionSpec};
use crate::constants::{PARAM_USER_ID, PARAM_WALLET_ADDRESS};

/// Trusted per-request values. Never sourced from model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub caller_id: String,
    pub wallet_address: Option<String>,
}

impl RequestContext {
    pub fn new(caller_id: impl Into<String>, wallet_address: Option<&str>) -> Self {
        let wallet_address = wallet_address
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string);
        Self {
            caller_id: caller_id.into(),
            wallet_address,
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet_address.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Injection {
    Ready(ActionArgs),
    /// The action needs a wallet and the request has none.
    MissingWallet,
}

/// Overlays trusted context on the selected arguments.
///
/// Declared trusted params are always replaced by the context value; when
/// the context has no value the model-provided one is removed instead.
pub fn inject(spec: &ActionSpec, args: Map<String, serde_json::Value>, ctx: &RequestContext) -> Injection {
    let mut args = ActionArgs::from_map(args);

    if spec.declares(PARAM_USER_ID) {
        args.insert(PARAM_USER_ID, ctx.caller_id.as_str());
    } else {
        args.remove(PARAM_USER_ID);
    }

    match (&ctx.wallet_address, spec.declares(PARAM_WALLET_ADDRESS)) {
        (Some(address), true) => {
            if args.get_str(PARAM_WALLET_ADDRESS).is_some_and(|given| given != address) {
                tracing::debug!("Overriding model-supplied wallet_address for {}", spec.name);
            }
            args.insert(PARAM_WALLET_ADDRESS, address.as_str());
        }
        (None, true) => {
            if args.remove(PARAM_WALLET_ADDRESS).is_some() {
                tracing::warn!("Discarded model-supplied wallet_address for {}", spec.name);
            }
        }
        (_, false) => {
            args.remove(PARAM_WALLET_ADDRESS);
        }
    }

    if spec.needs_wallet() && !ctx.has_wallet() {
        return Injection::MissingWallet;
    }
    Injection::Ready(args)
}
