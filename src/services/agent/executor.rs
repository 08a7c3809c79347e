use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::Value;

use super::envelope::Reply;
use super::registry::{ActionArgs, ActionOutput, WalletAction};

/// Runs one action and turns whatever it returns (or throws) into a [`Reply`].
pub struct ActionExecutor;

impl ActionExecutor {
    pub async fn execute(action: &dyn WalletAction, args: &ActionArgs) -> Reply {
        let name = action.spec().name;
        tracing::info!("Executing action: {}", name);

        match AssertUnwindSafe(action.invoke(args)).catch_unwind().await {
            Ok(Ok(output)) => normalize(output),
            Ok(Err(err)) => {
                tracing::error!("Action {} failed: {}", name, err);
                Reply::text(execution_error(name))
            }
            Err(_) => {
                tracing::error!("Action {} panicked", name);
                Reply::text(execution_error(name))
            }
        }
    }
}

pub fn execution_error(name: &str) -> String {
    format!("❌ Error executing {}. Please try again.", name)
}

/// Maps raw action output onto the closed reply set.
pub fn normalize(output: ActionOutput) -> Reply {
    let value = match output {
        ActionOutput::Text(text) => return Reply::Text(text),
        ActionOutput::Structured(value) => value,
    };

    match value.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(error)) => return Reply::Text(format!("❌ {}", error)),
        Some(error) => return Reply::Text(format!("❌ {}", error)),
    }

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    if value.get("needs_signing").and_then(Value::as_bool) == Some(true) {
        return Reply::Signing {
            message: message.unwrap_or_default(),
            tx_data: value,
        };
    }

    match message {
        Some(message) => Reply::Text(message),
        None => Reply::Text(
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        ),
    }
}
