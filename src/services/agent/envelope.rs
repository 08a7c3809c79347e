use serde::Serialize;
use serde_json::Value;

use crate::constants::DEFAULT_REPLY;

const DEFAULT_SIGNING_MESSAGE: &str = "📋 Transaction ready to sign.";

/// Closed set of result shapes an action can produce after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Signing { message: String, tx_data: Value },
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Reply::Text(message.into())
    }
}

/// Uniform pipeline output handed back to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub text: String,
    pub action: Option<String>,
    pub needs_signing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_data: Option<Value>,
}

impl Envelope {
    pub fn from_reply(reply: Reply, action: Option<&str>) -> Self {
        let action = action.map(str::to_string);
        match reply {
            Reply::Text(text) => Self {
                text: non_empty_or(text, DEFAULT_REPLY),
                action,
                needs_signing: false,
                tx_data: None,
            },
            Reply::Signing { message, tx_data } => Self {
                text: non_empty_or(message, DEFAULT_SIGNING_MESSAGE),
                action,
                needs_signing: true,
                tx_data: Some(tx_data),
            },
        }
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::from_reply(Reply::Text(message.into()), None)
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
