use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::domain::Domain;
use crate::constants::{PARAM_USER_ID, PARAM_WALLET_ADDRESS};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Integer,
}

impl ParamKind {
    pub fn schema_type(&self) -> &'static str {
        match self {
            ParamKind::String => "STRING",
            ParamKind::Number => "NUMBER",
            ParamKind::Integer => "INTEGER",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    /// Parameters filled from the request context rather than from user text.
    pub fn is_trusted(&self) -> bool {
        is_trusted_param(self.name)
    }
}

pub fn is_trusted_param(name: &str) -> bool {
    name == PARAM_USER_ID || name == PARAM_WALLET_ADDRESS
}

/// Static description of one invocable action: name, ordered parameters, wallet needs.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub requires_wallet: bool,
}

impl ActionSpec {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
            requires_wallet: false,
        }
    }

    pub fn required(mut self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.params.push(ParamSpec {
            name,
            kind,
            description,
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.params.push(ParamSpec {
            name,
            kind,
            description,
            required: false,
        });
        self
    }

    /// Declares the trusted `wallet_address` parameter and marks the action wallet-bound.
    pub fn with_wallet(mut self) -> Self {
        self.requires_wallet = true;
        self.required(
            PARAM_WALLET_ADDRESS,
            ParamKind::String,
            "Sender wallet address (filled from the linked wallet)",
        )
    }

    pub fn with_caller(self) -> Self {
        self.required(
            PARAM_USER_ID,
            ParamKind::String,
            "Caller identity (filled from the request)",
        )
    }

    pub fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.name == name)
    }

    pub fn needs_wallet(&self) -> bool {
        self.requires_wallet
            || self
                .params
                .iter()
                .any(|param| param.name == PARAM_WALLET_ADDRESS && param.required)
    }

    /// Parameters a model is allowed to fill. Trusted ones are never advertised.
    pub fn model_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|param| !param.is_trusted())
    }
}

/// Argument bag handed to an action; values arrive loosely typed from the selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs(Map<String, Value>);

impl ActionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Accepts JSON numbers and numeric strings (models emit both).
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(raw) => raw.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|value| value.is_finite())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        let value = self.get_f64(key)?;
        if value < 0.0 {
            return None;
        }
        Some(value.round() as u64)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Raw result of an action before it is normalized into an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    Text(String),
    Structured(Value),
}

impl ActionOutput {
    pub fn error(message: impl Into<String>) -> Self {
        ActionOutput::Structured(serde_json::json!({ "error": message.into() }))
    }
}

#[async_trait::async_trait]
pub trait WalletAction: Send + Sync {
    fn spec(&self) -> &ActionSpec;

    async fn invoke(&self, args: &ActionArgs) -> Result<ActionOutput>;
}

/// Name → action lookup. Built once at startup and shared read-only.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<&'static str, Arc<dyn WalletAction>>,
    order: Vec<&'static str>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: Arc<dyn WalletAction>) -> Result<()> {
        let name = action.spec().name;
        if self.actions.contains_key(name) {
            return Err(AppError::Internal(format!(
                "action `{}` registered twice",
                name
            )));
        }
        self.actions.insert(name, action);
        self.order.push(name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn WalletAction>> {
        self.actions.get(name)
    }

    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

}

/// Which registry entries each domain may use. `conversation` maps to nothing.
#[derive(Debug, Clone, Default)]
pub struct DomainActionMap {
    entries: HashMap<Domain, Vec<&'static str>>,
}

impl DomainActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, domain: Domain, actions: &[&'static str]) -> Self {
        self.entries.insert(domain, actions.to_vec());
        self
    }

    pub fn actions_for(&self, domain: Domain) -> &[&'static str] {
        self.entries
            .get(&domain)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn allows(&self, domain: Domain, action: &str) -> bool {
        self.actions_for(domain).iter().any(|name| *name == action)
    }

    pub fn validate(&self, registry: &ActionRegistry) -> Result<()> {
        if !self.actions_for(Domain::Conversation).is_empty() {
            return Err(AppError::Internal(
                "conversation domain must not expose actions".to_string(),
            ));
        }
        for (domain, names) in &self.entries {
            if let Some(missing) = names.iter().find(|name| registry.get(name).is_none()) {
                return Err(AppError::Internal(format!(
                    "domain `{}` references unknown action `{}`",
                    domain, missing
                )));
            }
        }
        Ok(())
    }
}
