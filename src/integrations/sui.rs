use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::constants::{MIST_PER_SUI, SUI_COIN_TYPE};
use crate::error::{AppError, Result};
use crate::models::chain::TransferKind;
use crate::models::{OwnedObject, TokenBalance, TransactionPage, TransactionSummary, WalletBalances};

const RPC_TIMEOUT_SECS: u64 = 30;
const COIN_OBJECT_PREFIX: &str = "0x2::coin::Coin";

/// Read-only chain queries the wallet actions depend on.
#[async_trait::async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_all_balances(&self, address: &str) -> Result<WalletBalances>;

    /// Sent and received transactions merged, newest first, at most `limit`.
    async fn get_transaction_history(&self, address: &str, limit: u64) -> Result<TransactionPage>;

    async fn get_owned_objects(&self, address: &str, limit: u64) -> Result<Vec<OwnedObject>>;
}

fn rpc_request(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    })
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBalance {
    coin_type: String,
    total_balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    digest: String,
    timestamp_ms: Option<String>,
    effects: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOwnedObject {
    data: Option<RawObjectData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObjectData {
    object_id: String,
    #[serde(rename = "type")]
    object_type: Option<String>,
    display: Option<Value>,
}

/// Sui JSON-RPC client
pub struct SuiClient {
    rpc_url: String,
    network: String,
    client: reqwest::Client,
}

impl SuiClient {
    pub fn new(rpc_url: String, network: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            rpc_url,
            network,
            client,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = rpc_request(method, params);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::BlockchainRPC(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(AppError::BlockchainRPC(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }
        body.result
            .ok_or_else(|| AppError::BlockchainRPC(format!("{} returned no result", method)))
    }

    async fn query_transactions(
        &self,
        filter_key: &str,
        address: &str,
        limit: u64,
    ) -> Result<RawPage<RawTransaction>> {
        self.call(
            "suix_queryTransactionBlocks",
            json!([
                {
                    "filter": { filter_key: address },
                    "options": { "showInput": true, "showEffects": true, "showEvents": false }
                },
                null,
                limit,
                true
            ]),
        )
        .await
    }

    fn explorer_url(&self, digest: &str) -> String {
        format!("https://suiscan.xyz/{}/tx/{}", self.network, digest)
    }
}

#[async_trait::async_trait]
impl ChainReader for SuiClient {
    async fn get_all_balances(&self, address: &str) -> Result<WalletBalances> {
        let raw: Vec<RawBalance> = self.call("suix_getAllBalances", json!([address])).await?;
        summarize_balances(address, raw)
    }

    async fn get_transaction_history(&self, address: &str, limit: u64) -> Result<TransactionPage> {
        let sent = self.query_transactions("FromAddress", address, limit).await?;
        let received = self.query_transactions("ToAddress", address, limit).await?;
        let has_next_page = sent.has_next_page || received.has_next_page;

        let items = merge_transactions(sent.data, received.data, limit)
            .into_iter()
            .map(|(tx, kind)| TransactionSummary {
                explorer_url: self.explorer_url(&tx.digest),
                status: transaction_status(tx.effects.as_ref()),
                timestamp_ms: tx.timestamp_ms.as_deref().and_then(|ts| ts.parse().ok()),
                digest: tx.digest,
                kind,
            })
            .collect();

        Ok(TransactionPage {
            items,
            has_next_page,
        })
    }

    async fn get_owned_objects(&self, address: &str, limit: u64) -> Result<Vec<OwnedObject>> {
        let page: RawPage<RawOwnedObject> = self
            .call(
                "suix_getOwnedObjects",
                json!([
                    address,
                    { "filter": null, "options": { "showType": true, "showDisplay": true } },
                    null,
                    limit
                ]),
            )
            .await?;

        let objects = page
            .data
            .into_iter()
            .filter_map(|entry| entry.data)
            .filter(|data| {
                !data
                    .object_type
                    .as_deref()
                    .is_some_and(|ty| ty.starts_with(COIN_OBJECT_PREFIX))
            })
            .map(|data| OwnedObject {
                name: display_name(data.display.as_ref()),
                object_id: data.object_id,
                object_type: data.object_type,
            })
            .take(limit as usize)
            .collect();
        Ok(objects)
    }
}

fn summarize_balances(address: &str, raw: Vec<RawBalance>) -> Result<WalletBalances> {
    let mut sui_mist: u128 = 0;
    let mut tokens = Vec::new();

    for balance in raw {
        let total: u128 = balance.total_balance.parse().map_err(|_| {
            AppError::BlockchainRPC(format!(
                "invalid balance `{}` for {}",
                balance.total_balance, balance.coin_type
            ))
        })?;
        if balance.coin_type == SUI_COIN_TYPE {
            sui_mist = total;
        } else {
            let symbol = balance
                .coin_type
                .rsplit("::")
                .next()
                .unwrap_or(&balance.coin_type)
                .to_string();
            tokens.push(TokenBalance {
                coin_type: balance.coin_type,
                symbol,
                total_balance: total,
            });
        }
    }

    Ok(WalletBalances {
        address: address.to_string(),
        sui_mist,
        sui: mist_to_sui(sui_mist)?,
        tokens,
    })
}

pub fn mist_to_sui(mist: u128) -> Result<Decimal> {
    let scale = MIST_PER_SUI.ilog10();
    let mist = i128::try_from(mist)
        .map_err(|_| AppError::BlockchainRPC("balance out of range".to_string()))?;
    Decimal::try_from_i128_with_scale(mist, scale)
        .map_err(|e| AppError::BlockchainRPC(format!("balance out of range: {}", e)))
}

// Sent entries win when a digest appears in both lists.
fn merge_transactions(
    sent: Vec<RawTransaction>,
    received: Vec<RawTransaction>,
    limit: u64,
) -> Vec<(RawTransaction, TransferKind)> {
    let mut by_digest: HashMap<String, (RawTransaction, TransferKind)> = HashMap::new();
    for tx in sent {
        by_digest.insert(tx.digest.clone(), (tx, TransferKind::Sent));
    }
    for tx in received {
        by_digest
            .entry(tx.digest.clone())
            .or_insert((tx, TransferKind::Received));
    }

    let mut merged: Vec<_> = by_digest.into_values().collect();
    merged.sort_by_key(|(tx, _)| {
        std::cmp::Reverse(
            tx.timestamp_ms
                .as_deref()
                .and_then(|ts| ts.parse::<u64>().ok())
                .unwrap_or(0),
        )
    });
    merged.truncate(limit as usize);
    merged
}

fn transaction_status(effects: Option<&Value>) -> String {
    effects
        .and_then(|effects| effects.pointer("/status/status"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn display_name(display: Option<&Value>) -> Option<String> {
    display
        .and_then(|display| display.pointer("/data/name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// Fixed chain state for action tests.
    pub(crate) struct StaticChain {
        pub sui_mist: u128,
        pub tokens: Vec<TokenBalance>,
        pub transactions: Vec<TransactionSummary>,
        pub objects: Vec<OwnedObject>,
    }

    impl Default for StaticChain {
        fn default() -> Self {
            Self {
                sui_mist: 1_500_000_000,
                tokens: Vec::new(),
                transactions: Vec::new(),
                objects: Vec::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl ChainReader for StaticChain {
        async fn get_all_balances(&self, address: &str) -> Result<WalletBalances> {
            Ok(WalletBalances {
                address: address.to_string(),
                sui_mist: self.sui_mist,
                sui: mist_to_sui(self.sui_mist)?,
                tokens: self.tokens.clone(),
            })
        }

        async fn get_transaction_history(
            &self,
            _address: &str,
            limit: u64,
        ) -> Result<TransactionPage> {
            Ok(TransactionPage {
                items: self.transactions.iter().take(limit as usize).cloned().collect(),
                has_next_page: self.transactions.len() as u64 > limit,
            })
        }

        async fn get_owned_objects(&self, _address: &str, limit: u64) -> Result<Vec<OwnedObject>> {
            Ok(self.objects.iter().take(limit as usize).cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tx(digest: &str, ts: u64) -> RawTransaction {
        RawTransaction {
            digest: digest.to_string(),
            timestamp_ms: Some(ts.to_string()),
            effects: Some(json!({ "status": { "status": "success" } })),
        }
    }

    #[test]
    fn mist_converts_to_sui() {
        assert_eq!(mist_to_sui(1_500_000_000).unwrap().to_string(), "1.500000000");
    }

    #[test]
    fn balances_split_sui_and_tokens() {
        let raw = vec![
            RawBalance {
                coin_type: SUI_COIN_TYPE.to_string(),
                total_balance: "2000000000".to_string(),
            },
            RawBalance {
                coin_type: "0xdee9::usdc::USDC".to_string(),
                total_balance: "42".to_string(),
            },
        ];
        let balances = summarize_balances("0xabc", raw).unwrap();
        assert_eq!(balances.sui_mist, 2_000_000_000);
        assert_eq!(balances.sui_formatted(), "2.0000 SUI");
        assert_eq!(balances.tokens[0].symbol, "USDC");
    }

    #[test]
    fn invalid_balance_is_an_rpc_error() {
        let raw = vec![RawBalance {
            coin_type: SUI_COIN_TYPE.to_string(),
            total_balance: "lots".to_string(),
        }];
        assert!(matches!(
            summarize_balances("0xabc", raw),
            Err(AppError::BlockchainRPC(_))
        ));
    }

    #[test]
    fn merge_dedupes_and_sorts_newest_first() {
        let sent = vec![raw_tx("a", 10), raw_tx("b", 30)];
        let received = vec![raw_tx("b", 30), raw_tx("c", 20)];
        let merged = merge_transactions(sent, received, 10);
        let digests: Vec<_> = merged.iter().map(|(tx, _)| tx.digest.as_str()).collect();
        assert_eq!(digests, vec!["b", "c", "a"]);
        assert_eq!(merged[0].1, TransferKind::Sent);
        assert_eq!(merged[1].1, TransferKind::Received);

        let limited = merge_transactions(vec![raw_tx("a", 1), raw_tx("b", 2)], vec![], 1);
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn status_and_display_name_parse() {
        assert_eq!(
            transaction_status(Some(&json!({ "status": { "status": "failure" } }))),
            "failure"
        );
        assert_eq!(transaction_status(None), "unknown");
        assert_eq!(
            display_name(Some(&json!({ "data": { "name": "Capy #1" } }))).as_deref(),
            Some("Capy #1")
        );
    }
}
