//! SDK REST client: balances, pallet queries and extrinsic submission.
//!
//! Signing is never done here. Extrinsics are built by the SDK, signed by an
//! injected [`Signer`] (a wallet extension in practice) and handed back to
//! the SDK for submission.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use unqstake_core::{BalanceAmount, BalanceSnapshot, Network, amount};

use crate::config::join_url;
use crate::error::ChainError;

/// Source of account balances.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn balances(&self, address: &str) -> Result<BalanceSnapshot, ChainError>;

    /// Number of active stakes (`appPromotion.stakesPerAccount`).
    async fn stakes_per_account(&self, address: &str) -> Result<u32, ChainError>;
}

/// An extrinsic call to build and submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtrinsicRequest {
    pub address: String,
    pub section: String,
    pub method: String,
    pub args: Vec<Value>,
}

/// Outcome of a submitted extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub hash: String,
    pub block_hash: Option<String>,
}

/// Unsigned payload produced by the SDK.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerPayload {
    #[serde(rename = "signerPayloadJSON")]
    pub json: Value,
    #[serde(rename = "signerPayloadHex", default)]
    pub hex: String,
}

/// Wallet-side signing port.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Returns the hex-encoded signature for `payload`.
    async fn sign(&self, address: &str, payload: &SignerPayload) -> Result<String, ChainError>;
}

/// Builds, signs and submits extrinsics.
#[async_trait]
pub trait ExtrinsicSubmitter: Send + Sync {
    async fn submit(
        &self,
        request: &ExtrinsicRequest,
        signer: &dyn Signer,
    ) -> Result<SubmitResult, ChainError>;
}

#[derive(Debug, Deserialize)]
struct SdkBalance {
    raw: String,
    #[serde(default)]
    decimals: Option<u8>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdkBalances {
    #[serde(default)]
    available_balance: Option<SdkBalance>,
    #[serde(default)]
    staked_balance: Option<SdkBalance>,
    #[serde(default)]
    unstaked_balance: Option<SdkBalance>,
    #[serde(default)]
    total_balance: Option<SdkBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdkSubmitResponse {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    block_hash: Option<String>,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    error: Option<Value>,
}

fn to_balance_amount(
    balance: Option<SdkBalance>,
    network: Network,
    field: &str,
) -> Result<BalanceAmount, ChainError> {
    let Some(balance) = balance else {
        return Ok(BalanceAmount::zero(network));
    };
    let raw = amount::parse_raw(&balance.raw).ok_or_else(|| {
        ChainError::InvalidData(format!("{field}: unparseable raw amount {:?}", balance.raw))
    })?;
    Ok(BalanceAmount::new(
        raw,
        balance.decimals.unwrap_or(network.token_decimals()),
        balance
            .unit
            .unwrap_or_else(|| network.token_symbol().to_string()),
    ))
}

fn parse_balances(body: SdkBalances, network: Network) -> Result<BalanceSnapshot, ChainError> {
    Ok(BalanceSnapshot {
        available: to_balance_amount(body.available_balance, network, "availableBalance")?,
        staked: to_balance_amount(body.staked_balance, network, "stakedBalance")?,
        unstaked: to_balance_amount(body.unstaked_balance, network, "unstakedBalance")?,
        total: to_balance_amount(body.total_balance, network, "totalBalance")?,
    })
}

/// Read a count from a query result: a number, a digit string, or either
/// wrapped as `{"json": ...}`.
fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("json").and_then(parse_count),
        _ => None,
    }
}

fn submit_result(body: SdkSubmitResponse) -> Result<SubmitResult, ChainError> {
    if body.is_error || body.error.is_some() {
        let message = match body.error {
            Some(Value::String(s)) => s,
            Some(Value::Object(map)) => match map.get("message").and_then(Value::as_str) {
                Some(message) => message.to_string(),
                None => Value::Object(map.clone()).to_string(),
            },
            Some(other) => other.to_string(),
            None => "extrinsic reported an error".to_string(),
        };
        return Err(ChainError::Transaction(message));
    }
    let hash = body
        .hash
        .ok_or_else(|| ChainError::InvalidData("submit response without hash".to_string()))?;
    Ok(SubmitResult {
        hash,
        block_hash: body.block_hash,
    })
}

/// Client for the SDK REST service.
#[derive(Debug, Clone)]
pub struct SdkClient {
    client: reqwest::Client,
    base_url: String,
    network: Network,
}

impl SdkClient {
    pub fn new(
        base_url: impl Into<String>,
        network: Network,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            network,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn check(response: reqwest::Response, url: String) -> Result<reqwest::Response, ChainError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ChainError::Status {
                url,
                status: response.status().as_u16(),
            })
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ChainError> {
        let url = join_url(&self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;
        let response = Self::check(response, url)?;
        Ok(response.json().await?)
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ChainError> {
        let url = join_url(&self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::check(response, url)?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BalanceProvider for SdkClient {
    async fn balances(&self, address: &str) -> Result<BalanceSnapshot, ChainError> {
        let body: SdkBalances = self.get_json("balance", &[("address", address)]).await?;
        parse_balances(body, self.network)
    }

    async fn stakes_per_account(&self, address: &str) -> Result<u32, ChainError> {
        let body: Value = self
            .get_json(
                "query/appPromotion/stakesPerAccount",
                &[("args", address)],
            )
            .await?;
        parse_count(&body)
            .ok_or_else(|| ChainError::InvalidData(format!("stakesPerAccount: {body}")))
    }
}

#[async_trait]
impl ExtrinsicSubmitter for SdkClient {
    async fn submit(
        &self,
        request: &ExtrinsicRequest,
        signer: &dyn Signer,
    ) -> Result<SubmitResult, ChainError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ChainError::InvalidData(e.to_string()))?;
        let payload: SignerPayload = self.post_json("extrinsic/build", &body).await?;

        let signature = signer.sign(&request.address, &payload).await?;
        tracing::debug!("Signed {}.{} for {}", request.section, request.method, request.address);

        let submit = json!({
            "signerPayloadJSON": payload.json,
            "signature": signature,
        });
        let response: SdkSubmitResponse = self.post_json("extrinsic/submit-watch", &submit).await?;
        submit_result(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unqstake_core::Balance;

    #[test]
    fn test_parse_balances() {
        let body: SdkBalances = serde_json::from_value(json!({
            "availableBalance": {"raw": "1500000000000000000", "decimals": 18, "unit": "UNQ"},
            "stakedBalance": {"raw": "0", "decimals": 18, "unit": "UNQ"},
            "lockedBalance": {"raw": "5", "decimals": 18, "unit": "UNQ"}
        }))
        .unwrap();
        let snapshot = parse_balances(body, Network::Unique).unwrap();
        assert_eq!(snapshot.available.raw, Balance::from(1_500_000_000_000_000_000u128));
        assert_eq!(snapshot.available.format_with_unit(), "1.5000 UNQ");
        assert_eq!(snapshot.staked.raw, Balance::zero());
        assert_eq!(snapshot.total, BalanceAmount::zero(Network::Unique));
    }

    #[test]
    fn test_parse_balances_rejects_garbage() {
        let body: SdkBalances = serde_json::from_value(json!({
            "availableBalance": {"raw": "1.5"}
        }))
        .unwrap();
        assert!(matches!(
            parse_balances(body, Network::Quartz),
            Err(ChainError::InvalidData(_))
        ));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&json!(3)), Some(3));
        assert_eq!(parse_count(&json!("7")), Some(7));
        assert_eq!(parse_count(&json!({"json": 2, "human": "2"})), Some(2));
        assert_eq!(parse_count(&json!(null)), None);
    }

    #[test]
    fn test_submit_result_success() {
        let body: SdkSubmitResponse =
            serde_json::from_value(json!({"hash": "0x01", "blockHash": "0xbb"})).unwrap();
        assert_eq!(
            submit_result(body).unwrap(),
            SubmitResult {
                hash: "0x01".to_string(),
                block_hash: Some("0xbb".to_string()),
            }
        );
    }

    #[test]
    fn test_submit_result_error_message() {
        let body: SdkSubmitResponse = serde_json::from_value(json!({
            "hash": "0x01",
            "isError": true,
            "error": {"message": "appPromotion.NoPermission"}
        }))
        .unwrap();
        match submit_result(body) {
            Err(ChainError::Transaction(msg)) => assert_eq!(msg, "appPromotion.NoPermission"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_signer_payload_field_names() {
        let payload: SignerPayload = serde_json::from_value(json!({
            "signerPayloadJSON": {"method": "0x00"},
            "signerPayloadHex": "0xdead"
        }))
        .unwrap();
        assert_eq!(payload.hex, "0xdead");
        assert_eq!(payload.json["method"], "0x00");
    }
}
