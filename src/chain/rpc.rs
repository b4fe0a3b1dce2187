//! JSON-RPC node client.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 over HTTP to the primary endpoint
//! - Poll signature status until the requested commitment or blockhash expiry
//! - Serve per-endpoint status lookups for consensus verification
//!
//! # Security
//! - Request URLs may carry API keys; only endpoint labels are logged

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use url::Url;

use crate::chain::client::{ChainClient, StatusSource};
use crate::chain::types::{
    AccountInfo, Address, ChainError, ChainResult, Commitment, ConfirmationTier, LatestBlockhash,
    Signature, SignatureStatus, SignedTransaction, SimulationResult, UnsignedTransaction,
};
use crate::config::RpcConfig;
use crate::endpoints::Endpoint;

/// Consecutive failed status polls tolerated while confirming.
const MAX_POLL_FAILURES: u32 = 10;

/// What one confirmation poll observed.
enum Poll {
    Settled(Option<Value>),
    Expired,
    Pending { block_height: u64 },
}

/// HTTP JSON-RPC client bound to one submission endpoint.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: Url,
    label: String,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client that submits through `endpoint`.
    pub fn new(endpoint: &Endpoint, config: &RpcConfig) -> ChainResult<Self> {
        let url = endpoint
            .request_url()
            .map_err(|e| ChainError::InvalidEndpoint(format!("{}: {}", endpoint.label, e)))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ChainError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(endpoint = %endpoint.label, "JSON-RPC client initialized");

        Ok(Self {
            http,
            url,
            label: endpoint.label.clone(),
            poll_interval: config.poll_interval(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, url: &Url, method: &str, params: Value) -> ChainResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let response = self
            .http
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Rpc(format!("{}: request timed out", method))
                } else {
                    ChainError::Rpc(format!("{}: {}", method, e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Rpc(format!("{}: HTTP {}", method, status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ChainError::Malformed(format!("{}: {}", method, e.without_url())))?;

        if let Some(err) = payload.get("error") {
            return Err(ChainError::Rpc(format!("{}: {}", method, err)));
        }
        payload
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::Malformed(format!("{}: missing result", method)))
    }

    async fn block_height(&self, commitment: Commitment) -> ChainResult<u64> {
        let result = self
            .call(&self.url, "getBlockHeight", json!([{ "commitment": commitment }]))
            .await?;
        result
            .as_u64()
            .ok_or_else(|| ChainError::Malformed(format!("getBlockHeight: {}", result)))
    }

    async fn status_at(
        &self,
        url: &Url,
        signature: &Signature,
        search_history: bool,
    ) -> ChainResult<Option<SignatureStatus>> {
        let result = self
            .call(
                url,
                "getSignatureStatuses",
                json!([[signature.0], { "searchTransactionHistory": search_history }]),
            )
            .await?;
        parse_signature_status(&result)
    }

    async fn poll(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        commitment: Commitment,
    ) -> ChainResult<Poll> {
        if let Some(status) = self.status_at(&self.url, signature, false).await? {
            if status.err.is_some() {
                return Ok(Poll::Settled(status.err));
            }
            if status.tier.satisfies(commitment) {
                return Ok(Poll::Settled(None));
            }
        }

        let block_height = self.block_height(commitment).await?;
        if block_height > blockhash.last_valid_block_height {
            return Ok(Poll::Expired);
        }
        Ok(Poll::Pending { block_height })
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn get_account_info(
        &self,
        address: &Address,
        commitment: Commitment,
    ) -> ChainResult<Option<AccountInfo>> {
        let result = self
            .call(
                &self.url,
                "getAccountInfo",
                json!([address.as_str(), { "commitment": commitment, "encoding": "base64" }]),
            )
            .await?;
        parse_account_info(&result)
    }

    async fn get_latest_blockhash(&self, commitment: Commitment) -> ChainResult<LatestBlockhash> {
        let result = self
            .call(&self.url, "getLatestBlockhash", json!([{ "commitment": commitment }]))
            .await?;
        let value = result.get("value").unwrap_or(&result);

        let blockhash = value
            .get("blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::Malformed("getLatestBlockhash: missing blockhash".into()))?;
        let last_valid_block_height = value
            .get("lastValidBlockHeight")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                ChainError::Malformed("getLatestBlockhash: missing lastValidBlockHeight".into())
            })?;

        Ok(LatestBlockhash {
            blockhash: blockhash.to_string(),
            last_valid_block_height,
        })
    }

    async fn simulate(&self, tx: &UnsignedTransaction) -> ChainResult<SimulationResult> {
        let result = self
            .call(
                &self.url,
                "simulateTransaction",
                json!([BASE64.encode(&tx.0), {
                    "encoding": "base64",
                    "commitment": Commitment::Processed,
                    "sigVerify": false,
                    "replaceRecentBlockhash": false,
                }]),
            )
            .await?;
        let value = result
            .get("value")
            .ok_or_else(|| ChainError::Malformed("simulateTransaction: missing value".into()))?;

        let err = value.get("err").filter(|e| !e.is_null()).cloned();
        let logs = value
            .get("logs")
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(SimulationResult { err, logs })
    }

    async fn send_raw(&self, tx: &SignedTransaction) -> ChainResult<Signature> {
        let result = self
            .call(
                &self.url,
                "sendTransaction",
                json!([BASE64.encode(&tx.bytes), { "encoding": "base64", "skipPreflight": true }]),
            )
            .await?;
        result
            .as_str()
            .map(Signature::from)
            .ok_or_else(|| ChainError::Malformed(format!("sendTransaction: {}", result)))
    }

    async fn confirm(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        commitment: Commitment,
    ) -> ChainResult<Option<Value>> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = 0u32;

        loop {
            ticker.tick().await;

            match self.poll(signature, blockhash, commitment).await {
                Ok(Poll::Settled(err)) => return Ok(err),
                Ok(Poll::Expired) => {
                    return Err(ChainError::ConfirmationTimeout {
                        last_valid_block_height: blockhash.last_valid_block_height,
                    })
                }
                Ok(Poll::Pending { block_height }) => {
                    failures = 0;
                    tracing::debug!(
                        endpoint = %self.label,
                        signature = %signature,
                        block_height,
                        last_valid = blockhash.last_valid_block_height,
                        "Transaction pending"
                    );
                }
                // The transaction is already broadcast, so a flaky poll must
                // not end the wait and trigger a resubmission.
                Err(err) if failures + 1 < MAX_POLL_FAILURES => {
                    failures += 1;
                    tracing::warn!(
                        endpoint = %self.label,
                        signature = %signature,
                        failures,
                        error = %err,
                        "Confirmation poll failed, still waiting"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> ChainResult<Option<SignatureStatus>> {
        self.status_at(&self.url, signature, search_history).await
    }
}

#[async_trait]
impl StatusSource for JsonRpcClient {
    async fn signature_status(
        &self,
        endpoint: &Endpoint,
        signature: &Signature,
    ) -> ChainResult<Option<SignatureStatus>> {
        let url = endpoint
            .request_url()
            .map_err(|e| ChainError::InvalidEndpoint(format!("{}: {}", endpoint.label, e)))?;
        self.status_at(&url, signature, true).await
    }
}

fn parse_signature_status(result: &Value) -> ChainResult<Option<SignatureStatus>> {
    let entry = result
        .get("value")
        .and_then(|v| v.get(0))
        .ok_or_else(|| ChainError::Malformed("getSignatureStatuses: missing value".into()))?;

    if entry.is_null() {
        return Ok(None);
    }

    let tier = match entry.get("confirmationStatus").and_then(Value::as_str) {
        Some(s) => ConfirmationTier::from_wire(s),
        None => ConfirmationTier::Unrecognized(String::new()),
    };
    let err = entry.get("err").filter(|e| !e.is_null()).cloned();

    Ok(Some(SignatureStatus { tier, err }))
}

fn parse_account_info(result: &Value) -> ChainResult<Option<AccountInfo>> {
    let value = match result.get("value") {
        Some(Value::Null) | None => return Ok(None),
        Some(v) => v,
    };

    let owner = value
        .get("owner")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let lamports = value.get("lamports").and_then(Value::as_u64).unwrap_or(0);
    let encoded = value
        .get("data")
        .and_then(|d| d.get(0))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let data = BASE64
        .decode(encoded)
        .map_err(|e| ChainError::Malformed(format!("getAccountInfo: bad data encoding: {}", e)))?;

    Ok(Some(AccountInfo {
        owner,
        lamports,
        data,
    }))
}
