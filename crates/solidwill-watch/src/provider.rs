//! Chain capability provider: the explicit object replacing a global wallet.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use reqwest::Client;

use super::WatchError;

/// Capability object threading the wallet/provider layer into the loop.
///
/// Reads work without a connected account; writes require one. Implemented
/// by [`RpcProvider`] in production and by a fake in tests.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Currently connected account, if any.
    fn address(&self) -> Option<Address>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WatchError>;

    /// Submit a transaction; signing is the provider's concern.
    async fn send(&self, to: Address, data: Bytes) -> Result<B256, WatchError>;

    /// Latest block number.
    async fn block_number(&self) -> Result<u64, WatchError>;

    /// Chain id of the connected node.
    async fn chain_id(&self) -> Result<u64, WatchError>;
}

/// JSON-RPC provider over HTTP.
pub struct RpcProvider {
    client: Client,
    rpc_url: String,
    account: Option<Address>,
}

impl RpcProvider {
    /// Create a provider from an RPC URL.
    /// Converts wss:// to https:// and ws:// to http://.
    pub fn new(url: &str, account: Option<Address>) -> Self {
        let rpc_url = url.replace("wss://", "https://").replace("ws://", "http://");
        Self { client: Client::new(), rpc_url, account }
    }

    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WatchError> {
        let req = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&req)
            .send()
            .await
            .map_err(|e| WatchError::Http(e.to_string()))?;

        let json: serde_json::Value =
            resp.json().await.map_err(|e| WatchError::Json(e.to_string()))?;

        if let Some(err) = json.get("error") {
            let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let message =
                err.get("message").and_then(|m| m.as_str()).unwrap_or("unknown").to_string();
            return Err(WatchError::Rpc { code, message });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| WatchError::Http("no result in response".to_string()))
    }
}

/// Parse a hex quantity ("0x...") result.
fn quantity(value: &serde_json::Value) -> Result<u64, WatchError> {
    value
        .as_str()
        .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .ok_or_else(|| WatchError::Json("expected hex quantity".to_string()))
}

#[async_trait]
impl ChainProvider for RpcProvider {
    fn address(&self) -> Option<Address> {
        self.account
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WatchError> {
        let params = serde_json::json!([
            { "to": format!("{:?}", to), "data": format!("0x{}", hex::encode(&data)) },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| WatchError::Json("expected hex return data".to_string()))?;
        let bytes = hex::decode(raw.trim_start_matches("0x"))
            .map_err(|e| WatchError::Json(e.to_string()))?;
        Ok(Bytes::from(bytes))
    }

    async fn send(&self, to: Address, data: Bytes) -> Result<B256, WatchError> {
        let from = self.account.ok_or(WatchError::NoSigner)?;
        let params = serde_json::json!([{
            "from": format!("{:?}", from),
            "to": format!("{:?}", to),
            "data": format!("0x{}", hex::encode(&data))
        }]);
        let result = self.request("eth_sendTransaction", params).await?;
        result
            .as_str()
            .and_then(|s| s.parse::<B256>().ok())
            .ok_or_else(|| WatchError::Json("expected transaction hash".to_string()))
    }

    async fn block_number(&self) -> Result<u64, WatchError> {
        quantity(&self.request("eth_blockNumber", serde_json::json!([])).await?)
    }

    async fn chain_id(&self) -> Result<u64, WatchError> {
        quantity(&self.request("eth_chainId", serde_json::json!([])).await?)
    }
}
