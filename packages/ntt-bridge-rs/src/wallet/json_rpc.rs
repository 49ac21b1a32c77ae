//! EIP-1193 wallet over HTTP JSON-RPC
//!
//! Desktop wallets and signing proxies expose the same provider API a browser
//! extension injects, on a local HTTP endpoint. Requests that need approval
//! (account access, network changes, transactions) block until the user
//! answers in the wallet.

use alloy::{
    primitives::{Address, B256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use super::{parse_hex_u64, AddChainParams, WalletError, WalletProvider};

/// JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Wallet reached through an HTTP provider endpoint
pub struct JsonRpcWallet {
    endpoint: String,
    client: Client,
    next_id: AtomicU64,
    /// First account returned by `eth_requestAccounts`
    account: Mutex<Option<Address>>,
}

impl JsonRpcWallet {
    /// Create a wallet client for `endpoint`
    ///
    /// `timeout` bounds each request, including the time the user takes to
    /// answer a prompt.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        info!(endpoint = %endpoint, "Created JSON-RPC wallet client");

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            next_id: AtomicU64::new(1),
            account: Mutex::new(None),
        })
    }

    fn cached_account(&self) -> Option<Address> {
        self.account.lock().ok().and_then(|guard| *guard)
    }

    /// Fill `from` with the connected account when the caller left it empty
    ///
    /// Providers reject `eth_sendTransaction` without a sender.
    async fn with_sender(&self, tx: TransactionRequest) -> Result<TransactionRequest, WalletError> {
        if tx.from.is_some() {
            return Ok(tx);
        }
        let account = match self.cached_account() {
            Some(account) => account,
            None => self
                .request_accounts()
                .await?
                .first()
                .copied()
                .ok_or_else(|| WalletError::Transport("wallet authorized no accounts".to_string()))?,
        };
        Ok(tx.from(account))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        chain_hint: Option<u64>,
    ) -> Result<T, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        debug!(method, id, "Wallet request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?
            .json::<RpcResponse>()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        decode_response(response, chain_hint)
    }
}

fn decode_response<T: DeserializeOwned>(
    response: RpcResponse,
    chain_hint: Option<u64>,
) -> Result<T, WalletError> {
    if let Some(error) = response.error {
        return Err(WalletError::from_rpc(error.code, error.message, chain_hint));
    }

    serde_json::from_value(response.result.unwrap_or(Value::Null))
        .map_err(|e| WalletError::Transport(format!("unexpected wallet response: {}", e)))
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let raw: Vec<String> = self.request("eth_requestAccounts", json!([]), None).await?;
        let accounts = raw
            .iter()
            .map(|a| {
                Address::from_str(a)
                    .map_err(|e| WalletError::Transport(format!("invalid account {}: {}", a, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let (Some(first), Ok(mut cached)) = (accounts.first(), self.account.lock()) {
            *cached = Some(*first);
        }
        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let raw: String = self.request("eth_chainId", json!([]), None).await?;
        parse_hex_u64(&raw)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let _: Value = self
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": format!("{:#x}", chain_id) }]),
                Some(chain_id),
            )
            .await?;
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        let chain_id = params.chain_id_u64().ok();
        let _: Value = self
            .request("wallet_addEthereumChain", json!([params]), chain_id)
            .await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, WalletError> {
        let tx = self.with_sender(tx).await?;
        debug!(from = ?tx.from, "Sending transaction through wallet");
        let raw: String = self
            .request("eth_sendTransaction", json!([tx]), None)
            .await?;
        B256::from_str(&raw)
            .map_err(|e| WalletError::Transport(format!("invalid transaction hash {}: {}", raw, e)))
    }
}
