//! Wallet Access
//!
//! The bridge never holds keys on the user's behalf; it talks to a wallet that
//! approves and signs. [`WalletProvider`] is the EIP-1193 subset the transfer
//! flow needs:
//!
//! - `request_accounts` - `eth_requestAccounts`
//! - `chain_id` - `eth_chainId`
//! - `switch_chain` - `wallet_switchEthereumChain`
//! - `add_chain` - `wallet_addEthereumChain` (EIP-3085)
//! - `send_transaction` - `eth_sendTransaction`
//!
//! ## Submodules
//!
//! - `json_rpc` - EIP-1193 provider reached over HTTP JSON-RPC
//! - `local` - private key wallet for scripted transfers
//! - `switch` - network switching with add-on-unknown fallback

pub mod json_rpc;
pub mod local;
pub mod switch;

pub use json_rpc::JsonRpcWallet;
pub use local::LocalWallet;
pub use switch::ensure_network;

use alloy::{
    primitives::{Address, B256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{TransferError, TransferResult};

/// EIP-1193: the user rejected the request
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 / MetaMask: the requested chain has not been added to the wallet
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Errors reported by a wallet provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("chain {0} is not known to the wallet")]
    UnrecognizedChain(u64),

    #[error("wallet has no active network")]
    NoActiveChain,

    #[error("wallet rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("wallet transport error: {0}")]
    Transport(String),
}

impl WalletError {
    /// Map a JSON-RPC error object to a wallet error
    pub fn from_rpc(code: i64, message: impl Into<String>, chain_id: Option<u64>) -> Self {
        match (code, chain_id) {
            (USER_REJECTED_CODE, _) => WalletError::UserRejected,
            (UNRECOGNIZED_CHAIN_CODE, Some(id)) => WalletError::UnrecognizedChain(id),
            (code, _) => WalletError::Rpc {
                code,
                message: message.into(),
            },
        }
    }
}

/// Native currency block of an EIP-3085 request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChainCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// EIP-3085 `wallet_addEthereumChain` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Hex chain ID with 0x prefix
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: AddChainCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl AddChainParams {
    /// Decode the hex chain ID
    pub fn chain_id_u64(&self) -> Result<u64, WalletError> {
        parse_hex_u64(&self.chain_id)
    }
}

/// Minimal wallet interface used by the transfer flow
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for authorized accounts; the first one signs
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// The wallet's active chain
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Switch the wallet's active chain
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Register a chain definition with the wallet
    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError>;

    /// Sign and broadcast a transaction on the active chain
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, WalletError>;
}

/// Connect to the wallet and return the signing address
pub async fn connect_wallet<W: WalletProvider + ?Sized>(wallet: &W) -> TransferResult<Address> {
    let accounts = wallet
        .request_accounts()
        .await
        .map_err(|e| TransferError::WalletConnection(e.to_string()))?;

    let account = accounts
        .first()
        .copied()
        .ok_or_else(|| TransferError::WalletConnection("no accounts authorized".to_string()))?;

    debug!(authorized = accounts.len(), "Wallet returned accounts");
    info!(account = %account, "Wallet connected");
    Ok(account)
}

/// Parse a 0x-prefixed hex quantity
pub(crate) fn parse_hex_u64(raw: &str) -> Result<u64, WalletError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|e| WalletError::Transport(format!("invalid hex quantity {}: {}", raw, e)))
}
