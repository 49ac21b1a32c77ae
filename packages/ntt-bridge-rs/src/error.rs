//! Transfer errors
//!
//! Detailed variants are kept for logs; [`TransferError::user_message`] collapses
//! them into the short messages shown to the user.

use thiserror::Error;

use crate::wallet::WalletError;

/// Everything that can stop a transfer attempt
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("wallet connection failed: {0}")]
    WalletConnection(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid address format: {0}")]
    InvalidAddress(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("source and destination network are both {0}")]
    SameNetwork(String),

    #[error("network switch to {network} failed: {reason}")]
    NetworkSwitchFailed { network: String, reason: String },

    #[error("NTT manager on {0} is not initialized")]
    BridgeNotInitialized(String),

    #[error("insufficient {symbol} balance: need {required}, have {available}")]
    InsufficientNativeBalance {
        symbol: String,
        required: String,
        available: String,
    },

    #[error("insufficient token balance: need {required}, have {available}")]
    InsufficientTokenBalance { required: String, available: String },

    #[error("approval failed: {0}")]
    ApprovalFailed(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("a transfer is already in progress")]
    TransferInProgress,

    #[error("rpc error: {0}")]
    Rpc(String),
}

impl TransferError {
    /// Message suitable for the single error line the user sees
    pub fn user_message(&self) -> &'static str {
        match self {
            TransferError::WalletConnection(_) => "Wallet connection failed",
            TransferError::InvalidAmount(_) => "Invalid amount",
            TransferError::InvalidAddress(_) => "Invalid address format",
            TransferError::UnknownNetwork(_) | TransferError::SameNetwork(_) => {
                "Select two different supported networks"
            }
            TransferError::NetworkSwitchFailed { .. } => "Network switch failed",
            TransferError::BridgeNotInitialized(_) => "Bridge is not available on this network",
            TransferError::InsufficientNativeBalance { .. }
            | TransferError::InsufficientTokenBalance { .. } => "Insufficient balance",
            TransferError::TransferInProgress => "A transfer is already in progress",
            TransferError::ApprovalFailed(_)
            | TransferError::TransactionFailed(_)
            | TransferError::Rpc(_) => "Transaction failed",
        }
    }

    /// Wrap an RPC-layer report
    pub fn rpc(err: eyre::Report) -> Self {
        TransferError::Rpc(format!("{:#}", err))
    }

    /// Map a wallet error raised while sending a transaction
    pub fn from_send(err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => {
                TransferError::TransactionFailed("request rejected in wallet".to_string())
            }
            other => TransferError::TransactionFailed(other.to_string()),
        }
    }
}

pub type TransferResult<T> = std::result::Result<T, TransferError>;
