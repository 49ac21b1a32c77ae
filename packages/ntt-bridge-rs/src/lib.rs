//! NTT-Bridge-RS: Wormhole Native Token Transfers between EVM networks
//!
//! This crate owns the transfer flow used by the `ntt-bridge` CLI:
//!
//! - **Networks** - Descriptors for the supported networks and their NTT deployments
//! - **Wallet** - EIP-1193 wallet abstraction, JSON-RPC and local key implementations
//! - **EVM Module** - Balance/allowance reads, contract bindings, instruction encoding
//! - **Transfer Module** - Orchestration, status tracking and the transfer form
//! - **Retry / Confirmation** - Fixed-backoff submission retry and receipt polling
//! - **Testing Module** - In-memory wallet and chain for tests
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! ntt-bridge-rs = { path = "../ntt-bridge-rs" }
//! ```
//!
//! ## Feature Flags
//!
//! - `testing` - Enable the mock wallet and chain outside this crate's own tests

// Core modules
pub mod address_codec;
pub mod amount;
pub mod confirmation;
pub mod error;
pub mod explorer;
pub mod networks;
pub mod redact;
pub mod retry;

pub mod evm;
pub mod transfer;
pub mod wallet;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used items at the crate root
pub use address_codec::{from_universal_address, to_universal_address, RecipientAddress};
pub use amount::{check_amount_syntax, format_amount, parse_amount};
pub use confirmation::{wait_for_receipt, ConfirmationConfig};
pub use error::{TransferError, TransferResult};
pub use networks::{NativeCurrency, NetworkDescriptor, NetworkRegistry, NttDeployment};
pub use redact::Redacted;
pub use retry::{with_retry, RetryConfig};
pub use transfer::{
    FeePolicy, StatusTracker, TransferForm, TransferOrchestrator, TransferOutcome,
    TransferRequest, TransferSettings, TransferStatus, DEFAULT_GAS_LIMIT,
    DEFAULT_TRANSFER_FEE_WEI,
};
pub use wallet::{
    connect_wallet, ensure_network, JsonRpcWallet, LocalWallet, WalletError, WalletProvider,
};
