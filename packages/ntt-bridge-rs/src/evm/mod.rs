//! EVM Chain Support Module
//!
//! Reads and call builders for the token and NTT manager contracts on the
//! source network.
//!
//! ## Submodules
//!
//! - `client` - RPC reads behind the `ChainReader` trait
//! - `contracts` - Token and manager bindings using alloy sol! macro
//! - `instructions` - Transceiver instruction encoding
//! - `tokens` - Funds check and approve/transfer request builders

pub mod client;
pub mod contracts;
pub mod instructions;
pub mod tokens;

// Re-export commonly used items
pub use client::{ChainReader, ChainReaderProvider, EvmChainReader, ReceiptSummary, RpcReaders};
pub use contracts::{NttManager, ERC20};
pub use instructions::{default_instructions, encode_instructions, RelayMode, TransceiverInstruction};
pub use tokens::{approve_request, check_funds, required_native, FundsQuery, FundsReport, TransferCall};
