//! Transfer parameters that do not come from the user

use alloy::primitives::U256;
use eyre::{eyre, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::confirmation::ConfirmationConfig;
use crate::evm::instructions::RelayMode;
use crate::retry::RetryConfig;

/// 0.0005 of an 18-decimal native currency
pub const DEFAULT_TRANSFER_FEE_WEI: u64 = 500_000_000_000_000;

/// Gas ceiling of the transfer transaction
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

/// How the native fee sent with the transfer is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "wei", rename_all = "lowercase")]
pub enum FeePolicy {
    /// Always send this many wei
    Fixed(U256),
    /// Ask the manager with `quoteDeliveryPrice`
    Quoted,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy::Fixed(U256::from(DEFAULT_TRANSFER_FEE_WEI))
    }
}

impl FeePolicy {
    /// Parse `FEE_MODE` with an optional `TRANSFER_FEE_WEI`
    pub fn parse(mode: &str, fixed_wei: Option<&str>) -> Result<Self> {
        match mode.trim().to_lowercase().as_str() {
            "fixed" => match fixed_wei {
                Some(raw) => {
                    let wei = U256::from_str(raw.trim())
                        .map_err(|e| eyre!("Invalid fee {:?}: {}", raw, e))?;
                    Ok(FeePolicy::Fixed(wei))
                }
                None => Ok(FeePolicy::default()),
            },
            "quoted" | "quote" => Ok(FeePolicy::Quoted),
            other => Err(eyre!("Unknown fee mode: {} (expected fixed or quoted)", other)),
        }
    }
}

/// Settings applied to every transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSettings {
    pub fee: FeePolicy,
    pub gas_limit: u64,
    /// Ask the manager to queue rather than fail on rate limits
    pub should_queue: bool,
    pub relay: RelayMode,
    pub retry: RetryConfig,
    pub confirmation: ConfirmationConfig,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            fee: FeePolicy::default(),
            gas_limit: DEFAULT_GAS_LIMIT,
            should_queue: false,
            relay: RelayMode::default(),
            retry: RetryConfig::default(),
            confirmation: ConfirmationConfig::default(),
        }
    }
}
