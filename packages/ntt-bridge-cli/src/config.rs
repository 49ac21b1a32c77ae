use eyre::{eyre, Result, WrapErr};
use ntt_bridge_rs::evm::RelayMode;
use ntt_bridge_rs::networks::validate_rpc_url;
use ntt_bridge_rs::{
    ConfirmationConfig, FeePolicy, Redacted, RetryConfig, TransferSettings, DEFAULT_GAS_LIMIT,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// How transactions get signed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletMode {
    /// EIP-1193 provider reached over HTTP
    JsonRpc,
    /// Private key held by this process
    Local,
}

impl FromStr for WalletMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json-rpc" | "jsonrpc" | "rpc" => Ok(WalletMode::JsonRpc),
            "local" | "key" => Ok(WalletMode::Local),
            other => Err(eyre!("Unknown wallet mode: {} (expected json-rpc or local)", other)),
        }
    }
}

/// Wallet configuration
///
/// The private key is wrapped so `Debug` never prints it.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub mode: WalletMode,
    pub rpc_url: String,
    pub private_key: Option<Redacted<String>>,
    pub request_timeout: Duration,
}

/// Main configuration for the CLI
#[derive(Debug, Clone)]
pub struct Config {
    pub wallet: WalletConfig,
    pub transfer: TransferSettings,
}

/// Default functions
fn default_wallet_rpc_url() -> String {
    "http://127.0.0.1:1248".to_string()
}

fn default_wallet_timeout_secs() -> u64 {
    120
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_confirmation_poll_ms() -> u64 {
    2000
}

fn default_confirmation_timeout_secs() -> u64 {
    180
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("{} is invalid: {}", name, e)),
        None => Ok(default),
    }
}

/// Load a .env file into the process environment if it exists
pub fn load_env_file(path: &str) -> Result<()> {
    if Path::new(path).exists() {
        dotenvy::from_filename(path)
            .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
    }
    Ok(())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let wallet = WalletConfig {
            mode: parse_var(&lookup, "WALLET_MODE", WalletMode::JsonRpc)?,
            rpc_url: lookup("WALLET_RPC_URL").unwrap_or_else(default_wallet_rpc_url),
            private_key: lookup("WALLET_PRIVATE_KEY").map(Redacted),
            request_timeout: Duration::from_secs(parse_var(
                &lookup,
                "WALLET_TIMEOUT_SECS",
                default_wallet_timeout_secs(),
            )?),
        };

        let fee_mode = lookup("FEE_MODE").unwrap_or_else(|| "fixed".to_string());
        let fee_wei = lookup("TRANSFER_FEE_WEI");
        let fee = FeePolicy::parse(&fee_mode, fee_wei.as_deref())?;

        let transfer = TransferSettings {
            fee,
            gas_limit: parse_var(&lookup, "TRANSFER_GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
            should_queue: parse_var(&lookup, "TRANSFER_SHOULD_QUEUE", false)?,
            relay: parse_var(&lookup, "RELAY_MODE", RelayMode::default())?,
            retry: RetryConfig {
                max_retries: parse_var(&lookup, "RETRY_ATTEMPTS", default_retry_attempts())?,
                delay: Duration::from_millis(parse_var(
                    &lookup,
                    "RETRY_DELAY_MS",
                    default_retry_delay_ms(),
                )?),
            },
            confirmation: ConfirmationConfig {
                poll_interval: Duration::from_millis(parse_var(
                    &lookup,
                    "CONFIRMATION_POLL_MS",
                    default_confirmation_poll_ms(),
                )?),
                timeout: Duration::from_secs(parse_var(
                    &lookup,
                    "CONFIRMATION_TIMEOUT_SECS",
                    default_confirmation_timeout_secs(),
                )?),
            },
        };

        let config = Config { wallet, transfer };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.wallet.mode {
            WalletMode::JsonRpc => validate_rpc_url(&self.wallet.rpc_url, "WALLET_RPC_URL")?,
            WalletMode::Local => {
                let key = self
                    .wallet
                    .private_key
                    .as_ref()
                    .ok_or_else(|| eyre!("WALLET_PRIVATE_KEY is required when WALLET_MODE=local"))?;
                let key = key.expose();
                if key.len() != 66 || !key.starts_with("0x") {
                    return Err(eyre!("WALLET_PRIVATE_KEY must be 66 chars (0x + 64 hex chars)"));
                }
            }
        }

        if self.transfer.gas_limit == 0 {
            return Err(eyre!("TRANSFER_GAS_LIMIT must be greater than zero"));
        }

        if self.transfer.confirmation.poll_interval.is_zero() {
            return Err(eyre!("CONFIRMATION_POLL_MS must be greater than zero"));
        }

        if self.transfer.confirmation.timeout < self.transfer.confirmation.poll_interval {
            return Err(eyre!(
                "CONFIRMATION_TIMEOUT_SECS must be at least one poll interval"
            ));
        }

        Ok(())
    }
}
