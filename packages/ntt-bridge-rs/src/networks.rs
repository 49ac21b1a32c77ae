//! Network descriptors and the registry of supported bridge networks
//!
//! Every network the bridge can use is described once, here. Descriptors carry
//! the native EVM chain ID the wallet understands, the Wormhole chain ID the
//! NTT manager routes on, the deployed contract addresses, and the endpoints
//! used for reads and explorer links.
//!
//! # Environment overrides
//!
//! ```text
//! NETWORK_SEPOLIA_RPC_URL=https://...   # replace the public RPC endpoint
//! NETWORK_SEPOLIA_TOKEN=0x...           # token contract
//! NETWORK_SEPOLIA_MANAGER=0x...         # NTT manager (also the allowance spender)
//! NETWORK_SEPOLIA_TRANSCEIVER=0x...     # Wormhole transceiver
//! ```
//!
//! Keys are upper-cased with `-` replaced by `_` (`NETWORK_ARBITRUM_SEPOLIA_RPC_URL`).

use alloy::primitives::{address, Address};
use eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::wallet::{AddChainParams, AddChainCurrency};

// ============================================================================
// URL Validation
// ============================================================================

/// Validates that a URL uses http/https and has a host component.
pub fn validate_rpc_url(url_str: &str, name: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url_str).map_err(|e| eyre!("{} must be a valid URL: {}", name, e))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(eyre!(
            "{} must use http:// or https:// scheme, got {}",
            name,
            scheme
        ));
    }

    if parsed.host_str().is_none() {
        return Err(eyre!("{} must have a host component", name));
    }

    Ok(())
}

// ============================================================================
// Descriptors
// ============================================================================

/// Native currency metadata, as wallets expect it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    fn ether() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// NTT contract addresses deployed on one network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NttDeployment {
    /// Token being bridged
    pub token: Address,
    /// NTT manager; receives the allowance and the transfer call
    pub manager: Address,
    /// Wormhole transceiver attached to the manager
    pub transceiver: Address,
}

/// Immutable description of a bridge network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDescriptor {
    /// Stable lookup key (e.g., "sepolia")
    pub key: String,
    /// Human-readable name
    pub name: String,
    /// Native EVM chain ID
    pub chain_id: u64,
    /// Wormhole chain ID used as the NTT routing identifier
    pub wormhole_chain_id: u16,
    pub contracts: NttDeployment,
    pub rpc_url: String,
    /// Block explorer base URL, without trailing path
    pub explorer_url: String,
    pub native_currency: NativeCurrency,
    pub testnet: bool,
}

impl NetworkDescriptor {
    /// EIP-3085 payload used when the wallet does not know this network yet
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: format!("{:#x}", self.chain_id),
            chain_name: self.name.clone(),
            native_currency: AddChainCurrency {
                name: self.native_currency.name.clone(),
                symbol: self.native_currency.symbol.clone(),
                decimals: self.native_currency.decimals,
            },
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls: vec![self.explorer_url.clone()],
        }
    }

    /// Validate a single descriptor
    pub fn validate(&self) -> Result<()> {
        if self.chain_id == 0 {
            return Err(eyre!("Chain ID is 0 for network {}", self.key));
        }
        if self.wormhole_chain_id == 0 {
            return Err(eyre!("Wormhole chain ID is 0 for network {}", self.key));
        }
        validate_rpc_url(&self.rpc_url, &format!("{} RPC URL", self.key))?;

        let contracts = [
            ("token", self.contracts.token),
            ("manager", self.contracts.manager),
            ("transceiver", self.contracts.transceiver),
        ];
        for (label, addr) in contracts {
            if addr == Address::ZERO {
                return Err(eyre!("{} address is zero for network {}", label, self.key));
            }
        }

        Ok(())
    }
}

impl fmt::Display for NetworkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Lookup table over the supported networks
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<NetworkDescriptor>,
    /// Index by lookup key → position in `networks`
    key_map: HashMap<String, usize>,
    /// Index by native chain ID → position in `networks`
    chain_id_map: HashMap<u64, usize>,
    /// Index by Wormhole chain ID → position in `networks`
    wormhole_id_map: HashMap<u16, usize>,
}

impl NetworkRegistry {
    /// Build a registry from descriptors, rejecting invalid or duplicate entries
    pub fn new(networks: Vec<NetworkDescriptor>) -> Result<Self> {
        let mut key_map = HashMap::new();
        let mut chain_id_map = HashMap::new();
        let mut wormhole_id_map = HashMap::new();

        for (idx, network) in networks.iter().enumerate() {
            key_map.insert(network.key.clone(), idx);
            chain_id_map.insert(network.chain_id, idx);
            wormhole_id_map.insert(network.wormhole_chain_id, idx);
        }

        let registry = Self {
            networks,
            key_map,
            chain_id_map,
            wormhole_id_map,
        };

        registry.validate()?;
        Ok(registry)
    }

    /// The networks the bridge ships with
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_networks())
    }

    /// The builtin networks with `NETWORK_<KEY>_*` environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::with_overrides(|name| std::env::var(name).ok())
    }

    /// The builtin networks with overrides taken from `lookup`
    pub fn with_overrides<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut networks = builtin_networks();

        for network in networks.iter_mut() {
            let prefix = format!("NETWORK_{}", env_key(&network.key));

            if let Some(url) = lookup(&format!("{}_RPC_URL", prefix)) {
                network.rpc_url = url;
            }

            let address_overrides = [
                ("TOKEN", &mut network.contracts.token),
                ("MANAGER", &mut network.contracts.manager),
                ("TRANSCEIVER", &mut network.contracts.transceiver),
            ];
            for (suffix, slot) in address_overrides {
                let var = format!("{}_{}", prefix, suffix);
                if let Some(raw) = lookup(&var) {
                    *slot = Address::from_str(raw.trim())
                        .wrap_err_with(|| format!("{} is not a valid address", var))?;
                }
            }
        }

        Self::new(networks)
    }

    /// Get a network by lookup key
    pub fn get(&self, key: &str) -> Option<&NetworkDescriptor> {
        self.key_map.get(key).map(|&idx| &self.networks[idx])
    }

    /// Get a network by native EVM chain ID
    pub fn by_chain_id(&self, chain_id: u64) -> Option<&NetworkDescriptor> {
        self.chain_id_map
            .get(&chain_id)
            .map(|&idx| &self.networks[idx])
    }

    /// Get a network by Wormhole chain ID
    pub fn by_wormhole_id(&self, wormhole_chain_id: u16) -> Option<&NetworkDescriptor> {
        self.wormhole_id_map
            .get(&wormhole_chain_id)
            .map(|&idx| &self.networks[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.networks.iter()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Lookup keys in display order
    pub fn keys(&self) -> Vec<&str> {
        self.networks.iter().map(|n| n.key.as_str()).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.networks.is_empty() {
            return Err(eyre!("At least one network must be configured"));
        }

        let mut seen_keys = HashSet::new();
        let mut seen_chain_ids = HashSet::new();
        let mut seen_wormhole_ids = HashSet::new();
        for network in &self.networks {
            if !seen_keys.insert(network.key.as_str()) {
                return Err(eyre!("Duplicate network key: {}", network.key));
            }
            if !seen_chain_ids.insert(network.chain_id) {
                return Err(eyre!(
                    "Duplicate chain ID: {} (network: {})",
                    network.chain_id,
                    network.key
                ));
            }
            if !seen_wormhole_ids.insert(network.wormhole_chain_id) {
                return Err(eyre!(
                    "Duplicate Wormhole chain ID: {} (network: {})",
                    network.wormhole_chain_id,
                    network.key
                ));
            }
            network.validate()?;
        }

        Ok(())
    }
}

/// `arbitrum-sepolia` → `ARBITRUM_SEPOLIA`
fn env_key(key: &str) -> String {
    key.to_uppercase().replace('-', "_")
}

fn builtin_networks() -> Vec<NetworkDescriptor> {
    vec![
        NetworkDescriptor {
            key: "sepolia".to_string(),
            name: "Sepolia".to_string(),
            chain_id: 11_155_111,
            wormhole_chain_id: 10002,
            contracts: NttDeployment {
                token: address!("738141eb2c4ad8f47a3a1ca3a8e4c0bd4d8a1c3e"),
                manager: address!("06413c42e913327bc9a08b7c1e362bafd4efd1e0"),
                transceiver: address!("649fc2fca1f3b2e8ef45cdb6b5b3f0bf2ae6a3c4"),
            },
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            explorer_url: "https://sepolia.etherscan.io".to_string(),
            native_currency: NativeCurrency::ether(),
            testnet: true,
        },
        NetworkDescriptor {
            key: "arbitrum-sepolia".to_string(),
            name: "Arbitrum Sepolia".to_string(),
            chain_id: 421_614,
            wormhole_chain_id: 10003,
            contracts: NttDeployment {
                token: address!("1d30e78b7c7fbbcef87ae6e97b5389b2e470ca4a"),
                manager: address!("b9a8a2f6d8c3a4e1a59dd1f0a3a6bd2c4a4d0c8e"),
                transceiver: address!("de3b0d4f2c2f6a2c3e9d0b7d76d8e7c3a5a0f1b2"),
            },
            rpc_url: "https://sepolia-rollup.arbitrum.io/rpc".to_string(),
            explorer_url: "https://sepolia.arbiscan.io".to_string(),
            native_currency: NativeCurrency::ether(),
            testnet: true,
        },
        NetworkDescriptor {
            key: "base-sepolia".to_string(),
            name: "Base Sepolia".to_string(),
            chain_id: 84_532,
            wormhole_chain_id: 10004,
            contracts: NttDeployment {
                token: address!("5c1c3a3e0b0d2ce5b9ee4b1a2f2c59a3a6cd9e1f"),
                manager: address!("8f0a2c76d7e4d3c9b6a1e4f3d2c1b0a9f8e7d6c5"),
                transceiver: address!("2b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b9c"),
            },
            rpc_url: "https://sepolia.base.org".to_string(),
            explorer_url: "https://sepolia.basescan.org".to_string(),
            native_currency: NativeCurrency::ether(),
            testnet: true,
        },
        NetworkDescriptor {
            key: "optimism-sepolia".to_string(),
            name: "OP Sepolia".to_string(),
            chain_id: 11_155_420,
            wormhole_chain_id: 10005,
            contracts: NttDeployment {
                token: address!("9e2d1c0b3a4f5e6d7c8b9a0f1e2d3c4b5a6f7e8d"),
                manager: address!("4a5b6c7d8e9f0a1b2c3d4e5f6a7b8c9d0e1f2a3b"),
                transceiver: address!("c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2"),
            },
            rpc_url: "https://sepolia.optimism.io".to_string(),
            explorer_url: "https://sepolia-optimism.etherscan.io".to_string(),
            native_currency: NativeCurrency::ether(),
            testnet: true,
        },
    ]
}
