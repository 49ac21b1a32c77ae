//! EVM RPC Reads
//!
//! [`ChainReader`] is every read the transfer flow makes against a source
//! network: balances, allowance, manager state, fee quotes and receipts.
//! [`EvmChainReader`] answers them over JSON-RPC with alloy.

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::evm::contracts::{NttManager, ERC20};
use crate::networks::NetworkDescriptor;

/// The parts of a transaction receipt the flow cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    /// `false` when the transaction reverted
    pub success: bool,
}

/// Read access to one network
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native currency balance in wei
    async fn native_balance(&self, account: Address) -> Result<U256>;

    /// Current gas price in wei
    async fn gas_price(&self) -> Result<u128>;

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Whether the NTT manager behind `manager` is initialized
    async fn manager_initialized(&self, manager: Address) -> Result<bool>;

    /// Total native fee the manager asks for a transfer to `recipient_chain`
    async fn quote_delivery_price(
        &self,
        manager: Address,
        recipient_chain: u16,
        instructions: Bytes,
    ) -> Result<U256>;

    /// Receipt for `tx_hash`, if mined
    async fn receipt(&self, tx_hash: B256) -> Result<Option<ReceiptSummary>>;
}

/// Hands out a reader for a network
pub trait ChainReaderProvider: Send + Sync {
    fn reader_for(&self, network: &NetworkDescriptor) -> Result<Arc<dyn ChainReader>>;
}

/// JSON-RPC reader for one EVM network
pub struct EvmChainReader {
    /// The alloy provider
    pub provider: RootProvider<Http<Client>>,
    /// Chain ID
    pub chain_id: u64,
}

impl EvmChainReader {
    /// Create a reader for `rpc_url`
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );

        info!(rpc_url = %rpc_url, chain_id = chain_id, "Created EVM chain reader");

        Ok(Self { provider, chain_id })
    }

    /// Confirm the endpoint serves the expected chain
    pub async fn verify_chain_id(&self) -> Result<()> {
        let remote = self.provider.get_chain_id().await?;
        if remote != self.chain_id {
            return Err(eyre!(
                "RPC serves chain {} but {} was expected",
                remote,
                self.chain_id
            ));
        }
        Ok(())
    }

    /// Get the current block number
    pub async fn get_block_number(&self) -> Result<u64> {
        let block = self.provider.get_block_number().await?;
        Ok(block)
    }

    /// Get token symbol
    pub async fn token_symbol(&self, token: Address) -> Result<String> {
        let contract = ERC20::new(token, &self.provider);
        let symbol = contract
            .symbol()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get symbol: {}", e))?;
        Ok(symbol._0)
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn native_balance(&self, account: Address) -> Result<U256> {
        let balance = self.provider.get_balance(account).await?;
        Ok(balance)
    }

    async fn gas_price(&self) -> Result<u128> {
        let price = self.provider.get_gas_price().await?;
        Ok(price)
    }

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256> {
        let contract = ERC20::new(token, &self.provider);
        let balance = contract
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get balance: {}", e))?;
        Ok(balance._0)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let contract = ERC20::new(token, &self.provider);
        let decimals = contract
            .decimals()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get decimals: {}", e))?;
        Ok(decimals._0)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let contract = ERC20::new(token, &self.provider);
        let allowance = contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get allowance: {}", e))?;
        Ok(allowance._0)
    }

    async fn manager_initialized(&self, manager: Address) -> Result<bool> {
        let contract = NttManager::new(manager, &self.provider);
        let initialized = contract
            .isInitialized()
            .call()
            .await
            .map_err(|e| eyre!("Failed to query manager state: {}", e))?;
        Ok(initialized._0)
    }

    async fn quote_delivery_price(
        &self,
        manager: Address,
        recipient_chain: u16,
        instructions: Bytes,
    ) -> Result<U256> {
        let contract = NttManager::new(manager, &self.provider);
        let quote = contract
            .quoteDeliveryPrice(recipient_chain, instructions)
            .call()
            .await
            .map_err(|e| eyre!("Failed to quote delivery price: {}", e))?;
        debug!(
            per_transceiver = ?quote._0,
            total = %quote._1,
            "Delivery price quoted"
        );
        Ok(quote._1)
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<ReceiptSummary>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.map(|r| ReceiptSummary {
            tx_hash: r.transaction_hash,
            block_number: r.block_number,
            success: r.status(),
        }))
    }
}

/// Creates one [`EvmChainReader`] per network and reuses it
#[derive(Default)]
pub struct RpcReaders {
    cache: Mutex<HashMap<u64, Arc<dyn ChainReader>>>,
}

impl RpcReaders {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainReaderProvider for RpcReaders {
    fn reader_for(&self, network: &NetworkDescriptor) -> Result<Arc<dyn ChainReader>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| eyre!("Chain reader cache lock poisoned"))?;

        if let Some(reader) = cache.get(&network.chain_id) {
            return Ok(reader.clone());
        }

        let reader: Arc<dyn ChainReader> =
            Arc::new(EvmChainReader::new(&network.rpc_url, network.chain_id)?);
        cache.insert(network.chain_id, reader.clone());
        Ok(reader)
    }
}
