//! In-memory chain state
//!
//! [`MockChain`] answers [`ChainReader`] queries from configured values and
//! doubles as a [`ChainReaderProvider`] that serves the same state for every
//! network. Clones share state.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::evm::client::{ChainReader, ChainReaderProvider, ReceiptSummary};
use crate::networks::NetworkDescriptor;

/// Receipt outcome for a hash: polls that return nothing, then the status
#[derive(Debug, Clone, Copy)]
struct ScriptedReceipt {
    pending_polls: u32,
    success: bool,
}

#[derive(Debug)]
struct ChainState {
    native_balance: U256,
    gas_price: u128,
    token_balance: U256,
    token_decimals: u8,
    allowance: U256,
    initialized: bool,
    quote: U256,
    fail_reads: bool,
    receipts: HashMap<B256, ScriptedReceipt>,
    /// Status for hashes with no scripted receipt, if any
    auto_confirm: Option<bool>,
    /// Unscripted receipts that revert before `auto_confirm` applies
    reverts_remaining: u32,
    receipt_polls: HashMap<B256, u32>,
    networks_served: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    /// 10 ETH, 1 gwei gas, 1,000,000 tokens with 6 decimals, no allowance
    pub fn funded() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChainState {
                native_balance: U256::from(10_000_000_000_000_000_000u128),
                gas_price: 1_000_000_000,
                token_balance: U256::from(1_000_000_000_000u64),
                token_decimals: 6,
                allowance: U256::ZERO,
                initialized: true,
                quote: U256::from(100_000_000_000_000u64),
                fail_reads: false,
                receipts: HashMap::new(),
                auto_confirm: None,
                reverts_remaining: 0,
                receipt_polls: HashMap::new(),
                networks_served: Vec::new(),
            })),
        }
    }

    fn update(self, f: impl FnOnce(&mut ChainState)) -> Self {
        f(&mut *self.state.lock().unwrap());
        self
    }

    pub fn with_native_balance(self, balance: U256) -> Self {
        self.update(|s| s.native_balance = balance)
    }

    pub fn with_gas_price(self, gas_price: u128) -> Self {
        self.update(|s| s.gas_price = gas_price)
    }

    pub fn with_token_balance(self, balance: U256) -> Self {
        self.update(|s| s.token_balance = balance)
    }

    pub fn with_decimals(self, decimals: u8) -> Self {
        self.update(|s| s.token_decimals = decimals)
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        self.update(|s| s.allowance = allowance)
    }

    /// Value returned by `quoteDeliveryPrice`
    pub fn with_quote(self, quote: U256) -> Self {
        self.update(|s| s.quote = quote)
    }

    pub fn uninitialized(self) -> Self {
        self.update(|s| s.initialized = false)
    }

    /// Every balance read fails like an unreachable RPC
    pub fn failing_reads(self) -> Self {
        self.update(|s| s.fail_reads = true)
    }

    /// `hash` gets a receipt after `pending_polls` empty polls
    pub fn with_receipt_after(self, hash: B256, pending_polls: u32, success: bool) -> Self {
        self.update(|s| {
            s.receipts.insert(
                hash,
                ScriptedReceipt {
                    pending_polls,
                    success,
                },
            );
        })
    }

    /// Any hash without a scripted receipt is mined successfully on first poll
    pub fn confirming_all(self) -> Self {
        self.update(|s| s.auto_confirm = Some(true))
    }

    /// The first `count` unscripted receipts are reverts
    pub fn reverting_first(self, count: u32) -> Self {
        self.update(|s| s.reverts_remaining = count)
    }

    pub fn receipt_polls(&self, hash: B256) -> u32 {
        self.state
            .lock()
            .unwrap()
            .receipt_polls
            .get(&hash)
            .copied()
            .unwrap_or(0)
    }

    /// Keys of the networks readers were requested for
    pub fn networks_served(&self) -> Vec<String> {
        self.state.lock().unwrap().networks_served.clone()
    }

    fn read<T>(&self, f: impl FnOnce(&ChainState) -> T) -> Result<T> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(eyre!("connection refused"));
        }
        Ok(f(&*state))
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn native_balance(&self, _account: Address) -> Result<U256> {
        self.read(|s| s.native_balance)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.read(|s| s.gas_price)
    }

    async fn token_balance(&self, _token: Address, _account: Address) -> Result<U256> {
        self.read(|s| s.token_balance)
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8> {
        self.read(|s| s.token_decimals)
    }

    async fn allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        self.read(|s| s.allowance)
    }

    async fn manager_initialized(&self, _manager: Address) -> Result<bool> {
        self.read(|s| s.initialized)
    }

    async fn quote_delivery_price(
        &self,
        _manager: Address,
        _recipient_chain: u16,
        _instructions: Bytes,
    ) -> Result<U256> {
        self.read(|s| s.quote)
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<ReceiptSummary>> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let polls = {
            let counter = state.receipt_polls.entry(tx_hash).or_insert(0);
            *counter += 1;
            *counter
        };

        let success = match state.receipts.get(&tx_hash).copied() {
            Some(scripted) if polls > scripted.pending_polls => scripted.success,
            Some(_) => return Ok(None),
            None => match state.auto_confirm {
                Some(status) => {
                    if polls == 1 && state.reverts_remaining > 0 {
                        state.reverts_remaining -= 1;
                        state.receipts.insert(
                            tx_hash,
                            ScriptedReceipt {
                                pending_polls: 0,
                                success: false,
                            },
                        );
                        false
                    } else {
                        status
                    }
                }
                None => return Ok(None),
            },
        };

        Ok(Some(ReceiptSummary {
            tx_hash,
            block_number: Some(100 + polls as u64),
            success,
        }))
    }
}

impl ChainReaderProvider for MockChain {
    fn reader_for(&self, network: &NetworkDescriptor) -> Result<Arc<dyn ChainReader>> {
        self.state
            .lock()
            .unwrap()
            .networks_served
            .push(network.key.clone());
        Ok(Arc::new(self.clone()))
    }
}
