//! Scripted wallet
//!
//! Records every request and answers from in-memory state, so flows can be
//! asserted call by call.

use alloy::{
    primitives::{Address, TxKind, B256, U256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::wallet::{AddChainParams, WalletError, WalletProvider};

/// A request the wallet received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
    RequestAccounts,
    ChainId,
    SwitchChain(u64),
    AddChain(u64),
    SendTransaction { to: Option<Address>, value: Option<U256> },
}

#[derive(Debug, Default)]
struct WalletState {
    active: u64,
    known: HashSet<u64>,
    calls: Vec<WalletCall>,
    sent: Vec<TransactionRequest>,
    send_failures: u32,
}

/// In-memory [`WalletProvider`]
#[derive(Debug)]
pub struct MockWallet {
    account: Address,
    reject_connect: bool,
    reject_switch: bool,
    reject_add: bool,
    /// Chain id reported regardless of the active chain
    reported_chain: Option<u64>,
    state: Mutex<WalletState>,
}

impl MockWallet {
    /// Wallet connected to `chain_id`, knowing only that chain
    pub fn on_chain(chain_id: u64) -> Self {
        let mut known = HashSet::new();
        known.insert(chain_id);
        Self {
            account: Address::repeat_byte(0x11),
            reject_connect: false,
            reject_switch: false,
            reject_add: false,
            reported_chain: None,
            state: Mutex::new(WalletState {
                active: chain_id,
                known,
                ..Default::default()
            }),
        }
    }

    /// Also know these chains, so switching needs no add
    pub fn knowing(self, chain_ids: &[u64]) -> Self {
        self.state.lock().unwrap().known.extend(chain_ids);
        self
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = account;
        self
    }

    /// Refuse `eth_requestAccounts` like a user closing the prompt
    pub fn rejecting_connect(mut self) -> Self {
        self.reject_connect = true;
        self
    }

    /// Refuse every network switch
    pub fn rejecting_switch(mut self) -> Self {
        self.reject_switch = true;
        self
    }

    /// Refuse every `wallet_addEthereumChain`
    pub fn rejecting_add(mut self) -> Self {
        self.reject_add = true;
        self
    }

    /// Answer `eth_chainId` with `chain_id` no matter which chain is active
    pub fn reporting_chain(mut self, chain_id: u64) -> Self {
        self.reported_chain = Some(chain_id);
        self
    }

    /// Fail the next `count` transaction sends
    pub fn failing_sends(self, count: u32) -> Self {
        self.state.lock().unwrap().send_failures = count;
        self
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn calls(&self) -> Vec<WalletCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn active_chain(&self) -> u64 {
        self.state.lock().unwrap().active
    }

    /// Transactions accepted by the wallet, in order
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Number of `eth_sendTransaction` requests, failed ones included
    pub fn send_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, WalletCall::SendTransaction { .. }))
            .count()
    }

    fn record(&self, call: WalletCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

/// Hash the mock wallet returns for the `n`th accepted transaction (1-based)
pub fn mock_tx_hash(n: usize) -> B256 {
    B256::left_padding_from(&(n as u64).to_be_bytes())
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.record(WalletCall::RequestAccounts);
        if self.reject_connect {
            return Err(WalletError::UserRejected);
        }
        Ok(vec![self.account])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.record(WalletCall::ChainId);
        Ok(self.reported_chain.unwrap_or_else(|| self.active_chain()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.record(WalletCall::SwitchChain(chain_id));
        if self.reject_switch {
            return Err(WalletError::UserRejected);
        }
        let mut state = self.state.lock().unwrap();
        if !state.known.contains(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        state.active = chain_id;
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        let chain_id = params.chain_id_u64()?;
        self.record(WalletCall::AddChain(chain_id));
        if self.reject_add {
            return Err(WalletError::UserRejected);
        }
        self.state.lock().unwrap().known.insert(chain_id);
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, WalletError> {
        let to = match tx.to {
            Some(TxKind::Call(addr)) => Some(addr),
            _ => None,
        };
        self.record(WalletCall::SendTransaction {
            to,
            value: tx.value,
        });

        let mut state = self.state.lock().unwrap();
        if state.send_failures > 0 {
            state.send_failures -= 1;
            return Err(WalletError::Rpc {
                code: -32000,
                message: "transaction underpriced".to_string(),
            });
        }
        state.sent.push(tx);
        Ok(mock_tx_hash(state.sent.len()))
    }
}
