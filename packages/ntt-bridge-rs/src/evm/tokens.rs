//! Balance, Allowance and Call Builders
//!
//! [`check_funds`] gathers everything the flow must know before signing
//! anything. The request builders produce unsigned transactions for the
//! wallet to sign.

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    rpc::types::{TransactionInput, TransactionRequest},
    sol_types::SolCall,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::amount::format_amount;
use crate::error::{TransferError, TransferResult};
use crate::evm::client::ChainReader;
use crate::evm::contracts::{NttManager, ERC20};
use crate::networks::NetworkDescriptor;

/// What a transfer needs from the owner's account
#[derive(Debug, Clone, Copy)]
pub struct FundsQuery {
    pub owner: Address,
    /// Raw token units to bridge
    pub amount: U256,
    pub token_decimals: u8,
    /// Native fee sent as `msg.value`
    pub native_fee: U256,
    /// Gas ceiling of the transfer transaction
    pub gas_limit: u64,
}

/// Result of a successful funds check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundsReport {
    pub native_balance: U256,
    /// `native_fee + gas_limit * gas_price`
    pub native_required: U256,
    pub token_balance: U256,
    pub allowance: U256,
    pub token_decimals: u8,
    /// Allowance is below the amount
    pub needs_approval: bool,
}

/// Native amount the transfer can consume at `gas_price`
pub fn required_native(native_fee: U256, gas_limit: u64, gas_price: u128) -> U256 {
    native_fee.saturating_add(U256::from(gas_limit).saturating_mul(U256::from(gas_price)))
}

/// Read balances and allowance, failing if either balance is short
pub async fn check_funds(
    reader: &dyn ChainReader,
    network: &NetworkDescriptor,
    query: &FundsQuery,
) -> TransferResult<FundsReport> {
    let contracts = &network.contracts;

    let native_balance = reader
        .native_balance(query.owner)
        .await
        .map_err(TransferError::rpc)?;
    let gas_price = reader.gas_price().await.map_err(TransferError::rpc)?;
    let native_required = required_native(query.native_fee, query.gas_limit, gas_price);

    if native_balance < native_required {
        let decimals = network.native_currency.decimals;
        warn!(
            network = %network.key,
            balance = %native_balance,
            required = %native_required,
            "Insufficient native balance"
        );
        return Err(TransferError::InsufficientNativeBalance {
            symbol: network.native_currency.symbol.clone(),
            required: format_amount(native_required, decimals),
            available: format_amount(native_balance, decimals),
        });
    }

    let token_balance = reader
        .token_balance(contracts.token, query.owner)
        .await
        .map_err(TransferError::rpc)?;

    if token_balance < query.amount {
        warn!(
            network = %network.key,
            balance = %token_balance,
            required = %query.amount,
            "Insufficient token balance"
        );
        return Err(TransferError::InsufficientTokenBalance {
            required: format_amount(query.amount, query.token_decimals),
            available: format_amount(token_balance, query.token_decimals),
        });
    }

    let allowance = reader
        .allowance(contracts.token, query.owner, contracts.manager)
        .await
        .map_err(TransferError::rpc)?;

    let report = FundsReport {
        native_balance,
        native_required,
        token_balance,
        allowance,
        token_decimals: query.token_decimals,
        needs_approval: allowance < query.amount,
    };

    debug!(
        network = %network.key,
        native_balance = %report.native_balance,
        native_required = %report.native_required,
        token_balance = %report.token_balance,
        allowance = %report.allowance,
        needs_approval = report.needs_approval,
        "Funds check passed"
    );

    Ok(report)
}

/// `approve(spender, amount)` on `token`, sent by `owner`
pub fn approve_request(
    owner: Address,
    token: Address,
    spender: Address,
    amount: U256,
) -> TransactionRequest {
    let data = ERC20::approveCall { spender, amount }.abi_encode();
    TransactionRequest::default()
        .from(owner)
        .to(token)
        .input(TransactionInput::both(Bytes::from(data)))
}

/// Arguments of `NttManager.transfer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    pub amount: U256,
    pub recipient_chain: u16,
    pub recipient: B256,
    pub refund_address: B256,
    pub should_queue: bool,
    pub instructions: Bytes,
}

impl TransferCall {
    pub fn calldata(&self) -> Bytes {
        let call = NttManager::transferCall {
            amount: self.amount,
            recipientChain: self.recipient_chain,
            recipient: self.recipient,
            refundAddress: self.refund_address,
            shouldQueue: self.should_queue,
            transceiverInstructions: self.instructions.clone(),
        };
        Bytes::from(call.abi_encode())
    }

    /// Payable call from `sender` to `manager` carrying `fee` and a fixed gas ceiling
    pub fn request(
        &self,
        sender: Address,
        manager: Address,
        fee: U256,
        gas_limit: u64,
    ) -> TransactionRequest {
        TransactionRequest::default()
            .from(sender)
            .to(manager)
            .input(TransactionInput::both(self.calldata()))
            .value(fee)
            .gas_limit(gas_limit)
    }
}
