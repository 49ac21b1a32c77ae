//! Transfer Orchestrator
//!
//! Runs one transfer from wallet connection to confirmed receipt:
//!
//! 1. Connect the wallet
//! 2. Put the wallet on the source network
//! 3. Check the manager, balances and allowance
//! 4. Approve the manager if the allowance is short
//! 5. Submit `NttManager.transfer` and wait for the receipt, retrying the pair
//!
//! A retry first checks the transfers already broadcast. If one of them has
//! since been mined, that one is the result and nothing is resubmitted.
//!
//! Each stage is published on the [`StatusTracker`]. Only one transfer runs at
//! a time per orchestrator.

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    rpc::types::TransactionRequest,
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use super::form::{TransferForm, TransferRequest};
use super::settings::{FeePolicy, TransferSettings};
use super::status::{StatusTracker, TransferOutcome, TransferStatus};
use crate::address_codec::{to_universal_address, RecipientAddress};
use crate::amount::{check_amount_syntax, parse_amount};
use crate::confirmation::wait_for_receipt;
use crate::error::{TransferError, TransferResult};
use crate::evm::client::{ChainReader, ChainReaderProvider, ReceiptSummary};
use crate::evm::instructions::default_instructions;
use crate::evm::tokens::{approve_request, check_funds, FundsQuery, TransferCall};
use crate::explorer;
use crate::networks::{NetworkDescriptor, NetworkRegistry};
use crate::retry::with_retry;
use crate::wallet::{connect_wallet, ensure_network, WalletProvider};

pub struct TransferOrchestrator {
    wallet: Arc<dyn WalletProvider>,
    readers: Arc<dyn ChainReaderProvider>,
    registry: Arc<NetworkRegistry>,
    settings: TransferSettings,
    status: StatusTracker,
}

impl TransferOrchestrator {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        readers: Arc<dyn ChainReaderProvider>,
        registry: Arc<NetworkRegistry>,
        settings: TransferSettings,
    ) -> Self {
        Self {
            wallet,
            readers,
            registry,
            settings,
            status: StatusTracker::new(),
        }
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    /// A form that locks while this orchestrator is busy
    pub fn form(&self, source: &str, destination: &str) -> TransferForm {
        TransferForm::new(source, destination, self.status.subscribe())
    }

    /// Run a transfer to completion
    ///
    /// The final status is `Success` or `Error`. Fails immediately with
    /// [`TransferError::TransferInProgress`] if a transfer is already running.
    pub async fn execute(&self, request: &TransferRequest) -> TransferResult<TransferOutcome> {
        self.status.try_begin()?;
        let started_at = Utc::now();

        info!(
            source = %request.source,
            destination = %request.destination,
            amount = %request.amount,
            "Starting transfer"
        );

        match self.run(request, started_at).await {
            Ok(outcome) => {
                info!(
                    tx_hash = %outcome.tx_hash,
                    attempts = outcome.attempts,
                    "Transfer confirmed"
                );
                self.status.set(TransferStatus::Success {
                    outcome: Box::new(outcome.clone()),
                });
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, "Transfer failed");
                self.status.set(TransferStatus::Error {
                    message: e.user_message().to_string(),
                });
                Err(e)
            }
        }
    }

    fn resolve_route(
        &self,
        request: &TransferRequest,
    ) -> TransferResult<(&NetworkDescriptor, &NetworkDescriptor)> {
        let lookup = |key: &str| {
            self.registry
                .get(key)
                .ok_or_else(|| TransferError::UnknownNetwork(key.to_string()))
        };
        let source = lookup(&request.source)?;
        let destination = lookup(&request.destination)?;

        if source.chain_id == destination.chain_id {
            return Err(TransferError::SameNetwork(source.name.clone()));
        }
        Ok((source, destination))
    }

    async fn run(
        &self,
        request: &TransferRequest,
        started_at: DateTime<Utc>,
    ) -> TransferResult<TransferOutcome> {
        let (source, destination) = self.resolve_route(request)?;

        // Malformed destinations fail before the wallet is touched
        let explicit_recipient = request
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(RecipientAddress::parse)
            .transpose()?;
        check_amount_syntax(&request.amount)?;

        let account = connect_wallet(self.wallet.as_ref()).await?;
        let recipient = match explicit_recipient {
            Some(recipient) => recipient,
            None => RecipientAddress::from_address(account)?,
        };

        self.status.set(TransferStatus::SwitchingNetwork);
        ensure_network(self.wallet.as_ref(), source).await?;

        self.status.set(TransferStatus::CheckingBalances);
        let reader = self
            .readers
            .reader_for(source)
            .map_err(TransferError::rpc)?;
        let contracts = source.contracts;

        let initialized = reader
            .manager_initialized(contracts.manager)
            .await
            .map_err(TransferError::rpc)?;
        if !initialized {
            return Err(TransferError::BridgeNotInitialized(source.name.clone()));
        }

        let decimals = reader
            .token_decimals(contracts.token)
            .await
            .map_err(TransferError::rpc)?;
        let amount = parse_amount(&request.amount, decimals)?;

        let instructions = default_instructions(self.settings.relay)
            .map_err(|e| TransferError::TransactionFailed(e.to_string()))?;
        let fee = self
            .resolve_fee(reader.as_ref(), source, destination, &instructions)
            .await?;

        let funds = check_funds(
            reader.as_ref(),
            source,
            &FundsQuery {
                owner: account,
                amount,
                token_decimals: decimals,
                native_fee: fee,
                gas_limit: self.settings.gas_limit,
            },
        )
        .await?;

        let approval_tx_hash = if funds.needs_approval {
            Some(
                self.approve(reader.as_ref(), source, account, amount, funds.allowance)
                    .await?,
            )
        } else {
            debug!(allowance = %funds.allowance, "Allowance covers amount, skipping approval");
            None
        };

        let call = TransferCall {
            amount,
            recipient_chain: destination.wormhole_chain_id,
            recipient: recipient.to_universal(),
            refund_address: to_universal_address(account),
            should_queue: self.settings.should_queue,
            instructions,
        };
        let tx = call.request(account, contracts.manager, fee, self.settings.gas_limit);

        let submitted = Mutex::new(Vec::new());
        let (tx_hash, receipt, attempts) = with_retry(&self.settings.retry, |attempt| {
            let tx = tx.clone();
            let reader = reader.clone();
            let submitted = &submitted;
            async move {
                if attempt > 0 {
                    if let Some(receipt) = self.find_mined(reader.as_ref(), submitted).await {
                        return Ok((receipt.tx_hash, receipt, attempt + 1));
                    }
                }
                self.submit_and_confirm(tx, reader.as_ref(), submitted, attempt + 1)
                    .await
            }
        })
        .await?;

        Ok(TransferOutcome {
            source: source.key.clone(),
            destination: destination.key.clone(),
            amount: request.amount.trim().to_string(),
            amount_units: amount,
            recipient: recipient.address(),
            tx_hash,
            approval_tx_hash,
            attempts,
            block_number: receipt.block_number,
            explorer_url: explorer::tx_url(source, &tx_hash),
            wormholescan_url: explorer::wormholescan_url(&tx_hash, source.testnet),
            started_at,
            completed_at: Utc::now(),
        })
    }

    async fn resolve_fee(
        &self,
        reader: &dyn ChainReader,
        source: &NetworkDescriptor,
        destination: &NetworkDescriptor,
        instructions: &Bytes,
    ) -> TransferResult<U256> {
        match self.settings.fee {
            FeePolicy::Fixed(wei) => Ok(wei),
            FeePolicy::Quoted => {
                let quote = reader
                    .quote_delivery_price(
                        source.contracts.manager,
                        destination.wormhole_chain_id,
                        instructions.clone(),
                    )
                    .await
                    .map_err(TransferError::rpc)?;
                info!(fee = %quote, destination = %destination.key, "Using quoted delivery fee");
                Ok(quote)
            }
        }
    }

    /// Approve the manager for exactly `amount` and wait for it to be mined
    async fn approve(
        &self,
        reader: &dyn ChainReader,
        source: &NetworkDescriptor,
        owner: Address,
        amount: U256,
        current_allowance: U256,
    ) -> TransferResult<B256> {
        self.status.set(TransferStatus::Approving);
        info!(
            token = %source.contracts.token,
            spender = %source.contracts.manager,
            allowance = %current_allowance,
            amount = %amount,
            "Approving NTT manager"
        );

        let tx = approve_request(
            owner,
            source.contracts.token,
            source.contracts.manager,
            amount,
        );
        let hash = self
            .wallet
            .send_transaction(tx)
            .await
            .map_err(|e| TransferError::ApprovalFailed(e.to_string()))?;

        wait_for_receipt(reader, hash, &self.settings.confirmation)
            .await
            .map_err(|e| TransferError::ApprovalFailed(e.to_string()))?;

        Ok(hash)
    }

    /// One receipt poll per earlier submission; the first successful one wins
    async fn find_mined(
        &self,
        reader: &dyn ChainReader,
        submitted: &Mutex<Vec<B256>>,
    ) -> Option<ReceiptSummary> {
        let hashes = submitted.lock().map(|h| h.clone()).unwrap_or_default();
        for tx_hash in hashes {
            match reader.receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.success => {
                    info!(tx_hash = %tx_hash, "Earlier transfer was mined, not resubmitting");
                    return Some(receipt);
                }
                Ok(Some(_)) => debug!(tx_hash = %tx_hash, "Earlier transfer reverted"),
                Ok(None) => debug!(tx_hash = %tx_hash, "Earlier transfer still pending"),
                Err(e) => warn!(tx_hash = %tx_hash, error = %e, "Receipt check failed"),
            }
        }
        None
    }

    async fn submit_and_confirm(
        &self,
        tx: TransactionRequest,
        reader: &dyn ChainReader,
        submitted: &Mutex<Vec<B256>>,
        attempt: u32,
    ) -> TransferResult<(B256, ReceiptSummary, u32)> {
        self.status.set(TransferStatus::Transferring { attempt });

        let tx_hash = self
            .wallet
            .send_transaction(tx)
            .await
            .map_err(TransferError::from_send)?;
        info!(tx_hash = %tx_hash, attempt, "Transfer submitted");
        if let Ok(mut hashes) = submitted.lock() {
            hashes.push(tx_hash);
        }

        self.status.set(TransferStatus::Confirming { tx_hash });
        let receipt = wait_for_receipt(reader, tx_hash, &self.settings.confirmation)
            .await
            .inspect_err(|e| warn!(tx_hash = %tx_hash, error = %e, "Transfer not confirmed"))?;

        Ok((tx_hash, receipt, attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::ConfirmationConfig;
    use crate::evm::contracts::{NttManager, ERC20};
    use crate::retry::RetryConfig;
    use crate::testing::{mock_tx_hash, MockChain, MockWallet, WalletCall};
    use alloy::primitives::TxKind;
    use alloy::sol_types::SolCall;
    use std::time::Duration;

    const RECIPIENT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn test_settings() -> TransferSettings {
        TransferSettings {
            retry: RetryConfig {
                max_retries: 3,
                delay: Duration::ZERO,
            },
            confirmation: ConfirmationConfig {
                poll_interval: Duration::from_millis(1),
                timeout: Duration::from_secs(5),
            },
            ..TransferSettings::default()
        }
    }

    fn registry() -> Arc<NetworkRegistry> {
        Arc::new(NetworkRegistry::builtin().unwrap())
    }

    fn sepolia_id() -> u64 {
        registry().get("sepolia").unwrap().chain_id
    }

    fn setup(
        wallet: MockWallet,
        chain: MockChain,
        settings: TransferSettings,
    ) -> (TransferOrchestrator, Arc<MockWallet>) {
        let wallet = Arc::new(wallet);
        let orchestrator = TransferOrchestrator::new(
            wallet.clone(),
            Arc::new(chain),
            registry(),
            settings,
        );
        (orchestrator, wallet)
    }

    fn request(amount: &str, recipient: Option<&str>) -> TransferRequest {
        TransferRequest {
            amount: amount.to_string(),
            source: "sepolia".to_string(),
            destination: "base-sepolia".to_string(),
            recipient: recipient.map(str::to_string),
        }
    }

    fn sends(wallet: &MockWallet) -> Vec<WalletCall> {
        wallet
            .calls()
            .into_iter()
            .filter(|c| matches!(c, WalletCall::SendTransaction { .. }))
            .collect()
    }

    #[tokio::test]
    async fn test_transfer_without_approval() {
        let chain = MockChain::funded()
            .with_allowance(U256::from(10_000_000u64))
            .confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let outcome = orchestrator
            .execute(&request("10", Some(RECIPIENT)))
            .await
            .unwrap();

        let manager = registry().get("sepolia").unwrap().contracts.manager;
        assert_eq!(
            sends(&wallet),
            vec![WalletCall::SendTransaction {
                to: Some(manager),
                value: Some(U256::from(500_000_000_000_000u64)),
            }]
        );
        assert_eq!(outcome.approval_tx_hash, None);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.amount_units, U256::from(10_000_000u64));
        assert_eq!(outcome.recipient, RECIPIENT.parse::<Address>().unwrap());
        assert!(outcome.explorer_url.starts_with("https://sepolia.etherscan.io/tx/"));
        assert!(matches!(
            orchestrator.status().current(),
            TransferStatus::Success { .. }
        ));
    }

    #[tokio::test]
    async fn test_transfer_call_arguments() {
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        orchestrator
            .execute(&request("1.5", Some(RECIPIENT)))
            .await
            .unwrap();

        let sent = wallet.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].gas, Some(500_000));

        let decoded = NttManager::transferCall::abi_decode(
            sent[0].input.input().unwrap(),
            true,
        )
        .unwrap();
        assert_eq!(decoded.amount, U256::from(1_500_000u64));
        assert_eq!(decoded.recipientChain, 10004);
        assert_eq!(
            decoded.recipient,
            RECIPIENT.parse::<Address>().unwrap().into_word()
        );
        assert_eq!(decoded.refundAddress, wallet.account().into_word());
        assert!(!decoded.shouldQueue);
        assert_eq!(
            decoded.transceiverInstructions,
            Bytes::from(vec![0x01, 0x00, 0x01, 0x01])
        );
    }

    #[tokio::test]
    async fn test_approval_when_allowance_short() {
        let chain = MockChain::funded()
            .with_allowance(U256::from(9_999_999u64))
            .confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let outcome = orchestrator.execute(&request("10", None)).await.unwrap();

        let sepolia = registry().get("sepolia").unwrap().clone();
        let sent = wallet.sent_transactions();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, Some(TxKind::Call(sepolia.contracts.token)));

        let approve = ERC20::approveCall::abi_decode(sent[0].input.input().unwrap(), true).unwrap();
        assert_eq!(approve.spender, sepolia.contracts.manager);
        assert_eq!(approve.amount, U256::from(10_000_000u64));

        assert_eq!(sent[1].to, Some(TxKind::Call(sepolia.contracts.manager)));
        assert_eq!(outcome.approval_tx_hash, Some(mock_tx_hash(1)));
        assert_eq!(outcome.tx_hash, mock_tx_hash(2));
        // No recipient given: tokens go to the connected account
        assert_eq!(outcome.recipient, wallet.account());
    }

    #[tokio::test]
    async fn test_insufficient_native_blocks_transfer() {
        let chain = MockChain::funded()
            .with_native_balance(U256::from(1_000u64))
            .confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let err = orchestrator.execute(&request("10", None)).await.unwrap_err();

        assert!(matches!(err, TransferError::InsufficientNativeBalance { .. }));
        assert!(sends(&wallet).is_empty());
        assert_eq!(
            orchestrator.status().current(),
            TransferStatus::Error {
                message: "Insufficient balance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_insufficient_token_blocks_transfer() {
        let chain = MockChain::funded()
            .with_token_balance(U256::from(5u64))
            .confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let err = orchestrator.execute(&request("10", None)).await.unwrap_err();
        assert_eq!(err.user_message(), "Insufficient balance");
        assert!(sends(&wallet).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_wallet() {
        let chain = MockChain::funded().confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain.clone(), test_settings());

        let err = orchestrator
            .execute(&request("10", Some("0x1234")))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::InvalidAddress(_)));
        assert!(wallet.calls().is_empty());
        assert!(chain.networks_served().is_empty());
        assert_eq!(
            orchestrator.status().current(),
            TransferStatus::Error {
                message: "Invalid address format".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_submit_retries_then_succeeds() {
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .confirming_all();
        let wallet = MockWallet::on_chain(sepolia_id()).failing_sends(2);
        let (orchestrator, wallet) = setup(wallet, chain, test_settings());

        let outcome = orchestrator.execute(&request("10", None)).await.unwrap();

        assert_eq!(wallet.send_attempts(), 3);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn test_submit_gives_up_after_max_retries() {
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .confirming_all();
        let wallet = MockWallet::on_chain(sepolia_id()).failing_sends(100);
        let (orchestrator, wallet) = setup(wallet, chain, test_settings());

        let err = orchestrator.execute(&request("10", None)).await.unwrap_err();

        assert_eq!(wallet.send_attempts(), 4);
        assert!(matches!(err, TransferError::TransactionFailed(_)));
        assert_eq!(
            orchestrator.status().current(),
            TransferStatus::Error {
                message: "Transaction failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_reverted_submission_is_retried() {
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .confirming_all()
            .reverting_first(1);
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let outcome = orchestrator.execute(&request("10", None)).await.unwrap();

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.tx_hash, mock_tx_hash(2));
        assert_eq!(wallet.sent_transactions().len(), 2);
    }

    fn impatient_settings() -> TransferSettings {
        TransferSettings {
            confirmation: ConfirmationConfig {
                poll_interval: Duration::from_secs(1),
                timeout: Duration::from_millis(10),
            },
            ..test_settings()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mined_earlier_transfer_is_not_resubmitted() {
        // First wait gives up after one empty poll; the next poll finds it mined
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .with_receipt_after(mock_tx_hash(1), 1, true);
        let (orchestrator, wallet) = setup(
            MockWallet::on_chain(sepolia_id()),
            chain.clone(),
            impatient_settings(),
        );

        let outcome = orchestrator.execute(&request("10", None)).await.unwrap();

        assert_eq!(wallet.sent_transactions().len(), 1);
        assert_eq!(outcome.tx_hash, mock_tx_hash(1));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(chain.receipt_polls(mock_tx_hash(1)), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_earlier_transfer_is_resubmitted() {
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .with_receipt_after(mock_tx_hash(1), 100, true)
            .with_receipt_after(mock_tx_hash(2), 0, true);
        let (orchestrator, wallet) = setup(
            MockWallet::on_chain(sepolia_id()),
            chain,
            impatient_settings(),
        );

        let outcome = orchestrator.execute(&request("10", None)).await.unwrap();

        assert_eq!(wallet.sent_transactions().len(), 2);
        assert_eq!(outcome.tx_hash, mock_tx_hash(2));
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test]
    async fn test_sent_transactions_name_the_sender() {
        let chain = MockChain::funded().confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        orchestrator.execute(&request("10", None)).await.unwrap();

        let sent = wallet.sent_transactions();
        assert_eq!(sent.len(), 2);
        let account = serde_json::to_value(wallet.account()).unwrap();
        for tx in &sent {
            let params = serde_json::to_value(tx).unwrap();
            assert_eq!(params.get("from"), Some(&account), "{}", params);
        }
    }

    #[tokio::test]
    async fn test_unparseable_amount_rejected_before_wallet() {
        let chain = MockChain::funded().confirming_all();
        for amount in ["abc", "-1", ""] {
            let (orchestrator, wallet) = setup(
                MockWallet::on_chain(sepolia_id()),
                chain.clone(),
                test_settings(),
            );

            let err = orchestrator
                .execute(&request(amount, None))
                .await
                .unwrap_err();
            assert!(matches!(err, TransferError::InvalidAmount(_)), "{:?}", amount);
            assert!(wallet.calls().is_empty());
        }
        assert!(chain.networks_served().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_while_in_progress() {
        let chain = MockChain::funded().confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());
        orchestrator.status().set(TransferStatus::Approving);

        let err = orchestrator.execute(&request("10", None)).await.unwrap_err();

        assert!(matches!(err, TransferError::TransferInProgress));
        assert!(wallet.calls().is_empty());
        assert_eq!(orchestrator.status().current(), TransferStatus::Approving);
    }

    #[tokio::test]
    async fn test_form_locked_during_transfer() {
        let chain = MockChain::funded().confirming_all();
        let (orchestrator, _wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());
        let mut form = orchestrator.form("sepolia", "base-sepolia");
        form.set_amount("10").unwrap();

        orchestrator.status().set(TransferStatus::Transferring { attempt: 1 });
        assert!(form.set_amount("11").is_err());

        orchestrator.status().set(TransferStatus::Idle);
        let outcome = orchestrator.execute(&form.request()).await.unwrap();
        assert_eq!(outcome.amount, "10");
        assert!(!form.is_locked());
    }

    #[tokio::test]
    async fn test_switches_and_adds_source_network() {
        let base_id = registry().get("base-sepolia").unwrap().chain_id;
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(base_id), chain, test_settings());

        orchestrator.execute(&request("1", None)).await.unwrap();

        assert_eq!(wallet.active_chain(), sepolia_id());
        assert!(wallet.calls().contains(&WalletCall::AddChain(sepolia_id())));
    }

    #[tokio::test]
    async fn test_same_network_rejected() {
        let chain = MockChain::funded();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());
        let mut req = request("1", None);
        req.destination = "sepolia".to_string();

        let err = orchestrator.execute(&req).await.unwrap_err();
        assert!(matches!(err, TransferError::SameNetwork(_)));
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_uninitialized_manager_blocks_transfer() {
        let chain = MockChain::funded().uninitialized().confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let err = orchestrator.execute(&request("1", None)).await.unwrap_err();
        assert!(matches!(err, TransferError::BridgeNotInitialized(_)));
        assert!(sends(&wallet).is_empty());
    }

    #[tokio::test]
    async fn test_amount_precision_checked_against_token() {
        let chain = MockChain::funded().with_decimals(2).confirming_all();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let err = orchestrator
            .execute(&request("1.005", None))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid amount");
        assert!(sends(&wallet).is_empty());
    }

    #[tokio::test]
    async fn test_quoted_fee_sent_as_value() {
        let quote = U256::from(123_456_789u64);
        let chain = MockChain::funded()
            .with_allowance(U256::MAX)
            .with_quote(quote)
            .confirming_all();
        let settings = TransferSettings {
            fee: FeePolicy::Quoted,
            ..test_settings()
        };
        let (orchestrator, wallet) = setup(MockWallet::on_chain(sepolia_id()), chain, settings);

        orchestrator.execute(&request("1", None)).await.unwrap();
        assert_eq!(wallet.sent_transactions()[0].value, Some(quote));
    }

    #[tokio::test]
    async fn test_rejected_connection() {
        let chain = MockChain::funded();
        let wallet = MockWallet::on_chain(sepolia_id()).rejecting_connect();
        let (orchestrator, _wallet) = setup(wallet, chain, test_settings());

        let err = orchestrator.execute(&request("1", None)).await.unwrap_err();
        assert_eq!(err.user_message(), "Wallet connection failed");
    }

    #[tokio::test]
    async fn test_rpc_failure_surfaces_as_transaction_failed() {
        let chain = MockChain::funded().failing_reads();
        let (orchestrator, wallet) =
            setup(MockWallet::on_chain(sepolia_id()), chain, test_settings());

        let err = orchestrator.execute(&request("1", None)).await.unwrap_err();
        assert!(matches!(err, TransferError::Rpc(_)));
        assert!(sends(&wallet).is_empty());
    }
}
