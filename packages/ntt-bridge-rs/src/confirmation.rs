//! Receipt polling
//!
//! A submitted transaction is confirmed once the source network returns a
//! receipt for it. A receipt with a failed status is a revert.

use alloy::primitives::B256;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{TransferError, TransferResult};
use crate::evm::client::{ChainReader, ReceiptSummary};

/// Receipt polling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationConfig {
    pub poll_interval: Duration,
    /// Give up after this long without a receipt
    pub timeout: Duration,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(180),
        }
    }
}

/// Poll until `tx_hash` has a receipt
///
/// RPC errors while polling are logged and polled through; only a revert or
/// the timeout ends the wait with an error.
pub async fn wait_for_receipt(
    reader: &dyn ChainReader,
    tx_hash: B256,
    config: &ConfirmationConfig,
) -> TransferResult<ReceiptSummary> {
    let poll = async {
        let mut polls = 0u32;
        loop {
            polls += 1;
            match reader.receipt(tx_hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => debug!(tx_hash = %tx_hash, polls, "Receipt not available yet"),
                Err(e) => warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
            }
            tokio::time::sleep(config.poll_interval).await;
        }
    };

    let receipt = tokio::time::timeout(config.timeout, poll)
        .await
        .map_err(|_| {
            TransferError::TransactionFailed(format!(
                "{} not confirmed after {:?}",
                tx_hash, config.timeout
            ))
        })?;

    if !receipt.success {
        warn!(tx_hash = %tx_hash, block = ?receipt.block_number, "Transaction reverted");
        return Err(TransferError::TransactionFailed(format!(
            "{} reverted",
            tx_hash
        )));
    }

    info!(tx_hash = %tx_hash, block = ?receipt.block_number, "Transaction confirmed");
    Ok(receipt)
}
