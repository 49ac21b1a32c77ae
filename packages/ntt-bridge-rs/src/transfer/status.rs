//! Transfer status and the single-flight guard

use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{TransferError, TransferResult};

/// Everything worth showing about a finished transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// Source network key
    pub source: String,
    /// Destination network key
    pub destination: String,
    /// Amount as the user entered it
    pub amount: String,
    /// Raw token units sent
    pub amount_units: U256,
    pub recipient: Address,
    pub tx_hash: B256,
    pub approval_tx_hash: Option<B256>,
    /// Submissions it took, including the successful one
    pub attempts: u32,
    pub block_number: Option<u64>,
    pub explorer_url: String,
    pub wormholescan_url: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Where the current transfer is
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransferStatus {
    #[default]
    Idle,
    Connecting,
    SwitchingNetwork,
    CheckingBalances,
    Approving,
    /// Submitting; `attempt` starts at 1
    Transferring {
        attempt: u32,
    },
    Confirming {
        tx_hash: B256,
    },
    Success {
        outcome: Box<TransferOutcome>,
    },
    Error {
        message: String,
    },
}

impl TransferStatus {
    /// A transfer is running
    pub fn is_busy(&self) -> bool {
        !matches!(
            self,
            TransferStatus::Idle | TransferStatus::Success { .. } | TransferStatus::Error { .. }
        )
    }

    /// The form may be edited
    pub fn is_editable(&self) -> bool {
        !self.is_busy()
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Idle => write!(f, "Ready"),
            TransferStatus::Connecting => write!(f, "Connecting wallet..."),
            TransferStatus::SwitchingNetwork => write!(f, "Switching network..."),
            TransferStatus::CheckingBalances => write!(f, "Checking balances..."),
            TransferStatus::Approving => write!(f, "Approving token spend..."),
            TransferStatus::Transferring { attempt } if *attempt > 1 => {
                write!(f, "Submitting transfer (attempt {})...", attempt)
            }
            TransferStatus::Transferring { .. } => write!(f, "Submitting transfer..."),
            TransferStatus::Confirming { tx_hash } => {
                write!(f, "Waiting for confirmation of {}...", tx_hash)
            }
            TransferStatus::Success { outcome } => {
                write!(f, "Transfer confirmed: {}", outcome.tx_hash)
            }
            TransferStatus::Error { message } => write!(f, "{}", message),
        }
    }
}

/// Shared, observable transfer status
///
/// Clones publish to the same channel.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    sender: Arc<watch::Sender<TransferStatus>>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(TransferStatus::Idle);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransferStatus> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> TransferStatus {
        self.sender.borrow().clone()
    }

    /// Claim the tracker for a new transfer
    ///
    /// Atomically moves a non-busy status to `Connecting`. Fails with
    /// [`TransferError::TransferInProgress`] if another transfer holds it.
    pub fn try_begin(&self) -> TransferResult<()> {
        let mut claimed = false;
        self.sender.send_if_modified(|status| {
            if status.is_busy() {
                return false;
            }
            *status = TransferStatus::Connecting;
            claimed = true;
            true
        });

        if claimed {
            Ok(())
        } else {
            Err(TransferError::TransferInProgress)
        }
    }

    pub fn set(&self, status: TransferStatus) {
        self.sender.send_replace(status);
    }

    /// Return to idle unless a transfer is running
    pub fn reset(&self) {
        self.sender.send_if_modified(|status| {
            if status.is_busy() || *status == TransferStatus::Idle {
                return false;
            }
            *status = TransferStatus::Idle;
            true
        });
    }
}
