//! Transfer form state
//!
//! What the user has typed so far. Edits are refused while a transfer is
//! running so the request being executed cannot change underneath it.

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use super::status::TransferStatus;
use crate::error::{TransferError, TransferResult};

/// A transfer as requested by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    /// Decimal amount in token units
    pub amount: String,
    /// Source network key
    pub source: String,
    /// Destination network key
    pub destination: String,
    /// Destination address; the connected account when absent
    pub recipient: Option<String>,
}

#[derive(Debug)]
pub struct TransferForm {
    amount: String,
    source: String,
    destination: String,
    recipient: String,
    status: watch::Receiver<TransferStatus>,
}

impl TransferForm {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        status: watch::Receiver<TransferStatus>,
    ) -> Self {
        Self {
            amount: String::new(),
            source: source.into(),
            destination: destination.into(),
            recipient: String::new(),
            status,
        }
    }

    /// True while a transfer is in flight
    pub fn is_locked(&self) -> bool {
        !self.status.borrow().is_editable()
    }

    fn ensure_editable(&self) -> TransferResult<()> {
        if self.is_locked() {
            debug!("Form edit refused while transfer is running");
            return Err(TransferError::TransferInProgress);
        }
        Ok(())
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) -> TransferResult<()> {
        self.ensure_editable()?;
        self.amount = amount.into();
        Ok(())
    }

    pub fn set_source(&mut self, key: impl Into<String>) -> TransferResult<()> {
        self.ensure_editable()?;
        self.source = key.into();
        Ok(())
    }

    pub fn set_destination(&mut self, key: impl Into<String>) -> TransferResult<()> {
        self.ensure_editable()?;
        self.destination = key.into();
        Ok(())
    }

    pub fn set_recipient(&mut self, address: impl Into<String>) -> TransferResult<()> {
        self.ensure_editable()?;
        self.recipient = address.into();
        Ok(())
    }

    /// Exchange source and destination
    pub fn swap_networks(&mut self) -> TransferResult<()> {
        self.ensure_editable()?;
        std::mem::swap(&mut self.source, &mut self.destination);
        Ok(())
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Snapshot for the orchestrator
    pub fn request(&self) -> TransferRequest {
        let recipient = self.recipient.trim();
        TransferRequest {
            amount: self.amount.trim().to_string(),
            source: self.source.clone(),
            destination: self.destination.clone(),
            recipient: (!recipient.is_empty()).then(|| recipient.to_string()),
        }
    }
}
