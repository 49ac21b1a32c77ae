//! Transfer Module
//!
//! ## Submodules
//!
//! - `form` - User-entered request, locked while a transfer runs
//! - `orchestrator` - The connect, switch, check, approve, submit sequence
//! - `settings` - Fee policy, gas limit, relaying, retry and polling
//! - `status` - Observable status and the single-flight guard

pub mod form;
pub mod orchestrator;
pub mod settings;
pub mod status;

pub use form::{TransferForm, TransferRequest};
pub use orchestrator::TransferOrchestrator;
pub use settings::{FeePolicy, TransferSettings, DEFAULT_GAS_LIMIT, DEFAULT_TRANSFER_FEE_WEI};
pub use status::{StatusTracker, TransferOutcome, TransferStatus};
