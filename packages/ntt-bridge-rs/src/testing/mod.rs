//! Testing Utilities Module
//!
//! In-memory stand-ins for the wallet and the chain, used by unit tests and by
//! downstream crates with the `testing` feature enabled.
//!
//! ## Submodules
//!
//! - `mock_wallet` - Scripted wallet that records every request
//! - `mock_chain` - Configurable balances, allowance and receipts

pub mod mock_chain;
pub mod mock_wallet;

// Re-export commonly used items
pub use mock_chain::*;
pub use mock_wallet::*;
