//! Network switching
//!
//! Puts the wallet on the transfer's source network before anything is read
//! or signed. Wallets that do not know the network get its EIP-3085
//! definition and are asked to switch again.

use tracing::{info, warn};

use super::{WalletError, WalletProvider};
use crate::error::{TransferError, TransferResult};
use crate::networks::NetworkDescriptor;

/// Make `network` the wallet's active chain
pub async fn ensure_network<W: WalletProvider + ?Sized>(
    wallet: &W,
    network: &NetworkDescriptor,
) -> TransferResult<()> {
    let failed = |reason: String| TransferError::NetworkSwitchFailed {
        network: network.name.clone(),
        reason,
    };

    let current = wallet.chain_id().await.map_err(|e| failed(e.to_string()))?;
    if current == network.chain_id {
        return Ok(());
    }

    info!(
        from = current,
        to = network.chain_id,
        network = %network.name,
        "Switching wallet network"
    );

    match wallet.switch_chain(network.chain_id).await {
        Ok(()) => {}
        Err(WalletError::UnrecognizedChain(_)) => {
            warn!(network = %network.name, "Wallet does not know network, adding it");
            wallet
                .add_chain(&network.add_chain_params())
                .await
                .map_err(|e| failed(format!("add network: {}", e)))?;
            wallet
                .switch_chain(network.chain_id)
                .await
                .map_err(|e| failed(e.to_string()))?;
        }
        Err(e) => return Err(failed(e.to_string())),
    }

    let active = wallet.chain_id().await.map_err(|e| failed(e.to_string()))?;
    if active != network.chain_id {
        return Err(failed(format!(
            "wallet reports chain {} after switching",
            active
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::NetworkRegistry;
    use crate::testing::{MockWallet, WalletCall};

    fn network(key: &str) -> NetworkDescriptor {
        NetworkRegistry::builtin().unwrap().get(key).unwrap().clone()
    }

    #[tokio::test]
    async fn test_already_on_network() {
        let sepolia = network("sepolia");
        let wallet = MockWallet::on_chain(sepolia.chain_id);

        ensure_network(&wallet, &sepolia).await.unwrap();
        assert!(!wallet.calls().iter().any(|c| matches!(c, WalletCall::SwitchChain(_))));
    }

    #[tokio::test]
    async fn test_switches_known_network() {
        let sepolia = network("sepolia");
        let base = network("base-sepolia");
        let wallet = MockWallet::on_chain(sepolia.chain_id).knowing(&[base.chain_id]);

        ensure_network(&wallet, &base).await.unwrap();
        assert_eq!(wallet.active_chain(), base.chain_id);
        assert!(!wallet.calls().iter().any(|c| matches!(c, WalletCall::AddChain(_))));
    }

    #[tokio::test]
    async fn test_adds_unknown_network_then_switches() {
        let sepolia = network("sepolia");
        let arb = network("arbitrum-sepolia");
        let wallet = MockWallet::on_chain(sepolia.chain_id);

        ensure_network(&wallet, &arb).await.unwrap();

        let calls = wallet.calls();
        let add_pos = calls
            .iter()
            .position(|c| matches!(c, WalletCall::AddChain(id) if *id == arb.chain_id))
            .expect("network added");
        let last_switch = calls
            .iter()
            .rposition(|c| matches!(c, WalletCall::SwitchChain(id) if *id == arb.chain_id))
            .expect("switched");
        assert!(add_pos < last_switch);
        assert_eq!(wallet.active_chain(), arb.chain_id);
    }

    #[tokio::test]
    async fn test_rejected_switch_fails() {
        let sepolia = network("sepolia");
        let base = network("base-sepolia");
        let wallet = MockWallet::on_chain(sepolia.chain_id)
            .knowing(&[base.chain_id])
            .rejecting_switch();

        let err = ensure_network(&wallet, &base).await.unwrap_err();
        assert!(matches!(err, TransferError::NetworkSwitchFailed { .. }));
        assert_eq!(err.user_message(), "Network switch failed");
    }

    #[tokio::test]
    async fn test_rejected_add_fails() {
        let sepolia = network("sepolia");
        let arb = network("arbitrum-sepolia");
        let wallet = MockWallet::on_chain(sepolia.chain_id).rejecting_add();

        let err = ensure_network(&wallet, &arb).await.unwrap_err();
        assert!(matches!(err, TransferError::NetworkSwitchFailed { .. }));
        assert_eq!(err.user_message(), "Network switch failed");
        assert!(wallet.calls().contains(&WalletCall::AddChain(arb.chain_id)));
        assert_eq!(wallet.active_chain(), sepolia.chain_id);
    }

    #[tokio::test]
    async fn test_chain_mismatch_after_switch_fails() {
        let sepolia = network("sepolia");
        let base = network("base-sepolia");
        let wallet = MockWallet::on_chain(sepolia.chain_id)
            .knowing(&[base.chain_id])
            .reporting_chain(sepolia.chain_id);

        let err = ensure_network(&wallet, &base).await.unwrap_err();
        match &err {
            TransferError::NetworkSwitchFailed { reason, .. } => {
                assert!(reason.contains("after switching"), "{}", reason)
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), "Network switch failed");
        assert!(wallet.calls().contains(&WalletCall::SwitchChain(base.chain_id)));
    }
}
