//! Private key wallet
//!
//! Wraps alloy's `PrivateKeySigner` and `EthereumWallet` behind the same
//! [`WalletProvider`] interface an injected wallet offers. Like an extension,
//! it only switches to networks it has been told about; anything else must be
//! added first.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, B256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{AddChainParams, WalletError, WalletProvider};
use crate::networks::NetworkDescriptor;
use crate::redact::Redacted;

#[derive(Debug, Default)]
struct ChainState {
    /// Known chains: chain ID → RPC URL
    rpc_urls: HashMap<u64, String>,
    active: Option<u64>,
}

/// Wallet backed by a local private key
pub struct LocalWallet {
    wallet: EthereumWallet,
    address: Address,
    state: Mutex<ChainState>,
}

impl LocalWallet {
    /// Create a wallet whose active network is `home`
    pub fn new(private_key: &Redacted<String>, home: &NetworkDescriptor) -> eyre::Result<Self> {
        let signer: PrivateKeySigner = private_key
            .expose()
            .parse()
            .map_err(|e| eyre::eyre!("Invalid private key: {}", e))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let mut rpc_urls = HashMap::new();
        rpc_urls.insert(home.chain_id, home.rpc_url.clone());

        info!(
            address = %address,
            chain_id = home.chain_id,
            "Local wallet initialized"
        );

        Ok(Self {
            wallet,
            address,
            state: Mutex::new(ChainState {
                rpc_urls,
                active: Some(home.chain_id),
            }),
        })
    }

    /// The signing address
    pub fn address(&self) -> Address {
        self.address
    }

    async fn active_rpc(&self) -> Result<(u64, String), WalletError> {
        let state = self.state.lock().await;
        let chain_id = state.active.ok_or(WalletError::NoActiveChain)?;
        let url = state
            .rpc_urls
            .get(&chain_id)
            .cloned()
            .ok_or(WalletError::UnrecognizedChain(chain_id))?;
        Ok((chain_id, url))
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.state
            .lock()
            .await
            .active
            .ok_or(WalletError::NoActiveChain)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.state.lock().await;
        if !state.rpc_urls.contains_key(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        state.active = Some(chain_id);
        debug!(chain_id, "Local wallet switched network");
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        let chain_id = params.chain_id_u64()?;
        let rpc_url = params.rpc_urls.first().cloned().ok_or_else(|| WalletError::Rpc {
            code: -32602,
            message: "rpcUrls must not be empty".to_string(),
        })?;

        self.state.lock().await.rpc_urls.insert(chain_id, rpc_url);
        info!(chain_id, name = %params.chain_name, "Local wallet added network");
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, WalletError> {
        let (chain_id, rpc_url) = self.active_rpc().await?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet.clone())
            .on_http(
                rpc_url
                    .parse()
                    .map_err(|e| WalletError::Transport(format!("Invalid RPC URL: {}", e)))?,
            );

        let tx = tx.with_from(self.address).with_chain_id(chain_id);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::Transport(format!("Failed to send transaction: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, chain_id, "Local wallet broadcast transaction");
        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::NetworkRegistry;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn wallet() -> (LocalWallet, NetworkRegistry) {
        let registry = NetworkRegistry::builtin().unwrap();
        let home = registry.get("sepolia").unwrap().clone();
        let wallet = LocalWallet::new(&Redacted(ANVIL_KEY.to_string()), &home).unwrap();
        (wallet, registry)
    }

    #[tokio::test]
    async fn test_accounts_and_home_chain() {
        let (wallet, _) = wallet();
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(
            format!("{:?}", accounts[0]).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(wallet.chain_id().await.unwrap(), 11_155_111);
    }

    #[tokio::test]
    async fn test_switch_requires_add() {
        let (wallet, registry) = wallet();
        let base = registry.get("base-sepolia").unwrap();

        assert_eq!(
            wallet.switch_chain(base.chain_id).await,
            Err(WalletError::UnrecognizedChain(base.chain_id))
        );

        wallet.add_chain(&base.add_chain_params()).await.unwrap();
        wallet.switch_chain(base.chain_id).await.unwrap();
        assert_eq!(wallet.chain_id().await.unwrap(), base.chain_id);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let registry = NetworkRegistry::builtin().unwrap();
        let home = registry.get("sepolia").unwrap();
        assert!(LocalWallet::new(&Redacted("0x1234".to_string()), home).is_err());
    }
}
