//! Explorer links

use alloy::primitives::{Address, B256};

use crate::networks::NetworkDescriptor;

const WORMHOLESCAN_URL: &str = "https://wormholescan.io";

fn base(network: &NetworkDescriptor) -> &str {
    network.explorer_url.trim_end_matches('/')
}

/// Block explorer page for a transaction on `network`
pub fn tx_url(network: &NetworkDescriptor, tx_hash: &B256) -> String {
    format!("{}/tx/{}", base(network), tx_hash)
}

/// Block explorer page for an account or contract on `network`
pub fn address_url(network: &NetworkDescriptor, address: &Address) -> String {
    format!("{}/address/{}", base(network), address.to_checksum(None))
}

/// Wormholescan page tracking the cross-chain message of a source transaction
pub fn wormholescan_url(tx_hash: &B256, testnet: bool) -> String {
    if testnet {
        format!("{}/#/tx/{}?network=Testnet", WORMHOLESCAN_URL, tx_hash)
    } else {
        format!("{}/#/tx/{}", WORMHOLESCAN_URL, tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::NetworkRegistry;

    #[test]
    fn test_tx_url() {
        let registry = NetworkRegistry::builtin().unwrap();
        let mut network = registry.get("sepolia").unwrap().clone();
        let hash = B256::repeat_byte(0xab);

        let url = tx_url(&network, &hash);
        assert_eq!(url, format!("https://sepolia.etherscan.io/tx/{}", hash));

        network.explorer_url.push('/');
        assert_eq!(tx_url(&network, &hash), url);
    }

    #[test]
    fn test_address_url_is_checksummed() {
        let registry = NetworkRegistry::builtin().unwrap();
        let network = registry.get("base-sepolia").unwrap();
        let address: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();

        assert_eq!(
            address_url(network, &address),
            "https://sepolia.basescan.org/address/0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_wormholescan_network_param() {
        let hash = B256::repeat_byte(0x01);
        assert!(wormholescan_url(&hash, true).ends_with("?network=Testnet"));
        assert!(!wormholescan_url(&hash, false).contains("network="));
    }
}
