//! Transfer Integration Test
//!
//! Public API checks that need no network, plus live reads against a source
//! network's NTT deployment.
//!
//! ## Running
//!
//! The live tests read the deployment configured for `sepolia` (override it
//! with `NETWORK_SEPOLIA_RPC_URL`, `NETWORK_SEPOLIA_TOKEN`,
//! `NETWORK_SEPOLIA_MANAGER`):
//!
//! ```bash
//! cd packages/ntt-bridge-rs
//! cargo test --test transfer_integration -- --ignored --nocapture
//! ```
//!
//! Set `LIVE_HOLDER_ADDRESS` to an account holding the token to exercise the
//! funds check.

use alloy::primitives::{Address, U256};
use ntt_bridge_rs::evm::{check_funds, ChainReader, EvmChainReader, FundsQuery};
use ntt_bridge_rs::{
    format_amount, parse_amount, NetworkRegistry, RecipientAddress, TransferError,
    TransferSettings, TransferStatus, DEFAULT_GAS_LIMIT,
};
use std::str::FromStr;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init()
        .ok();
}

fn live_reader() -> (EvmChainReader, ntt_bridge_rs::NetworkDescriptor) {
    init_logging();
    let registry = NetworkRegistry::from_env().expect("network overrides are valid");
    let network = registry.get("sepolia").expect("sepolia is builtin").clone();
    let reader = EvmChainReader::new(&network.rpc_url, network.chain_id).expect("valid RPC URL");
    (reader, network)
}

#[test]
fn test_every_builtin_network_can_be_added_to_a_wallet() {
    let registry = NetworkRegistry::builtin().unwrap();
    for network in registry.iter() {
        let params = network.add_chain_params();
        assert_eq!(params.chain_id_u64().unwrap(), network.chain_id);
        assert_eq!(params.rpc_urls, vec![network.rpc_url.clone()]);
        assert_ne!(network.wormhole_chain_id, 0);
    }
}

#[test]
fn test_user_input_round_trip() {
    let units = parse_amount("2500.75", 6).unwrap();
    assert_eq!(units, U256::from(2_500_750_000u64));
    assert_eq!(format_amount(units, 6), "2500.75");

    let err = RecipientAddress::parse("not-an-address").unwrap_err();
    assert!(matches!(err, TransferError::InvalidAddress(_)));
}

#[test]
fn test_default_settings_and_status() {
    let settings = TransferSettings::default();
    assert_eq!(settings.gas_limit, DEFAULT_GAS_LIMIT);
    assert!(TransferStatus::default().is_editable());
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_live_chain_id_and_manager() {
    let (reader, network) = live_reader();

    reader.verify_chain_id().await.unwrap();
    let block = reader.get_block_number().await.unwrap();
    println!("{} at block {}", network, block);

    let initialized = reader
        .manager_initialized(network.contracts.manager)
        .await
        .unwrap();
    println!("manager {} initialized: {}", network.contracts.manager, initialized);

    let decimals = reader.token_decimals(network.contracts.token).await.unwrap();
    assert!(decimals <= 36);
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_live_funds_check() {
    let Ok(holder) = std::env::var("LIVE_HOLDER_ADDRESS") else {
        println!("LIVE_HOLDER_ADDRESS not set, skipping");
        return;
    };
    let owner = Address::from_str(&holder).unwrap();
    let (reader, network) = live_reader();

    let decimals = reader.token_decimals(network.contracts.token).await.unwrap();
    let query = FundsQuery {
        owner,
        amount: U256::from(1u64),
        token_decimals: decimals,
        native_fee: U256::ZERO,
        gas_limit: DEFAULT_GAS_LIMIT,
    };

    match check_funds(&reader, &network, &query).await {
        Ok(report) => println!("{:?}", report),
        Err(e) => println!("funds check failed: {} ({})", e, e.user_message()),
    }
}
