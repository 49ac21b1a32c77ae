//! NTT Bridge CLI
//!
//! - `ntt-bridge networks` - list supported networks
//! - `ntt-bridge balances` - native/token balance and manager allowance
//! - `ntt-bridge transfer` - bridge tokens to another network
//! - `ntt-bridge explorer` - explorer links for a transaction or address

mod config;

use alloy::primitives::{Address, B256, U256};
use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use config::{Config, WalletConfig, WalletMode};
use ntt_bridge_rs::evm::{ChainReader, EvmChainReader, RpcReaders};
use ntt_bridge_rs::{
    connect_wallet, explorer, format_amount, JsonRpcWallet, LocalWallet, NetworkDescriptor,
    NetworkRegistry, RecipientAddress, TransferOrchestrator, WalletProvider,
};

#[derive(Parser)]
#[command(name = "ntt-bridge")]
#[command(about = "Bridge tokens between EVM networks with Wormhole NTT", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported networks
    Networks,

    /// Show balances and the NTT manager allowance on a network
    Balances {
        /// Network key (see `networks`)
        #[arg(short, long)]
        network: String,

        /// Account to inspect; defaults to the connected wallet
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Bridge tokens to another network
    Transfer {
        /// Source network key
        #[arg(long)]
        from: String,

        /// Destination network key
        #[arg(long)]
        to: String,

        /// Amount in token units (e.g. 12.5)
        #[arg(short, long)]
        amount: String,

        /// Destination address; defaults to the connected wallet
        #[arg(short, long)]
        recipient: Option<String>,
    },

    /// Print explorer links
    Explorer {
        /// Network key
        #[arg(short, long)]
        network: String,

        /// Transaction hash
        #[arg(long)]
        tx: Option<String>,

        /// Account or contract address
        #[arg(long)]
        address: Option<String>,
    },
}

fn main() -> Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    let cli = Cli::parse();

    // Run the async main
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    config::load_env_file(".env")?;
    let registry = NetworkRegistry::from_env()?;
    tracing::debug!(networks = registry.len(), "Network registry loaded");

    match cli.command {
        Commands::Networks => list_networks(&registry, cli.json),
        Commands::Balances { network, address } => {
            show_balances(&registry, &network, address.as_deref(), cli.json).await
        }
        Commands::Transfer {
            from,
            to,
            amount,
            recipient,
        } => run_transfer(registry, &from, &to, &amount, recipient, cli.json).await,
        Commands::Explorer {
            network,
            tx,
            address,
        } => show_links(&registry, &network, tx.as_deref(), address.as_deref(), cli.json),
    }
}

/// Initialize tracing/logging on stderr so stdout stays parseable
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "debug"
    } else {
        "info,ntt_bridge_rs=debug"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn lookup_network<'a>(registry: &'a NetworkRegistry, key: &str) -> Result<&'a NetworkDescriptor> {
    registry.get(key).ok_or_else(|| {
        eyre!(
            "Unknown network: {} (supported: {})",
            key,
            registry.keys().join(", ")
        )
    })
}

fn build_wallet(config: &WalletConfig, home: &NetworkDescriptor) -> Result<Arc<dyn WalletProvider>> {
    match config.mode {
        WalletMode::JsonRpc => {
            tracing::info!(endpoint = %config.rpc_url, "Using JSON-RPC wallet");
            Ok(Arc::new(JsonRpcWallet::new(
                &config.rpc_url,
                config.request_timeout,
            )?))
        }
        WalletMode::Local => {
            let key = config
                .private_key
                .as_ref()
                .ok_or_else(|| eyre!("WALLET_PRIVATE_KEY is required when WALLET_MODE=local"))?;
            Ok(Arc::new(LocalWallet::new(key, home)?))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn list_networks(registry: &NetworkRegistry, json: bool) -> Result<()> {
    if json {
        return print_json(&registry.iter().collect::<Vec<_>>());
    }

    println!(
        "{:<18} {:<18} {:>10} {:>9}  {}",
        "KEY", "NAME", "CHAIN ID", "WORMHOLE", "NTT MANAGER"
    );
    for network in registry.iter() {
        println!(
            "{:<18} {:<18} {:>10} {:>9}  {}",
            network.key,
            network.name,
            network.chain_id,
            network.wormhole_chain_id,
            network.contracts.manager
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BalancesView {
    network: String,
    account: Address,
    native_symbol: String,
    native_balance: String,
    token: Address,
    token_symbol: String,
    token_decimals: u8,
    token_balance: String,
    manager: Address,
    allowance: String,
    allowance_units: U256,
    manager_initialized: bool,
}

async fn show_balances(
    registry: &NetworkRegistry,
    key: &str,
    address: Option<&str>,
    json: bool,
) -> Result<()> {
    let network = lookup_network(registry, key)?;

    let account = match address {
        Some(raw) => RecipientAddress::parse(raw)?.address(),
        None => {
            let config = Config::from_env()?;
            let wallet = build_wallet(&config.wallet, network)?;
            connect_wallet(wallet.as_ref()).await?
        }
    };

    let reader = EvmChainReader::new(&network.rpc_url, network.chain_id)?;
    reader
        .verify_chain_id()
        .await
        .wrap_err_with(|| format!("RPC for {} is misconfigured", network.key))?;

    let contracts = network.contracts;
    let decimals = reader.token_decimals(contracts.token).await?;
    let symbol = reader
        .token_symbol(contracts.token)
        .await
        .unwrap_or_else(|_| "TOKEN".to_string());
    let native = reader.native_balance(account).await?;
    let token_balance = reader.token_balance(contracts.token, account).await?;
    let allowance = reader
        .allowance(contracts.token, account, contracts.manager)
        .await?;
    let initialized = reader.manager_initialized(contracts.manager).await?;

    let view = BalancesView {
        network: network.key.clone(),
        account,
        native_symbol: network.native_currency.symbol.clone(),
        native_balance: format_amount(native, network.native_currency.decimals),
        token: contracts.token,
        token_symbol: symbol,
        token_decimals: decimals,
        token_balance: format_amount(token_balance, decimals),
        manager: contracts.manager,
        allowance: format_amount(allowance, decimals),
        allowance_units: allowance,
        manager_initialized: initialized,
    };

    if json {
        return print_json(&view);
    }

    println!("Network:    {}", network);
    println!("Account:    {}", view.account);
    println!("Native:     {} {}", view.native_balance, view.native_symbol);
    println!("Token:      {} {}", view.token_balance, view.token_symbol);
    println!("Allowance:  {} {}", view.allowance, view.token_symbol);
    if !view.manager_initialized {
        println!("Warning:    NTT manager is not initialized on this network");
    }
    Ok(())
}

async fn run_transfer(
    registry: NetworkRegistry,
    from: &str,
    to: &str,
    amount: &str,
    recipient: Option<String>,
    json: bool,
) -> Result<()> {
    let config = Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let source = lookup_network(&registry, from)?.clone();
    lookup_network(&registry, to)?;

    let wallet = build_wallet(&config.wallet, &source)?;
    let orchestrator = TransferOrchestrator::new(
        wallet,
        Arc::new(RpcReaders::new()),
        Arc::new(registry),
        config.transfer,
    );

    let mut form = orchestrator.form(from, to);
    form.set_amount(amount)?;
    if let Some(recipient) = recipient {
        form.set_recipient(recipient)?;
    }
    let request = form.request();

    let mut status = orchestrator.status().subscribe();
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            tracing::info!(status = %current, "Transfer status");
        }
    });

    let result = orchestrator.execute(&request).await;
    // Dropping the orchestrator closes the status channel and ends the printer
    drop(orchestrator);
    let _ = printer.await;

    match result {
        Ok(outcome) => {
            if json {
                return print_json(&outcome);
            }
            println!("Transfer confirmed");
            println!("  Amount:      {} ({} -> {})", outcome.amount, outcome.source, outcome.destination);
            println!("  Recipient:   {}", outcome.recipient);
            if let Some(approval) = outcome.approval_tx_hash {
                println!("  Approval:    {}", approval);
            }
            println!("  Transaction: {}", outcome.tx_hash);
            println!("  Attempts:    {}", outcome.attempts);
            println!("  Explorer:    {}", outcome.explorer_url);
            println!("  Wormhole:    {}", outcome.wormholescan_url);
            Ok(())
        }
        Err(e) => {
            if json {
                print_json(&serde_json::json!({
                    "status": "error",
                    "message": e.user_message(),
                    "detail": e.to_string(),
                }))?;
            } else {
                eprintln!("Transfer failed: {}", e.user_message());
            }
            std::process::exit(1);
        }
    }
}

fn show_links(
    registry: &NetworkRegistry,
    key: &str,
    tx: Option<&str>,
    address: Option<&str>,
    json: bool,
) -> Result<()> {
    let network = lookup_network(registry, key)?;
    let mut links: Vec<(&str, String)> = Vec::new();

    if let Some(raw) = tx {
        let hash = B256::from_str(raw.trim()).wrap_err("Invalid transaction hash")?;
        links.push(("transaction", explorer::tx_url(network, &hash)));
        links.push(("wormholescan", explorer::wormholescan_url(&hash, network.testnet)));
    }
    if let Some(raw) = address {
        let account = RecipientAddress::parse(raw)?.address();
        links.push(("address", explorer::address_url(network, &account)));
    }
    if links.is_empty() {
        links.push(("token", explorer::address_url(network, &network.contracts.token)));
        links.push(("manager", explorer::address_url(network, &network.contracts.manager)));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = links
            .into_iter()
            .map(|(label, url)| (label.to_string(), serde_json::Value::String(url)))
            .collect();
        return print_json(&map);
    }

    for (label, url) in links {
        println!("{:<13} {}", label, url);
    }
    Ok(())
}
