//! Compiles a Solidity contract and deploys it to an Ethereum node.
//!
//! Prints the deployment receipt as JSON on stdout once the contract is mined.
use std::path::PathBuf;

use clap::Parser;
use deployer::{
    parse_quantity, Compiler, Deployer, KeyPair, Node, DEFAULT_MAX_BLOCKS,
};
use eyre::WrapErr;

mod logging;
mod receipt;

use logging::LogArgs;
use receipt::Ext;

/// Default gas limit of a deployment.
const DEFAULT_GAS_LIMIT: u64 = 3_000_000;

/// Compile and deploy a Solidity contract.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path of the Solidity source. Its first contract is deployed.
    contract: PathBuf,

    /// IPC socket path, or WebSocket or HTTP URL of the node. Defaults to
    /// `~/.ethereum/geth.ipc`.
    #[arg(long, env = "ETH_ENDPOINT")]
    endpoint: Option<String>,

    /// Hex-encoded private key of the deploying account.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: KeyPair,

    /// Constructor argument. Repeat once per argument, in order.
    #[arg(long = "args", value_name = "ARG")]
    args: Vec<String>,

    /// Gas limit of the deployment transaction.
    #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
    gas_limit: u64,

    /// Gas price in wei, decimal or `0x`-prefixed hex. Defaults to the node's
    /// current gas price.
    #[arg(long, value_parser = parse_quantity)]
    gas_price: Option<u128>,

    /// Chain id to sign for (EIP-155). Without it, the transaction can be
    /// replayed on other chains.
    #[arg(long)]
    chain_id: Option<u64>,

    /// Sign for the chain id reported by the node.
    #[arg(long, conflicts_with = "chain_id")]
    eip155: bool,

    /// Number of blocks to wait for the deployment to be mined.
    #[arg(long, default_value_t = DEFAULT_MAX_BLOCKS)]
    max_blocks: u64,

    /// Solidity compiler executable.
    #[arg(long, env = "SOLC", default_value = deployer::compile::DEFAULT_SOLC)]
    solc: PathBuf,

    #[command(flatten)]
    log: LogArgs,
}

impl Args {
    /// Endpoint to connect to, with `~` expanded to the home directory.
    fn endpoint(&self) -> String {
        let endpoint =
            self.endpoint.as_deref().unwrap_or("~/.ethereum/geth.ipc");
        match (endpoint.strip_prefix("~/"), std::env::var("HOME")) {
            (Some(rest), Ok(home)) => format!("{home}/{rest}"),
            _ => endpoint.to_owned(),
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    args.log.init();
    run(args).await
}

async fn run(args: Args) -> eyre::Result<()> {
    let endpoint = args.endpoint();
    let mut deployer = Deployer::connect(&endpoint)
        .await
        .wrap_err_with(|| format!("failed to connect to {endpoint}"))?
        .with_compiler(Compiler::new(&args.solc))
        .with_max_blocks(args.max_blocks);
    let chain_id = if args.eip155 {
        let chain_id = deployer
            .node()
            .chain_id()
            .await
            .wrap_err("failed to fetch the chain id")?;
        Some(chain_id)
    } else {
        args.chain_id
    };
    if let Some(chain_id) = chain_id {
        deployer = deployer.with_chain_id(chain_id);
    }

    let contract = deployer
        .compile_contract(&args.contract)
        .await
        .wrap_err_with(|| {
            format!("failed to compile {}", args.contract.display())
        })?;

    let gas_price = match args.gas_price {
        Some(gas_price) => gas_price,
        None => deployer
            .current_gas_price()
            .await
            .wrap_err("failed to fetch the gas price")?,
    };

    tracing::info!(
        contract = contract.name.as_deref().unwrap_or_default(),
        sender = %args.private_key.address(),
        gas_price,
        gas_limit = args.gas_limit,
        "deploying contract"
    );
    let receipt = deployer
        .deploy_contract(
            &args.private_key,
            &contract,
            &args.args,
            gas_price,
            args.gas_limit,
        )
        .await
        .wrap_err("failed to deploy contract")?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);

    let address = receipt.address()?;
    tracing::info!(%address, tx_hash = %receipt.transaction_hash, "contract deployed");
    Ok(())
}
