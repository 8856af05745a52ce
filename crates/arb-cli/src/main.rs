use std::path::PathBuf;

use alloy::primitives::Address;
use arb_engine::{balance, calldata, BalanceError, EquilibriumResult};
use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

mod snapshot;

#[derive(Parser, Debug)]
#[command(name = "arb")]
#[command(about = "Two-pool arbitrage equilibrium solver over pool snapshots")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Balance two pools from a snapshot and report the sized trade.
    Balance(BalanceArgs),
    /// List the pools a snapshot contains.
    Pools(PoolsArgs),
}

#[derive(Args, Debug)]
struct BalanceArgs {
    /// Path to the JSON pool snapshot.
    #[arg(long)]
    snapshot: PathBuf,

    /// Reference token: symbol or 0x-address. Profit is counted in it.
    #[arg(long)]
    reference: String,

    /// Addresses of the two pools to balance; defaults to the snapshot's
    /// first two pools.
    #[arg(long, num_args = 2)]
    pools: Option<Vec<Address>>,

    /// Block number to stamp into the settlement calldata; when given, the
    /// packed call is printed alongside the result.
    #[arg(long)]
    block: Option<u64>,
}

#[derive(Args, Debug)]
struct PoolsArgs {
    /// Path to the JSON pool snapshot.
    #[arg(long)]
    snapshot: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Balance(args) => handle_balance(args),
        Commands::Pools(args) => handle_pools(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn handle_balance(args: BalanceArgs) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot)?;
    let reference = snapshot.resolve_token(&args.reference)?;

    let (def_x, def_y) = match &args.pools {
        Some(addresses) => {
            let find = |address: Address| {
                snapshot
                    .pools
                    .iter()
                    .find(|def| def.address() == address)
                    .ok_or_else(|| eyre!("pool {address} is not in the snapshot"))
            };
            (find(addresses[0])?, find(addresses[1])?)
        }
        None => {
            if snapshot.pools.len() < 2 {
                return Err(eyre!("snapshot holds fewer than two pools"));
            }
            (&snapshot.pools[0], &snapshot.pools[1])
        }
    };

    let pool_x = snapshot.build_pool(def_x)?;
    let pool_y = snapshot.build_pool(def_y)?;

    match balance(&pool_x, &pool_y, &reference) {
        Ok(result) => {
            print_result(&result, &reference.symbol);
            if let Some(block) = args.block {
                let call = calldata::encode(&result, reference.address, block)
                    .wrap_err("failed to encode settlement calldata")?;
                print_call(&call);
            }
            Ok(())
        }
        Err(BalanceError::NotProfitable) => {
            info!("no profitable trade between these pools");
            Ok(())
        }
        Err(err) => Err(err).wrap_err("balancing failed"),
    }
}

fn handle_pools(args: PoolsArgs) -> Result<()> {
    let snapshot = snapshot::load(&args.snapshot)?;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["address", "kind", "detail"]);
    for def in &snapshot.pools {
        let pool = snapshot.build_pool(def)?;
        let detail = match &pool {
            arb_engine::Pool::ConstantProduct(p) => format!(
                "fee {}/{}",
                p.fee_numerator(),
                p.fee_denominator()
            ),
            arb_engine::Pool::ConcentratedLiquidity(p) => {
                format!("fee {} pips, tick {}", p.fee_pips(), p.tick())
            }
        };
        table.add_row(vec![
            format!("{}", pool.address()),
            pool.kind().to_string(),
            detail,
        ]);
    }
    println!("{table}");
    Ok(())
}

fn print_result(result: &EquilibriumResult, reference_symbol: &str) {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["", "pool", "kind"]);
    table.add_row(vec![
        "from".to_string(),
        format!("{}", result.from.address()),
        result.from.kind().to_string(),
    ]);
    table.add_row(vec![
        "to".to_string(),
        format!("{}", result.to.address()),
        result.to.kind().to_string(),
    ]);
    println!("{table}");
    println!("amount in: {} {reference_symbol}", result.amount_in);
    println!("profit:    {} {reference_symbol}", result.profit);
}

fn print_call(call: &calldata::SettlementCall) {
    println!("settlement call for block {}:", call.block_number);
    println!("  amount_in:   {}", call.amount_in);
    println!("  packed word: {:#066x}", call.packed_word);
    println!("  from:        {}", call.from_address);
    println!("  to:          {}", call.to_address);
}
