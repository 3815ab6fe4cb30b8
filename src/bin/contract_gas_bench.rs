use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contract_gas_bench::artifacts::ArtifactStore;
use contract_gas_bench::benches::{OracleAggregator, Reentrancy, Workload};
use contract_gas_bench::config::{self, BenchConfig, OracleAggregatorArgs, ReentrancyArgs, Vars};
use contract_gas_bench::env::rpc::{self, RpcEnvironment};
use contract_gas_bench::harness;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand, Debug)]
enum Command {
    /// Oracle aggregators: deploy test oracles, then estimate `aggregateQuotes(address[])`.
    ///
    /// Positional arguments take precedence over `SC_01`, `SC_02` and `SC_TEST`.
    /// `ORACLE_COUNT` (default 50) and `ITERATIONS` (default 10) are read from the environment.
    OracleAggregator {
        /// First aggregator variant (default OraMemory).
        sc_01: Option<String>,
        /// Second aggregator variant (default OraTransient).
        sc_02: Option<String>,
        /// Oracle fixture contract (default OraTest).
        sc_test: Option<String>,
    },

    /// Reentrancy guards: send `claimReward()` transactions.
    ///
    /// `ITERATIONS`, `SC_01` and `SC_02` take precedence over the positional arguments.
    Reentrancy {
        /// Number of calls per variant (default 5000).
        iterations: Option<String>,
        /// First guard variant (default ReeStorage).
        sc_01: Option<String>,
        /// Second guard variant (default ReeTransient).
        sc_02: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "contract-gas-bench")]
#[command(about = "Gas usage benchmarks for contract variants on a local dev chain (JSON output)")]
struct Args {
    /// JSON-RPC endpoint of the development node.
    #[arg(long, env = "RPC_URL", default_value = rpc::DEFAULT_RPC_URL, global = true)]
    rpc_url: String,

    /// Hardhat `artifacts/` or Foundry `out/` directory.
    #[arg(long, env = "ARTIFACTS_DIR", default_value = "artifacts", global = true)]
    artifacts: PathBuf,

    /// Sending account; defaults to the node's first unlocked account.
    #[arg(long, env = "FROM_ADDRESS", global = true)]
    from: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let vars = Vars::from_env();

    let (cfg, mut workload): (BenchConfig, Box<dyn Workload>) = match args.cmd {
        Command::OracleAggregator { sc_01, sc_02, sc_test } => {
            let cfg = config::oracle_aggregator(
                OracleAggregatorArgs {
                    first: sc_01,
                    second: sc_02,
                    fixture: sc_test,
                },
                &vars,
            )?;
            let fixtures = cfg
                .fixtures
                .clone()
                .context("oracle aggregator benchmark needs fixture settings")?;
            (cfg, Box::new(OracleAggregator::new(fixtures)))
        }
        Command::Reentrancy {
            iterations,
            sc_01,
            sc_02,
        } => {
            let cfg = config::reentrancy(
                ReentrancyArgs {
                    iterations,
                    first: sc_01,
                    second: sc_02,
                },
                &vars,
            )?;
            (cfg, Box::new(Reentrancy))
        }
    };
    cfg.log();

    let from = args
        .from
        .as_deref()
        .map(|s| rpc::parse_address("--from", s))
        .transpose()?;
    let mut env = RpcEnvironment::connect(&args.rpc_url, ArtifactStore::new(&args.artifacts), from)
        .with_context(|| format!("connecting to {}", args.rpc_url))?;

    let records = harness::run(&mut env, &cfg, workload.as_mut())?;
    harness::write_report(&cfg.output_file, &records)
        .with_context(|| format!("writing {}", cfg.output_file.display()))?;

    Ok(())
}
