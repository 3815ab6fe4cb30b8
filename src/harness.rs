use std::fs;
use std::path::Path;

use ethabi::ethereum_types::U256;
use tracing::{error, info};

use crate::benches::Workload;
use crate::config::BenchConfig;
use crate::env::Environment;
use crate::error::{BenchError, Result};
use crate::schema::MeasurementRecord;

/// Iterations between progress log lines.
const PROGRESS_EVERY: u64 = 1_000;

/// Deploys every variant in `cfg` and measures `workload`'s operation against
/// it, returning all records in the order they were produced.
///
/// The gas price is read once, after fixtures are in place, and applied to
/// every record. Fees are therefore an approximation for long runs on a node
/// whose price moves.
pub fn run(
    env: &mut dyn Environment,
    cfg: &BenchConfig,
    workload: &mut dyn Workload,
) -> Result<Vec<MeasurementRecord>> {
    fs::create_dir_all(&cfg.result_dir)?;

    workload.prepare(env)?;

    let gas_price = env.gas_price()?;
    info!("gas price fixed at {gas_price} wei");

    let mut records = Vec::new();
    for name in &cfg.variants {
        run_variant(env, cfg, workload, name, gas_price, &mut records)?;
    }
    Ok(records)
}

fn run_variant(
    env: &mut dyn Environment,
    cfg: &BenchConfig,
    workload: &dyn Workload,
    name: &str,
    gas_price: U256,
    records: &mut Vec<MeasurementRecord>,
) -> Result<()> {
    info!("### {name} ###");

    let artifact = env.artifact(name)?;
    let bytecode_size = artifact.bytecode_size();
    info!("bytecode size: {bytecode_size} bytes");

    let instance = env
        .deploy(&artifact, &[])
        .map_err(|e| BenchError::deployment(name, e))?;
    let deploy = MeasurementRecord::deploy(
        name,
        instance.transaction.gas_used,
        gas_price,
        bytecode_size,
        instance.transaction.data.len() as u64,
    );
    info!(
        "deploy gasUsed: {}, fee: {} wei, tx size: {} bytes",
        deploy.gas_used, deploy.fee_wei, deploy.tx_size_bytes
    );
    records.push(deploy);

    let operation = workload.operation();
    info!("{name}.{operation}(): {} iterations", cfg.iterations);
    for i in 1..=cfg.iterations {
        match workload.invoke(env, &instance, gas_price) {
            Ok(inv) => records.push(MeasurementRecord::operation(
                name,
                operation,
                i,
                inv.gas_used,
                gas_price,
                inv.tx_size_bytes,
            )),
            Err(err) => error!(contract = name, iteration = i, "{operation} failed: {err}"),
        }
        if i % PROGRESS_EVERY == 0 {
            info!("iteration {i} done");
        }
    }
    Ok(())
}

/// Writes `records` as one pretty-printed JSON array, replacing `path`.
pub fn write_report(path: &Path, records: &[MeasurementRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}
