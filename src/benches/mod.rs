use ethabi::ethereum_types::U256;

use crate::env::{DeployedInstance, Environment};
use crate::error::Result;


pub use oracle::OracleAggregator;
pub use reentrancy::Reentrancy;

/// Outcome of one benchmarked call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub gas_used: u64,
    pub tx_size_bytes: u64,
}

/// The scenario-specific half of a benchmark: which operation is measured and
/// what has to exist on chain before it can be called.
pub trait Workload {
    /// Name of the measured function, also used as the record's action label.
    fn operation(&self) -> &str;

    /// Deploys auxiliary contracts. Runs once, before any variant.
    fn prepare(&mut self, _env: &mut dyn Environment) -> Result<()> {
        Ok(())
    }

    fn invoke(
        &self,
        env: &mut dyn Environment,
        instance: &DeployedInstance,
        gas_price: U256,
    ) -> Result<Invocation>;
}
