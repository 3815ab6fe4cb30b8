//! The chain the benchmarks run against.

use ethabi::ethereum_types::U256;
use ethabi::{Address, Token};

use crate::artifacts::Artifact;
use crate::error::Result;

pub mod rpc;

pub use rpc::RpcEnvironment;

/// A message call to an already deployed contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Vec<u8>,
}

/// Mined transaction as far as the benchmarks care.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub hash: String,
    pub gas_used: u64,
}

/// The transaction that created a contract.
#[derive(Clone, Debug)]
pub struct DeployTransaction {
    pub hash: String,
    pub data: Vec<u8>,
    pub gas_used: u64,
}

/// One deployed contract. The ABI travels with it so calls can be encoded
/// without going back to the artifact store.
#[derive(Clone, Debug)]
pub struct DeployedInstance {
    pub name: String,
    pub address: Address,
    pub abi: ethabi::Contract,
    pub transaction: DeployTransaction,
}

impl DeployedInstance {
    pub fn encode_call(&self, function: &str, args: &[Token]) -> Result<CallRequest> {
        Ok(CallRequest {
            to: self.address,
            data: self.abi.function(function)?.encode_input(args)?,
        })
    }
}

/// Everything the runner needs from a chain. Every call blocks until the
/// node has answered, so callers observe operations strictly in order.
pub trait Environment {
    /// Resolves a compiled contract by name.
    fn artifact(&self, name: &str) -> Result<Artifact>;

    /// Deploys `artifact` and waits for the receipt.
    fn deploy(&mut self, artifact: &Artifact, args: &[Token]) -> Result<DeployedInstance>;

    fn estimate_gas(&mut self, call: &CallRequest) -> Result<u64>;

    /// Sends `call` as a transaction and waits for it to be mined.
    fn send_transaction(&mut self, call: &CallRequest, gas_price: U256) -> Result<Receipt>;

    fn gas_price(&mut self) -> Result<U256>;
}
