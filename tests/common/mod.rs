#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use contract_gas_bench::artifacts::Artifact;
use contract_gas_bench::env::{
    CallRequest, DeployTransaction, DeployedInstance, Environment, Receipt,
};
use contract_gas_bench::{BenchError, Result};
use ethabi::ethereum_types::U256;
use ethabi::{Address, Token};
use serde_json::json;

pub const DEPLOY_BASE_GAS: u64 = 53_000;
pub const CALL_BASE_GAS: u64 = 21_000;

/// In-memory chain with a simple, deterministic gas model.
pub struct FakeChain {
    artifacts: HashMap<String, Artifact>,
    deployed: HashMap<Address, String>,
    calls_per_contract: HashMap<Address, u64>,
    next_address: u64,
    pub gas_price: U256,
    pub gas_price_queries: usize,
    /// Contracts whose every call fails.
    pub reverting: HashSet<String>,
    /// Contract name -> 1-based call numbers that fail.
    pub failing_calls: HashMap<String, Vec<u64>>,
    /// Every operation in the order it reached the chain.
    pub journal: Vec<String>,
    /// Constructor arguments of every deployment, in order.
    pub constructor_args: Vec<(String, Vec<u8>)>,
    /// Calldata of every estimate or transaction, in order.
    pub calldata: Vec<Vec<u8>>,
}

impl FakeChain {
    pub fn new(gas_price: u64) -> Self {
        Self {
            artifacts: HashMap::new(),
            deployed: HashMap::new(),
            calls_per_contract: HashMap::new(),
            next_address: 1,
            gas_price: U256::from(gas_price),
            gas_price_queries: 0,
            reverting: HashSet::new(),
            failing_calls: HashMap::new(),
            journal: Vec::new(),
            constructor_args: Vec::new(),
            calldata: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.insert(artifact.name.clone(), artifact);
        self
    }

    pub fn deployments(&self) -> usize {
        self.deployed.len()
    }

    fn call_gas(&mut self, call: &CallRequest) -> Result<u64> {
        let name = self
            .deployed
            .get(&call.to)
            .cloned()
            .ok_or_else(|| BenchError::Config(format!("no contract at {:?}", call.to)))?;
        let n = self.calls_per_contract.entry(call.to).or_default();
        *n += 1;
        let n = *n;

        self.calldata.push(call.data.clone());
        let fails = self.reverting.contains(&name)
            || self
                .failing_calls
                .get(&name)
                .is_some_and(|calls| calls.contains(&n));
        if fails {
            return Err(BenchError::Rpc {
                method: "eth_call".into(),
                code: 3,
                message: "execution reverted".into(),
            });
        }
        Ok(CALL_BASE_GAS + 16 * call.data.len() as u64)
    }
}

impl Environment for FakeChain {
    fn artifact(&self, name: &str) -> Result<Artifact> {
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| BenchError::ArtifactNotFound {
                name: name.to_string(),
                root: "fake".into(),
            })
    }

    fn deploy(&mut self, artifact: &Artifact, args: &[Token]) -> Result<DeployedInstance> {
        let data = artifact.deploy_data(args)?;
        self.journal.push(format!("deploy {}", artifact.name));
        self.constructor_args
            .push((artifact.name.clone(), data[artifact.bytecode.len()..].to_vec()));

        let address = Address::from_low_u64_be(self.next_address);
        self.next_address += 1;
        self.deployed.insert(address, artifact.name.clone());

        Ok(DeployedInstance {
            name: artifact.name.clone(),
            address,
            abi: artifact.abi.clone(),
            transaction: DeployTransaction {
                hash: format!("0x{:064x}", self.next_address),
                gas_used: DEPLOY_BASE_GAS + 200 * data.len() as u64,
                data,
            },
        })
    }

    fn estimate_gas(&mut self, call: &CallRequest) -> Result<u64> {
        self.journal.push("estimate".into());
        self.call_gas(call)
    }

    fn send_transaction(&mut self, call: &CallRequest, gas_price: U256) -> Result<Receipt> {
        assert_eq!(gas_price, self.gas_price, "transactions use the snapshot price");
        self.journal.push("send".into());
        let gas_used = self.call_gas(call)?;
        Ok(Receipt {
            hash: format!("0x{:064x}", self.calldata.len()),
            gas_used,
        })
    }

    fn gas_price(&mut self) -> Result<U256> {
        self.journal.push("gas_price".into());
        self.gas_price_queries += 1;
        Ok(self.gas_price)
    }
}

fn abi(entries: serde_json::Value) -> ethabi::Contract {
    serde_json::from_value(entries).unwrap()
}

pub fn guard_artifact(name: &str, bytecode: &str) -> Artifact {
    let abi = abi(json!([{
        "type": "function",
        "name": "claimReward",
        "inputs": [],
        "outputs": [],
        "stateMutability": "nonpayable"
    }]));
    Artifact::from_hex(name, abi, bytecode).unwrap()
}

pub fn aggregator_artifact(name: &str, bytecode: &str) -> Artifact {
    let abi = abi(json!([{
        "type": "function",
        "name": "aggregateQuotes",
        "inputs": [{ "name": "oracles", "type": "address[]" }],
        "outputs": [{ "name": "", "type": "uint256" }],
        "stateMutability": "view"
    }]));
    Artifact::from_hex(name, abi, bytecode).unwrap()
}

pub fn oracle_artifact(name: &str) -> Artifact {
    let abi = abi(json!([{
        "type": "constructor",
        "inputs": [{ "name": "initialQuote", "type": "uint256" }],
        "stateMutability": "nonpayable"
    }]));
    Artifact::from_hex(name, abi, "0x60806040").unwrap()
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that writes into the returned buffer.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}
