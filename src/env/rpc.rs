//! Blocking JSON-RPC client for a development node (Hardhat, Anvil).
//!
//! Transactions are submitted with `eth_sendTransaction` from one of the
//! node's unlocked accounts, so no local signing is involved.

use std::thread;
use std::time::Duration;

use ethabi::ethereum_types::U256;
use ethabi::{Address, Token};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::{CallRequest, DeployTransaction, DeployedInstance, Environment, Receipt};
use crate::artifacts::{Artifact, ArtifactStore};
use crate::error::{BenchError, Result};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    gas_used: String,
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct RpcEnvironment {
    client: Client,
    url: String,
    from: Address,
    artifacts: ArtifactStore,
    next_id: u64,
    poll_interval: Duration,
}

impl RpcEnvironment {
    /// Connects to `url` and picks the sending account: `from` when given,
    /// otherwise the first account the node reports.
    pub fn connect(url: &str, artifacts: ArtifactStore, from: Option<Address>) -> Result<Self> {
        let mut env = Self {
            client: Client::new(),
            url: url.to_string(),
            from: Address::zero(),
            artifacts,
            next_id: 1,
            poll_interval: RECEIPT_POLL_INTERVAL,
        };

        env.from = match from {
            Some(address) => address,
            None => {
                let accounts: Vec<String> = env.request("eth_accounts", json!([]))?;
                let first = accounts.first().ok_or_else(|| {
                    BenchError::Config(format!("node at {url} exposes no unlocked accounts"))
                })?;
                parse_address("eth_accounts", first)?
            }
        };
        debug!(url, from = %to_hex(env.from.as_bytes()), "connected");
        Ok(env)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn from_address(&self) -> Address {
        self.from
    }

    fn request<T: DeserializeOwned>(&mut self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id;
        self.next_id += 1;
        trace!(id, method, %params, "rpc request");

        let response: Response = self
            .client
            .post(&self.url)
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()?
            .error_for_status()?
            .json()?;

        if let Some(err) = response.error {
            return Err(BenchError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }
        serde_json::from_value(response.result.unwrap_or(Value::Null))
            .map_err(|e| BenchError::malformed(method, e.to_string()))
    }

    fn wait_for_receipt(&mut self, hash: &str) -> Result<RawReceipt> {
        loop {
            let receipt: Option<RawReceipt> =
                self.request("eth_getTransactionReceipt", json!([hash]))?;
            if let Some(receipt) = receipt {
                if receipt.status.as_deref() == Some("0x0") {
                    return Err(BenchError::Reverted {
                        hash: receipt.transaction_hash,
                    });
                }
                return Ok(receipt);
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn transact(&mut self, tx: Value) -> Result<RawReceipt> {
        let hash: String = self.request("eth_sendTransaction", json!([tx]))?;
        self.wait_for_receipt(&hash)
    }
}

impl Environment for RpcEnvironment {
    fn artifact(&self, name: &str) -> Result<Artifact> {
        self.artifacts.load(name)
    }

    fn deploy(&mut self, artifact: &Artifact, args: &[Token]) -> Result<DeployedInstance> {
        let data = artifact.deploy_data(args)?;
        let receipt = self.transact(json!({
            "from": to_hex(self.from.as_bytes()),
            "data": to_hex(&data),
        }))?;

        let address = receipt
            .contract_address
            .as_deref()
            .ok_or_else(|| {
                BenchError::malformed("eth_getTransactionReceipt", "missing contractAddress")
            })?;
        let address = parse_address("eth_getTransactionReceipt", address)?;
        let gas_used = parse_u64("eth_getTransactionReceipt", &receipt.gas_used)?;

        Ok(DeployedInstance {
            name: artifact.name.clone(),
            address,
            abi: artifact.abi.clone(),
            transaction: DeployTransaction {
                hash: receipt.transaction_hash,
                data,
                gas_used,
            },
        })
    }

    fn estimate_gas(&mut self, call: &CallRequest) -> Result<u64> {
        let from = to_hex(self.from.as_bytes());
        let gas: String = self.request(
            "eth_estimateGas",
            json!([{
                "from": from,
                "to": to_hex(call.to.as_bytes()),
                "data": to_hex(&call.data),
            }]),
        )?;
        parse_u64("eth_estimateGas", &gas)
    }

    fn send_transaction(&mut self, call: &CallRequest, gas_price: U256) -> Result<Receipt> {
        let receipt = self.transact(json!({
            "from": to_hex(self.from.as_bytes()),
            "to": to_hex(call.to.as_bytes()),
            "data": to_hex(&call.data),
            "gasPrice": format!("0x{gas_price:x}"),
        }))?;
        Ok(Receipt {
            gas_used: parse_u64("eth_getTransactionReceipt", &receipt.gas_used)?,
            hash: receipt.transaction_hash,
        })
    }

    fn gas_price(&mut self) -> Result<U256> {
        let price: String = self.request("eth_gasPrice", json!([]))?;
        U256::from_str_radix(strip_0x(&price), 16)
            .map_err(|e| BenchError::malformed("eth_gasPrice", format!("{price:?}: {e:?}")))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

fn parse_u64(method: &str, s: &str) -> Result<u64> {
    u64::from_str_radix(strip_0x(s), 16)
        .map_err(|e| BenchError::malformed(method, format!("{s:?}: {e}")))
}

pub fn parse_address(method: &str, s: &str) -> Result<Address> {
    let bytes = hex::decode(strip_0x(s))
        .map_err(|e| BenchError::malformed(method, format!("{s:?}: {e}")))?;
    if bytes.len() != 20 {
        return Err(BenchError::malformed(method, format!("{s:?} is not a 20-byte address")));
    }
    Ok(Address::from_slice(&bytes))
}
