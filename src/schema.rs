use ethabi::ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// Action label of the record emitted for a contract deployment.
pub const DEPLOY_ACTION: &str = "deploy";

/// One row of the metrics file.
///
/// Gas and size fields serialize as plain JSON numbers, while gas price and
/// fee are decimal strings so large wei amounts survive JSON consumers that
/// parse numbers as doubles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub contract: String,
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u64>,

    pub gas_used: u64,
    #[serde(with = "decimal")]
    pub gas_price: U256,
    #[serde(with = "decimal")]
    pub fee_wei: U256,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode_size_bytes: Option<u64>,
    pub tx_size_bytes: u64,
}

impl MeasurementRecord {
    pub fn deploy(
        contract: &str,
        gas_used: u64,
        gas_price: U256,
        bytecode_size_bytes: u64,
        tx_size_bytes: u64,
    ) -> Self {
        Self {
            contract: contract.to_string(),
            action: DEPLOY_ACTION.to_string(),
            iteration: None,
            gas_used,
            gas_price,
            fee_wei: fee(gas_used, gas_price),
            bytecode_size_bytes: Some(bytecode_size_bytes),
            tx_size_bytes,
        }
    }

    pub fn operation(
        contract: &str,
        action: &str,
        iteration: u64,
        gas_used: u64,
        gas_price: U256,
        tx_size_bytes: u64,
    ) -> Self {
        Self {
            contract: contract.to_string(),
            action: action.to_string(),
            iteration: Some(iteration),
            gas_used,
            gas_price,
            fee_wei: fee(gas_used, gas_price),
            bytecode_size_bytes: None,
            tx_size_bytes,
        }
    }

    pub fn is_deploy(&self) -> bool {
        self.action == DEPLOY_ACTION
    }
}

pub fn fee(gas_used: u64, gas_price: U256) -> U256 {
    gas_price.saturating_mul(U256::from(gas_used))
}

mod decimal {
    use ethabi::ethereum_types::U256;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s).map_err(|e| D::Error::custom(format!("{s:?}: {e:?}")))
    }
}
