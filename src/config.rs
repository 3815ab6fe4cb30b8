//! Scenario configuration.
//!
//! Every setting comes from a positional argument, an environment variable or
//! a built-in default. Which of the first two wins differs between scenarios,
//! so resolution is explicit here and the rest of the crate only ever sees a
//! finished [`BenchConfig`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{BenchError, Result};

pub const ORACLE_DEFAULT_ITERATIONS: u64 = 10;
pub const ORACLE_DEFAULT_FIXTURES: usize = 50;
pub const REENTRANCY_DEFAULT_ITERATIONS: u64 = 5_000;

const METRICS_FILE_NAME: &str = "metrics_output.json";

/// Auxiliary contracts deployed once before any variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureConfig {
    pub contract: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    pub iterations: u64,
    pub variants: Vec<String>,
    pub fixtures: Option<FixtureConfig>,
    pub result_dir: PathBuf,
    pub output_file: PathBuf,
}

impl BenchConfig {
    /// Builds a config, deriving the output locations the same way both
    /// scenarios do when `RESULT_DIR` and `OUTPUT_FILE` are unset.
    pub fn new(
        iterations: u64,
        variants: Vec<String>,
        fixtures: Option<FixtureConfig>,
        vars: &Vars,
    ) -> Result<Self> {
        if variants.is_empty() {
            return Err(BenchError::Config("at least one contract variant is required".into()));
        }

        let result_dir = vars
            .get("RESULT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new("results").join(variants.join("_")));
        let output_file = vars
            .get("OUTPUT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| result_dir.join(METRICS_FILE_NAME));

        Ok(Self {
            iterations,
            variants,
            fixtures,
            result_dir,
            output_file,
        })
    }

    pub fn log(&self) {
        info!("ITERATIONS={}", self.iterations);
        if let Some(fixtures) = &self.fixtures {
            info!("FIXTURE={} COUNT={}", fixtures.contract, fixtures.count);
        }
        for (i, variant) in self.variants.iter().enumerate() {
            info!("SC_{:02}={variant}", i + 1);
        }
        info!("RESULT_DIR={}", self.result_dir.display());
        info!("OUTPUT_FILE={}", self.output_file.display());
    }
}

/// Snapshot of environment variables. Empty values count as unset.
#[derive(Clone, Debug, Default)]
pub struct Vars(HashMap<String, String>);

impl Vars {
    /// Variables whose name or value is not valid UTF-8 are left out.
    pub fn from_env() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Vars(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn non_empty(arg: Option<String>) -> Option<String> {
    arg.filter(|v| !v.is_empty())
}

/// Parses a count the way a shell user expects: surrounding whitespace is
/// ignored and anything below zero means zero.
pub fn parse_count(key: &str, raw: &str) -> Result<u64> {
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|_| BenchError::Config(format!("{key} must be an integer, got {raw:?}")))?;
    Ok(n.max(0) as u64)
}

#[derive(Clone, Debug, Default)]
pub struct OracleAggregatorArgs {
    pub first: Option<String>,
    pub second: Option<String>,
    pub fixture: Option<String>,
}

/// Positional arguments win over `SC_01`, `SC_02` and `SC_TEST`.
pub fn oracle_aggregator(args: OracleAggregatorArgs, vars: &Vars) -> Result<BenchConfig> {
    let fixture_count = match vars.get("ORACLE_COUNT") {
        Some(raw) => parse_count("ORACLE_COUNT", &raw)? as usize,
        None => ORACLE_DEFAULT_FIXTURES,
    };
    let iterations = match vars.get("ITERATIONS") {
        Some(raw) => parse_count("ITERATIONS", &raw)?,
        None => ORACLE_DEFAULT_ITERATIONS,
    };

    let first = non_empty(args.first)
        .or_else(|| vars.get("SC_01"))
        .unwrap_or_else(|| "OraMemory".to_string());
    let second = non_empty(args.second)
        .or_else(|| vars.get("SC_02"))
        .unwrap_or_else(|| "OraTransient".to_string());
    let fixture = non_empty(args.fixture)
        .or_else(|| vars.get("SC_TEST"))
        .unwrap_or_else(|| "OraTest".to_string());

    BenchConfig::new(
        iterations,
        vec![first, second],
        Some(FixtureConfig {
            contract: fixture,
            count: fixture_count,
        }),
        vars,
    )
}

#[derive(Clone, Debug, Default)]
pub struct ReentrancyArgs {
    pub iterations: Option<String>,
    pub first: Option<String>,
    pub second: Option<String>,
}

/// `ITERATIONS`, `SC_01` and `SC_02` win over positional arguments.
pub fn reentrancy(args: ReentrancyArgs, vars: &Vars) -> Result<BenchConfig> {
    let iterations = match vars.get("ITERATIONS").or_else(|| non_empty(args.iterations)) {
        Some(raw) => parse_count("ITERATIONS", &raw)?,
        None => REENTRANCY_DEFAULT_ITERATIONS,
    };

    let first = vars
        .get("SC_01")
        .or_else(|| non_empty(args.first))
        .unwrap_or_else(|| "ReeStorage".to_string());
    let second = vars
        .get("SC_02")
        .or_else(|| non_empty(args.second))
        .unwrap_or_else(|| "ReeTransient".to_string());

    BenchConfig::new(iterations, vec![first, second], None, vars)
}
