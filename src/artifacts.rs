//! Compiled contract lookup.
//!
//! Understands the Hardhat layout (`artifacts/contracts/<File>.sol/<Name>.json`
//! with a hex `bytecode` string) and the Foundry layout
//! (`out/<File>.sol/<Name>.json` with `bytecode.object`).

use std::fs;
use std::path::PathBuf;

use ethabi::Token;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BenchError, Result};

/// Bytecode and interface of one compiled contract.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub name: String,
    pub abi: ethabi::Contract,
    pub bytecode: Vec<u8>,
}

impl Artifact {
    /// Builds an artifact from a `0x`-prefixed (or bare) hex bytecode string.
    pub fn from_hex(name: &str, abi: ethabi::Contract, bytecode: &str) -> Result<Self> {
        let digits = bytecode.strip_prefix("0x").unwrap_or(bytecode);
        let bytecode = hex::decode(digits).map_err(|e| BenchError::InvalidArtifact {
            path: PathBuf::from(name),
            reason: format!("bytecode is not valid hex: {e}"),
        })?;
        Ok(Self {
            name: name.to_string(),
            abi,
            bytecode,
        })
    }

    /// Size of the creation bytecode, i.e. its hex length divided by two.
    pub fn bytecode_size(&self) -> u64 {
        self.bytecode.len() as u64
    }

    /// Creation payload: bytecode followed by the ABI-encoded constructor
    /// arguments.
    pub fn deploy_data(&self, args: &[Token]) -> Result<Vec<u8>> {
        if self.bytecode.is_empty() {
            return Err(BenchError::EmptyBytecode {
                name: self.name.clone(),
            });
        }
        match self.abi.constructor() {
            Some(constructor) => Ok(constructor.encode_input(self.bytecode.clone(), args)?),
            None if args.is_empty() => Ok(self.bytecode.clone()),
            None => Err(BenchError::Config(format!(
                "contract `{}` has no constructor but {} arguments were given",
                self.name,
                args.len()
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: Option<String>,
    abi: ethabi::Contract,
    bytecode: RawBytecode,
}

/// Artifact directory produced by `hardhat compile` or `forge build`.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, name: &str) -> Result<Vec<PathBuf>> {
        let file_name = format!("{name}.json");
        let mut out = Vec::new();

        let walker = walkdir::WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.file_name() != "build-info");
        for entry in walker {
            let entry = entry.map_err(|e| BenchError::Io(e.into()))?;
            let matches = entry.file_name().to_str() == Some(file_name.as_str());
            if entry.file_type().is_file() && matches {
                out.push(entry.into_path());
            }
        }
        out.sort();
        Ok(out)
    }

    pub fn load(&self, name: &str) -> Result<Artifact> {
        if !self.root.is_dir() {
            return Err(BenchError::ArtifactNotFound {
                name: name.to_string(),
                root: self.root.clone(),
            });
        }

        let mut candidates = self.candidates(name)?;
        let path = match candidates.len() {
            0 => {
                return Err(BenchError::ArtifactNotFound {
                    name: name.to_string(),
                    root: self.root.clone(),
                })
            }
            1 => candidates.remove(0),
            _ => {
                return Err(BenchError::AmbiguousArtifact {
                    name: name.to_string(),
                    candidates,
                })
            }
        };
        debug!(contract = name, path = %path.display(), "loading artifact");

        let text = fs::read_to_string(&path)?;
        let raw: RawArtifact = serde_json::from_str(&text).map_err(|e| BenchError::InvalidArtifact {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if let Some(declared) = &raw.contract_name {
            if declared != name {
                return Err(BenchError::InvalidArtifact {
                    path,
                    reason: format!("declares contract `{declared}`"),
                });
            }
        }

        let bytecode = match raw.bytecode {
            RawBytecode::Hex(s) => s,
            RawBytecode::Object { object } => object,
        };
        Artifact::from_hex(name, raw.abi, &bytecode).map_err(|e| match e {
            BenchError::InvalidArtifact { reason, .. } => {
                BenchError::InvalidArtifact { path, reason }
            }
            other => other,
        })
    }
}
