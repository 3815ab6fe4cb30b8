use std::io;
use std::path::PathBuf;

pub type Result<T, E = BenchError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// No compiled artifact carries the requested contract name.
    #[error("artifact for contract `{name}` not found under {root:?}")]
    ArtifactNotFound { name: String, root: PathBuf },

    /// The same contract name is compiled from more than one source file.
    #[error("contract name `{name}` is ambiguous: {candidates:?}")]
    AmbiguousArtifact {
        name: String,
        candidates: Vec<PathBuf>,
    },

    /// Abstract contracts and interfaces compile to empty bytecode.
    #[error("contract `{name}` has no deployable bytecode")]
    EmptyBytecode { name: String },

    #[error("invalid artifact {path:?}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("ABI encoding failed: {0}")]
    Abi(#[from] ethabi::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("`{method}` failed with code {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("malformed `{method}` response: {reason}")]
    MalformedResponse { method: String, reason: String },

    #[error("transaction {hash} reverted")]
    Reverted { hash: String },

    #[error("deployment of `{name}` failed: {source}")]
    Deployment {
        name: String,
        #[source]
        source: Box<BenchError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    pub(crate) fn deployment(name: &str, source: BenchError) -> Self {
        BenchError::Deployment {
            name: name.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn malformed(method: &str, reason: impl Into<String>) -> Self {
        BenchError::MalformedResponse {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
