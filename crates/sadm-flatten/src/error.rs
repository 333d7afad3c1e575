use sadm_graph::{ErrorKind, GraphError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlattenError {
    /// A copy or relink step failed; the partial output was discarded.
    #[error("flatten aborted: {0}")]
    Graph(#[from] GraphError),

    #[error("failed to read config: {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseConfig {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl FlattenError {
    /// Graph error kind when the failure came from the graph layer.
    pub fn graph_kind(&self) -> Option<ErrorKind> {
        match self {
            FlattenError::Graph(err) => Some(err.kind()),
            _ => None,
        }
    }
}
