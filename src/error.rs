use thiserror::Error;

/// Structural contract violations found while building a `WorkflowGraph`.
///
/// These indicate a bug in whatever produced the graph, never a property of the
/// workflow being audited.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node id '{node_id}' appears more than once in the graph")]
    DuplicateNodeId { node_id: String },

    #[error("Edge '{edge_id}' references node '{node_id}', which is not part of the graph")]
    UnknownEdgeEndpoint { edge_id: String, node_id: String },
}

/// Errors that can occur when converting a custom workflow export into the
/// canonical graph and metadata.
#[derive(Error, Debug, Clone)]
pub enum WorkflowConversionError {
    #[error("Invalid workflow data: {0}")]
    Validation(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while loading an `AnalyzerConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
