use thiserror::Error;

/// Failures raised while building a network or running a single pass over it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("network already contains a node named '{0}'")]
    DuplicateNode(String),

    #[error("no node named '{0}' in the network")]
    UnknownNode(String),

    #[error("topology is frozen once training has begun")]
    TopologyFrozen,

    #[error("cannot connect '{source_name}' -> '{target}': {reason}")]
    InvalidConnection {
        source_name: String,
        target: String,
        reason: &'static str,
    },

    #[error("connecting '{source_name}' -> '{target}' would close a cycle")]
    CycleDetected { source_name: String, target: String },

    #[error("node '{0}' does not have a corresponding input value")]
    MissingInput(String),

    #[error("no expected value supplied for output node '{0}'")]
    MissingExpected(String),

    #[error("no actual value supplied for output node '{0}'")]
    MissingActual(String),

    #[error("node '{node}' has {weights} weights but {inputs} inputs")]
    DimensionMismatch {
        node: String,
        weights: usize,
        inputs: usize,
    },

    #[error("backward called without a preceding forward pass")]
    NoForwardPass,
}

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Failures surfaced by `Trainer::train`.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training set is empty")]
    EmptyDataset,

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("dataset returned no example for index {0}")]
    MissingExample(usize),

    #[error("unable to evaluate example {index}")]
    Evaluation {
        index: usize,
        #[source]
        source: NetworkError,
    },

    #[error("unable to train network: epoch {epoch} failed")]
    Failed {
        epoch: usize,
        #[source]
        source: NetworkError,
    },
}

/// Failures from the example-set and value-translation helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("requested {requested} examples but the set only holds {available}")]
    PartitionTooLarge { requested: usize, available: usize },

    #[error("partition fractions sum to {0}, which exceeds 1.0")]
    FractionsExceedOne(f64),

    #[error("row is missing column '{0}'")]
    MissingColumn(String),

    #[error("\"{0}\" has not been defined for this translator")]
    UnknownClass(String),

    #[error("range scaler needs max > min (got min={min}, max={max})")]
    DegenerateRange { min: f64, max: f64 },
}

/// Failures while reading or writing a JSON configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
