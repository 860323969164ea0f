use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {field} {reason}")]
    Config { field: &'static str, reason: String },

    #[error("Unsupported sampling strategy '{0}' (expected SRS or ERS)")]
    UnknownSamplingStrategy(String),

    #[error("Unsupported switch trigger '{0}' (expected random or endogenous)")]
    UnknownSwitchTrigger(String),

    #[error("Unsupported comparison basis '{0}' (expected objective or star)")]
    UnknownComparisonBasis(String),

    #[error("Malformed result record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Result record at line {line} is outside the expected grid: {reason}")]
    UnexpectedRecord { line: usize, reason: String },

    #[error("Duplicate result record: seed={seed} period={period} sample_size={sample_size}")]
    DuplicateRecord { seed: u64, period: u64, sample_size: usize },

    #[error("Incomplete results: expected {expected} records, found {found}")]
    IncompleteResults { expected: usize, found: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config { field, reason: reason.into() }
    }
}
