use serde::{Deserialize, Serialize};

/// Input rejected before scoring, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationFailure {
    pub field: String,
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures raised by a probability oracle or while loading its artifact.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle did not answer within {after_ms} ms")]
    Timeout { after_ms: u64 },
    #[error("oracle returned invalid probability {0}")]
    InvalidProbability(f64),
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error raised while evaluating a single application.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationFailure),
    #[error("probability oracle unavailable: {0}")]
    OracleUnavailable(#[source] OracleError),
    #[error("probability oracle timed out after {after_ms} ms")]
    OracleTimeout { after_ms: u64 },
    #[error("computation invariant violated: {0}")]
    InvariantViolation(String),
}

impl ScoringError {
    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::InvalidInput(_) => "invalid_input",
            ScoringError::OracleUnavailable(_) => "oracle_unavailable",
            ScoringError::OracleTimeout { .. } => "oracle_timeout",
            ScoringError::InvariantViolation(_) => "invariant_violation",
        }
    }
}

impl From<OracleError> for ScoringError {
    fn from(value: OracleError) -> Self {
        match value {
            OracleError::Timeout { after_ms } => Self::OracleTimeout { after_ms },
            other => Self::OracleUnavailable(other),
        }
    }
}
