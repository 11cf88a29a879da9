//! Error types for the glmtune crate

use thiserror::Error;

/// Result type alias for glmtune operations
pub type Result<T> = std::result::Result<T, TuneError>;

/// Main error type for the glmtune crate
#[derive(Error, Debug)]
pub enum TuneError {
    #[error("Invalid assignment: {name} = {value}, {reason}")]
    InvalidAssignment {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported family: {0} (expected one of: identity, log)")]
    UnsupportedFamily(String),

    #[error("Fit failure: {0}")]
    FitFailure(String),

    #[error("Convergence failed after {iterations} iterations")]
    Convergence { iterations: usize },

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("No successful trial: every trial in the search failed")]
    NoSuccessfulTrial,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TuneError {
    fn from(err: serde_json::Error) -> Self {
        TuneError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TuneError::UnsupportedFamily("probit".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported family: probit (expected one of: identity, log)"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TuneError = io_err.into();
        assert!(matches!(err, TuneError::Io(_)));
    }

    #[test]
    fn test_shape_error_display() {
        let err = TuneError::Shape {
            expected: "y length = 10".to_string(),
            actual: "y length = 8".to_string(),
        };
        assert!(err.to_string().contains("expected y length = 10"));
    }
}
