//! Error types for guide star search and asterism analysis.

/// Result type for guide star operations
pub type AgsResult<T> = Result<T, AgsError>;

/// Error type for guide star operations
#[derive(Debug, thiserror::Error)]
pub enum AgsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Estimator failure: {0}")]
    EstimatorFailure(#[from] EstimatorError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<String> for AgsError {
    fn from(s: String) -> Self {
        AgsError::InternalError(s)
    }
}

impl From<&str> for AgsError {
    fn from(s: &str) -> Self {
        AgsError::InternalError(s.to_string())
    }
}

/// Failure of the external quality estimator for a single star selection.
///
/// These never abort an analysis run: the analyzer discards the affected
/// combination and keeps going.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimatorError {
    #[error("estimation failed: {0}")]
    Failed(String),

    #[error("degenerate star selection: {0}")]
    Degenerate(String),

    #[error("estimator panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgsError::InvalidConfiguration("outer < inner".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: outer < inner");
    }

    #[test]
    fn test_estimator_error_converts() {
        let err: AgsError = EstimatorError::Failed("no psf".to_string()).into();
        assert!(matches!(err, AgsError::EstimatorFailure(_)));
        assert_eq!(err.to_string(), "Estimator failure: estimation failed: no psf");
    }

    #[test]
    fn test_from_str_is_internal() {
        let err: AgsError = "boom".into();
        assert!(matches!(err, AgsError::InternalError(_)));
    }
}
