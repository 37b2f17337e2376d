use thiserror::Error;

/// Errors raised by loading, training and forecasting.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing or malformed source columns, or nothing left after cleaning.
    #[error("Data error: {0}")]
    Data(String),

    /// Requested date outside the available history, or an empty slice.
    #[error("Range error: {0}")]
    Range(String),

    /// A prediction was requested from a predictor that has no fitted model.
    #[error("Model not ready: {0}")]
    ModelNotReady(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type ForecastResult<T> = Result<T, ForecastError>;

impl ForecastError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    /// Errors caused by the caller's input rather than by the process state.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Range(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForecastError::range("2030-01-01 is after the last observed period");
        assert_eq!(
            err.to_string(),
            "Range error: 2030-01-01 is after the last observed period"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(ForecastError::range("x").is_client_error());
        assert!(!ForecastError::data("x").is_client_error());
        assert!(!ForecastError::ModelNotReady("x".into()).is_client_error());
    }
}
