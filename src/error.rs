//! Error types

use thiserror::Error;

/// Invalid pager configuration, reported before any page is laid out
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no measurement oracle is bound to the paginator")]
    MissingOracle,
    #[error("no page budget is configured")]
    MissingBudget,
    #[error("page budget must be a positive finite height, got first={first} interior={interior}")]
    InvalidBudget { first: f32, interior: f32 },
    #[error("invalid pagination rule: {0}")]
    InvalidRule(&'static str),
    #[error("unknown card template {0:?} (expected \"deep\" or \"classic\")")]
    UnknownTemplate(String),
}

/// Failure reported by a measurement oracle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("oracle returned an unusable height: {0}")]
    InvalidHeight(f32),
    #[error("measurement callback failed: {0}")]
    Callback(String),
}

/// A pagination run either yields every page or one of these
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaginateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Measure(#[from] MeasureError),
}

/// Style sheet or rules JSON that could not be read
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("malformed style JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, PaginateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_error_converts() {
        let err: PaginateError = MeasureError::InvalidHeight(f32::NAN).into();
        assert!(matches!(err, PaginateError::Measure(_)));
        assert!(err.to_string().contains("unusable height"));
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::UnknownTemplate("neon".into());
        assert_eq!(
            err.to_string(),
            "unknown card template \"neon\" (expected \"deep\" or \"classic\")"
        );
    }
}
