use thiserror::Error;

pub type GridCalcResult<T> = Result<T, GridCalcError>;

#[derive(Error, Debug)]
pub enum GridCalcError {
    #[error("Formula evaluation error: {0}")]
    Eval(String),

    #[error("Circular dependency detected: column '{0}'")]
    CircularDependency(String),

    #[error("Alias constraint violation: {0}")]
    Alias(String),

    #[error("Column definition error: {0}")]
    Definition(String),

    #[error("JSON serialization error: {0}")]
    Export(#[from] serde_json::Error),
}
