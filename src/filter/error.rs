use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
