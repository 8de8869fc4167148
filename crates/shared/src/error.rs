use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Internal,
}

/// JSON error body returned by the REST surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SoapError {
    #[error("failed to write SOAP envelope: {0}")]
    Write(String),
    #[error("malformed SOAP XML: {0}")]
    Malformed(String),
    #[error("<{element}> is missing child <{field}>")]
    MissingField { element: String, field: String },
    #[error("invalid number {value:?} in <{element}>")]
    InvalidNumber { element: String, value: String },
    #[error("SOAP body has no operation element")]
    MissingOperation,
    #[error("SOAP fault: {0}")]
    Fault(String),
}
