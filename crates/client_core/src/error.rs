use shared::error::{ErrorCode, SoapError};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{operation} failed with HTTP {status}")]
    Status { operation: &'static str, status: u16 },
    #[error("{operation} rejected by server (HTTP {status}, {code:?}): {message}")]
    Api {
        operation: &'static str,
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error(transparent)]
    Soap(#[from] SoapError),
    #[error("invalid order form: {0}")]
    Validation(String),
    #[error("order {0} is not in the current list")]
    UnknownOrder(String),
}
