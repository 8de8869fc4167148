//! HTTP plumbing shared by both adapters.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{
    backend::Protocol,
    error::{ClientError, ClientResult},
};

pub const DEFAULT_SOAP_URL: &str = "http://localhost:8080/Service.asmx";
pub const DEFAULT_REST_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub protocol: Protocol,
    pub soap_url: String,
    pub rest_base_url: String,
    pub page_number: u32,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            soap_url: DEFAULT_SOAP_URL.into(),
            rest_base_url: DEFAULT_REST_BASE_URL.into(),
            page_number: shared::protocol::DEFAULT_PAGE_NUMBER,
            page_size: shared::protocol::DEFAULT_PAGE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub fn build_http_client(timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ClientError::Transport)
}

/// Parses an endpoint and rejects urls that cannot carry a path.
pub fn parse_endpoint(raw: &str) -> ClientResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl {
            url: raw.to_string(),
            reason: "expected an http(s) url".into(),
        });
    }
    Ok(url)
}
