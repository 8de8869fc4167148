//! SOAP adapter: one POST endpoint, operation named by the `SOAPAction` header.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::{
    domain::{Order, OrderDraft, OrderId},
    error::SoapError,
    protocol::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, SOAP_CONTENT_TYPE},
    soap::{self, SoapRequest},
};
use tracing::debug;
use url::Url;

use crate::{
    backend::{OrderBackend, Protocol},
    error::{ClientError, ClientResult},
};

pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

pub struct SoapBackend {
    http: Client,
    endpoint: Url,
    page_number: u32,
    page_size: u32,
}

impl SoapBackend {
    pub fn new(http: Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page(mut self, page_number: u32, page_size: u32) -> Self {
        self.page_number = page_number;
        self.page_size = page_size;
        self
    }

    async fn call(&self, request: &SoapRequest) -> ClientResult<String> {
        let operation = request.operation();
        let envelope = soap::encode_request(request)?;
        debug!(%operation, endpoint = %self.endpoint, "sending SOAP request");

        let res = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header(SOAP_ACTION_HEADER, operation.soap_action())
            .body(envelope)
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            // Servers answer faults with HTTP 500; the fault text is the useful part.
            if let Err(SoapError::Fault(message)) = soap::decode_ack_response(&body) {
                return Err(SoapError::Fault(message).into());
            }
            return Err(ClientError::Status {
                operation: operation.name(),
                status: status.as_u16(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl OrderBackend for SoapBackend {
    fn protocol(&self) -> Protocol {
        Protocol::Soap
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let body = self
            .call(&SoapRequest::GetOrders {
                page_number: self.page_number,
                page_size: self.page_size,
            })
            .await?;
        Ok(soap::decode_orders_response(&body)?)
    }

    async fn create_order(&self, draft: &OrderDraft) -> ClientResult<()> {
        let body = self.call(&SoapRequest::CreateOrder(draft.clone())).await?;
        Ok(soap::decode_ack_response(&body)?)
    }

    async fn update_order(&self, id: &OrderId, draft: &OrderDraft) -> ClientResult<()> {
        let body = self
            .call(&SoapRequest::UpdateOrder {
                id: id.clone(),
                draft: draft.clone(),
            })
            .await?;
        Ok(soap::decode_ack_response(&body)?)
    }

    async fn delete_order(&self, id: &OrderId) -> ClientResult<()> {
        let body = self
            .call(&SoapRequest::DeleteOrder { id: id.clone() })
            .await?;
        Ok(soap::decode_ack_response(&body)?)
    }
}

#[cfg(test)]
#[path = "tests/soap_tests.rs"]
mod tests;
