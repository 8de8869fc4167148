use std::{fmt, str::FromStr};

use crate::domain::OrderId;

pub const SOAP_PATH: &str = "/Service.asmx";
pub const REST_ORDERS_PATH: &str = "/api/Order";

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const TEMPURI_NS: &str = "http://tempuri.org/";
pub const ORDER_MODELS_NS: &str = "http://schemas.datacontract.org/2004/07/RestApiWithDb.Models";
pub const XML_SCHEMA_INSTANCE_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SOAP_ACTION_PREFIX: &str = "http://tempuri.org/IOrderService/";
pub const SOAP_CONTENT_TYPE: &str = "text/xml";

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub fn rest_order_path(id: &OrderId) -> String {
    format!("{REST_ORDERS_PATH}/{id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapOperation {
    GetOrders,
    CreateOrder,
    UpdateOrder,
    DeleteOrder,
}

impl SoapOperation {
    pub const ALL: [SoapOperation; 4] = [
        SoapOperation::GetOrders,
        SoapOperation::CreateOrder,
        SoapOperation::UpdateOrder,
        SoapOperation::DeleteOrder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoapOperation::GetOrders => "GetOrders",
            SoapOperation::CreateOrder => "CreateOrder",
            SoapOperation::UpdateOrder => "UpdateOrder",
            SoapOperation::DeleteOrder => "DeleteOrder",
        }
    }

    /// Value of the `SOAPAction` header for this operation.
    pub fn soap_action(self) -> String {
        format!("{SOAP_ACTION_PREFIX}{}", self.name())
    }

    /// Accepts the header value with or without surrounding quotes.
    pub fn from_soap_action(header: &str) -> Option<Self> {
        let action = header.trim().trim_matches('"');
        action
            .strip_prefix(SOAP_ACTION_PREFIX)
            .and_then(|name| name.parse().ok())
    }
}

impl fmt::Display for SoapOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoapOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoapOperation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| format!("unknown SOAP operation {s:?}"))
    }
}
