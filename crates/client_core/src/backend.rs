use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use shared::domain::{Order, OrderDraft, OrderId};

use crate::error::ClientResult;

/// Which backend surface the desk talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    Soap,
    Rest,
}

impl Protocol {
    pub fn toggled(self) -> Self {
        match self {
            Protocol::Soap => Protocol::Rest,
            Protocol::Rest => Protocol::Soap,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Soap => "soap",
            Protocol::Rest => "rest",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soap" => Ok(Protocol::Soap),
            "rest" => Ok(Protocol::Rest),
            other => Err(format!("unknown protocol {other:?}; expected soap or rest")),
        }
    }
}

#[async_trait]
pub trait OrderBackend: Send + Sync {
    fn protocol(&self) -> Protocol;
    async fn list_orders(&self) -> ClientResult<Vec<Order>>;
    async fn create_order(&self, draft: &OrderDraft) -> ClientResult<()>;
    async fn update_order(&self, id: &OrderId, draft: &OrderDraft) -> ClientResult<()>;
    async fn delete_order(&self, id: &OrderId) -> ClientResult<()>;
}

/// One adapter per protocol.
#[derive(Clone)]
pub struct BackendSet {
    soap: Arc<dyn OrderBackend>,
    rest: Arc<dyn OrderBackend>,
}

impl BackendSet {
    pub fn new(soap: Arc<dyn OrderBackend>, rest: Arc<dyn OrderBackend>) -> Self {
        Self { soap, rest }
    }

    pub fn for_protocol(&self, protocol: Protocol) -> Arc<dyn OrderBackend> {
        match protocol {
            Protocol::Soap => Arc::clone(&self.soap),
            Protocol::Rest => Arc::clone(&self.rest),
        }
    }
}
