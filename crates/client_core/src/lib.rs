use std::sync::Arc;

use shared::domain::{Order, OrderId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub mod backend;
pub mod error;
pub mod rest;
pub mod soap;
pub mod transport;
pub mod view_model;

pub use backend::{BackendSet, OrderBackend, Protocol};
pub use error::{ClientError, ClientResult};
pub use rest::RestBackend;
pub use soap::SoapBackend;
pub use transport::ClientSettings;
pub use view_model::{OrderForm, RefreshTicket, Submission, ViewState};

/// Async controller over [`ViewState`].
///
/// Every operation picks the adapter for the protocol selected at the time it
/// starts. The state lock is never held across a network call, so operations
/// may overlap; list responses are sequenced by [`RefreshTicket`].
pub struct OrderDesk {
    backends: BackendSet,
    state: Mutex<ViewState>,
}

impl OrderDesk {
    pub fn new(backends: BackendSet, protocol: Protocol) -> Self {
        Self {
            backends,
            state: Mutex::new(ViewState::new(protocol)),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Self> {
        let http = transport::build_http_client(settings.request_timeout)?;
        let soap = SoapBackend::new(http.clone(), transport::parse_endpoint(&settings.soap_url)?)
            .with_page(settings.page_number, settings.page_size);
        let rest = RestBackend::new(http, transport::parse_endpoint(&settings.rest_base_url)?);
        Ok(Self::new(
            BackendSet::new(Arc::new(soap), Arc::new(rest)),
            settings.protocol,
        ))
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    pub async fn protocol(&self) -> Protocol {
        self.state.lock().await.protocol()
    }

    /// Initial load.
    pub async fn mount(&self) -> ClientResult<()> {
        self.refresh().await
    }

    pub async fn refresh(&self) -> ClientResult<()> {
        let (ticket, backend) = {
            let mut state = self.state.lock().await;
            (
                state.begin_refresh(),
                self.backends.for_protocol(state.protocol()),
            )
        };
        self.load(ticket, backend).await
    }

    /// Switches protocol and refreshes once through the new adapter.
    pub async fn toggle_protocol(&self) -> ClientResult<Protocol> {
        let (ticket, protocol) = {
            let mut state = self.state.lock().await;
            (state.toggle_protocol(), state.protocol())
        };
        info!(%protocol, "switched protocol");
        self.load(ticket, self.backends.for_protocol(protocol))
            .await?;
        Ok(protocol)
    }

    /// No-op when `protocol` is already selected.
    pub async fn set_protocol(&self, protocol: Protocol) -> ClientResult<()> {
        if self.protocol().await == protocol {
            return Ok(());
        }
        self.toggle_protocol().await.map(|_| ())
    }

    pub async fn update_form(&self, edit: impl FnOnce(&mut OrderForm)) {
        edit(self.state.lock().await.form_mut());
    }

    pub async fn edit(&self, id: &OrderId) -> ClientResult<()> {
        let result = self.state.lock().await.begin_edit_by_id(id);
        match result {
            Ok(()) => Ok(()),
            Err(error) => self.fail("editing order", error).await,
        }
    }

    /// Starts editing `order` as given, without looking it up in the list.
    /// Used when the order may sit outside the fetched page.
    pub async fn edit_order(&self, order: &Order) {
        self.state.lock().await.begin_edit(order);
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.cancel_edit();
    }

    /// Creates or updates depending on whether an order is being edited.
    /// The form is cleared only when the call succeeds.
    pub async fn submit(&self) -> ClientResult<()> {
        let prepared = {
            let state = self.state.lock().await;
            state
                .submission()
                .map(|submission| (submission, self.backends.for_protocol(state.protocol())))
        };
        let (submission, backend) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => return self.fail("submitting order", error).await,
        };

        let result = match &submission {
            Submission::Create(draft) => backend.create_order(draft).await,
            Submission::Update { id, draft } => backend.update_order(id, draft).await,
        };
        if let Err(error) = result {
            return self.fail("submitting order", error).await;
        }

        match &submission {
            Submission::Create(draft) => {
                info!(
                    protocol = %backend.protocol(),
                    product = %draft.product_name,
                    "order created"
                )
            }
            Submission::Update { id, .. } => {
                info!(protocol = %backend.protocol(), %id, "order updated")
            }
        }
        self.state.lock().await.finish_submit();
        self.refresh().await
    }

    pub async fn delete(&self, id: &OrderId) -> ClientResult<()> {
        let backend = self.backends.for_protocol(self.protocol().await);
        if let Err(error) = backend.delete_order(id).await {
            return self.fail("deleting order", error).await;
        }
        info!(protocol = %backend.protocol(), %id, "order deleted");
        self.refresh().await
    }

    async fn load(
        &self,
        ticket: RefreshTicket,
        backend: Arc<dyn OrderBackend>,
    ) -> ClientResult<()> {
        let protocol = backend.protocol();
        match backend.list_orders().await {
            Ok(orders) => {
                let count = orders.len();
                let mut state = self.state.lock().await;
                if state.apply_orders(ticket, orders) {
                    state.clear_error();
                    debug!(%protocol, count, "order list refreshed");
                } else {
                    warn!(%protocol, ?ticket, "discarding stale order list response");
                }
                Ok(())
            }
            Err(error) => self.fail("fetching orders", error).await,
        }
    }

    async fn fail<T>(&self, action: &str, error: ClientError) -> ClientResult<T> {
        error!(%error, "error {action}");
        self.state
            .lock()
            .await
            .record_error(format!("error {action}: {error}"));
        Err(error)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
