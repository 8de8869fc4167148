use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{Order, OrderDraft, OrderId},
    error::{ApiError, ErrorCode},
    protocol::{SoapOperation, REST_ORDERS_PATH, SOAP_PATH},
    soap::{self, SoapRequest},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod store;

use config::load_settings;
use store::{OrderStore, StoreError};

const SOAP_ACTION_HEADER: &str = "SOAPAction";
const SOAP_RESPONSE_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

struct AppState {
    store: OrderStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let store = OrderStore::default();
    if settings.seed_demo_orders {
        store.seed_demo().await?;
    }

    let app = build_router(Arc::new(AppState { store }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "order server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(SOAP_PATH, post(soap_endpoint))
        .route(REST_ORDERS_PATH, get(http_list_orders).post(http_create_order))
        .route(
            &format!("{REST_ORDERS_PATH}/:id"),
            get(http_get_order)
                .put(http_update_order)
                .delete(http_delete_order),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn api_error(error: StoreError) -> (StatusCode, Json<ApiError>) {
    match error {
        StoreError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(ErrorCode::NotFound, error.to_string())),
        ),
        StoreError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, error.to_string())),
        ),
    }
}

async fn http_list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.list().await)
}

async fn http_get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let order = state.store.get(&OrderId::new(id)).await.map_err(api_error)?;
    Ok(Json(order))
}

async fn http_create_order(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<OrderDraft>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.store.create(draft).await.map_err(api_error)?;
    info!(id = %order.id, "order created over REST");
    Ok((StatusCode::CREATED, Json(order)))
}

async fn http_update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(draft): Json<OrderDraft>,
) -> ApiResult<StatusCode> {
    let id = OrderId::new(id);
    state.store.update(&id, draft).await.map_err(api_error)?;
    info!(%id, "order updated over REST");
    Ok(StatusCode::NO_CONTENT)
}

async fn http_delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = OrderId::new(id);
    state.store.delete(&id).await.map_err(api_error)?;
    info!(%id, "order deleted over REST");
    Ok(StatusCode::NO_CONTENT)
}

struct SoapFault {
    code: &'static str,
    message: String,
}

impl SoapFault {
    fn client(message: impl Into<String>) -> Self {
        Self {
            code: "s:Client",
            message: message.into(),
        }
    }

    fn server(message: impl Into<String>) -> Self {
        Self {
            code: "s:Server",
            message: message.into(),
        }
    }
}

impl From<StoreError> for SoapFault {
    fn from(error: StoreError) -> Self {
        Self::client(error.to_string())
    }
}

async fn soap_endpoint(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let hint = headers
        .get(SOAP_ACTION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(SoapOperation::from_soap_action);

    match dispatch_soap(&state.store, &body, hint).await {
        Ok(xml) => soap_xml(StatusCode::OK, xml),
        Err(fault) => {
            warn!(code = fault.code, message = %fault.message, "answering SOAP fault");
            match soap::encode_fault(fault.code, &fault.message) {
                Ok(xml) => soap_xml(StatusCode::INTERNAL_SERVER_ERROR, xml),
                Err(error) => {
                    error!(%error, "failed to encode SOAP fault");
                    (StatusCode::INTERNAL_SERVER_ERROR, fault.message).into_response()
                }
            }
        }
    }
}

fn soap_xml(status: StatusCode, xml: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, SOAP_RESPONSE_CONTENT_TYPE)],
        xml,
    )
        .into_response()
}

async fn dispatch_soap(
    store: &OrderStore,
    body: &str,
    hint: Option<SoapOperation>,
) -> Result<String, SoapFault> {
    let request =
        soap::decode_request(body, hint).map_err(|error| SoapFault::client(error.to_string()))?;
    let operation = request.operation();

    let orders = match request {
        SoapRequest::GetOrders {
            page_number,
            page_size,
        } => store.page(page_number, page_size).await,
        SoapRequest::CreateOrder(draft) => {
            let order = store.create(draft).await?;
            info!(id = %order.id, "order created over SOAP");
            vec![order]
        }
        SoapRequest::UpdateOrder { id, draft } => {
            let order = store.update(&id, draft).await?;
            info!(%id, "order updated over SOAP");
            vec![order]
        }
        SoapRequest::DeleteOrder { id } => {
            store.delete(&id).await?;
            info!(%id, "order deleted over SOAP");
            Vec::new()
        }
    };

    soap::encode_response(operation, &orders).map_err(|error| SoapFault::server(error.to_string()))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
