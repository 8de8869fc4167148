//! REST adapter: verb-to-CRUD mapping over `/api/Order[/:id]`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Order, OrderDraft, OrderId},
    error::ApiError,
};
use tracing::debug;
use url::Url;

use crate::{
    backend::{OrderBackend, Protocol},
    error::{ClientError, ClientResult},
};

pub struct RestBackend {
    http: Client,
    base: Url,
}

impl RestBackend {
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    /// `{base}/api/Order` or `{base}/api/Order/{id}`, keeping any path prefix
    /// of the base url and escaping the id as a path segment.
    pub fn orders_url(&self, id: Option<&OrderId>) -> ClientResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| ClientError::InvalidUrl {
                url: self.base.to_string(),
                reason: "base url cannot carry a path".into(),
            })?;
            segments.pop_if_empty().extend(["api", "Order"]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn check(operation: &'static str, res: Response) -> ClientResult<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiError>(&body) {
            Ok(api) => Err(ClientError::Api {
                operation,
                status: status.as_u16(),
                code: api.code,
                message: api.message,
            }),
            Err(_) => Err(ClientError::Status {
                operation,
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl OrderBackend for RestBackend {
    fn protocol(&self) -> Protocol {
        Protocol::Rest
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let url = self.orders_url(None)?;
        debug!(%url, "GET orders");
        let res = self.http.get(url).send().await?;
        let res = Self::check("list_orders", res).await?;
        Ok(res.json().await?)
    }

    async fn create_order(&self, draft: &OrderDraft) -> ClientResult<()> {
        let url = self.orders_url(None)?;
        debug!(%url, "POST order");
        let res = self.http.post(url).json(draft).send().await?;
        Self::check("create_order", res).await?;
        Ok(())
    }

    async fn update_order(&self, id: &OrderId, draft: &OrderDraft) -> ClientResult<()> {
        let url = self.orders_url(Some(id))?;
        debug!(%url, "PUT order");
        let res = self.http.put(url).json(draft).send().await?;
        Self::check("update_order", res).await?;
        Ok(())
    }

    async fn delete_order(&self, id: &OrderId) -> ClientResult<()> {
        let url = self.orders_url(Some(id))?;
        debug!(%url, "DELETE order");
        let res = self.http.delete(url).send().await?;
        Self::check("delete_order", res).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
