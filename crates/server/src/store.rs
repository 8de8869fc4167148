use std::{collections::BTreeMap, sync::Arc};

use shared::domain::{Order, OrderDraft, OrderId};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("{0}")]
    Validation(String),
}

/// In-memory order table with server-assigned ids.
#[derive(Clone, Default)]
pub struct OrderStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    last_id: u64,
    orders: BTreeMap<u64, Order>,
}

fn validate(draft: &OrderDraft) -> Result<(), StoreError> {
    if draft.product_name.trim().is_empty() {
        return Err(StoreError::Validation("productName must not be empty".into()));
    }
    Ok(())
}

fn key(id: &OrderId) -> Result<u64, StoreError> {
    id.as_str()
        .trim()
        .parse()
        .map_err(|_| StoreError::NotFound(id.clone()))
}

impl OrderStore {
    pub async fn list(&self) -> Vec<Order> {
        self.inner.read().await.orders.values().cloned().collect()
    }

    /// One 1-based page of orders in id order. Page 0 is read as page 1.
    pub async fn page(&self, page_number: u32, page_size: u32) -> Vec<Order> {
        let skip = (page_number.max(1) as usize - 1).saturating_mul(page_size as usize);
        self.inner
            .read()
            .await
            .orders
            .values()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order, StoreError> {
        let key = key(id)?;
        self.inner
            .read()
            .await
            .orders
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub async fn create(&self, draft: OrderDraft) -> Result<Order, StoreError> {
        validate(&draft)?;
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let key = inner.last_id;
        let order = draft.with_id(OrderId::from(key));
        inner.orders.insert(key, order.clone());
        Ok(order)
    }

    /// Replaces the three mutable fields; the id never changes.
    pub async fn update(&self, id: &OrderId, draft: OrderDraft) -> Result<Order, StoreError> {
        validate(&draft)?;
        let key = key(id)?;
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        order.product_name = draft.product_name;
        order.quantity = draft.quantity;
        order.status = draft.status;
        Ok(order.clone())
    }

    pub async fn delete(&self, id: &OrderId) -> Result<(), StoreError> {
        let key = key(id)?;
        self.inner
            .write()
            .await
            .orders
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub async fn seed_demo(&self) -> Result<(), StoreError> {
        for (name, quantity, status) in [
            ("Widget", 3, "Pending"),
            ("Gadget", 1, "Shipped"),
            ("Sprocket", 12, "Processing"),
        ] {
            self.create(OrderDraft::new(name, quantity, status)).await?;
        }
        Ok(())
    }
}
