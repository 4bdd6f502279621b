//! REST bindings for the canteen order and queue services.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{OrderStore, QueueStore, StoreError};
use crate::domain::{Order, OrderId, OrderStatus, QueueEntry, UserId};

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

/// Order service client (`/api/orders/...`).
#[derive(Clone)]
pub struct HttpOrderStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOrderStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl OrderStore for HttpOrderStore {
    #[instrument(skip(self))]
    async fn get(&self, order_id: OrderId) -> Result<Order, StoreError> {
        get_json(&self.client, self.url(&format!("/api/orders/{order_id}"))).await
    }

    #[instrument(skip(self))]
    async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        let url = self.url(&format!("/api/orders/{order_id}/status/"));
        debug!(url = %url, "Sending status update");
        let response = self
            .client
            .put(&url)
            .json(&StatusUpdate { status })
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        check_status(response.status(), &url)?;
        response.json().await.map_err(|e| StoreError::Decode(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        get_json(&self.client, self.url(&format!("/api/orders/user/{user_id}"))).await
    }

    #[instrument(skip(self))]
    async fn list_active_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        get_json(&self.client, self.url(&format!("/api/orders/user/{user_id}/active"))).await
    }
}

/// Queue service client (`/api/queue/...`).
#[derive(Clone)]
pub struct HttpQueueStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpQueueStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl QueueStore for HttpQueueStore {
    #[instrument(skip(self))]
    async fn get(&self, order_id: OrderId) -> Result<QueueEntry, StoreError> {
        get_json(&self.client, self.url(&format!("/api/queue/order/{order_id}"))).await
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> Result<Vec<QueueEntry>, StoreError> {
        // The queue service encodes an empty queue as `null`.
        let entries: Option<Vec<QueueEntry>> =
            get_json(&self.client, self.url("/api/queue/active")).await?;
        Ok(entries.unwrap_or_default())
    }
}

fn trim_base(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: String) -> Result<T, StoreError> {
    debug!(url = %url, "Sending request");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    check_status(response.status(), &url)?;
    response.json().await.map_err(|e| StoreError::Decode(e.to_string()))
}

fn check_status(status: StatusCode, url: &str) -> Result<(), StoreError> {
    if status == StatusCode::NOT_FOUND {
        Err(StoreError::NotFound(url.to_string()))
    } else if !status.is_success() {
        Err(StoreError::Unavailable(format!("{url} returned {status}")))
    } else {
        Ok(())
    }
}
