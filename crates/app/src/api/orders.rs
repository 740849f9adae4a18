//! Order endpoints.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use tracing::instrument;

use storefront::{
    cart::PLACEHOLDER_ID_PREFIX,
    fields::{self, FieldKeys},
    orders::{Order, OrderRequest, StatusUpdate},
};

use super::{ApiError, RestClient};
use crate::session::AuthToken;

const ORDER_ID: FieldKeys = FieldKeys(&["order_id", "id"]);
const MESSAGE: FieldKeys = FieldKeys(&["message"]);

/// What the backend reports for a newly placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    /// Backend-assigned order id.
    pub order_id: String,

    /// Confirmation message, if any.
    pub message: Option<String>,
}

#[async_trait]
impl OrdersApi for RestClient {
    #[instrument(skip_all, fields(items = order.items.len()))]
    async fn place_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> Result<PlacedOrder, ApiError> {
        let request = self
            .authorized(Method::POST, &["past_order", "add"], token)?
            .json(order);

        let body = self.send(request).await?;
        let body = fields::envelope(&body, &["order", "data"]);

        Ok(PlacedOrder {
            order_id: ORDER_ID.string(body).unwrap_or_default(),
            message: MESSAGE.string(body),
        })
    }

    #[instrument(skip_all)]
    async fn past_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let body = self
            .send(self.authorized(Method::GET, &["past_order", "view"], token)?)
            .await?;

        Ok(Order::from_response(&body))
    }

    #[instrument(skip(self, token))]
    async fn order(&self, token: &AuthToken, order_id: &str) -> Result<Order, ApiError> {
        let body = self
            .send(self.authorized(Method::GET, &["past_order", "view", order_id], token)?)
            .await?;

        let mut order = Order::from_record(fields::envelope(&body, &["order", "data"]), 0);

        if order.id.starts_with(PLACEHOLDER_ID_PREFIX) {
            order.id = order_id.to_string();
        }

        Ok(order)
    }

    #[instrument(skip(self, token))]
    async fn update_status(
        &self,
        token: &AuthToken,
        order_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        let request = self
            .authorized(
                Method::PATCH,
                &["past_order", "update-status", order_id],
                token,
            )?
            .json(update);

        self.send(request).await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Submit one order for every line in `order`.
    async fn place_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> Result<PlacedOrder, ApiError>;

    /// Fetch past orders, newest first.
    async fn past_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError>;

    /// Fetch one order.
    async fn order(&self, token: &AuthToken, order_id: &str) -> Result<Order, ApiError>;

    /// Change an order's payment and/or delivery status.
    async fn update_status(
        &self,
        token: &AuthToken,
        order_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), ApiError>;
}
