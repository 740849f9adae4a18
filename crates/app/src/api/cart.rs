//! Cart endpoints.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use storefront::{cart::Cart, fields};

use super::{ApiError, RestClient};
use crate::session::AuthToken;

#[derive(Debug, Serialize)]
struct AddToCart<'a> {
    pro_id: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateQuantity {
    quantity: u32,
}

#[async_trait]
impl CartApi for RestClient {
    #[instrument(skip_all)]
    async fn view_cart(&self, token: &AuthToken) -> Result<Cart, ApiError> {
        let body = self
            .send(self.authorized(Method::GET, &["cart", "view"], token)?)
            .await?;

        Ok(Cart::from_records(fields::records(&body, "cart")))
    }

    #[instrument(skip(self, token))]
    async fn add_to_cart(
        &self,
        token: &AuthToken,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::POST, &["cart", "add"], token)?
            .json(&AddToCart {
                pro_id: product_id,
                quantity,
            });

        self.send(request).await?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn update_quantity(
        &self,
        token: &AuthToken,
        cart_id: &str,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::PUT, &["cart", "update", cart_id], token)?
            .json(&UpdateQuantity { quantity });

        self.send(request).await?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn delete_line(&self, token: &AuthToken, cart_id: &str) -> Result<(), ApiError> {
        self.send(self.authorized(Method::DELETE, &["cart", "delete", cart_id], token)?)
            .await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the authoritative cart. An empty cart message maps to no lines.
    async fn view_cart(&self, token: &AuthToken) -> Result<Cart, ApiError>;

    /// Add `quantity` units of a product.
    async fn add_to_cart(
        &self,
        token: &AuthToken,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Set the quantity of a backend cart row.
    async fn update_quantity(
        &self,
        token: &AuthToken,
        cart_id: &str,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Delete a backend cart row.
    async fn delete_line(&self, token: &AuthToken, cart_id: &str) -> Result<(), ApiError>;
}
