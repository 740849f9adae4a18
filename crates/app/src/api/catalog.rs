//! Catalog endpoints. None of these need a token.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use tracing::instrument;

use storefront::catalog::{CategoryPage, Product};

use super::{ApiError, RestClient};

#[async_trait]
impl CatalogApi for RestClient {
    #[instrument(skip(self))]
    async fn list_categories(&self, page: u64) -> Result<CategoryPage, ApiError> {
        let request = self
            .request(Method::GET, &["products", "cat_info"])?
            .query(&[("pagination", page)]);

        let body = self.send(request).await?;

        Ok(CategoryPage::from_response(&body, page))
    }

    #[instrument(skip(self))]
    async fn list_products(&self, category_id: &str, page: u64) -> Result<Vec<Product>, ApiError> {
        let page = page.to_string();

        let request = self
            .request(Method::GET, &["products", "pro_info"])?
            .query(&[("pagination", page.as_str()), ("catgories_id", category_id)]);

        let body = self.send(request).await?;

        Ok(Product::list_from_response(&body))
    }

    #[instrument(skip(self))]
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let request = self
            .request(Method::GET, &["products", "search"])?
            .query(&[("query", query)]);

        let body = self.send(request).await?;

        Ok(Product::list_from_response(&body))
    }
}

#[automock]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of categories.
    async fn list_categories(&self, page: u64) -> Result<CategoryPage, ApiError>;

    /// Fetch one page of a category's products.
    async fn list_products(&self, category_id: &str, page: u64) -> Result<Vec<Product>, ApiError>;

    /// Search products by free text.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError>;
}
