//! Catalog Reader
//!
//! Read-only category and product listings. Nothing is cached: every page or
//! query change is a fresh fetch, and a failed fetch leaves an empty listing
//! with a message until the shopper tries again.

use std::sync::Arc;

use storefront::catalog::{CategoryPage, Product, ProductQuery};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, CatalogApi};

/// Shown when the category listing fails to load.
pub const CATEGORIES_FAILED: &str = "Failed to load categories. Please try again.";

/// Shown when a product listing or search fails to load.
pub const PRODUCTS_FAILED: &str = "Failed to load products. Please try again.";

/// A catalog listing failed to load.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{message}")]
    Load {
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

/// What the catalog screens render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    /// Current category page.
    pub categories: CategoryPage,

    /// Category listing failure.
    pub category_error: Option<String>,

    /// Listing the products below were fetched for.
    pub product_query: Option<ProductQuery>,

    /// Current product listing or search results.
    pub products: Vec<Product>,

    /// Product listing failure.
    pub product_error: Option<String>,
}

/// Read-only category and product listings.
pub struct CatalogReader {
    api: Arc<dyn CatalogApi>,
    view: Mutex<CatalogView>,
}

impl std::fmt::Debug for CatalogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReader").finish_non_exhaustive()
    }
}

impl CatalogReader {
    #[must_use]
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            view: Mutex::new(CatalogView::default()),
        }
    }

    /// A copy of the current view.
    pub async fn view(&self) -> CatalogView {
        self.view.lock().await.clone()
    }

    /// Fetch one page of categories.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Load`] when the fetch fails; the view then
    /// holds an empty page and [`CATEGORIES_FAILED`].
    #[instrument(skip(self))]
    pub async fn list_categories(&self, page: u64) -> Result<CategoryPage, CatalogError> {
        let page = page.max(1);

        match self.api.list_categories(page).await {
            Ok(listing) => {
                debug!(
                    items = listing.items.len(),
                    total_pages = listing.total_pages,
                    "categories loaded"
                );

                let mut view = self.view.lock().await;

                view.categories = listing.clone();
                view.category_error = None;

                Ok(listing)
            }
            Err(source) => {
                warn!(error = %source, "failed to load categories");

                let mut view = self.view.lock().await;

                view.categories = CategoryPage::empty(page);
                view.category_error = Some(CATEGORIES_FAILED.to_string());

                Err(CatalogError::Load {
                    message: CATEGORIES_FAILED,
                    source,
                })
            }
        }
    }

    /// Move the category listing to `page`. Pages outside the known range
    /// are ignored and return `None` without a fetch.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Load`] when the fetch fails.
    pub async fn change_page(&self, page: u64) -> Result<Option<CategoryPage>, CatalogError> {
        let accepted = self.view.lock().await.categories.accepts_page(page);

        if !accepted {
            debug!(page, "ignoring out-of-range category page");

            return Ok(None);
        }

        self.list_categories(page).await.map(Some)
    }

    /// Show products for a category, or search results when `search` is not
    /// blank. Results for a listing that was superseded while in flight are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Load`] when the fetch fails; the view then
    /// holds no products and [`PRODUCTS_FAILED`].
    #[instrument(skip(self))]
    pub async fn show_products(
        &self,
        category_id: &str,
        page: u64,
        search: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::resolve(category_id, page, search);

        self.view.lock().await.product_query = Some(query.clone());

        let result = match &query {
            ProductQuery::Category { id, page } => self.api.list_products(id, *page).await,
            ProductQuery::Search(text) => self.api.search_products(text).await,
        };

        let mut view = self.view.lock().await;

        if view.product_query.as_ref() != Some(&query) {
            debug!("discarding results for a superseded listing");

            return result.map_err(|source| CatalogError::Load {
                message: PRODUCTS_FAILED,
                source,
            });
        }

        match result {
            Ok(products) => {
                debug!(items = products.len(), "products loaded");

                view.products.clone_from(&products);
                view.product_error = None;

                Ok(products)
            }
            Err(source) => {
                warn!(error = %source, "failed to load products");

                view.products.clear();
                view.product_error = Some(PRODUCTS_FAILED.to_string());

                Err(CatalogError::Load {
                    message: PRODUCTS_FAILED,
                    source,
                })
            }
        }
    }
}
