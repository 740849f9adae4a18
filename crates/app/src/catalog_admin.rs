//! Admin catalog console: categories and products.

use std::sync::Arc;

use storefront::catalog::{CatalogFormError, Category, CategoryForm, Product, ProductForm};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    admin::AdminError,
    api::{AdminCatalogApi, ApiError},
    session::{AuthToken, Session},
};

/// Outcome of the last console action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogAdminView {
    /// Confirmation of the last successful change.
    pub notice: Option<String>,

    /// Last user-visible failure.
    pub error: Option<String>,
}

/// Create, edit, inspect and delete categories and products.
pub struct CatalogAdmin {
    api: Arc<dyn AdminCatalogApi>,
    session: Session,
    view: Mutex<CatalogAdminView>,
}

impl std::fmt::Debug for CatalogAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogAdmin").finish_non_exhaustive()
    }
}

impl CatalogAdmin {
    #[must_use]
    pub fn new(api: Arc<dyn AdminCatalogApi>, session: Session) -> Self {
        Self {
            api,
            session,
            view: Mutex::new(CatalogAdminView::default()),
        }
    }

    /// A copy of the current view.
    pub async fn view(&self) -> CatalogAdminView {
        self.view.lock().await.clone()
    }

    /// Fetch one category.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a session, or the API
    /// error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn category(&self, category_id: &str) -> Result<Category, AdminError> {
        let token = self.token().await?;

        match self.api.category(&token, category_id).await {
            Ok(category) => {
                self.view.lock().await.error = None;

                Ok(category)
            }
            Err(error) => Err(self.record(error, "Failed to fetch category").await),
        }
    }

    /// Add a category.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Form`] before any call when the form is
    /// incomplete, [`AdminError::NotAuthenticated`] without a session, or the
    /// API error when the backend refuses.
    #[instrument(skip_all, fields(name = %form.name))]
    pub async fn create_category(&self, form: &CategoryForm) -> Result<Category, AdminError> {
        self.check(form.validate()).await?;

        let token = self.token().await?;

        match self.api.create_category(&token, form).await {
            Ok(category) => {
                self.confirm("Category added successfully").await;

                Ok(category)
            }
            Err(error) => Err(self.record(error, "Failed to create category").await),
        }
    }

    /// Rename a category and replace its image.
    ///
    /// # Errors
    ///
    /// As [`CatalogAdmin::create_category`].
    #[instrument(skip(self, form))]
    pub async fn edit_category(
        &self,
        category_id: &str,
        form: &CategoryForm,
    ) -> Result<Category, AdminError> {
        self.check(form.validate()).await?;

        let token = self.token().await?;

        match self.api.edit_category(&token, category_id, form).await {
            Ok(category) => {
                self.confirm("Category updated successfully").await;

                Ok(category)
            }
            Err(error) => Err(self.record(error, "Failed to update category").await),
        }
    }

    /// Delete a category with its products. Returns how many products went
    /// with it.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a session, or the API
    /// error when the backend refuses.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: &str) -> Result<u64, AdminError> {
        let token = self.token().await?;

        match self.api.delete_category(&token, category_id).await {
            Ok(products) => {
                self.confirm("Category deleted successfully").await;

                Ok(products)
            }
            Err(error) => Err(self.record(error, "Failed to delete category").await),
        }
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a session, or the API
    /// error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn product(&self, product_id: &str) -> Result<Product, AdminError> {
        let token = self.token().await?;

        match self.api.product(&token, product_id).await {
            Ok(product) => {
                self.view.lock().await.error = None;

                Ok(product)
            }
            Err(error) => Err(self.record(error, "Failed to fetch product").await),
        }
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Form`] before any call when the form is
    /// incomplete, [`AdminError::NotAuthenticated`] without a session, or the
    /// API error when the backend refuses.
    #[instrument(skip_all, fields(name = %form.name, category = %form.category_id))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, AdminError> {
        self.check(form.validate()).await?;

        let token = self.token().await?;

        match self.api.create_product(&token, form).await {
            Ok(product) => {
                self.confirm("Product added successfully").await;

                Ok(product)
            }
            Err(error) => Err(self.record(error, "Failed to create product").await),
        }
    }

    /// Replace every field of a product.
    ///
    /// # Errors
    ///
    /// As [`CatalogAdmin::create_product`].
    #[instrument(skip(self, form))]
    pub async fn edit_product(
        &self,
        product_id: &str,
        form: &ProductForm,
    ) -> Result<Product, AdminError> {
        self.check(form.validate()).await?;

        let token = self.token().await?;

        match self.api.edit_product(&token, product_id, form).await {
            Ok(product) => {
                self.confirm("Product updated successfully").await;

                Ok(product)
            }
            Err(error) => Err(self.record(error, "Failed to update product").await),
        }
    }

    /// Delete one product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a session, or the API
    /// error when the backend refuses.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: &str) -> Result<(), AdminError> {
        let token = self.token().await?;

        match self.api.delete_product(&token, product_id).await {
            Ok(()) => {
                self.confirm("Product deleted successfully").await;

                Ok(())
            }
            Err(error) => Err(self.record(error, "Failed to delete product").await),
        }
    }

    async fn check(&self, validation: Result<(), CatalogFormError>) -> Result<(), AdminError> {
        if let Err(error) = validation {
            self.view.lock().await.error = Some(error.to_string());

            return Err(error.into());
        }

        Ok(())
    }

    async fn token(&self) -> Result<AuthToken, AdminError> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => {
                self.view.lock().await.error = Some(AdminError::NotAuthenticated.to_string());

                Err(AdminError::NotAuthenticated)
            }
        }
    }

    async fn confirm(&self, notice: &str) {
        info!(notice, "catalog changed");

        let mut view = self.view.lock().await;

        view.notice = Some(notice.to_string());
        view.error = None;
    }

    async fn record(&self, error: ApiError, fallback: &str) -> AdminError {
        warn!(%error, "catalog admin request failed");

        self.session.invalidate_on(&error);

        let mut view = self.view.lock().await;

        view.notice = None;
        view.error = Some(error.backend_message().unwrap_or(fallback).to_string());

        error.into()
    }
}
