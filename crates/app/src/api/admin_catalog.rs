//! Admin catalog endpoints under `admin/operation`. Every call needs an admin
//! token; creates and edits are multipart uploads carrying the image.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{
    Method, RequestBuilder,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::instrument;

use storefront::{
    catalog::{Category, CategoryForm, ImageFile, Product, ProductForm},
    fields::{self, FieldKeys},
};

use super::{ApiError, RestClient};
use crate::session::AuthToken;

const DELETED_PRODUCTS: FieldKeys = FieldKeys(&["deleted_products_count"]);

fn image_part(image: &ImageFile) -> Part {
    Part::bytes(image.bytes.clone()).file_name(image.file_name.clone())
}

fn category_form(form: &CategoryForm, category_id: Option<&str>) -> Form {
    let multipart = category_id.map_or_else(Form::new, |id| {
        Form::new().text("cat_id", id.to_string())
    });

    multipart
        .text("catgories_name", form.name.trim().to_string())
        .part("catgories_img", image_part(&form.image))
}

fn product_form(form: &ProductForm, product_id: Option<&str>) -> Form {
    let multipart = product_id.map_or_else(Form::new, |id| {
        Form::new().text("pro_id", id.to_string())
    });

    multipart
        .text("cat_id", form.category_id.trim().to_string())
        .text("product_name", form.name.trim().to_string())
        .text("product_description", form.description.trim().to_string())
        .text("price", form.price.normalize().to_string())
        .part("product_img", image_part(&form.image))
}

/// The category in a `data` envelope. A bare string body is the backend
/// refusing with a 200.
fn category_from(body: &Value) -> Result<Category, ApiError> {
    Category::from_record(fields::envelope(body, &["data"])).ok_or_else(|| refusal(body))
}

/// The product in a `data` envelope, falling back to the category it was
/// filed under when the response leaves it out.
fn product_from(body: &Value, category_id: Option<&str>) -> Result<Product, ApiError> {
    let mut product =
        Product::from_record(fields::envelope(body, &["data"])).ok_or_else(|| refusal(body))?;

    if product.category_id.is_none() {
        product.category_id = category_id.map(str::to_string);
    }

    Ok(product)
}

fn refusal(body: &Value) -> ApiError {
    let message = body
        .as_str()
        .map(str::to_string)
        .or_else(|| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unexpected response".to_string());

    ApiError::Rejected(message)
}

impl RestClient {
    fn operation(
        &self,
        method: Method,
        action: &str,
        token: &AuthToken,
    ) -> Result<RequestBuilder, ApiError> {
        self.authorized(method, &["admin", "operation", action], token)
    }
}

#[async_trait]
impl AdminCatalogApi for RestClient {
    #[instrument(skip(self, token))]
    async fn category(&self, token: &AuthToken, category_id: &str) -> Result<Category, ApiError> {
        let request = self
            .operation(Method::GET, "get_catgories", token)?
            .query(&[("catgories_id", category_id)]);

        category_from(&self.send(request).await?)
    }

    #[instrument(skip_all)]
    async fn create_category(
        &self,
        token: &AuthToken,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        let request = self
            .operation(Method::POST, "new_catgories", token)?
            .multipart(category_form(form, None));

        category_from(&self.send(request).await?)
    }

    #[instrument(skip(self, token, form))]
    async fn edit_category(
        &self,
        token: &AuthToken,
        category_id: &str,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        let request = self
            .operation(Method::PUT, "edit_catgories", token)?
            .multipart(category_form(form, Some(category_id)));

        category_from(&self.send(request).await?)
    }

    #[instrument(skip(self, token))]
    async fn delete_category(&self, token: &AuthToken, category_id: &str) -> Result<u64, ApiError> {
        let request = self
            .operation(Method::DELETE, "delete_catgories", token)?
            .query(&[("catgories_id", category_id)]);

        let body = self.send(request).await?;

        Ok(DELETED_PRODUCTS
            .integer(&body)
            .and_then(|count| u64::try_from(count).ok())
            .unwrap_or_default())
    }

    #[instrument(skip(self, token))]
    async fn product(&self, token: &AuthToken, product_id: &str) -> Result<Product, ApiError> {
        let request = self
            .operation(Method::GET, "get_product", token)?
            .query(&[("product_id", product_id)]);

        product_from(&self.send(request).await?, None)
    }

    #[instrument(skip_all)]
    async fn create_product(
        &self,
        token: &AuthToken,
        form: &ProductForm,
    ) -> Result<Product, ApiError> {
        let request = self
            .operation(Method::POST, "new_product", token)?
            .multipart(product_form(form, None));

        product_from(&self.send(request).await?, Some(&form.category_id))
    }

    #[instrument(skip(self, token, form))]
    async fn edit_product(
        &self,
        token: &AuthToken,
        product_id: &str,
        form: &ProductForm,
    ) -> Result<Product, ApiError> {
        let request = self
            .operation(Method::PUT, "edit_product", token)?
            .multipart(product_form(form, Some(product_id)));

        product_from(&self.send(request).await?, Some(&form.category_id))
    }

    #[instrument(skip(self, token))]
    async fn delete_product(&self, token: &AuthToken, product_id: &str) -> Result<(), ApiError> {
        let request = self
            .operation(Method::DELETE, "delete_product", token)?
            .query(&[("product_id", product_id)]);

        self.send(request).await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait AdminCatalogApi: Send + Sync {
    /// Fetch one category.
    async fn category(&self, token: &AuthToken, category_id: &str) -> Result<Category, ApiError>;

    /// Add a category with its image.
    async fn create_category(
        &self,
        token: &AuthToken,
        form: &CategoryForm,
    ) -> Result<Category, ApiError>;

    /// Rename a category and replace its image.
    async fn edit_category(
        &self,
        token: &AuthToken,
        category_id: &str,
        form: &CategoryForm,
    ) -> Result<Category, ApiError>;

    /// Delete a category and every product filed under it. Returns how many
    /// products went with it.
    async fn delete_category(&self, token: &AuthToken, category_id: &str) -> Result<u64, ApiError>;

    /// Fetch one product.
    async fn product(&self, token: &AuthToken, product_id: &str) -> Result<Product, ApiError>;

    /// Add a product with its image.
    async fn create_product(&self, token: &AuthToken, form: &ProductForm)
    -> Result<Product, ApiError>;

    /// Replace every field of a product.
    async fn edit_product(
        &self,
        token: &AuthToken,
        product_id: &str,
        form: &ProductForm,
    ) -> Result<Product, ApiError>;

    /// Delete one product.
    async fn delete_product(&self, token: &AuthToken, product_id: &str) -> Result<(), ApiError>;
}
