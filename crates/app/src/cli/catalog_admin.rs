use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront::catalog::{Category, CategoryForm, ImageFile, Product, ProductForm};
use storefront_app::context::StorefrontContext;

use super::render;

#[derive(Debug, Subcommand)]
pub(crate) enum CategoryCommand {
    /// Show one category
    Show { category_id: String },
    /// Add a category
    Create(CategoryArgs),
    /// Rename a category and replace its image
    Edit {
        category_id: String,

        #[command(flatten)]
        fields: CategoryArgs,
    },
    /// Delete a category and every product in it
    Delete { category_id: String },
}

#[derive(Debug, Args)]
pub(crate) struct CategoryArgs {
    /// Category name
    #[arg(long)]
    name: String,

    /// Image file to upload
    #[arg(long)]
    image: PathBuf,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ProductCommand {
    /// Show one product
    Show { product_id: String },
    /// Add a product
    Create(ProductArgs),
    /// Replace every field of a product
    Edit {
        product_id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete { product_id: String },
}

#[derive(Debug, Args)]
pub(crate) struct ProductArgs {
    /// Category the product is filed under
    #[arg(long)]
    category: String,

    /// Product name
    #[arg(long)]
    name: String,

    /// Product description
    #[arg(long, default_value = "")]
    description: String,

    /// Listed price
    #[arg(long)]
    price: Decimal,

    /// Image file to upload
    #[arg(long)]
    image: PathBuf,
}

async fn image(path: &Path) -> Result<ImageFile, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|error| format!("cannot read {}: {error}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(ImageFile { file_name, bytes })
}

impl CategoryArgs {
    async fn form(&self) -> Result<CategoryForm, String> {
        Ok(CategoryForm {
            name: self.name.clone(),
            image: image(&self.image).await?,
        })
    }
}

impl ProductArgs {
    async fn form(&self) -> Result<ProductForm, String> {
        Ok(ProductForm {
            category_id: self.category.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            image: image(&self.image).await?,
        })
    }
}

fn show_category(category: &Category) {
    println!("{}  {}", category.id, category.name);

    if let Some(image_url) = &category.image_url {
        println!("  image: {image_url}");
    }
}

fn show_product(product: &Product, context: &StorefrontContext) {
    println!(
        "{}  {}  {}",
        product.id,
        product.name,
        render::amount(product.price, context.currency)
    );

    if let Some(category_id) = &product.category_id {
        println!("  category: {category_id}");
    }

    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
}

pub(crate) async fn category(
    context: &StorefrontContext,
    command: &CategoryCommand,
) -> Result<(), String> {
    let console = &context.catalog_admin;

    match command {
        CategoryCommand::Show { category_id } => {
            let category = console
                .category(category_id)
                .await
                .map_err(|error| render::describe(&error))?;

            show_category(&category);
        }
        CategoryCommand::Create(args) => {
            let category = console
                .create_category(&args.form().await?)
                .await
                .map_err(|error| render::describe(&error))?;

            show_category(&category);
        }
        CategoryCommand::Edit {
            category_id,
            fields,
        } => {
            let category = console
                .edit_category(category_id, &fields.form().await?)
                .await
                .map_err(|error| render::describe(&error))?;

            show_category(&category);
        }
        CategoryCommand::Delete { category_id } => {
            let products = console
                .delete_category(category_id)
                .await
                .map_err(|error| render::describe(&error))?;

            println!("category {category_id} deleted with {products} products");
        }
    }

    Ok(())
}

pub(crate) async fn product(
    context: &StorefrontContext,
    command: &ProductCommand,
) -> Result<(), String> {
    let console = &context.catalog_admin;

    match command {
        ProductCommand::Show { product_id } => {
            let product = console
                .product(product_id)
                .await
                .map_err(|error| render::describe(&error))?;

            show_product(&product, context);
        }
        ProductCommand::Create(args) => {
            let product = console
                .create_product(&args.form().await?)
                .await
                .map_err(|error| render::describe(&error))?;

            show_product(&product, context);
        }
        ProductCommand::Edit { product_id, fields } => {
            let product = console
                .edit_product(product_id, &fields.form().await?)
                .await
                .map_err(|error| render::describe(&error))?;

            show_product(&product, context);
        }
        ProductCommand::Delete { product_id } => {
            console
                .delete_product(product_id)
                .await
                .map_err(|error| render::describe(&error))?;

            println!("product {product_id} deleted");
        }
    }

    Ok(())
}
