use clap::Args;
use storefront_app::context::StorefrontContext;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct CategoriesArgs {
    /// Page to show, starting at one
    #[arg(long, default_value_t = 1)]
    page: u64,
}

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Category whose products are listed
    #[arg(long, default_value = "")]
    category: String,

    /// Page to show, starting at one
    #[arg(long, default_value_t = 1)]
    page: u64,

    /// Search text; replaces the category listing when not blank
    #[arg(long, default_value = "")]
    search: String,
}

pub(crate) async fn categories(
    context: &StorefrontContext,
    args: &CategoriesArgs,
) -> Result<(), String> {
    let page = context
        .catalog
        .list_categories(args.page)
        .await
        .map_err(|error| render::describe(&error))?;

    println!("page {} of {}", page.current_page, page.total_pages);

    for category in &page.items {
        println!("{}  {}", category.id, category.name);
    }

    Ok(())
}

pub(crate) async fn products(context: &StorefrontContext, args: &ProductsArgs) -> Result<(), String> {
    if args.category.trim().is_empty() && args.search.trim().is_empty() {
        return Err("pass --category or --search".to_string());
    }

    list(context, &args.category, args.page, &args.search).await
}

pub(crate) async fn search(context: &StorefrontContext, query: &str) -> Result<(), String> {
    if query.trim().is_empty() {
        return Err("search text is empty".to_string());
    }

    list(context, "", 1, query).await
}

async fn list(
    context: &StorefrontContext,
    category: &str,
    page: u64,
    search: &str,
) -> Result<(), String> {
    let products = context
        .catalog
        .show_products(category, page, search)
        .await
        .map_err(|error| render::describe(&error))?;

    if products.is_empty() {
        println!("no products found");

        return Ok(());
    }

    for product in &products {
        println!(
            "{}  {}  {}",
            product.id,
            product.name,
            render::amount(product.price, context.currency)
        );
    }

    Ok(())
}
