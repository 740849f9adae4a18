use clap::{Args, Subcommand};
use storefront_app::context::StorefrontContext;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and totals for the selected lines
    Show,
    /// Add one unit of a product
    Add { product_id: String },
    /// Add one unit to a cart line
    Inc { line_id: String },
    /// Remove one unit from a cart line
    Dec { line_id: String },
    /// Delete a cart line
    Rm { line_id: String },
    /// Price only the given lines
    Select(SelectionArgs),
    /// Leave the given lines out of the totals
    Unselect(SelectionArgs),
    /// Price every line
    SelectAll,
}

#[derive(Debug, Args)]
pub(crate) struct SelectionArgs {
    /// Cart lines to select; every line is selected when omitted
    #[arg(long = "line")]
    pub(crate) lines: Vec<String>,
}

pub(crate) async fn run(context: &StorefrontContext, command: &CartCommand) -> Result<(), String> {
    let cart = &context.cart;

    match &command.command {
        CartSubcommand::Show => fetch(context).await?,
        CartSubcommand::Add { product_id } => {
            cart.add_product(product_id).await.map_err(|error| render::describe(&error))?;
        }
        CartSubcommand::Inc { line_id } => {
            fetch(context).await?;
            cart.increase(line_id).await.map_err(|error| render::describe(&error))?;
        }
        CartSubcommand::Dec { line_id } => {
            fetch(context).await?;
            cart.decrease(line_id).await.map_err(|error| render::describe(&error))?;
        }
        CartSubcommand::Rm { line_id } => {
            fetch(context).await?;
            cart.delete(line_id).await.map_err(|error| render::describe(&error))?;
        }
        CartSubcommand::Select(selection) => {
            fetch(context).await?;
            select(context, selection).await?;
        }
        CartSubcommand::Unselect(selection) => {
            fetch(context).await?;

            for line_id in &selection.lines {
                cart.set_selected(line_id, false)
                    .await
                    .map_err(|error| render::describe(&error))?;
            }
        }
        CartSubcommand::SelectAll => {
            fetch(context).await?;
            cart.select_all().await;
        }
    }

    show(context).await;

    Ok(())
}

/// Load the cart from the backend.
pub(crate) async fn fetch(context: &StorefrontContext) -> Result<(), String> {
    context.cart.fetch_cart().await.map(drop).map_err(|error| render::describe(&error))
}

/// Narrow the selection to `selection.lines` when any are given.
pub(crate) async fn select(
    context: &StorefrontContext,
    selection: &SelectionArgs,
) -> Result<(), String> {
    if selection.lines.is_empty() {
        return Ok(());
    }

    context.cart.deselect_all().await;

    for line_id in &selection.lines {
        context
            .cart
            .set_selected(line_id, true)
            .await
            .map_err(|error| render::describe(&error))?;
    }

    Ok(())
}

async fn show(context: &StorefrontContext) {
    let view = context.cart.view().await;

    if view.cart.is_empty() {
        println!("cart is empty");

        return;
    }

    for line in view.cart.lines() {
        render::cart_line(line, context.currency);
    }

    println!();
    render::totals(&context.checkout.snapshot().await, context.currency);
}
