use clap::Args;
use storefront::address::{AddressChoice, AddressField};
use storefront_app::{checkout::CheckoutError, context::StorefrontContext, scope::ViewScope};

use super::{address, cart, render};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[command(flatten)]
    selection: cart::SelectionArgs,

    /// Which address to deliver to (default, draft)
    #[arg(long)]
    address: Option<AddressChoice>,

    /// One-off address fields as `field=value`; implies `--address draft`
    #[arg(long = "set", value_parser = address::parse_field)]
    fields: Vec<(AddressField, String)>,
}

pub(crate) async fn run(context: &StorefrontContext, args: &CheckoutArgs) -> Result<(), String> {
    let checkout = &context.checkout;
    let scope = ViewScope::new();

    checkout
        .load(&scope.handle())
        .await
        .ok_or_else(|| "checkout was cancelled".to_string())?
        .map_err(|error| render::describe(&error))?;

    cart::select(context, &args.selection).await?;

    if !args.fields.is_empty() {
        address::fill_draft(context, &args.fields).await;
    }

    let choice = args.address.unwrap_or(if args.fields.is_empty() {
        AddressChoice::Default
    } else {
        AddressChoice::Draft
    });

    checkout.choose_address(choice).await;

    let snapshot = checkout.snapshot().await;

    match checkout.handle_checkout().await {
        Ok(order) => {
            let state = checkout.state().await;

            if let Some(notice) = state.notice {
                println!("{notice}");
            }

            render::totals(&snapshot, context.currency);
            println!();
            render::order(&order, context.currency);

            Ok(())
        }
        Err(CheckoutError::NothingSelected) => Err("no cart lines are selected".to_string()),
        Err(error) => Err(checkout
            .state()
            .await
            .error
            .unwrap_or_else(|| render::describe(&error))),
    }
}

pub(crate) async fn orders(context: &StorefrontContext) -> Result<(), String> {
    let orders = context
        .checkout
        .load_history()
        .await
        .map_err(|error| render::describe(&error))?;

    if orders.is_empty() {
        println!("no orders yet");

        return Ok(());
    }

    for order in &orders {
        render::order(order, context.currency);
    }

    Ok(())
}
