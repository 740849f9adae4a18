use clap::{Args, Subcommand};
use storefront::orders::{DeliveryStatus, PaymentStatus};
use storefront_app::context::StorefrontContext;

use super::{
    catalog_admin::{self, CategoryCommand, ProductCommand},
    render,
};

#[derive(Debug, Args)]
pub(crate) struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminSubcommand {
    /// List every order, optionally filtered
    Orders(OrdersArgs),
    /// Show one order's details
    Show { order_id: String },
    /// Change an order's payment or delivery status
    SetStatus(SetStatusArgs),
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage products
    #[command(subcommand)]
    Product(ProductCommand),
}

#[derive(Debug, Args)]
pub(crate) struct OrdersArgs {
    /// Only orders in this delivery status (pending, out-for-delivery,
    /// delivered)
    #[arg(long)]
    status: Option<DeliveryStatus>,

    /// Match order id, product names or customer name
    #[arg(long, default_value = "")]
    search: String,
}

#[derive(Debug, Args)]
pub(crate) struct SetStatusArgs {
    order_id: String,

    /// New payment status (pending, successfully)
    #[arg(long)]
    payment: Option<PaymentStatus>,

    /// New delivery status (pending, out-for-delivery, delivered)
    #[arg(long)]
    delivery: Option<DeliveryStatus>,
}

pub(crate) async fn run(context: &StorefrontContext, command: &AdminCommand) -> Result<(), String> {
    let console = &context.admin;

    match &command.command {
        AdminSubcommand::Orders(args) => {
            console
                .refresh()
                .await
                .map_err(|error| render::describe(&error))?;

            let view = console.view().await;
            let orders = view.filtered(args.status, &args.search);

            if orders.is_empty() {
                println!("no matching orders");
            }

            for order in orders {
                render::order(order, context.currency);
            }
        }
        AdminSubcommand::Show { order_id } => {
            let order = console
                .order_details(order_id)
                .await
                .map_err(|error| render::describe(&error))?;

            render::order(&order, context.currency);
        }
        AdminSubcommand::SetStatus(args) => {
            console
                .update_order_status(&args.order_id, args.payment, args.delivery)
                .await
                .map_err(|error| render::describe(&error))?;

            println!("order {} updated", args.order_id);
        }
        AdminSubcommand::Category(command) => catalog_admin::category(context, command).await?,
        AdminSubcommand::Product(command) => catalog_admin::product(context, command).await?,
    }

    Ok(())
}
