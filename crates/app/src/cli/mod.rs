use clap::{Parser, Subcommand};
use storefront_app::{config::AppConfig, context::StorefrontContext, observability};

mod address;
mod admin;
mod cart;
mod catalog;
mod catalog_admin;
mod checkout;
mod render;
mod session;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store the token from a login redirect URL
    Login(session::LoginArgs),
    /// Forget the stored token
    Logout,
    /// List product categories
    Categories(catalog::CategoriesArgs),
    /// List a category's products, or search
    Products(catalog::ProductsArgs),
    /// Search products by name
    Search { query: String },
    Cart(cart::CartCommand),
    Address(address::AddressCommand),
    /// Place an order for cart lines
    Checkout(checkout::CheckoutArgs),
    /// Show past orders
    Orders,
    Admin(admin::AdminCommand),
}

impl Cli {
    /// Parse arguments after loading `.env`.
    pub(crate) fn load() -> Self {
        _ = dotenvy::dotenv();

        Self::parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_logging(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let context = StorefrontContext::from_config(&self.config)
            .map_err(|error| render::describe(&error))?;

        match self.command {
            Commands::Login(args) => session::login(&context, &args),
            Commands::Logout => session::logout(&context),
            Commands::Categories(args) => catalog::categories(&context, &args).await,
            Commands::Products(args) => catalog::products(&context, &args).await,
            Commands::Search { query } => catalog::search(&context, &query).await,
            Commands::Cart(command) => cart::run(&context, &command).await,
            Commands::Address(command) => address::run(&context, &command).await,
            Commands::Checkout(args) => checkout::run(&context, &args).await,
            Commands::Orders => checkout::orders(&context).await,
            Commands::Admin(command) => admin::run(&context, &command).await,
        }
    }
}
