//! REST API
//!
//! One `#[automock]` trait per backend concern, each implemented by
//! [`RestClient`]. Components depend on the traits so tests can assert
//! exactly which calls are made.

mod admin_catalog;
mod cart;
mod catalog;
mod client;
mod errors;
mod orders;
mod profile;

pub use admin_catalog::{AdminCatalogApi, MockAdminCatalogApi};
pub use cart::{CartApi, MockCartApi};
pub use catalog::{CatalogApi, MockCatalogApi};
pub use client::RestClient;
pub use errors::ApiError;
pub use orders::{MockOrdersApi, OrdersApi, PlacedOrder};
pub use profile::{MockProfileApi, ProfileApi};
