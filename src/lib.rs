//! Storefront
//!
//! Domain model of the storefront client: the working cart and its derived
//! totals, delivery address resolution, orders, the checkout step machine and
//! the field tables used to read backend payloads. Nothing here performs I/O;
//! the `storefront-app` crate drives it against the REST API.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fields;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod profile;
