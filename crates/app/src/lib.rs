//! Storefront client services.
//!
//! Session handling, the REST API client, and the stateful components that
//! drive the `storefront` domain model: catalog reader, cart reconciler,
//! checkout orchestrator, the admin order console and the admin catalog
//! console.

pub mod admin;
pub mod api;
pub mod catalog;
pub mod catalog_admin;
pub mod checkout;
pub mod config;
pub mod context;
pub mod observability;
pub mod reconciler;
pub mod scope;
pub mod session;

#[cfg(test)]
mod test;
