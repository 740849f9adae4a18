//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    address::{AddressBook, AddressChoice, AddressError, AddressField, DeliveryAddress},
    cart::{Cart, CartLine},
    catalog::{
        CatalogFormError, Category, CategoryForm, CategoryPage, ImageFile, Product, ProductForm,
        ProductQuery,
    },
    checkout::{CheckoutFlow, CheckoutStep, StepError},
    money::{MoneyFormatError, find_currency, format_amount},
    orders::{
        DeliveryStatus, Order, OrderError, OrderLine, OrderRequest, PaymentMethod, PaymentStatus,
        StatusUpdate,
    },
    pricing::{CartSnapshot, FeeRate, PricingError},
    profile::{ProfileUpdate, UserProfile},
};
