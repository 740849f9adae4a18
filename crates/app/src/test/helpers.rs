//! Test Helpers

use std::sync::Arc;

use rust_decimal::Decimal;
use storefront::{address::DeliveryAddress, cart::CartLine, profile::UserProfile};

use crate::session::{AuthToken, MemoryTokenStore, Session, SessionError};

/// Token every logged-in fixture carries.
pub(crate) const TOKEN: &str = "abc";

pub(crate) fn logged_in_session() -> Result<Session, SessionError> {
    Ok(Session::new(Arc::new(MemoryTokenStore::with_token(
        AuthToken::new(TOKEN)?,
    ))))
}

pub(crate) fn anonymous_session() -> Session {
    Session::new(Arc::new(MemoryTokenStore::default()))
}

/// A selected line priced in minor units.
pub(crate) fn cart_line(id: &str, product_id: &str, price_minor: i64, quantity: u32) -> CartLine {
    CartLine::new(id, Some(product_id), id, Decimal::new(price_minor, 2), quantity)
}

pub(crate) fn complete_address() -> DeliveryAddress {
    DeliveryAddress {
        door_no: "12".to_string(),
        street_address: "MG Road".to_string(),
        city: "Bengaluru".to_string(),
        landmark: "Near Metro".to_string(),
        pincode: "560001".to_string(),
        phone: "+91 98765 43210".to_string(),
    }
}

pub(crate) fn profile_with(address: DeliveryAddress) -> UserProfile {
    UserProfile {
        name: Some("Asha".to_string()),
        email: Some("asha@example.com".to_string()),
        address,
    }
}
