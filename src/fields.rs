//! Field Resolution
//!
//! Backend payloads have drifted between revisions, so every entity field is
//! read through an ordered list of candidate keys. The first key holding a
//! usable value (not `null`, not a blank string) wins. The tables below are
//! the single place where those priorities live.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Ordered candidate keys for one entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKeys(pub &'static [&'static str]);

impl FieldKeys {
    /// Candidate keys in priority order.
    #[must_use]
    pub const fn keys(self) -> &'static [&'static str] {
        self.0
    }

    /// First usable raw value for this field.
    #[must_use]
    pub fn lookup(self, record: &Value) -> Option<&Value> {
        self.0
            .iter()
            .filter_map(|key| record.get(key))
            .find(|value| is_usable(value))
    }

    /// Resolve the field as text. Numbers are rendered as written.
    #[must_use]
    pub fn string(self, record: &Value) -> Option<String> {
        self.0
            .iter()
            .filter_map(|key| record.get(key))
            .find_map(as_text)
    }

    /// Resolve the field as an exact decimal.
    ///
    /// Numbers are parsed from their JSON text so no binary floating point
    /// rounding leaks into prices.
    #[must_use]
    pub fn decimal(self, record: &Value) -> Option<Decimal> {
        self.0
            .iter()
            .filter_map(|key| record.get(key))
            .find_map(as_decimal)
    }

    /// Resolve the field as a whole number, truncating fractional input.
    #[must_use]
    pub fn integer(self, record: &Value) -> Option<i64> {
        self.0
            .iter()
            .filter_map(|key| record.get(key))
            .find_map(|value| match value {
                Value::Number(number) => number
                    .as_i64()
                    .or_else(|| as_decimal(value).and_then(|d| i64::try_from(d.trunc()).ok())),
                Value::String(text) => text.trim().parse().ok(),
                _ => None,
            })
    }
}

fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Unwrap a response envelope: the first object found under `keys`, or the
/// value itself when none match.
#[must_use]
pub fn envelope<'v>(value: &'v Value, keys: &[&str]) -> &'v Value {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find(|inner| inner.is_object())
        .unwrap_or(value)
}

/// Records of a list response: the value itself when it is an array,
/// otherwise the array under `key`. Anything else yields no records.
#[must_use]
pub fn records<'v>(value: &'v Value, key: &str) -> &'v [Value] {
    match value {
        Value::Array(items) => items,
        _ => value
            .get(key)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
    }
}

/// Cart record fields (`GET /cart/view`).
pub mod cart {
    use super::FieldKeys;

    /// Backend cart row id.
    pub const ID: FieldKeys = FieldKeys(&["cart_id", "id"]);
    /// Product id.
    pub const PRODUCT_ID: FieldKeys = FieldKeys(&["product_id", "pro_id"]);
    /// Display name.
    pub const NAME: FieldKeys = FieldKeys(&["product_name", "name"]);
    /// Category label.
    pub const CATEGORY: FieldKeys = FieldKeys(&["category", "category_name"]);
    /// Colour variant.
    pub const COLOR: FieldKeys = FieldKeys(&["color", "colour"]);
    /// Size variant.
    pub const SIZE: FieldKeys = FieldKeys(&["size"]);
    /// Price of a single unit.
    pub const UNIT_PRICE: FieldKeys = FieldKeys(&["price_per_item", "price"]);
    /// Units in the line.
    pub const QUANTITY: FieldKeys = FieldKeys(&["quantity", "qty"]);
    /// Product image.
    pub const IMAGE: FieldKeys = FieldKeys(&["product_img", "image_url", "image"]);
}

/// User profile fields (`GET /users/user_details`).
pub mod profile {
    use super::FieldKeys;

    /// Envelope keys the user object may be nested under.
    pub const ENVELOPE: &[&str] = &["user", "user_details", "data"];

    /// Full name.
    pub const NAME: FieldKeys = FieldKeys(&["user_name", "userName", "name"]);
    /// Email address.
    pub const EMAIL: FieldKeys = FieldKeys(&["user_email", "email"]);
    /// Door or flat number.
    pub const DOOR_NO: FieldKeys = FieldKeys(&[
        "user_doorno",
        "user_door_no",
        "user_doornumber",
        "doorNo",
        "door_no",
        "flat_no",
        "door_number",
    ]);
    /// Street address line.
    pub const STREET: FieldKeys = FieldKeys(&[
        "user_address",
        "address",
        "address_line",
        "street",
        "addr",
    ]);
    /// City.
    pub const CITY: FieldKeys = FieldKeys(&["user_city", "city", "town", "locality"]);
    /// Landmark. The backend capitalises this one.
    pub const LANDMARK: FieldKeys = FieldKeys(&["Landmark", "landmark", "near"]);
    /// Postal code.
    pub const PINCODE: FieldKeys = FieldKeys(&[
        "user_pincode",
        "user_postal_code",
        "pincode",
        "pin",
        "postal_code",
        "zipcode",
    ]);
    /// Contact phone.
    pub const PHONE: FieldKeys = FieldKeys(&[
        "user_phone_no",
        "user_number",
        "user_phone",
        "user_mobile",
        "phone",
        "phone_number",
        "mobile",
        "contact",
    ]);
}

/// Past order fields (`GET /past_order/view`).
pub mod order {
    use super::FieldKeys;

    /// Backend order id.
    pub const ID: FieldKeys = FieldKeys(&["order_id", "id"]);
    /// Product id of a line.
    pub const PRODUCT_ID: FieldKeys = FieldKeys(&["product_id", "pro_id"]);
    /// Product name of a line.
    pub const PRODUCT_NAME: FieldKeys = FieldKeys(&["product_name", "name"]);
    /// Units ordered.
    pub const QUANTITY: FieldKeys = FieldKeys(&["quantity", "total_items", "qty"]);
    /// Unit price at order time.
    pub const UNIT_PRICE: FieldKeys = FieldKeys(&["price_per_item", "price"]);
    /// Amount charged.
    pub const TOTAL_AMOUNT: FieldKeys = FieldKeys(&["total_amount", "total_price", "amount"]);
    /// Payment status label.
    pub const PAYMENT_STATUS: FieldKeys = FieldKeys(&["payment_status"]);
    /// Delivery status label.
    pub const DELIVERY_STATUS: FieldKeys = FieldKeys(&["status", "delivery_status", "order_status"]);
    /// Delivery type label.
    pub const DELIVERY_TYPE: FieldKeys = FieldKeys(&["delivery_type"]);
    /// Delivery address line.
    pub const DELIVERY_ADDRESS: FieldKeys = FieldKeys(&["delivery_address", "address"]);
    /// Delivery city.
    pub const CITY: FieldKeys = FieldKeys(&["city"]);
    /// Delivery pincode.
    pub const PINCODE: FieldKeys = FieldKeys(&["pincode"]);
    /// Delivery landmark.
    pub const LANDMARK: FieldKeys = FieldKeys(&["landmark", "Landmark"]);
    /// Order timestamp as sent by the backend.
    pub const ORDERED_AT: FieldKeys = FieldKeys(&["order_date", "created_at"]);
    /// Customer name.
    pub const CUSTOMER_NAME: FieldKeys = FieldKeys(&["user_name"]);
    /// Customer email.
    pub const CUSTOMER_EMAIL: FieldKeys = FieldKeys(&["user_email"]);
    /// Customer phone.
    pub const CUSTOMER_PHONE: FieldKeys = FieldKeys(&["user_phoneno", "user_number"]);
}

/// Category fields (`GET /products/cat_info`).
pub mod category {
    use super::FieldKeys;

    /// Category id.
    pub const ID: FieldKeys = FieldKeys(&["category_id", "cat_id", "id"]);
    /// Category name.
    pub const NAME: FieldKeys = FieldKeys(&["category_name", "cat_name", "name"]);
    /// Category image.
    pub const IMAGE: FieldKeys = FieldKeys(&["category_img", "category_Img", "cat_img"]);
}

/// Paging metadata of list responses.
pub mod paging {
    use super::FieldKeys;

    /// Page returned, starting at one.
    pub const PAGE: FieldKeys = FieldKeys(&["page", "current_page"]);
    /// Records per page.
    pub const PAGE_SIZE: FieldKeys = FieldKeys(&["page_size", "limit"]);
    /// Records across all pages.
    pub const TOTAL_RECORDS: FieldKeys = FieldKeys(&["total_records", "total", "count"]);
}

/// Product fields (`GET /products/pro_info`, `GET /products/search`).
pub mod product {
    use super::FieldKeys;

    /// Product id.
    pub const ID: FieldKeys = FieldKeys(&["product_id", "pro_id", "id"]);
    /// Owning category id.
    pub const CATEGORY_ID: FieldKeys = FieldKeys(&["category_id", "cat_id"]);
    /// Product name.
    pub const NAME: FieldKeys = FieldKeys(&["product_name", "name"]);
    /// Long description.
    pub const DESCRIPTION: FieldKeys = FieldKeys(&["description", "product_description"]);
    /// Listed price.
    pub const PRICE: FieldKeys = FieldKeys(&["price", "price_per_item"]);
    /// Product image.
    pub const IMAGE: FieldKeys = FieldKeys(&["product_img", "product_Img", "image_url", "image"]);
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn first_usable_key_wins() {
        let record = json!({ "product_name": "  ", "name": "Kettle" });

        assert_eq!(cart::NAME.string(&record).as_deref(), Some("Kettle"));
    }

    #[test]
    fn null_values_are_skipped() {
        let record = json!({ "cart_id": null, "id": "CART123456" });

        assert_eq!(cart::ID.string(&record).as_deref(), Some("CART123456"));
    }

    #[test]
    fn missing_field_resolves_to_none() {
        assert_eq!(cart::COLOR.string(&json!({})), None);
    }

    #[test]
    fn decimal_parses_numbers_exactly() {
        let record = json!({ "price_per_item": 19.99 });

        assert_eq!(
            cart::UNIT_PRICE.decimal(&record),
            Some(Decimal::new(1999, 2))
        );
    }

    #[test]
    fn decimal_accepts_price_strings() {
        let record = json!({ "price": "499.99" });

        assert_eq!(product::PRICE.decimal(&record), Some(Decimal::new(49999, 2)));
    }

    #[test]
    fn integer_accepts_numeric_strings() {
        let record = json!({ "quantity": "3" });

        assert_eq!(cart::QUANTITY.integer(&record), Some(3));
    }

    #[test]
    fn phone_numbers_render_as_text() {
        let record = json!({ "user_number": 9_876_543_210_u64 });

        assert_eq!(profile::PHONE.string(&record).as_deref(), Some("9876543210"));
    }

    #[test]
    fn envelope_prefers_nested_user_object() {
        let response = json!({ "user": { "user_name": "Arul" } });

        assert_eq!(
            profile::NAME.string(envelope(&response, profile::ENVELOPE)).as_deref(),
            Some("Arul")
        );
    }

    #[test]
    fn envelope_falls_back_to_root() {
        let response = json!({ "user_name": "Arul" });

        assert_eq!(envelope(&response, profile::ENVELOPE), &response);
    }

    #[test]
    fn records_reads_bare_arrays_and_keyed_arrays() {
        let bare = json!([{ "cart_id": "CART1" }]);
        let keyed = json!({ "cart": [{ "cart_id": "CART1" }, { "cart_id": "CART2" }] });
        let empty = json!({ "message": "Your cart is empty" });

        assert_eq!(records(&bare, "cart").len(), 1);
        assert_eq!(records(&keyed, "cart").len(), 2);
        assert!(records(&empty, "cart").is_empty());
    }
}
