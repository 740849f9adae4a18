//! Orders

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    address::DeliveryAddress,
    cart::CartLine,
    fields::{self, order as keys},
    pricing::{line_amount, round_currency},
};

/// The only delivery type the store offers.
pub const HOME_DELIVERY: &str = "Home Delivery";

/// Errors raised while parsing order values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Not one of the payment status wire values.
    #[error("unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    /// Not one of the delivery status wire values.
    #[error("unknown delivery status: {0}")]
    UnknownDeliveryStatus(String),

    /// Not a supported payment method.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

fn normalise(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Not paid yet.
    #[default]
    Pending,

    /// Paid. Older clients sent `Paid`.
    #[serde(alias = "Paid")]
    Successfully,
}

impl PaymentStatus {
    /// Every wire value, in admin menu order.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Successfully];

    /// The wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Successfully => "Successfully",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "pending" => Ok(Self::Pending),
            "successfully" | "successful" | "success" | "paid" => Ok(Self::Successfully),
            _ => Err(OrderError::UnknownPaymentStatus(s.to_string())),
        }
    }
}

/// Delivery state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Not dispatched.
    #[default]
    Pending,

    /// With the courier.
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,

    /// Handed over.
    Delivered,
}

impl DeliveryStatus {
    /// Every wire value, in fulfilment order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::OutForDelivery, Self::Delivered];

    /// The wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "pending" => Ok(Self::Pending),
            "outfordelivery" | "shipped" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            _ => Err(OrderError::UnknownDeliveryStatus(s.to_string())),
        }
    }
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash on delivery, the only method currently enabled.
    #[default]
    CashOnDelivery,

    /// Paid up front.
    Prepaid,
}

impl PaymentMethod {
    /// Payment status hint sent with a new order.
    #[must_use]
    pub const fn payment_status(self) -> PaymentStatus {
        match self {
            Self::CashOnDelivery => PaymentStatus::Pending,
            Self::Prepaid => PaymentStatus::Successfully,
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "cod" | "cash" | "cashondelivery" => Ok(Self::CashOnDelivery),
            "prepaid" | "online" | "card" | "upi" => Ok(Self::Prepaid),
            _ => Err(OrderError::UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Snapshot of one product in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product ordered.
    pub product_id: Option<String>,

    /// Product name at order time.
    pub name: String,

    /// Units ordered.
    pub quantity: u32,

    /// Unit price at order time.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Amount charged for the line.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl OrderLine {
    /// Snapshot a cart line.
    #[must_use]
    pub fn from_cart_line(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            amount: line_amount(line.unit_price, line.quantity),
        }
    }

    fn from_record(record: &Value) -> Self {
        let quantity = keys::QUANTITY
            .integer(record)
            .and_then(|quantity| u32::try_from(quantity.max(1)).ok())
            .unwrap_or(1);

        let unit_price = keys::UNIT_PRICE.decimal(record).unwrap_or_default();

        Self {
            product_id: keys::PRODUCT_ID.string(record),
            name: keys::PRODUCT_NAME
                .string(record)
                .unwrap_or_else(|| crate::cart::DEFAULT_NAME.to_string()),
            quantity,
            unit_price,
            amount: keys::TOTAL_AMOUNT
                .decimal(record)
                .unwrap_or_else(|| line_amount(unit_price, quantity)),
        }
    }
}

/// Who placed an order, as reported to admins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer name.
    pub name: Option<String>,

    /// Customer email.
    pub email: Option<String>,

    /// Customer phone.
    pub phone: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Backend order id.
    pub id: String,

    /// Products in the order.
    pub lines: Vec<OrderLine>,

    /// Units across all lines.
    pub total_items: u64,

    /// Amount charged.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Payment state.
    pub payment_status: PaymentStatus,

    /// Delivery state.
    pub delivery_status: DeliveryStatus,

    /// Delivery type label.
    pub delivery_type: String,

    /// Delivery line (door and street).
    pub delivery_address: String,

    /// Delivery city.
    pub city: String,

    /// Delivery pincode.
    pub pincode: String,

    /// Delivery landmark.
    pub landmark: String,

    /// Order timestamp as the backend formats it.
    pub ordered_at: Option<String>,

    /// Customer details, when the backend includes them.
    pub customer: Customer,
}

impl Order {
    /// Record a successful checkout of `lines` to `address`.
    #[must_use]
    pub fn placed(
        id: impl Into<String>,
        lines: &[CartLine],
        address: &DeliveryAddress,
        payment_status: PaymentStatus,
    ) -> Self {
        let lines: Vec<_> = lines.iter().map(OrderLine::from_cart_line).collect();

        Self {
            id: id.into(),
            total_items: total_units(&lines),
            total_amount: round_currency(lines.iter().map(|line| line.amount).sum()),
            lines,
            payment_status,
            delivery_status: DeliveryStatus::Pending,
            delivery_type: HOME_DELIVERY.to_string(),
            delivery_address: address.delivery_line(),
            city: address.city.clone(),
            pincode: address.pincode.clone(),
            landmark: address.landmark.clone(),
            ordered_at: None,
            customer: Customer {
                phone: Some(address.phone.clone()).filter(|phone| !phone.is_empty()),
                ..Customer::default()
            },
        }
    }

    /// Map one past-order record. Records either carry an `items` array or
    /// describe a single product inline.
    #[must_use]
    pub fn from_record(record: &Value, index: usize) -> Self {
        let items = fields::records(record, "items");

        let lines: Vec<_> = if items.is_empty() {
            vec![OrderLine::from_record(record)]
        } else {
            items.iter().map(OrderLine::from_record).collect()
        };

        let total_items = total_units(&lines);

        Self {
            id: keys::ID
                .string(record)
                .unwrap_or_else(|| format!("{}{index}", crate::cart::PLACEHOLDER_ID_PREFIX)),
            total_items,
            total_amount: keys::TOTAL_AMOUNT
                .decimal(record)
                .unwrap_or_else(|| lines.iter().map(|line| line.amount).sum()),
            lines,
            payment_status: keys::PAYMENT_STATUS
                .string(record)
                .and_then(|status| status.parse().ok())
                .unwrap_or_default(),
            delivery_status: keys::DELIVERY_STATUS
                .string(record)
                .and_then(|status| status.parse().ok())
                .unwrap_or_default(),
            delivery_type: keys::DELIVERY_TYPE
                .string(record)
                .unwrap_or_else(|| HOME_DELIVERY.to_string()),
            delivery_address: keys::DELIVERY_ADDRESS.string(record).unwrap_or_default(),
            city: keys::CITY.string(record).unwrap_or_default(),
            pincode: keys::PINCODE.string(record).unwrap_or_default(),
            landmark: keys::LANDMARK.string(record).unwrap_or_default(),
            ordered_at: keys::ORDERED_AT.string(record),
            customer: Customer {
                name: keys::CUSTOMER_NAME.string(record),
                email: keys::CUSTOMER_EMAIL.string(record),
                phone: keys::CUSTOMER_PHONE.string(record),
            },
        }
    }

    /// Map every record of a past-orders response.
    #[must_use]
    pub fn from_response(response: &Value) -> Vec<Self> {
        fields::records(response, "past_orders")
            .iter()
            .enumerate()
            .map(|(index, record)| Self::from_record(record, index))
            .collect()
    }

    /// Whether the order passes an admin filter. `search` matches the order
    /// id, product names and customer name, case-insensitively.
    #[must_use]
    pub fn matches(&self, status: Option<DeliveryStatus>, search: &str) -> bool {
        if status.is_some_and(|status| status != self.delivery_status) {
            return false;
        }

        let needle = search.trim().to_lowercase();

        if needle.is_empty() {
            return true;
        }

        std::iter::once(self.id.as_str())
            .chain(self.lines.iter().map(|line| line.name.as_str()))
            .chain(self.customer.name.as_deref())
            .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    /// Apply a confirmed status update.
    pub fn apply(&mut self, update: &StatusUpdate) {
        if let Some(payment_status) = update.payment_status {
            self.payment_status = payment_status;
        }

        if let Some(delivery_status) = update.status {
            self.delivery_status = delivery_status;
        }
    }
}

fn total_units(lines: &[OrderLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

/// One product in an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequestItem {
    /// Product id.
    pub pro_id: String,

    /// Units.
    pub quantity: u32,

    /// `round(unit_price, 2) * quantity`.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// Body of `POST /past_order/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Products ordered.
    pub items: Vec<OrderRequestItem>,

    /// Amount for the whole order, rounded to two places.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Payment status hint.
    pub payment_status: PaymentStatus,

    /// Delivery line.
    pub delivery_address: String,

    /// Delivery city.
    pub city: String,

    /// Delivery pincode.
    pub pincode: String,

    /// Delivery landmark.
    pub landmark: String,

    /// Delivery type.
    pub delivery_type: &'static str,

    /// Contact phone, digits only.
    pub user_number: Option<u64>,
}

impl OrderRequest {
    /// Build the request for `lines` delivered to `address`. Lines without a
    /// product id fall back to their line id.
    #[must_use]
    pub fn new(lines: &[CartLine], address: &DeliveryAddress, method: PaymentMethod) -> Self {
        let items: Vec<_> = lines
            .iter()
            .map(|line| OrderRequestItem {
                pro_id: line.product_id.clone().unwrap_or_else(|| line.id.clone()),
                quantity: line.quantity,
                total_amount: line_amount(line.unit_price, line.quantity),
            })
            .collect();

        Self {
            total_amount: items.iter().map(|item| item.total_amount).sum(),
            items,
            payment_status: method.payment_status(),
            delivery_address: address.delivery_line(),
            city: address.city.trim().to_string(),
            pincode: address.pincode.trim().to_string(),
            landmark: address.landmark.trim().to_string(),
            delivery_type: HOME_DELIVERY,
            user_number: address.phone_digits(),
        }
    }
}

/// Body of `PATCH /past_order/update-status/{id}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// New payment status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,

    /// New delivery status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
}

impl StatusUpdate {
    /// Whether neither status is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payment_status.is_none() && self.status.is_none()
    }
}
