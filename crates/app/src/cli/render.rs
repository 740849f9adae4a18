use std::{error::Error, fmt::Write as _};

use rust_decimal::Decimal;
use storefront::{
    cart::CartLine,
    money::{Currency, format_amount},
    orders::Order,
    pricing::{CartSnapshot, line_amount},
};

/// `error` and its sources, innermost last, on one line.
pub(crate) fn describe(error: &dyn Error) -> String {
    let mut line = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        _ = write!(line, ": {cause}");
        source = cause.source();
    }

    line
}

pub(crate) fn amount(value: Decimal, currency: &'static Currency) -> String {
    format_amount(value, currency)
}

pub(crate) fn cart_line(line: &CartLine, currency: &'static Currency) {
    println!(
        "[{}] {}  {} x{}  {}  {}",
        if line.selected { "x" } else { " " },
        line.id,
        line.name,
        line.quantity,
        amount(line.unit_price, currency),
        amount(line_amount(line.unit_price, line.quantity), currency),
    );
}

pub(crate) fn totals(snapshot: &CartSnapshot, currency: &'static Currency) {
    println!(
        "selected: {} lines, {} units",
        snapshot.selected_lines, snapshot.selected_units
    );
    println!("subtotal: {}", amount(snapshot.display_subtotal(), currency));
    println!("platform_fee: {}", amount(snapshot.platform_fee, currency));
    println!("total: {}", amount(snapshot.display_total(), currency));
}

pub(crate) fn order(order: &Order, currency: &'static Currency) {
    println!("order_id: {}", order.id);
    println!("items: {}", order.total_items);
    println!("total: {}", amount(order.total_amount, currency));
    println!("payment: {}", order.payment_status);
    println!("delivery: {}", order.delivery_status);
    println!(
        "deliver_to: {}, {} {}",
        order.delivery_address, order.city, order.pincode
    );

    if let Some(ordered_at) = &order.ordered_at {
        println!("ordered_at: {ordered_at}");
    }

    if let Some(name) = &order.customer.name {
        println!("customer: {name}");
    }

    for line in &order.lines {
        println!(
            "  {} x{}  {}",
            line.name,
            line.quantity,
            amount(line.amount, currency)
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner(#[source] std::io::Error);

    #[test]
    fn describe_walks_every_cause() {
        let error = Outer(Inner(std::io::Error::other("disk")));

        assert_eq!(describe(&error), "outer: inner: disk");
    }
}
