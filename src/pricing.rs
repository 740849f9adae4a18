//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors raised while configuring pricing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Fee rates are fractions of the subtotal and cannot be negative.
    #[error("platform fee rate cannot be negative: {0}")]
    NegativeFeeRate(Decimal),
}

/// Round to two decimal places, halves away from zero.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The amount sent to the backend for a line: the unit price rounded to two
/// places, times the quantity.
#[must_use]
pub fn line_amount(unit_price: Decimal, quantity: u32) -> Decimal {
    round_currency(unit_price) * Decimal::from(quantity)
}

/// Platform fee rate, as a fraction of the selected subtotal (`0.02` is 2%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeRate(Decimal);

impl FeeRate {
    /// No platform fee.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a fee rate from a fraction.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeFeeRate`] for rates below zero.
    pub fn new(rate: Decimal) -> Result<Self, PricingError> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(PricingError::NegativeFeeRate(rate));
        }

        Ok(Self(rate))
    }

    /// The rate as a fraction.
    #[must_use]
    pub fn rate(self) -> Decimal {
        self.0
    }

    /// Fee charged on `subtotal`, rounded to two places.
    #[must_use]
    pub fn fee_for(self, subtotal: Decimal) -> Decimal {
        round_currency(Percentage::from(self.0) * subtotal)
    }
}

/// Totals derived from the current cart lines.
///
/// Recomputed from the lines every time it is needed; never stored on its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Unrounded sum of `unit_price * quantity` over selected lines.
    pub subtotal: Decimal,

    /// Sum of [`line_amount`] over selected lines: what an order request
    /// for the same lines is charged.
    pub billed_subtotal: Decimal,

    /// `round(billed_subtotal * fee_rate, 2)`.
    pub platform_fee: Decimal,

    /// `subtotal + platform_fee`.
    pub total: Decimal,

    /// Number of selected lines.
    pub selected_lines: usize,

    /// Units across selected lines.
    pub selected_units: u64,
}

impl CartSnapshot {
    /// Derive totals from the given lines. Unselected lines are ignored.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a CartLine>, fee_rate: FeeRate) -> Self {
        let (subtotal, billed_subtotal, selected_lines, selected_units) = lines
            .into_iter()
            .filter(|line| line.selected)
            .fold(
                (Decimal::ZERO, Decimal::ZERO, 0, 0_u64),
                |(sum, billed, count, units), line| {
                    (
                        sum + line.line_total(),
                        billed + line_amount(line.unit_price, line.quantity),
                        count + 1,
                        units + u64::from(line.quantity),
                    )
                },
            );

        let platform_fee = fee_rate.fee_for(billed_subtotal);

        Self {
            subtotal,
            billed_subtotal,
            platform_fee,
            total: subtotal + platform_fee,
            selected_lines,
            selected_units,
        }
    }

    /// Subtotal as displayed, matching the order request's `total_amount`.
    #[must_use]
    pub fn display_subtotal(&self) -> Decimal {
        self.billed_subtotal
    }

    /// Total as displayed: the billed subtotal plus the platform fee.
    #[must_use]
    pub fn display_total(&self) -> Decimal {
        self.billed_subtotal + self.platform_fee
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_lines == 0
    }
}
