//! Money display

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Findable, Money};
use thiserror::Error;

pub use rusty_money::iso::Currency;

/// ISO code of the store's default currency.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Errors raised while turning decimal amounts into display money.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyFormatError {
    /// The ISO code is not in the currency table.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The amount does not fit in minor units.
    #[error("amount {0} is out of range for display")]
    OutOfRange(Decimal),
}

/// Look up an ISO 4217 currency by alpha code, case-insensitively.
///
/// # Errors
///
/// Returns [`MoneyFormatError::UnknownCurrency`] for codes missing from the
/// ISO table.
pub fn find_currency(code: &str) -> Result<&'static Currency, MoneyFormatError> {
    Currency::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| MoneyFormatError::UnknownCurrency(code.to_string()))
}

/// Round an amount to the currency's minor unit and wrap it as [`Money`].
///
/// # Errors
///
/// Returns [`MoneyFormatError::OutOfRange`] when the amount overflows `i64`
/// minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, MoneyFormatError> {
    let mut scaled =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    scaled.rescale(currency.exponent);

    let minor = i64::try_from(scaled.mantissa())
        .ok()
        .ok_or(MoneyFormatError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Format an amount for display, e.g. `₹204.00`.
#[must_use]
pub fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    to_money(amount, currency).map_or_else(
        |_| format!("{} {}", currency.iso_alpha_code, amount.round_dp(2)),
        |money| format!("{money}"),
    )
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn find_currency_is_case_insensitive() -> TestResult {
        assert_eq!(find_currency("gbp")?, iso::GBP);

        Ok(())
    }

    #[test]
    fn find_currency_rejects_unknown_codes() {
        assert!(matches!(
            find_currency("XYZ1"),
            Err(MoneyFormatError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn to_money_rounds_half_away_from_zero() -> TestResult {
        let money = to_money(Decimal::new(12_345, 3), iso::GBP)?;

        assert_eq!(money, Money::from_minor(1235, iso::GBP));

        Ok(())
    }

    #[test]
    fn format_amount_gbp() {
        assert_eq!(format_amount(Decimal::new(1250, 2), iso::GBP), "£12.50");
    }

    #[test]
    fn format_amount_usd() {
        assert_eq!(format_amount(Decimal::new(999, 2), iso::USD), "$9.99");
    }
}
