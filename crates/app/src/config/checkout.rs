//! Checkout Config

use std::time::Duration;

use clap::Args;
use rust_decimal::Decimal;
use storefront::{
    money::{self, Currency, DEFAULT_CURRENCY},
    orders::PaymentMethod,
    pricing::FeeRate,
};

use super::ConfigError;
use crate::checkout::CheckoutSettings;

/// Pricing and checkout settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Platform fee as a fraction of the selected subtotal (0.02 is 2%)
    #[arg(long, env = "STOREFRONT_PLATFORM_FEE_RATE", default_value_t = Decimal::ZERO)]
    pub platform_fee_rate: Decimal,

    /// ISO 4217 code amounts are displayed in
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Seconds an order confirmation stays up before showing past orders
    #[arg(long, env = "STOREFRONT_CONFIRMATION_DELAY_SECS", default_value_t = 20_u64)]
    pub confirmation_delay_secs: u64,
}

impl CheckoutConfig {
    /// The configured fee rate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FeeRate`] for a negative rate.
    pub fn fee_rate(&self) -> Result<FeeRate, ConfigError> {
        Ok(FeeRate::new(self.platform_fee_rate)?)
    }

    /// The configured display currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Currency`] for an unknown ISO code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(money::find_currency(&self.currency)?)
    }

    /// Settings for the checkout orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FeeRate`] for a negative rate.
    pub fn settings(&self) -> Result<CheckoutSettings, ConfigError> {
        Ok(CheckoutSettings {
            fee_rate: self.fee_rate()?,
            confirmation_delay: Duration::from_secs(self.confirmation_delay_secs),
            payment_method: PaymentMethod::CashOnDelivery,
        })
    }
}
