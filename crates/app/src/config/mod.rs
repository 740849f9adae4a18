//! Client configuration module

use clap::Args;
use storefront::{money::MoneyFormatError, pricing::PricingError};
use thiserror::Error;

use crate::config::{
    api::ApiConfig, checkout::CheckoutConfig, logging::LoggingConfig, session::SessionConfig,
};

pub mod api;
pub mod checkout;
pub mod logging;
pub mod session;

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid platform fee rate")]
    FeeRate(#[source] PricingError),

    #[error("invalid currency")]
    Currency(#[source] MoneyFormatError),

    #[error("no platform config directory; pass --token-file")]
    NoConfigDir,
}

impl From<PricingError> for ConfigError {
    fn from(error: PricingError) -> Self {
        Self::FeeRate(error)
    }
}

impl From<MoneyFormatError> for ConfigError {
    fn from(error: MoneyFormatError) -> Self {
        Self::Currency(error)
    }
}

/// Storefront client configuration
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Backend connection settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Token storage settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Pricing and checkout settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reject values no command can run with.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.checkout.fee_rate()?;
        self.checkout.currency()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        config: AppConfig,
    }

    fn parse(args: &[&str]) -> Result<AppConfig, clap::Error> {
        Harness::try_parse_from(std::iter::once("storefront-app").chain(args.iter().copied()))
            .map(|harness| harness.config)
    }

    #[test]
    fn defaults_are_valid() -> TestResult {
        let config = parse(&[])?;

        config.validate()?;

        assert_eq!(config.checkout.fee_rate()?, storefront::pricing::FeeRate::ZERO);
        assert_eq!(config.checkout.currency()?.iso_alpha_code, "INR");
        assert_eq!(config.api.request_timeout().as_secs(), 30);

        Ok(())
    }

    #[test]
    fn negative_fee_rate_is_rejected() -> TestResult {
        let config = parse(&["--platform-fee-rate=-0.02"])?;

        assert!(matches!(config.validate(), Err(ConfigError::FeeRate(_))));

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() -> TestResult {
        let config = parse(&["--currency", "XYZ"])?;

        assert!(matches!(config.validate(), Err(ConfigError::Currency(_))));

        Ok(())
    }

    #[test]
    fn fee_rate_feeds_checkout_settings() -> TestResult {
        let config = parse(&["--platform-fee-rate", "0.02", "--confirmation-delay-secs", "5"])?;
        let settings = config.checkout.settings()?;

        assert_eq!(settings.fee_rate.rate(), Decimal::new(2, 2));
        assert_eq!(settings.confirmation_delay.as_secs(), 5);

        Ok(())
    }

    #[test]
    fn explicit_token_file_wins() -> TestResult {
        let config = parse(&["--token-file", "/tmp/storefront-token"])?;

        assert_eq!(
            config.session.token_path()?,
            std::path::PathBuf::from("/tmp/storefront-token")
        );

        Ok(())
    }
}
