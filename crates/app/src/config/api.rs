//! API Config

use std::time::Duration;

use clap::Args;

/// Backend connection settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Storefront REST API base URL
    #[arg(
        long,
        env = "STOREFRONT_API_URL",
        default_value = "https://ellectra-beta.vercel.app/ellectra/v1"
    )]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "STOREFRONT_REQUEST_TIMEOUT_SECS", default_value_t = 30_u64)]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
