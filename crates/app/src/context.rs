//! App Context

use std::sync::Arc;

use storefront::money::Currency;
use thiserror::Error;

use crate::{
    admin::OrderConsole,
    api::{ApiError, RestClient},
    catalog::CatalogReader,
    catalog_admin::CatalogAdmin,
    checkout::{CheckoutOrchestrator, CheckoutSettings},
    config::{AppConfig, ConfigError},
    reconciler::CartReconciler,
    session::{FileTokenStore, Session},
};

/// Failure to build a [`StorefrontContext`].
#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("failed to build API client")]
    Api(#[from] ApiError),
}

/// Every component a command needs, wired to one REST client and session.
#[derive(Debug, Clone)]
pub struct StorefrontContext {
    pub session: Session,
    pub catalog: Arc<CatalogReader>,
    pub cart: Arc<CartReconciler>,
    pub checkout: Arc<CheckoutOrchestrator>,
    pub admin: Arc<OrderConsole>,
    pub catalog_admin: Arc<CatalogAdmin>,
    pub currency: &'static Currency,
}

impl StorefrontContext {
    /// Build the context from parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when a setting is invalid or the base URL cannot be
    /// used.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        config.validate()?;

        let client = Arc::new(RestClient::new(
            &config.api.api_base_url,
            config.api.request_timeout(),
        )?);

        let store = FileTokenStore::new(config.session.token_path()?);

        Ok(Self::new(
            &client,
            Session::new(Arc::new(store)),
            config.checkout.settings()?,
            config.checkout.currency()?,
        ))
    }

    /// Wire components over an existing client and session.
    #[must_use]
    pub fn new(
        client: &Arc<RestClient>,
        session: Session,
        settings: CheckoutSettings,
        currency: &'static Currency,
    ) -> Self {
        let cart = Arc::new(CartReconciler::new(client.clone(), session.clone()));

        Self {
            catalog: Arc::new(CatalogReader::new(client.clone())),
            checkout: Arc::new(CheckoutOrchestrator::new(
                Arc::clone(&cart),
                client.clone(),
                client.clone(),
                session.clone(),
                settings,
            )),
            admin: Arc::new(OrderConsole::new(client.clone(), session.clone())),
            catalog_admin: Arc::new(CatalogAdmin::new(client.clone(), session.clone())),
            cart,
            session,
            currency,
        }
    }
}
