//! Profile endpoints.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use tracing::instrument;

use storefront::profile::{ProfileUpdate, UserProfile};

use super::{ApiError, RestClient};
use crate::session::AuthToken;

#[async_trait]
impl ProfileApi for RestClient {
    #[instrument(skip_all)]
    async fn fetch_profile(&self, token: &AuthToken) -> Result<UserProfile, ApiError> {
        let body = self
            .send(self.authorized(Method::GET, &["users", "user_details"], token)?)
            .await?;

        Ok(UserProfile::from_response(&body))
    }

    #[instrument(skip_all)]
    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::PUT, &["users", "user_info_change"], token)?
            .json(update);

        self.send(request).await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Fetch the signed-in user's profile.
    async fn fetch_profile(&self, token: &AuthToken) -> Result<UserProfile, ApiError>;

    /// Save address and contact details to the profile.
    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError>;
}
