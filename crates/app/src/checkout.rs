//! Checkout Orchestrator
//!
//! Turns the selected cart lines into one order. The address is resolved and
//! validated before anything is sent; an incomplete address opens the editor
//! instead. A placed order shows a confirmation that advances to the past
//! orders view after [`CONFIRMATION_DELAY`] unless the shopper dismisses it
//! first.

use std::{
    sync::{Arc, Mutex as SyncMutex, PoisonError},
    time::Duration,
};

use storefront::{
    address::{AddressBook, AddressChoice, AddressError, AddressField},
    cart::{Cart, CartLine},
    checkout::{CheckoutFlow, CheckoutStep, StepError},
    orders::{Order, OrderRequest, PaymentMethod},
    pricing::{CartSnapshot, FeeRate},
    profile::ProfileUpdate,
};
use thiserror::Error;
use tokio::{sync::Mutex, task::AbortHandle};
use tracing::{debug, info, instrument, warn};

use crate::{
    api::{ApiError, OrdersApi, ProfileApi},
    reconciler::{CartError, CartReconciler},
    scope::ScopeHandle,
    session::Session,
};

/// How long an order confirmation stays up before moving to past orders.
pub const CONFIRMATION_DELAY: Duration = Duration::from_secs(20);

/// Shown when an action needs a session and there is none.
pub const NOT_LOGGED_IN: &str = "Not logged in";

/// Shown when an order fails without a backend message.
pub const CHECKOUT_FAILED: &str = "Checkout failed";

/// Shown when an order is placed and the backend sent no message.
pub const ORDER_PLACED: &str = "Order placed successfully";

/// Why a checkout action failed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("no cart lines are selected")]
    NothingSelected,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("a checkout is already being submitted")]
    InProgress,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Checkout behaviour that comes from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Platform fee on the selected subtotal.
    pub fee_rate: FeeRate,

    /// How long a confirmation stays up.
    pub confirmation_delay: Duration,

    /// How the shopper pays.
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            fee_rate: FeeRate::ZERO,
            confirmation_delay: CONFIRMATION_DELAY,
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }
}

/// What the checkout screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutState {
    /// Step and confirmation.
    pub flow: CheckoutFlow,

    /// Default address, draft form and editor state.
    pub addresses: AddressBook,

    /// Shopper name from the profile, carried into profile updates.
    pub profile_name: Option<String>,

    /// Past orders, newest first.
    pub history: Vec<Order>,

    /// Last user-visible failure.
    pub error: Option<String>,

    /// Confirmation message while an order confirmation is shown.
    pub notice: Option<String>,

    /// Whether an order is being submitted.
    pub submitting: bool,
}

/// Drives checkout over the cart, orders and profile APIs.
pub struct CheckoutOrchestrator {
    cart: Arc<CartReconciler>,
    orders: Arc<dyn OrdersApi>,
    profile: Arc<dyn ProfileApi>,
    session: Session,
    settings: CheckoutSettings,
    state: Arc<Mutex<CheckoutState>>,
    timer: SyncMutex<Option<AbortHandle>>,
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(
        cart: Arc<CartReconciler>,
        orders: Arc<dyn OrdersApi>,
        profile: Arc<dyn ProfileApi>,
        session: Session,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            cart,
            orders,
            profile,
            session,
            settings,
            state: Arc::new(Mutex::new(CheckoutState::default())),
            timer: SyncMutex::new(None),
        }
    }

    /// The cart this checkout draws lines from.
    #[must_use]
    pub fn cart(&self) -> &CartReconciler {
        &self.cart
    }

    /// A copy of the current state.
    pub async fn state(&self) -> CheckoutState {
        self.state.lock().await.clone()
    }

    /// Totals for the current selection at the configured fee rate.
    pub async fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot(self.settings.fee_rate).await
    }

    /// Initial load: the profile, then the cart. Returns `None` when the
    /// scope is aborted first; whatever was in flight is discarded.
    pub async fn load(&self, scope: &ScopeHandle) -> Option<Result<Cart, CartError>> {
        scope
            .run(async {
                self.load_profile().await;
                self.cart.fetch_cart().await
            })
            .await
    }

    /// Seed the default address from the profile. Failures keep the current
    /// default and are only logged.
    #[instrument(skip(self))]
    pub async fn load_profile(&self) {
        let Some(token) = self.session.token() else {
            debug!("no session, skipping profile fetch");

            return;
        };

        match self.profile.fetch_profile(&token).await {
            Ok(profile) => {
                let mut state = self.state.lock().await;

                state.addresses.seed_from_profile(&profile.address);
                state.profile_name = profile.name;

                debug!("default address seeded from profile");
            }
            Err(error) => {
                warn!(%error, "failed to load profile");

                self.session.invalidate_on(&error);
            }
        }
    }

    /// Open the address editor, prefilled from the default.
    pub async fn edit_address(&self) {
        self.state.lock().await.addresses.begin_edit();
    }

    /// Change one draft field.
    pub async fn update_address(&self, field: AddressField, value: impl Into<String>) {
        self.state.lock().await.addresses.update_form(field, value);
    }

    /// Close the editor and clear the draft.
    pub async fn cancel_edit(&self) {
        self.state.lock().await.addresses.cancel_edit();
    }

    /// Pick the address checkout uses.
    pub async fn choose_address(&self, choice: AddressChoice) {
        self.state.lock().await.addresses.choose(choice);
    }

    /// Save the draft to the profile and make it the default.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAuthenticated`] without a session, or the
    /// API error when the profile update fails.
    #[instrument(skip(self))]
    pub async fn save_address(&self) -> Result<(), CheckoutError> {
        let Some(token) = self.session.token() else {
            return Err(self.fail(CheckoutError::NotAuthenticated, NOT_LOGGED_IN).await);
        };

        let update = {
            let mut state = self.state.lock().await;

            state.error = None;

            ProfileUpdate::new(state.addresses.form(), state.profile_name.as_deref())
        };

        if let Err(error) = self.profile.update_profile(&token, &update).await {
            warn!(%error, "failed to save address");

            self.session.invalidate_on(&error);

            let message = error
                .backend_message()
                .unwrap_or("Failed to save address")
                .to_string();

            return Err(self.fail(error.into(), &message).await);
        }

        self.state.lock().await.addresses.promote_form();

        info!("address saved to profile");

        Ok(())
    }

    /// Place one order for the selected lines.
    ///
    /// With nothing selected this returns at once and changes nothing. An
    /// incomplete address leaves the step alone and opens the editor.
    ///
    /// # Errors
    ///
    /// Returns an error when a precondition fails or the backend rejects the
    /// order; the cart is untouched in every failure case.
    #[instrument(skip(self))]
    pub async fn handle_checkout(&self) -> Result<Order, CheckoutError> {
        let lines = self.cart.selected_lines().await;

        if lines.is_empty() {
            debug!("checkout with nothing selected");

            return Err(CheckoutError::NothingSelected);
        }

        let Some(token) = self.session.token() else {
            return Err(self.fail(CheckoutError::NotAuthenticated, NOT_LOGGED_IN).await);
        };

        let address = {
            let mut state = self.state.lock().await;

            if state.submitting {
                return Err(CheckoutError::InProgress);
            }

            match state.addresses.prepare_checkout() {
                Ok(address) => {
                    state.submitting = true;
                    state.error = None;

                    address
                }
                Err(error) => {
                    debug!(%error, "checkout address incomplete");

                    state.error = Some(error.to_string());

                    return Err(error.into());
                }
            }
        };

        let request = OrderRequest::new(&lines, &address, self.settings.payment_method);

        match self.orders.place_order(&token, &request).await {
            Ok(placed) => {
                let ids: Vec<_> = lines.iter().map(|line| line.id.clone()).collect();

                self.cart.remove_lines(&ids).await;

                let order = Order::placed(
                    placed.order_id,
                    &lines,
                    &address,
                    request.payment_status,
                );

                {
                    let mut state = self.state.lock().await;

                    state.submitting = false;
                    state.flow.submit_order(order.clone());
                    state.history.insert(0, order.clone());
                    state.notice = Some(placed.message.unwrap_or_else(|| ORDER_PLACED.to_string()));
                }

                self.schedule_advance();

                info!(order_id = %order.id, lines = lines.len(), "order placed");

                Ok(order)
            }
            Err(error) => {
                warn!(%error, "order submission failed");

                self.session.invalidate_on(&error);

                let mut state = self.state.lock().await;

                state.submitting = false;
                state.error = Some(error.backend_message().unwrap_or(CHECKOUT_FAILED).to_string());

                Err(error.into())
            }
        }
    }

    /// Close the confirmation now and show past orders.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NotConfirming`] when no confirmation is shown.
    pub async fn dismiss_confirmation(&self) -> Result<(), CheckoutError> {
        self.cancel_timer();

        let mut state = self.state.lock().await;

        state.flow.dismiss_confirmation()?;
        state.notice = None;

        Ok(())
    }

    /// Jump to a numbered step, dropping any confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidStep`] for numbers outside `1..=3`.
    pub async fn select_step(&self, number: u8) -> Result<CheckoutStep, CheckoutError> {
        let mut state = self.state.lock().await;
        let step = state.flow.select_step(number)?;

        state.notice = None;
        drop(state);

        self.cancel_timer();

        Ok(step)
    }

    /// Replace the order history with the backend's.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAuthenticated`] without a session, or the
    /// API error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn load_history(&self) -> Result<Vec<Order>, CheckoutError> {
        let Some(token) = self.session.token() else {
            return Err(self.fail(CheckoutError::NotAuthenticated, NOT_LOGGED_IN).await);
        };

        match self.orders.past_orders(&token).await {
            Ok(orders) => {
                debug!(orders = orders.len(), "order history loaded");

                let mut state = self.state.lock().await;

                state.history.clone_from(&orders);
                state.error = None;

                Ok(orders)
            }
            Err(error) => {
                warn!(%error, "failed to load order history");

                self.session.invalidate_on(&error);

                let message = error
                    .backend_message()
                    .unwrap_or("Failed to load orders")
                    .to_string();

                Err(self.fail(error.into(), &message).await)
            }
        }
    }

    /// Selected lines, for display before checkout.
    pub async fn selected_lines(&self) -> Vec<CartLine> {
        self.cart.selected_lines().await
    }

    async fn fail(&self, error: CheckoutError, message: &str) -> CheckoutError {
        self.state.lock().await.error = Some(message.to_string());

        error
    }

    fn schedule_advance(&self) {
        let state = Arc::clone(&self.state);
        let delay = self.settings.confirmation_delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut state = state.lock().await;

            if state.flow.timeout_elapsed() {
                state.notice = None;

                debug!("confirmation timed out, showing past orders");
            }
        });

        self.replace_timer(Some(task.abort_handle()));
    }

    fn cancel_timer(&self) {
        self.replace_timer(None);
    }

    fn replace_timer(&self, next: Option<AbortHandle>) {
        let previous = std::mem::replace(
            &mut *self.timer.lock().unwrap_or_else(PoisonError::into_inner),
            next,
        );

        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for CheckoutOrchestrator {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use storefront::{address::DeliveryAddress, orders::PaymentStatus};
    use testresult::TestResult;

    use crate::{
        api::{MockCartApi, MockOrdersApi, MockProfileApi, PlacedOrder},
        scope::ViewScope,
        test::helpers::{cart_line, complete_address, logged_in_session, profile_with},
    };

    use super::*;

    fn three_lines() -> Cart {
        Cart::new(vec![
            cart_line("CART1", "P1", 100_00, 2),
            cart_line("CART2", "P2", 45_50, 1),
            cart_line("CART3", "P3", 10_00, 3),
        ])
    }

    fn cart_api(cart: Cart) -> MockCartApi {
        let mut api = MockCartApi::new();

        api.expect_view_cart()
            .returning(move |_| Ok(cart.clone()));

        api
    }

    fn profile_api(address: DeliveryAddress) -> MockProfileApi {
        let mut api = MockProfileApi::new();

        api.expect_fetch_profile()
            .returning(move |_| Ok(profile_with(address.clone())));

        api
    }

    async fn orchestrator(
        cart: MockCartApi,
        orders: MockOrdersApi,
        profile: MockProfileApi,
        session: Session,
    ) -> TestResult<CheckoutOrchestrator> {
        let reconciler = Arc::new(CartReconciler::new(Arc::new(cart), session.clone()));
        let checkout = CheckoutOrchestrator::new(
            reconciler,
            Arc::new(orders),
            Arc::new(profile),
            session,
            CheckoutSettings::default(),
        );

        checkout
            .load(&ViewScope::new().handle())
            .await
            .ok_or("load was aborted")??;

        Ok(checkout)
    }

    fn placed(id: &str) -> PlacedOrder {
        PlacedOrder {
            order_id: id.to_string(),
            message: None,
        }
    }

    #[tokio::test]
    async fn nothing_selected_changes_nothing() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders.expect_place_order().never();

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            logged_in_session()?,
        )
        .await?;

        checkout.cart().deselect_all().await;

        let before = checkout.state().await;
        let cart_before = checkout.cart().view().await;

        assert!(matches!(
            checkout.handle_checkout().await,
            Err(CheckoutError::NothingSelected)
        ));
        assert_eq!(checkout.state().await, before);
        assert_eq!(checkout.cart().view().await, cart_before);

        Ok(())
    }

    #[tokio::test]
    async fn missing_pincode_opens_editor_and_stays_on_step_one() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders.expect_place_order().never();

        let address = DeliveryAddress {
            pincode: String::new(),
            ..complete_address()
        };

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(address),
            logged_in_session()?,
        )
        .await?;

        let result = checkout.handle_checkout().await;
        let state = checkout.state().await;

        assert!(matches!(result, Err(CheckoutError::Address(_))));
        assert_eq!(state.flow.step().number(), 1);
        assert!(state.addresses.is_editing());
        assert!(state.error.is_some_and(|error| error.contains("pincode")));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn placed_order_removes_selected_lines_and_advances_after_delay() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders
            .expect_place_order()
            .once()
            .withf(|_, request| {
                request.items.len() == 2
                    && request.total_amount == Decimal::new(245_50, 2)
                    && request.payment_status == PaymentStatus::Pending
                    && request.pincode == "560001"
            })
            .returning(|_, _| Ok(placed("ORD123ABC")));

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            logged_in_session()?,
        )
        .await?;

        checkout.cart().set_selected("CART3", false).await?;

        let order = checkout.handle_checkout().await?;

        assert_eq!(order.id, "ORD123ABC");
        assert_eq!(order.total_items, 3);

        let cart = checkout.cart().view().await.cart;

        assert_eq!(cart.len(), 1);
        assert!(cart.get("CART3").is_some());

        let state = checkout.state().await;

        assert_eq!(state.flow.step(), CheckoutStep::Confirming);
        assert_eq!(state.notice.as_deref(), Some(ORDER_PLACED));
        assert_eq!(state.history.first().map(|order| order.id.as_str()), Some("ORD123ABC"));

        tokio::time::sleep(CONFIRMATION_DELAY + Duration::from_secs(1)).await;

        let state = checkout.state().await;

        assert_eq!(state.flow.step(), CheckoutStep::History);
        assert_eq!(state.flow.step().number(), 3);
        assert!(state.notice.is_none());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_cancels_the_pending_advance() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders
            .expect_place_order()
            .once()
            .returning(|_, _| Ok(placed("ORD1")));

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            logged_in_session()?,
        )
        .await?;

        checkout.handle_checkout().await?;
        checkout.dismiss_confirmation().await?;

        assert_eq!(checkout.state().await.flow.step(), CheckoutStep::History);

        checkout.select_step(1).await?;
        tokio::time::sleep(CONFIRMATION_DELAY * 2).await;

        assert_eq!(checkout.state().await.flow.step(), CheckoutStep::Reviewing);
        assert!(matches!(
            checkout.dismiss_confirmation().await,
            Err(CheckoutError::Step(StepError::NotConfirming(_)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn backend_rejection_keeps_cart_and_shows_message() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders.expect_place_order().once().returning(|_, _| {
            Err(ApiError::from_response(
                StatusCode::NOT_FOUND,
                r#"{"detail":"Product not found"}"#,
            ))
        });

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            logged_in_session()?,
        )
        .await?;

        assert!(checkout.handle_checkout().await.is_err());

        let state = checkout.state().await;

        assert_eq!(state.error.as_deref(), Some("Product not found"));
        assert_eq!(state.flow.step(), CheckoutStep::Reviewing);
        assert!(!state.submitting);
        assert_eq!(checkout.cart().view().await.cart.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_after_logout_makes_no_call() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders.expect_place_order().never();

        let session = logged_in_session()?;
        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            session.clone(),
        )
        .await?;

        session.logout()?;

        assert!(matches!(
            checkout.handle_checkout().await,
            Err(CheckoutError::NotAuthenticated)
        ));
        assert_eq!(checkout.state().await.error.as_deref(), Some(NOT_LOGGED_IN));

        Ok(())
    }

    #[tokio::test]
    async fn draft_address_backfills_from_default() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders
            .expect_place_order()
            .once()
            .withf(|_, request| request.city == "Mysuru" && request.pincode == "560001")
            .returning(|_, _| Ok(placed("ORD2")));

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            logged_in_session()?,
        )
        .await?;

        checkout.cancel_edit().await;
        checkout.update_address(AddressField::City, "Mysuru").await;
        checkout.choose_address(AddressChoice::Draft).await;

        let order = checkout.handle_checkout().await?;

        assert_eq!(order.city, "Mysuru");
        assert_eq!(order.pincode, "560001");

        Ok(())
    }

    #[tokio::test]
    async fn saving_address_updates_profile_then_default() -> TestResult {
        let mut profile = profile_api(complete_address());

        profile
            .expect_update_profile()
            .once()
            .withf(|_, update| {
                update.user_city == "Mysuru"
                    && update.user_number == Some(919_876_543_210)
                    && update.user_name == "Asha"
            })
            .returning(|_, _| Ok(()));

        let checkout = orchestrator(
            cart_api(three_lines()),
            MockOrdersApi::new(),
            profile,
            logged_in_session()?,
        )
        .await?;

        checkout.edit_address().await;
        checkout.update_address(AddressField::City, "Mysuru").await;
        checkout.save_address().await?;

        let state = checkout.state().await;

        assert_eq!(state.addresses.default_address().city, "Mysuru");
        assert!(!state.addresses.is_editing());

        Ok(())
    }

    #[tokio::test]
    async fn load_fetches_profile_before_cart() -> TestResult {
        let mut seq = mockall::Sequence::new();
        let mut cart = MockCartApi::new();
        let mut profile = MockProfileApi::new();

        profile
            .expect_fetch_profile()
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(profile_with(complete_address())));
        cart.expect_view_cart()
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(three_lines()));

        let checkout =
            orchestrator(cart, MockOrdersApi::new(), profile, logged_in_session()?).await?;
        let state = checkout.state().await;

        assert_eq!(state.addresses.default_address(), &complete_address());
        assert_eq!(checkout.cart().view().await.cart.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn aborted_load_makes_no_calls() -> TestResult {
        let mut cart = MockCartApi::new();
        let mut profile = MockProfileApi::new();

        cart.expect_view_cart().never();
        profile.expect_fetch_profile().never();

        let session = logged_in_session()?;
        let checkout = CheckoutOrchestrator::new(
            Arc::new(CartReconciler::new(Arc::new(cart), session.clone())),
            Arc::new(MockOrdersApi::new()),
            Arc::new(profile),
            session,
            CheckoutSettings::default(),
        );

        let scope = ViewScope::new();
        let handle = scope.handle();

        drop(scope);

        assert!(checkout.load(&handle).await.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn history_refetch_replaces_local_orders() -> TestResult {
        let mut orders = MockOrdersApi::new();

        orders
            .expect_place_order()
            .once()
            .returning(|_, _| Ok(placed("ORD-LOCAL")));
        orders.expect_past_orders().once().returning(|_| {
            Ok(vec![Order::placed(
                "ORD-SERVER",
                &[cart_line("CART1", "P1", 100_00, 2)],
                &complete_address(),
                PaymentStatus::Pending,
            )])
        });

        let checkout = orchestrator(
            cart_api(three_lines()),
            orders,
            profile_api(complete_address()),
            logged_in_session()?,
        )
        .await?;

        checkout.handle_checkout().await?;

        let history = checkout.load_history().await?;

        assert_eq!(history.len(), 1);
        assert_eq!(
            checkout.state().await.history.first().map(|order| order.id.as_str()),
            Some("ORD-SERVER")
        );

        Ok(())
    }
}
