//! Cart Reconciler
//!
//! Keeps a local [`Cart`] in step with the backend. Every mutation applies a
//! provisional hint, makes one backend call, then refetches the cart whether
//! or not the call succeeded; the refetch always wins over the hint. Each
//! line carries its own pending flag so mutations on different lines run
//! independently.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use storefront::{
    cart::{Cart, CartLine},
    pricing::{CartSnapshot, FeeRate},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    api::{ApiError, CartApi},
    session::{AuthToken, Session},
};

/// Shown when the cart is opened without a session.
pub const NO_TOKEN: &str = "No token found. Please log in.";

/// Shown when a catalog add is attempted without a session.
pub const LOGIN_TO_ADD: &str = "Please log in to add items to your cart.";

/// Why a cart action failed.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("{0}")]
    NotAuthenticated(&'static str),

    #[error("no cart line with id {0}")]
    UnknownLine(String),

    #[error("Product id not found")]
    MissingProductId,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CartError {
    fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(error) => error
                .backend_message()
                .map_or_else(|| fallback.to_string(), str::to_string),
            other => other.to_string(),
        }
    }
}

/// What the cart screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
    /// Lines as of the last refetch, plus provisional hints.
    pub cart: Cart,

    /// Ids of lines (or products, for catalog adds) with a call in flight.
    pub pending: FxHashSet<String>,

    /// Last user-visible failure.
    pub error: Option<String>,

    /// Whether the last fetch had a session.
    pub logged_in: bool,
}

impl CartView {
    /// Whether a mutation is in flight for `id`.
    #[must_use]
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Increase,
    Decrease,
    Delete,
}

impl Mutation {
    const fn failure_message(self) -> &'static str {
        match self {
            Self::Increase => "Failed to increase quantity",
            Self::Decrease => "Failed to decrease quantity",
            Self::Delete => "Failed to delete item",
        }
    }
}

/// Optimistic-then-reconcile cart state.
pub struct CartReconciler {
    api: Arc<dyn CartApi>,
    session: Session,
    view: Mutex<CartView>,
}

impl std::fmt::Debug for CartReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartReconciler")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl CartReconciler {
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>, session: Session) -> Self {
        Self {
            api,
            session,
            view: Mutex::new(CartView::default()),
        }
    }

    /// A copy of the current view.
    pub async fn view(&self) -> CartView {
        self.view.lock().await.clone()
    }

    /// Totals for the current selection.
    pub async fn snapshot(&self, fee_rate: FeeRate) -> CartSnapshot {
        self.view.lock().await.cart.snapshot(fee_rate)
    }

    /// Selected lines, in cart order.
    pub async fn selected_lines(&self) -> Vec<CartLine> {
        self.view.lock().await.cart.selected().cloned().collect()
    }

    /// Drop lines from local state without calling the backend.
    pub async fn remove_lines(&self, ids: &[String]) {
        self.view.lock().await.cart.remove_lines(ids);
    }

    /// Forget any displayed error.
    pub async fn clear_error(&self) {
        self.view.lock().await.error = None;
    }

    /// Reload the cart from the backend.
    ///
    /// Without a session the view is emptied and shows [`NO_TOKEN`]; no call
    /// is made.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotAuthenticated`] without a session, or the API
    /// error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Cart, CartError> {
        self.clear_error().await;

        self.refetch().await
    }

    /// Add one unit of `line_id`.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or the refetch error when only that
    /// failed.
    #[instrument(skip(self))]
    pub async fn increase(&self, line_id: &str) -> Result<(), CartError> {
        let line = self.line(line_id).await?;

        self.mutate(&line, Mutation::Increase).await
    }

    /// Remove one unit of `line_id`. A line at quantity one is left alone and
    /// no call is made.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or the refetch error when only that
    /// failed.
    #[instrument(skip(self))]
    pub async fn decrease(&self, line_id: &str) -> Result<(), CartError> {
        let line = self.line(line_id).await?;

        if line.quantity <= 1 {
            debug!("quantity already at minimum");

            return Ok(());
        }

        self.mutate(&line, Mutation::Decrease).await
    }

    /// Delete `line_id`. Lines the backend never confirmed are only dropped
    /// locally.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or the refetch error when only that
    /// failed.
    #[instrument(skip(self))]
    pub async fn delete(&self, line_id: &str) -> Result<(), CartError> {
        let line = self.line(line_id).await?;

        if !line.is_backend_confirmed() {
            self.view.lock().await.cart.remove(&line.id);

            debug!("dropped unconfirmed line locally");

            return Ok(());
        }

        self.mutate(&line, Mutation::Delete).await
    }

    /// Add one unit of a catalog product, then refetch.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotAuthenticated`] without a session (no call is
    /// made), otherwise the add or refetch error.
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: &str) -> Result<(), CartError> {
        let Some(token) = self.session.token() else {
            return Err(self.signed_out(LOGIN_TO_ADD).await);
        };

        self.begin(product_id, None).await;

        let result = self
            .api
            .add_to_cart(&token, product_id, 1)
            .await
            .map_err(CartError::from);

        self.settle(product_id, result, "Failed to add to cart").await
    }

    /// Flip one line's selection.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] when no line has that id.
    pub async fn toggle_selection(&self, line_id: &str) -> Result<(), CartError> {
        if self.view.lock().await.cart.toggle_selection(line_id) {
            Ok(())
        } else {
            Err(CartError::UnknownLine(line_id.to_string()))
        }
    }

    /// Set one line's selection.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] when no line has that id.
    pub async fn set_selected(&self, line_id: &str, selected: bool) -> Result<(), CartError> {
        if self.view.lock().await.cart.select(line_id, selected) {
            Ok(())
        } else {
            Err(CartError::UnknownLine(line_id.to_string()))
        }
    }

    /// Deselect everything when all lines are selected, otherwise select
    /// everything.
    pub async fn toggle_select_all(&self) {
        self.view.lock().await.cart.toggle_select_all();
    }

    pub async fn select_all(&self) {
        self.view.lock().await.cart.select_all();
    }

    pub async fn deselect_all(&self) {
        self.view.lock().await.cart.deselect_all();
    }

    async fn line(&self, line_id: &str) -> Result<CartLine, CartError> {
        self.view
            .lock()
            .await
            .cart
            .get(line_id)
            .cloned()
            .ok_or_else(|| CartError::UnknownLine(line_id.to_string()))
    }

    async fn mutate(&self, line: &CartLine, mutation: Mutation) -> Result<(), CartError> {
        let Some(token) = self.session.token() else {
            return Err(self.signed_out(NO_TOKEN).await);
        };

        let quantity = match mutation {
            Mutation::Increase => line.quantity.saturating_add(1),
            Mutation::Decrease => line.quantity.saturating_sub(1).max(1),
            Mutation::Delete => line.quantity,
        };

        let hint = (mutation != Mutation::Delete && line.is_backend_confirmed()).then_some(quantity);

        self.begin(&line.id, hint).await;

        let result = self.call(&token, line, mutation, quantity).await;

        self.settle(&line.id, result, mutation.failure_message())
            .await
    }

    async fn call(
        &self,
        token: &AuthToken,
        line: &CartLine,
        mutation: Mutation,
        quantity: u32,
    ) -> Result<(), CartError> {
        if line.is_backend_confirmed() {
            let call = match mutation {
                Mutation::Delete => self.api.delete_line(token, &line.id).await,
                Mutation::Increase | Mutation::Decrease => {
                    self.api.update_quantity(token, &line.id, quantity).await
                }
            };

            return call.map_err(CartError::from);
        }

        let product_id = line
            .product_id
            .as_deref()
            .ok_or(CartError::MissingProductId)?;

        Ok(self.api.add_to_cart(token, product_id, 1).await?)
    }

    async fn begin(&self, pending_id: &str, hint: Option<u32>) {
        let mut view = self.view.lock().await;

        view.pending.insert(pending_id.to_string());

        if let Some(quantity) = hint {
            view.cart.set_quantity_hint(pending_id, quantity);
        }
    }

    /// Record a mutation's outcome, refetch unconditionally, and clear the
    /// pending flag.
    async fn settle(
        &self,
        pending_id: &str,
        result: Result<(), CartError>,
        fallback: &str,
    ) -> Result<(), CartError> {
        if let Err(error) = &result {
            warn!(%error, "cart mutation failed");

            if let CartError::Api(api_error) = error {
                self.session.invalidate_on(api_error);
            }

            self.view.lock().await.error = Some(error.display_message(fallback));
        }

        let refetched = self.refetch().await;

        self.view.lock().await.pending.remove(pending_id);

        result?;
        refetched.map(|_| ())
    }

    async fn refetch(&self) -> Result<Cart, CartError> {
        let Some(token) = self.session.token() else {
            return Err(self.signed_out(NO_TOKEN).await);
        };

        match self.api.view_cart(&token).await {
            Ok(fresh) => {
                let mut view = self.view.lock().await;

                view.logged_in = true;
                view.cart.reconcile(fresh);

                debug!(lines = view.cart.len(), "cart refreshed");

                Ok(view.cart.clone())
            }
            Err(error) => {
                warn!(%error, "failed to load cart");

                self.session.invalidate_on(&error);

                let error = CartError::from(error);
                let mut view = self.view.lock().await;

                view.cart.clear();
                view.error = Some(error.display_message("Failed to load cart"));

                Err(error)
            }
        }
    }

    async fn signed_out(&self, message: &'static str) -> CartError {
        let mut view = self.view.lock().await;

        view.cart.clear();
        view.logged_in = false;
        view.error = Some(message.to_string());

        CartError::NotAuthenticated(message)
    }
}
