//! Admin order console.

use std::sync::Arc;

use storefront::{
    catalog::CatalogFormError,
    orders::{DeliveryStatus, Order, PaymentStatus, StatusUpdate},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    api::{ApiError, OrdersApi},
    session::{AuthToken, Session},
};

/// Why an admin console action failed.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("choose a payment or delivery status to update")]
    NothingToUpdate,

    #[error(transparent)]
    Form(#[from] CatalogFormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the console renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleView {
    /// Orders as of the last refresh, with confirmed updates applied.
    pub orders: Vec<Order>,

    /// Last user-visible failure.
    pub error: Option<String>,
}

impl ConsoleView {
    /// Orders passing the delivery status filter and free-text search.
    #[must_use]
    pub fn filtered(&self, status: Option<DeliveryStatus>, search: &str) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| order.matches(status, search))
            .collect()
    }
}

/// Admin view over every order.
pub struct OrderConsole {
    api: Arc<dyn OrdersApi>,
    session: Session,
    view: Mutex<ConsoleView>,
}

impl std::fmt::Debug for OrderConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderConsole").finish_non_exhaustive()
    }
}

impl OrderConsole {
    #[must_use]
    pub fn new(api: Arc<dyn OrdersApi>, session: Session) -> Self {
        Self {
            api,
            session,
            view: Mutex::new(ConsoleView::default()),
        }
    }

    /// A copy of the current view.
    pub async fn view(&self) -> ConsoleView {
        self.view.lock().await.clone()
    }

    /// Reload every order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a session, or the API
    /// error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Order>, AdminError> {
        let token = self.token().await?;

        match self.api.past_orders(&token).await {
            Ok(orders) => {
                debug!(orders = orders.len(), "orders loaded");

                let mut view = self.view.lock().await;

                view.orders.clone_from(&orders);
                view.error = None;

                Ok(orders)
            }
            Err(error) => Err(self.record(error, "Failed to fetch orders").await),
        }
    }

    /// Fetch one order's details, replacing its row.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a session, or the API
    /// error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn order_details(&self, order_id: &str) -> Result<Order, AdminError> {
        let token = self.token().await?;

        match self.api.order(&token, order_id).await {
            Ok(order) => {
                let mut view = self.view.lock().await;

                if let Some(row) = view.orders.iter_mut().find(|row| row.id == order.id) {
                    row.clone_from(&order);
                }

                Ok(order)
            }
            Err(error) => Err(self.record(error, "Failed to fetch order details").await),
        }
    }

    /// Change an order's statuses. At least one must be given.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NothingToUpdate`] before any call when neither
    /// status is set, or the API error when the backend refuses.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: &str,
        payment_status: Option<PaymentStatus>,
        status: Option<DeliveryStatus>,
    ) -> Result<(), AdminError> {
        let update = StatusUpdate {
            payment_status,
            status,
        };

        if update.is_empty() {
            return Err(AdminError::NothingToUpdate);
        }

        let token = self.token().await?;

        if let Err(error) = self.api.update_status(&token, order_id, &update).await {
            return Err(self.record(error, "Failed to update status").await);
        }

        let mut view = self.view.lock().await;

        if let Some(order) = view.orders.iter_mut().find(|order| order.id == order_id) {
            order.apply(&update);
        }

        view.error = None;

        info!("order status updated");

        Ok(())
    }

    async fn token(&self) -> Result<AuthToken, AdminError> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => {
                self.view.lock().await.error = Some(AdminError::NotAuthenticated.to_string());

                Err(AdminError::NotAuthenticated)
            }
        }
    }

    async fn record(&self, error: ApiError, fallback: &str) -> AdminError {
        warn!(%error, "admin request failed");

        self.session.invalidate_on(&error);
        self.view.lock().await.error =
            Some(error.backend_message().unwrap_or(fallback).to_string());

        error.into()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use storefront::{cart::CartLine, orders::Customer};
    use testresult::TestResult;

    use crate::{
        api::MockOrdersApi,
        test::helpers::{anonymous_session, cart_line, complete_address, logged_in_session},
    };

    use super::*;

    fn order(id: &str, product: &CartLine, customer: &str) -> Order {
        Order {
            customer: Customer {
                name: Some(customer.to_string()),
                ..Customer::default()
            },
            ..Order::placed(
                id,
                std::slice::from_ref(product),
                &complete_address(),
                PaymentStatus::Pending,
            )
        }
    }

    fn orders() -> Vec<Order> {
        let mut shipped = order("ORD2", &cart_line("CART2", "P2", 20_00, 1), "Ravi");

        shipped.delivery_status = DeliveryStatus::OutForDelivery;

        vec![
            order("ORD1", &cart_line("CART1", "P1", 10_00, 1), "Meera"),
            shipped,
        ]
    }

    #[tokio::test]
    async fn empty_update_is_rejected_before_any_call() -> TestResult {
        let mut api = MockOrdersApi::new();

        api.expect_update_status().never();

        let console = OrderConsole::new(Arc::new(api), logged_in_session()?);

        assert!(matches!(
            console.update_order_status("ORD1", None, None).await,
            Err(AdminError::NothingToUpdate)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn confirmed_update_changes_local_row() -> TestResult {
        let mut api = MockOrdersApi::new();

        api.expect_past_orders().once().returning(|_| Ok(orders()));
        api.expect_update_status()
            .once()
            .withf(|_, id, update| {
                id == "ORD1"
                    && update.status == Some(DeliveryStatus::Delivered)
                    && update.payment_status.is_none()
            })
            .returning(|_, _, _| Ok(()));

        let console = OrderConsole::new(Arc::new(api), logged_in_session()?);

        console.refresh().await?;
        console
            .update_order_status("ORD1", None, Some(DeliveryStatus::Delivered))
            .await?;

        let view = console.view().await;

        assert_eq!(
            view.orders.first().map(|order| order.delivery_status),
            Some(DeliveryStatus::Delivered)
        );
        assert_eq!(
            view.orders.first().map(|order| order.payment_status),
            Some(PaymentStatus::Pending)
        );

        Ok(())
    }

    #[tokio::test]
    async fn refused_update_leaves_row_and_reports() -> TestResult {
        let mut api = MockOrdersApi::new();

        api.expect_past_orders().once().returning(|_| Ok(orders()));
        api.expect_update_status().once().returning(|_, _, _| {
            Err(ApiError::from_response(
                StatusCode::NOT_FOUND,
                r#"{"detail":"Order not found or cannot be modified (only Pending orders can be updated)"}"#,
            ))
        });

        let console = OrderConsole::new(Arc::new(api), logged_in_session()?);

        console.refresh().await?;

        assert!(
            console
                .update_order_status("ORD2", Some(PaymentStatus::Successfully), None)
                .await
                .is_err()
        );

        let view = console.view().await;

        assert_eq!(
            view.orders.get(1).map(|order| order.payment_status),
            Some(PaymentStatus::Pending)
        );
        assert!(view.error.is_some_and(|error| error.starts_with("Order not found")));

        Ok(())
    }

    #[tokio::test]
    async fn filter_and_search_are_local() -> TestResult {
        let mut api = MockOrdersApi::new();

        api.expect_past_orders().once().returning(|_| Ok(orders()));

        let console = OrderConsole::new(Arc::new(api), logged_in_session()?);

        console.refresh().await?;

        let view = console.view().await;

        assert_eq!(view.filtered(None, "").len(), 2);
        assert_eq!(view.filtered(Some(DeliveryStatus::OutForDelivery), "").len(), 1);
        assert_eq!(view.filtered(None, "meera").len(), 1);
        assert_eq!(view.filtered(None, "ord").len(), 2);
        assert!(view.filtered(Some(DeliveryStatus::Delivered), "").is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_without_session_makes_no_call() {
        let mut api = MockOrdersApi::new();

        api.expect_past_orders().never();

        let console = OrderConsole::new(Arc::new(api), anonymous_session());

        assert!(matches!(
            console.refresh().await,
            Err(AdminError::NotAuthenticated)
        ));
        assert_eq!(console.view().await.error.as_deref(), Some("Not logged in"));
    }
}
