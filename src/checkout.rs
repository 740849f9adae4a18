//! Checkout Steps
//!
//! The shopper-facing flow is a small state machine. A successful order moves
//! the cart view into [`CheckoutStep::Confirming`]; from there either the
//! shopper dismisses the confirmation or the display delay runs out, and both
//! land on [`CheckoutStep::History`]. The step selector can jump between the
//! three numbered views at any time.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::orders::Order;

/// Errors raised by step transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    /// The selector only knows steps 1 to 3.
    #[error("no checkout step numbered {0}")]
    InvalidStep(u8),

    /// The transition needs a confirmation on screen.
    #[error("no order confirmation to dismiss (currently {0})")]
    NotConfirming(CheckoutStep),
}

/// Where the shopper is in the checkout flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Step 1, reviewing the cart.
    #[default]
    Reviewing,

    /// Step 1 with an order confirmation shown over it.
    Confirming,

    /// Step 2, order tracking.
    Tracking,

    /// Step 3, past orders.
    History,
}

impl CheckoutStep {
    /// The number shown on the step selector.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Reviewing | Self::Confirming => 1,
            Self::Tracking => 2,
            Self::History => 3,
        }
    }

    /// The view behind a step selector number.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidStep`] for numbers outside `1..=3`.
    pub const fn from_number(number: u8) -> Result<Self, StepError> {
        match number {
            1 => Ok(Self::Reviewing),
            2 => Ok(Self::Tracking),
            3 => Ok(Self::History),
            other => Err(StepError::InvalidStep(other)),
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reviewing => "cart review",
            Self::Confirming => "order confirmation",
            Self::Tracking => "order tracking",
            Self::History => "past orders",
        };

        f.write_str(label)
    }
}

/// Step state plus the order being confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    confirmation: Option<Order>,
}

impl CheckoutFlow {
    /// Start on the cart review step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The order on the confirmation screen, if one is shown.
    #[must_use]
    pub fn confirmation(&self) -> Option<&Order> {
        self.confirmation.as_ref()
    }

    /// An order was placed: show its confirmation. A newer order replaces an
    /// older confirmation.
    pub fn submit_order(&mut self, order: Order) {
        self.confirmation = Some(order);
        self.step = CheckoutStep::Confirming;
    }

    /// The shopper closed the confirmation early.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NotConfirming`] when no confirmation is shown.
    pub fn dismiss_confirmation(&mut self) -> Result<(), StepError> {
        if self.step != CheckoutStep::Confirming {
            return Err(StepError::NotConfirming(self.step));
        }

        self.confirmation = None;
        self.step = CheckoutStep::History;

        Ok(())
    }

    /// The confirmation delay ran out. Does nothing unless a confirmation is
    /// shown; returns whether the step changed.
    pub fn timeout_elapsed(&mut self) -> bool {
        self.dismiss_confirmation().is_ok()
    }

    /// Jump to a numbered view. Any confirmation on screen is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidStep`] for numbers outside `1..=3`.
    pub fn select_step(&mut self, number: u8) -> Result<CheckoutStep, StepError> {
        let step = CheckoutStep::from_number(number)?;

        self.confirmation = None;
        self.step = step;

        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{address::DeliveryAddress, cart::CartLine, orders::PaymentStatus};

    use super::*;

    fn order() -> Order {
        Order::placed(
            "ORD123ABC",
            &[CartLine::new("CART1", Some("P1"), "Kettle", Decimal::ONE, 1)],
            &DeliveryAddress::default(),
            PaymentStatus::Pending,
        )
    }

    #[test]
    fn starts_on_review() {
        let flow = CheckoutFlow::new();

        assert_eq!(flow.step(), CheckoutStep::Reviewing);
        assert_eq!(flow.step().number(), 1);
    }

    #[test]
    fn submit_then_dismiss_lands_on_history() -> TestResult {
        let mut flow = CheckoutFlow::new();

        flow.submit_order(order());

        assert_eq!(flow.step(), CheckoutStep::Confirming);
        assert_eq!(flow.step().number(), 1);
        assert!(flow.confirmation().is_some());

        flow.dismiss_confirmation()?;

        assert_eq!(flow.step(), CheckoutStep::History);
        assert_eq!(flow.step().number(), 3);
        assert!(flow.confirmation().is_none());

        Ok(())
    }

    #[test]
    fn timeout_lands_on_history() {
        let mut flow = CheckoutFlow::new();

        flow.submit_order(order());

        assert!(flow.timeout_elapsed());
        assert_eq!(flow.step(), CheckoutStep::History);
    }

    #[test]
    fn timeout_after_dismiss_is_a_no_op() -> TestResult {
        let mut flow = CheckoutFlow::new();

        flow.submit_order(order());
        flow.dismiss_confirmation()?;
        flow.select_step(1)?;

        assert!(!flow.timeout_elapsed());
        assert_eq!(flow.step(), CheckoutStep::Reviewing);

        Ok(())
    }

    #[test]
    fn dismiss_without_confirmation_is_rejected() {
        let mut flow = CheckoutFlow::new();

        assert_eq!(
            flow.dismiss_confirmation(),
            Err(StepError::NotConfirming(CheckoutStep::Reviewing))
        );
    }

    #[test]
    fn select_step_drops_confirmation() -> TestResult {
        let mut flow = CheckoutFlow::new();

        flow.submit_order(order());

        assert_eq!(flow.select_step(2)?, CheckoutStep::Tracking);
        assert!(flow.confirmation().is_none());
        assert!(!flow.timeout_elapsed());

        Ok(())
    }

    #[test]
    fn select_step_rejects_unknown_numbers() {
        let mut flow = CheckoutFlow::new();

        assert_eq!(flow.select_step(4), Err(StepError::InvalidStep(4)));
        assert_eq!(flow.step(), CheckoutStep::Reviewing);
    }
}
