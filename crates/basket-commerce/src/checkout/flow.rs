//! Checkout flow state machine.
//!
//! Pure state: which step the customer is on and which steps they have
//! completed. The sequencer decides *when* to advance (after the backend
//! acknowledges a step); this type only decides *whether* a move is legal.

use crate::error::CommerceError;
use crate::ids::OrderId;
use serde::{Deserialize, Serialize};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Shipping address.
    Address,
    /// Delivery speed and payment method.
    DeliveryPayment,
    /// Backend-computed order review.
    Review,
    /// Final confirmation and submission.
    PlaceOrder,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] = [
        CheckoutStep::Address,
        CheckoutStep::DeliveryPayment,
        CheckoutStep::Review,
        CheckoutStep::PlaceOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Address => "address",
            CheckoutStep::DeliveryPayment => "delivery_payment",
            CheckoutStep::Review => "review",
            CheckoutStep::PlaceOrder => "place_order",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Address => "Address",
            CheckoutStep::DeliveryPayment => "Delivery & Payment",
            CheckoutStep::Review => "Review",
            CheckoutStep::PlaceOrder => "Place Order",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Address => 1,
            CheckoutStep::DeliveryPayment => 2,
            CheckoutStep::Review => 3,
            CheckoutStep::PlaceOrder => 4,
        }
    }

    /// Step with the given 1-indexed number.
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

/// Checkout flow state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutFlow {
    /// Current step.
    pub step: CheckoutStep,
    /// Steps whose backend save has succeeded at least once.
    pub completed_steps: Vec<CheckoutStep>,
    /// Set once the order is placed; the flow is closed from then on.
    pub placed_order: Option<OrderId>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    /// Create a new checkout flow at the address step.
    pub fn new() -> Self {
        let now = current_timestamp();
        Self {
            step: CheckoutStep::Address,
            completed_steps: Vec::new(),
            placed_order: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance from the current step to the next.
    ///
    /// Only call after the current step's backend save has succeeded.
    pub fn advance(&mut self) -> Result<CheckoutStep, CommerceError> {
        self.ensure_open()?;
        let next = self
            .step
            .next()
            .ok_or_else(|| CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "none".to_string(),
            })?;

        if !self.is_step_completed(self.step) {
            self.completed_steps.push(self.step);
        }
        self.step = next;
        self.updated_at = current_timestamp();

        Ok(next)
    }

    /// Go back to the previous step.
    pub fn go_back(&mut self) -> Result<CheckoutStep, CommerceError> {
        self.ensure_open()?;
        let prev = self
            .step
            .previous()
            .ok_or_else(|| CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "none".to_string(),
            })?;

        self.step = prev;
        self.updated_at = current_timestamp();

        Ok(prev)
    }

    /// Jump back to any step at or before the current one.
    ///
    /// Forward jumps are never allowed; moving forward always goes through
    /// [`advance`](Self::advance) so each step is re-saved.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<(), CommerceError> {
        self.ensure_open()?;
        if step <= self.step {
            self.step = step;
            self.updated_at = current_timestamp();
            Ok(())
        } else {
            Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: step.as_str().to_string(),
            })
        }
    }

    /// Close the flow with the backend-issued order id.
    pub fn complete(&mut self, order_id: OrderId) -> Result<(), CommerceError> {
        self.ensure_open()?;
        if self.step != CheckoutStep::PlaceOrder {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "complete".to_string(),
            });
        }
        if !self.is_step_completed(self.step) {
            self.completed_steps.push(self.step);
        }
        self.placed_order = Some(order_id);
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Check if the order has been placed.
    pub fn is_complete(&self) -> bool {
        self.placed_order.is_some()
    }

    pub fn is_step_completed(&self, step: CheckoutStep) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Get progress percentage.
    pub fn progress_percent(&self) -> u8 {
        if self.is_complete() {
            return 100;
        }
        ((self.completed_steps.len() as f64 / CheckoutStep::ALL.len() as f64) * 100.0) as u8
    }

    fn ensure_open(&self) -> Result<(), CommerceError> {
        match &self.placed_order {
            Some(id) => Err(CommerceError::AlreadySubmitted(id.to_string())),
            None => Ok(()),
        }
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_creation() {
        let flow = CheckoutFlow::new();
        assert_eq!(flow.step, CheckoutStep::Address);
        assert!(flow.completed_steps.is_empty());
        assert_eq!(flow.progress_percent(), 0);
    }

    #[test]
    fn test_advance_through_all_steps() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.advance().unwrap(), CheckoutStep::DeliveryPayment);
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Review);
        assert_eq!(flow.advance().unwrap(), CheckoutStep::PlaceOrder);
        assert!(flow.advance().is_err());
        assert_eq!(flow.progress_percent(), 75);
    }

    #[test]
    fn test_go_back_keeps_completed() {
        let mut flow = CheckoutFlow::new();
        flow.advance().unwrap();
        flow.advance().unwrap();

        assert_eq!(flow.go_back().unwrap(), CheckoutStep::DeliveryPayment);
        assert!(flow.is_step_completed(CheckoutStep::DeliveryPayment));
        assert!(flow.is_step_completed(CheckoutStep::Address));
    }

    #[test]
    fn test_cannot_go_back_from_first_step() {
        let mut flow = CheckoutFlow::new();
        assert!(flow.go_back().is_err());
    }

    #[test]
    fn test_go_to_only_backwards() {
        let mut flow = CheckoutFlow::new();
        flow.advance().unwrap();
        flow.advance().unwrap();
        flow.go_to(CheckoutStep::Address).unwrap();
        assert_eq!(flow.step, CheckoutStep::Address);

        // Step 3 was completed before, but skipping forward is still refused.
        let err = flow.go_to(CheckoutStep::Review).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidCheckoutTransition { .. }));
        assert_eq!(flow.step, CheckoutStep::Address);
    }

    #[test]
    fn test_complete_closes_flow() {
        let mut flow = CheckoutFlow::new();
        assert!(flow.complete(OrderId::new("1")).is_err());

        for _ in 0..3 {
            flow.advance().unwrap();
        }
        flow.complete(OrderId::new("41")).unwrap();
        assert!(flow.is_complete());
        assert_eq!(flow.progress_percent(), 100);
        assert!(matches!(flow.go_back(), Err(CommerceError::AlreadySubmitted(_))));
        assert!(flow.go_to(CheckoutStep::Address).is_err());
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(CheckoutStep::from_number(2), Some(CheckoutStep::DeliveryPayment));
        assert_eq!(CheckoutStep::from_number(5), None);
        assert_eq!(CheckoutStep::Address.previous(), None);
        assert_eq!(CheckoutStep::PlaceOrder.next(), None);
    }
}
