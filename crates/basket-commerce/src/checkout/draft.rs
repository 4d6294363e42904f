//! The order being assembled across checkout steps.

use crate::checkout::{CheckoutStep, DeliveryOption, PaymentMethod, ShippingSelection};
use crate::error::CommerceError;
use crate::ids::OrderId;

/// Selections collected so far.
///
/// Going back a step keeps everything; once submitted the draft is frozen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub shipping: Option<ShippingSelection>,
    pub delivery: Option<DeliveryOption>,
    pub payment: Option<PaymentMethod>,
    submitted: Option<OrderId>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_shipping(&mut self, shipping: ShippingSelection) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.shipping = Some(shipping);
        Ok(())
    }

    pub fn set_delivery_payment(
        &mut self,
        delivery: DeliveryOption,
        payment: PaymentMethod,
    ) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.delivery = Some(delivery);
        self.payment = Some(payment);
        Ok(())
    }

    /// Fields a step needs that are not filled in yet.
    pub fn missing_for_step(&self, step: CheckoutStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if step > CheckoutStep::Address && self.shipping.is_none() {
            missing.push("shipping address");
        }
        if step > CheckoutStep::DeliveryPayment {
            if self.delivery.is_none() {
                missing.push("delivery option");
            }
            if self.payment.is_none() {
                missing.push("payment method");
            }
        }
        missing
    }

    /// Fail with [`CommerceError::CheckoutIncomplete`] unless `step` can run.
    pub fn require_for_step(&self, step: CheckoutStep) -> Result<(), CommerceError> {
        let missing = self.missing_for_step(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::CheckoutIncomplete(missing.join(", ")))
        }
    }

    /// Freeze the draft under the order the backend created from it.
    pub fn mark_submitted(&mut self, order_id: OrderId) -> Result<(), CommerceError> {
        self.ensure_open()?;
        self.submitted = Some(order_id);
        Ok(())
    }

    pub fn submitted(&self) -> Option<&OrderId> {
        self.submitted.as_ref()
    }

    fn ensure_open(&self) -> Result<(), CommerceError> {
        match &self.submitted {
            Some(id) => Err(CommerceError::AlreadySubmitted(id.to_string())),
            None => Ok(()),
        }
    }
}
