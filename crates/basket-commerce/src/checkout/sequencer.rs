//! Checkout step sequencer.
//!
//! Drives one shopper through Address → Delivery & Payment → Review →
//! Place Order. A step only advances after its backend call succeeds; any
//! failure records an error and leaves the step where it was.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::backend::CheckoutBackend;
use crate::cart::{compute_subtotal, CartStore, CartTotals, Coupon, CouponBook, PricingPolicy};
use crate::checkout::error::CheckoutError;
use crate::checkout::guard::InFlight;
use crate::checkout::{
    CheckoutFlow, CheckoutSelection, CheckoutStep, Customer, DeliveryOption, Order, OrderDraft,
    OrderReview, PaymentMethod, PlacedOrder, ShippingSelection,
};
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::notify::{GeoLocation, NotificationChannel, OrderNotification};

/// Pricing and coupon rules a checkout runs under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub pricing: PricingPolicy,
    #[serde(default)]
    pub coupons: CouponBook,
}

/// Read-only view of a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSnapshot {
    pub step: CheckoutStep,
    pub completed_steps: Vec<CheckoutStep>,
    pub draft: OrderDraft,
    pub review: Option<OrderReview>,
    pub applied_coupon: Option<String>,
    pub last_error: Option<String>,
    pub placed_order: Option<OrderId>,
}

#[derive(Debug, Default)]
struct SessionState {
    flow: CheckoutFlow,
    draft: OrderDraft,
    review: Option<OrderReview>,
    applied_coupon: Option<String>,
    /// Set when the shopper removes a coupon; stops auto-apply re-adding it.
    coupon_dismissed: bool,
    last_error: Option<String>,
    location: Option<GeoLocation>,
}

/// One shopper's checkout.
pub struct CheckoutSession {
    backend: Arc<dyn CheckoutBackend>,
    cart: Arc<CartStore>,
    notifier: Arc<dyn NotificationChannel>,
    config: CheckoutConfig,
    customer: Customer,
    state: Mutex<SessionState>,
    /// Held by every step action and navigation, including order placement.
    busy: InFlight,
}

impl CheckoutSession {
    /// Begin checkout. Requires a signed-in customer and a non-empty cart.
    pub fn start(
        customer: Option<Customer>,
        cart: Arc<CartStore>,
        backend: Arc<dyn CheckoutBackend>,
        notifier: Arc<dyn NotificationChannel>,
        config: CheckoutConfig,
    ) -> Result<Self, CheckoutError> {
        let customer = customer.ok_or(CheckoutError::NotAuthenticated)?;
        if cart.is_empty()? {
            return Err(CheckoutError::EmptyCart);
        }
        tracing::info!(customer = %customer.email, "checkout started");
        Ok(Self {
            backend,
            cart,
            notifier,
            config,
            customer,
            state: Mutex::new(SessionState::default()),
            busy: InFlight::new(),
        })
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn step(&self) -> CheckoutStep {
        self.state().flow.step
    }

    pub fn is_complete(&self) -> bool {
        self.state().flow.is_complete()
    }

    /// Share of the four steps already saved.
    pub fn progress_percent(&self) -> u8 {
        self.state().flow.progress_percent()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn snapshot(&self) -> CheckoutSnapshot {
        let state = self.state();
        CheckoutSnapshot {
            step: state.flow.step,
            completed_steps: state.flow.completed_steps.clone(),
            draft: state.draft.clone(),
            review: state.review.clone(),
            applied_coupon: state.applied_coupon.clone(),
            last_error: state.last_error.clone(),
            placed_order: state.flow.placed_order.clone(),
        }
    }

    /// Attach the shopper's location to the order notification.
    pub fn set_location(&self, location: Option<GeoLocation>) {
        self.state().location = location;
    }

    /// Live totals from the cart, the drafted delivery option and the
    /// applied coupon. Auto-applies the first eligible coupon when none is.
    pub fn totals(&self) -> Result<CartTotals, CheckoutError> {
        let items = self.cart.items()?;
        let subtotal = compute_subtotal(&items);
        let mut state = self.state();
        if !state.coupon_dismissed {
            if let Some(code) = self
                .config
                .coupons
                .auto_apply(subtotal, &mut state.applied_coupon)
            {
                tracing::info!(coupon = %code, subtotal = %subtotal, "coupon auto-applied");
            }
        }
        let coupon = state
            .applied_coupon
            .as_deref()
            .and_then(|code| self.config.coupons.find(code));
        Ok(self
            .config
            .pricing
            .totals(&items, state.draft.delivery.as_ref(), coupon))
    }

    /// Apply a typed coupon code.
    pub fn apply_coupon(&self, code: &str) -> Result<Coupon, CheckoutError> {
        let subtotal = compute_subtotal(&self.cart.items()?);
        let coupon = self.config.coupons.validate(code, subtotal)?.clone();
        let mut state = self.state();
        state.applied_coupon = Some(coupon.code.clone());
        state.coupon_dismissed = false;
        tracing::info!(coupon = %coupon.code, "coupon applied");
        Ok(coupon)
    }

    /// Remove the applied coupon. Returns the code that was removed.
    pub fn remove_coupon(&self) -> Option<String> {
        let mut state = self.state();
        state.coupon_dismissed = true;
        state.applied_coupon.take()
    }

    /// Step 1: save the shipping address.
    pub async fn submit_address(
        &self,
        selection: ShippingSelection,
    ) -> Result<CheckoutStep, CheckoutError> {
        let _guard = self.busy.try_begin().ok_or(CheckoutError::InFlight)?;
        self.expect_step(CheckoutStep::Address)?;

        if let ShippingSelection::New(address) = &selection {
            address.validate().map_err(|e| self.fail(e))?;
        }

        let payload = CheckoutSelection::from(&selection);
        self.backend
            .save_selection(&self.customer.email, &payload)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state();
        state.draft.set_shipping(selection)?;
        state.review = None;
        self.advance(&mut state, CheckoutStep::Address)
    }

    /// Step 2: save delivery speed and payment method.
    pub async fn submit_delivery_payment(
        &self,
        delivery: DeliveryOption,
        payment: PaymentMethod,
    ) -> Result<CheckoutStep, CheckoutError> {
        let _guard = self.busy.try_begin().ok_or(CheckoutError::InFlight)?;
        self.expect_step(CheckoutStep::DeliveryPayment)?;

        let payload = CheckoutSelection::DeliveryPayment {
            delivery_option: delivery.id.clone(),
            payment_method: payment,
        };
        self.backend
            .save_selection(&self.customer.email, &payload)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state();
        state.draft.set_delivery_payment(delivery, payment)?;
        state.review = None;
        self.advance(&mut state, CheckoutStep::DeliveryPayment)
    }

    /// Step 3: fetch the backend's review of the order.
    pub async fn confirm_review(&self) -> Result<OrderReview, CheckoutError> {
        let _guard = self.busy.try_begin().ok_or(CheckoutError::InFlight)?;
        self.expect_step(CheckoutStep::Review)?;

        let review = self
            .backend
            .review(&self.customer.email)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state();
        state.review = Some(review.clone());
        self.advance(&mut state, CheckoutStep::Review)?;
        Ok(review)
    }

    /// Step 4: place the order.
    ///
    /// One backend call, never retried here. On success the cart is
    /// cleared and the notification is attempted; neither can undo the
    /// order. On failure the cart is kept and the step stays at 4.
    pub async fn place_order(&self) -> Result<PlacedOrder, CheckoutError> {
        let _guard = self.busy.try_begin().ok_or(CheckoutError::InFlight)?;
        self.expect_step(CheckoutStep::PlaceOrder)?;

        let order = match self.backend.place_order(&self.customer.email).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, customer = %self.customer.email, "place order failed");
                return Err(self.fail(e));
            }
        };

        // The order exists from here on; local bookkeeping must not fail the call.
        let (review, location) = {
            let mut state = self.state();
            if let Err(e) = state.draft.mark_submitted(order.id.clone()) {
                tracing::warn!(error = %e, order_id = %order.id, "draft already submitted");
            }
            if let Err(e) = state.flow.complete(order.id.clone()) {
                tracing::warn!(error = %e, order_id = %order.id, "closing checkout out of step");
                state.flow.placed_order = Some(order.id.clone());
            }
            state.last_error = None;
            (state.review.clone(), state.location)
        };
        tracing::info!(order_id = %order.id, total = %order.total, "order placed");

        if let Err(e) = self.cart.clear() {
            tracing::warn!(error = %e, order_id = %order.id, "failed to clear cart after order");
        }

        let notified = self.notify(&order, review, location).await;
        Ok(PlacedOrder { order, notified })
    }

    /// Go back one step.
    pub fn go_back(&self) -> Result<CheckoutStep, CheckoutError> {
        let _guard = self.busy.try_begin().ok_or(CheckoutError::InFlight)?;
        let mut state = self.state();
        self.ensure_open(&state)?;
        Ok(state.flow.go_back()?)
    }

    /// Jump back to an earlier step. Forward jumps are refused.
    pub fn go_to(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        let _guard = self.busy.try_begin().ok_or(CheckoutError::InFlight)?;
        let mut state = self.state();
        self.ensure_open(&state)?;
        Ok(state.flow.go_to(step)?)
    }

    async fn notify(
        &self,
        order: &Order,
        review: Option<OrderReview>,
        location: Option<GeoLocation>,
    ) -> bool {
        let notification = OrderNotification {
            order: order.clone(),
            review,
            customer: self.customer.clone(),
            location,
        };
        match self.notifier.send(&notification).await {
            Ok(()) => {
                tracing::debug!(channel = self.notifier.name(), order_id = %order.id, "notification sent");
                true
            }
            Err(e) => {
                tracing::warn!(
                    channel = self.notifier.name(),
                    order_id = %order.id,
                    error = %e,
                    "order notification failed"
                );
                false
            }
        }
    }

    fn advance(
        &self,
        state: &mut SessionState,
        from: CheckoutStep,
    ) -> Result<CheckoutStep, CheckoutError> {
        if state.flow.step != from {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: state.flow.step.as_str().to_string(),
                to: from.as_str().to_string(),
            }
            .into());
        }
        let next = state.flow.advance()?;
        state.last_error = None;
        tracing::info!(from = from.as_str(), to = next.as_str(), "checkout step completed");
        Ok(next)
    }

    fn expect_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        let state = self.state();
        self.ensure_open(&state)?;
        if state.flow.step != step {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: state.flow.step.as_str().to_string(),
                to: step.as_str().to_string(),
            }
            .into());
        }
        state.draft.require_for_step(step)?;
        Ok(())
    }

    fn ensure_open(&self, state: &SessionState) -> Result<(), CheckoutError> {
        match &state.flow.placed_order {
            Some(id) => Err(CheckoutError::Completed(id.to_string())),
            None => Ok(()),
        }
    }

    /// Record a step failure and hand it back.
    fn fail(&self, err: impl Into<CheckoutError>) -> CheckoutError {
        let err = err.into();
        let mut state = self.state();
        tracing::debug!(step = state.flow.step.as_str(), error = %err, "checkout step failed");
        state.last_error = Some(err.to_string());
        err
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::cart::{CartItem, LineItemKey};
    use crate::checkout::ShippingAddress;
    use crate::ids::{AddressId, ProductId};
    use crate::money::Money;
    use crate::notify::NotifyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        SaveAddress,
        SaveDeliveryPayment,
        Review,
        PlaceOrder,
    }

    #[derive(Default)]
    struct MockBackend {
        fail_on: Mutex<Option<Call>>,
        calls: Mutex<Vec<Call>>,
        place_delay: Option<Duration>,
        orders_created: AtomicUsize,
    }

    impl MockBackend {
        fn fail_on(&self, call: Option<Call>) {
            *self.fail_on.lock().unwrap() = call;
        }

        fn record(&self, call: Call) -> Result<(), BackendError> {
            self.calls.lock().unwrap().push(call);
            if *self.fail_on.lock().unwrap() == Some(call) {
                return Err(BackendError::status(500, "injected failure"));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckoutBackend for MockBackend {
        async fn save_selection(
            &self,
            email: &str,
            selection: &CheckoutSelection,
        ) -> Result<(), BackendError> {
            assert_eq!(email, "asha@example.com");
            let call = match selection {
                CheckoutSelection::DeliveryPayment { .. } => Call::SaveDeliveryPayment,
                _ => Call::SaveAddress,
            };
            self.record(call)
        }

        async fn review(&self, _email: &str) -> Result<OrderReview, BackendError> {
            self.record(Call::Review)?;
            Ok(OrderReview {
                subtotal: Money::inr(1600),
                discount: Money::inr(160),
                total: Money::inr(1440),
                ..Default::default()
            })
        }

        async fn place_order(&self, _email: &str) -> Result<Order, BackendError> {
            if let Some(delay) = self.place_delay {
                tokio::time::sleep(delay).await;
            }
            self.record(Call::PlaceOrder)?;
            let n = self.orders_created.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(serde_json::from_value(serde_json::json!({
                "id": 100 + n as i64,
                "status": "pending",
                "total": 1440
            }))
            .unwrap())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationChannel for RecordingNotifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, notification: &OrderNotification) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Unavailable("popup blocked".to_string()));
            }
            self.sent.lock().unwrap().push(notification.render());
            Ok(())
        }
    }

    fn line(id: &str, rupees: i64, quantity: i64) -> CartItem {
        let product_id = ProductId::new(id);
        CartItem {
            key: LineItemKey::new(&product_id, None),
            product_id,
            name: format!("Product {}", id),
            unit_price: Money::inr(rupees),
            original_unit_price: None,
            quantity,
            variant_label: None,
            category: None,
            brand: None,
            stock_cap: None,
            image_url: None,
        }
    }

    fn customer() -> Customer {
        Customer {
            email: "asha@example.com".to_string(),
            name: "Asha Rao".to_string(),
            phone: Some("9876543210".to_string()),
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            id: None,
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            street: "12 MG Road".to_string(),
            landmark: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
        }
    }

    struct Harness {
        session: CheckoutSession,
        backend: Arc<MockBackend>,
        notifier: Arc<RecordingNotifier>,
        cart: Arc<CartStore>,
    }

    fn harness_with(backend: MockBackend, notifier: RecordingNotifier) -> Harness {
        let cart = Arc::new(CartStore::in_memory());
        cart.add(line("1", 800, 2)).unwrap();
        let backend = Arc::new(backend);
        let notifier = Arc::new(notifier);
        let session = CheckoutSession::start(
            Some(customer()),
            cart.clone(),
            backend.clone(),
            notifier.clone(),
            CheckoutConfig::default(),
        )
        .unwrap();
        Harness {
            session,
            backend,
            notifier,
            cart,
        }
    }

    fn harness() -> Harness {
        harness_with(MockBackend::default(), RecordingNotifier::default())
    }

    async fn drive_to(session: &CheckoutSession, step: CheckoutStep) {
        if step > CheckoutStep::Address {
            session
                .submit_address(ShippingSelection::New(address()))
                .await
                .unwrap();
        }
        if step > CheckoutStep::DeliveryPayment {
            session
                .submit_delivery_payment(DeliveryOption::standard(), PaymentMethod::Cod)
                .await
                .unwrap();
        }
        if step > CheckoutStep::Review {
            session.confirm_review().await.unwrap();
        }
        assert_eq!(session.step(), step);
    }

    async fn run_step(session: &CheckoutSession, step: CheckoutStep) -> Result<(), CheckoutError> {
        match step {
            CheckoutStep::Address => session
                .submit_address(ShippingSelection::New(address()))
                .await
                .map(|_| ()),
            CheckoutStep::DeliveryPayment => session
                .submit_delivery_payment(DeliveryOption::standard(), PaymentMethod::Cod)
                .await
                .map(|_| ()),
            CheckoutStep::Review => session.confirm_review().await.map(|_| ()),
            CheckoutStep::PlaceOrder => session.place_order().await.map(|_| ()),
        }
    }

    #[test]
    fn test_start_requires_customer_and_cart() {
        let backend: Arc<dyn CheckoutBackend> = Arc::new(MockBackend::default());
        let notifier: Arc<dyn NotificationChannel> = Arc::new(RecordingNotifier::default());

        let cart = Arc::new(CartStore::in_memory());
        cart.add(line("1", 100, 1)).unwrap();
        let err = CheckoutSession::start(
            None,
            cart,
            backend.clone(),
            notifier.clone(),
            CheckoutConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CheckoutError::NotAuthenticated));

        let err = CheckoutSession::start(
            Some(customer()),
            Arc::new(CartStore::in_memory()),
            backend,
            notifier,
            CheckoutConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_happy_path() {
        let h = harness();
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;
        assert_eq!(h.session.progress_percent(), 75);

        let placed = h.session.place_order().await.unwrap();
        assert_eq!(h.session.progress_percent(), 100);
        assert_eq!(placed.order.id.as_str(), "101");
        assert!(placed.notified);
        assert!(h.session.is_complete());
        assert!(h.cart.is_empty().unwrap());
        assert_eq!(
            h.backend.calls(),
            vec![Call::SaveAddress, Call::SaveDeliveryPayment, Call::Review, Call::PlaceOrder]
        );

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("*Discount:* -₹160.00"));
    }

    #[tokio::test]
    async fn test_failure_at_any_step_keeps_step() {
        let injected = [
            (CheckoutStep::Address, Call::SaveAddress),
            (CheckoutStep::DeliveryPayment, Call::SaveDeliveryPayment),
            (CheckoutStep::Review, Call::Review),
            (CheckoutStep::PlaceOrder, Call::PlaceOrder),
        ];
        for (step, call) in injected {
            let h = harness();
            drive_to(&h.session, step).await;
            h.backend.fail_on(Some(call));

            let err = run_step(&h.session, step).await.unwrap_err();
            assert!(matches!(err, CheckoutError::Backend(_)), "step {:?}", step);
            assert_eq!(h.session.step(), step);
            assert!(h.session.last_error().is_some());
            assert!(!h.session.is_complete());

            // Retry succeeds once the backend recovers.
            h.backend.fail_on(None);
            run_step(&h.session, step).await.unwrap();
            assert!(h.session.last_error().is_none());
        }
    }

    #[tokio::test]
    async fn test_failed_place_order_keeps_cart() {
        let h = harness();
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;
        h.backend.fail_on(Some(Call::PlaceOrder));

        assert!(h.session.place_order().await.is_err());
        assert_eq!(h.session.step(), CheckoutStep::PlaceOrder);
        assert_eq!(h.cart.count().unwrap(), 2);
        assert!(h.notifier.sent.lock().unwrap().is_empty());

        // Going back to review is allowed after a failure.
        h.session.go_to(CheckoutStep::Review).unwrap();
        assert_eq!(h.session.step(), CheckoutStep::Review);
    }

    #[tokio::test]
    async fn test_double_submit_creates_one_order() {
        let backend = MockBackend {
            place_delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let h = harness_with(backend, RecordingNotifier::default());
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;

        let (a, b) = tokio::join!(h.session.place_order(), h.session.place_order());
        let (ok, busy) = if a.is_ok() { (a, b) } else { (b, a) };
        assert!(ok.is_ok());
        assert!(matches!(busy, Err(CheckoutError::InFlight)));
        assert_eq!(h.backend.orders_created.load(Ordering::SeqCst), 1);

        // And a late third click finds the checkout closed.
        assert!(matches!(
            h.session.place_order().await,
            Err(CheckoutError::Completed(_))
        ));
        assert_eq!(h.backend.orders_created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_navigation_refused_while_order_in_flight() {
        let backend = MockBackend {
            place_delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let h = harness_with(backend, RecordingNotifier::default());
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;

        let navigate = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            (
                h.session.go_to(CheckoutStep::Review),
                h.session.go_back(),
                h.session.confirm_review().await,
            )
        };
        let (placed, (jump, back, review)) = tokio::join!(h.session.place_order(), navigate);

        assert!(matches!(jump, Err(CheckoutError::InFlight)));
        assert!(matches!(back, Err(CheckoutError::InFlight)));
        assert!(matches!(review, Err(CheckoutError::InFlight)));
        assert_eq!(placed.unwrap().order.id.as_str(), "101");
        assert!(h.session.is_complete());
        assert!(h.cart.is_empty().unwrap());

        // Nothing can reach the backend for a second order.
        assert!(matches!(
            h.session.go_to(CheckoutStep::Review),
            Err(CheckoutError::Completed(_))
        ));
        assert!(h.session.place_order().await.is_err());
        assert_eq!(h.backend.orders_created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_order() {
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let h = harness_with(MockBackend::default(), notifier);
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;

        let placed = h.session.place_order().await.unwrap();
        assert!(!placed.notified);
        assert!(h.session.is_complete());
        assert!(h.cart.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_invalid_address_never_reaches_backend() {
        let h = harness();
        let mut bad = address();
        bad.pincode.clear();

        let err = h
            .session
            .submit_address(ShippingSelection::New(bad))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Commerce(CommerceError::ValidationError(_))));
        assert_eq!(h.session.step(), CheckoutStep::Address);
        assert!(h.session.last_error().is_some());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_saved_address_sends_id() {
        let h = harness();
        let selection = ShippingSelection::Saved {
            id: AddressId::new("5"),
            address: address(),
        };
        assert_eq!(
            h.session.submit_address(selection).await.unwrap(),
            CheckoutStep::DeliveryPayment
        );
    }

    #[tokio::test]
    async fn test_no_skipping_ahead() {
        let h = harness();
        assert!(h.session.confirm_review().await.is_err());
        assert!(h.session.place_order().await.is_err());
        assert!(h.session.go_to(CheckoutStep::Review).is_err());
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_back_navigation_keeps_draft_and_drops_review() {
        let h = harness();
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;

        h.session.go_to(CheckoutStep::DeliveryPayment).unwrap();
        let snap = h.session.snapshot();
        assert!(snap.draft.shipping.is_some());
        assert_eq!(snap.draft.payment, Some(PaymentMethod::Cod));

        h.session
            .submit_delivery_payment(DeliveryOption::express(Money::inr(99)), PaymentMethod::Upi)
            .await
            .unwrap();
        assert!(h.session.snapshot().review.is_none());
        assert_eq!(h.session.step(), CheckoutStep::Review);
    }

    #[tokio::test]
    async fn test_no_navigation_after_completion() {
        let h = harness();
        drive_to(&h.session, CheckoutStep::PlaceOrder).await;
        h.session.place_order().await.unwrap();

        assert!(matches!(h.session.go_back(), Err(CheckoutError::Completed(_))));
        assert!(h
            .session
            .submit_address(ShippingSelection::New(address()))
            .await
            .is_err());
    }

    #[test]
    fn test_totals_auto_apply_flat10() {
        let h = harness();
        let first = h.session.totals().unwrap();
        assert_eq!(first.subtotal, Money::inr(1600));
        assert_eq!(first.discount, Money::inr(160));
        assert_eq!(first.total, Money::inr(1440));
        assert_eq!(first.coupon.as_deref(), Some("FLAT10"));

        let second = h.session.totals().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_removed_coupon_stays_removed() {
        let h = harness();
        h.session.totals().unwrap();
        assert_eq!(h.session.remove_coupon().as_deref(), Some("FLAT10"));
        let t = h.session.totals().unwrap();
        assert!(t.discount.is_zero());
        assert_eq!(t.total, Money::inr(1600));

        h.session.apply_coupon("flat10").unwrap();
        assert_eq!(h.session.totals().unwrap().total, Money::inr(1440));
    }

    #[test]
    fn test_coupon_below_minimum_rejected() {
        let cart = Arc::new(CartStore::in_memory());
        cart.add(line("1", 399, 1)).unwrap();
        cart.add(line("2", 280, 2)).unwrap();
        let session = CheckoutSession::start(
            Some(customer()),
            cart,
            Arc::new(MockBackend::default()),
            Arc::new(RecordingNotifier::default()),
            CheckoutConfig::default(),
        )
        .unwrap();

        let t = session.totals().unwrap();
        assert_eq!(t.total, Money::inr(959));
        assert!(t.coupon.is_none());
        assert!(matches!(
            session.apply_coupon("FLAT10"),
            Err(CheckoutError::Commerce(CommerceError::CouponNotEligible { .. }))
        ));
        assert!(matches!(
            session.apply_coupon("NOPE"),
            Err(CheckoutError::Commerce(CommerceError::InvalidDiscountCode(_)))
        ));
    }
}
