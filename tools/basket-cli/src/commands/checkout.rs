//! Interactive checkout.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use basket_commerce::backend::CheckoutBackend;
use basket_commerce::checkout::{
    CheckoutError, CheckoutSession, CheckoutStep, DeliveryOption, ErrorKind, OrderReview,
    PaymentMethod, ShippingAddress, ShippingSelection,
};
use basket_commerce::notify::{
    DisabledChannel, GeoLocation, LinkSink, NotificationChannel, NotifyError, WhatsAppChannel,
};
use dialoguer::{Confirm, Input, Select};
use url::Url;

use super::cart::{print_lines, print_totals};
use super::CheckoutArgs;
use crate::context::Context;
use crate::output::{shipping_label, Output};

/// Keeps the WhatsApp link so it can be shown after the order.
#[derive(Default)]
struct LinkCapture {
    link: Mutex<Option<Url>>,
}

impl LinkCapture {
    fn take(&self) -> Option<Url> {
        self.link.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl LinkSink for LinkCapture {
    fn deliver(&self, link: &Url) -> Result<(), NotifyError> {
        let mut slot = self
            .link
            .lock()
            .map_err(|_| NotifyError::Unavailable("link slot poisoned".to_string()))?;
        *slot = Some(link.clone());
        Ok(())
    }
}

/// Choices made so far; reused as prompt defaults when a step is revisited.
#[derive(Default)]
struct Choices {
    address: Option<ShippingAddress>,
    delivery: usize,
    payment: PaymentMethod,
    /// Given on the command line; used on the first pass only.
    preset_delivery: Option<usize>,
    preset_payment: Option<PaymentMethod>,
}

enum NextAction {
    Place,
    Revisit(CheckoutStep),
    Cancel,
}

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let session = ctx.require_session()?;
    let cart = ctx.cart_store()?;
    let backend: Arc<dyn CheckoutBackend> = Arc::new(ctx.client()?);

    let links = Arc::new(LinkCapture::default());
    let notifier: Arc<dyn NotificationChannel> = if ctx.config.store.notify {
        Arc::new(WhatsAppChannel::new(
            ctx.config.store.whatsapp_recipient.clone(),
            links.clone(),
        ))
    } else {
        Arc::new(DisabledChannel)
    };

    let checkout = CheckoutSession::start(
        Some(session.user.customer()),
        cart,
        backend,
        notifier,
        ctx.config.checkout(),
    )?;

    if let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) {
        checkout.set_location(Some(GeoLocation { latitude, longitude }));
    }

    ctx.output.header(&format!("Checkout for {}", checkout.customer().name));
    print_lines(&checkout.cart().items()?, ctx);

    if let Some(code) = &args.coupon {
        let coupon = checkout.apply_coupon(code)?;
        ctx.output.success(&format!("Coupon {} applied: {}", coupon.code, coupon.describe()));
    }
    let pricing = ctx.config.checkout().pricing;
    print_totals(&checkout.totals()?, &pricing, ctx);

    let options = ctx.config.delivery_options();
    let mut choices = Choices {
        preset_delivery: args.express.then_some(1),
        preset_payment: args
            .payment
            .as_deref()
            .map(str::parse::<PaymentMethod>)
            .transpose()
            .map_err(|e| anyhow!(e))?,
        ..Default::default()
    };

    loop {
        let step = checkout.step();
        ctx.output.info("");
        ctx.output.step(
            step.number() as usize,
            CheckoutStep::ALL.len(),
            &format!("{} ({}% done)", step.display_name(), checkout.progress_percent()),
        );

        let outcome = match step {
            CheckoutStep::Address => {
                let address = prompt_address(&checkout, choices.address.take())?;
                choices.address = Some(address.clone());
                let spinner = ctx.output.spinner("Saving address...");
                let result = checkout.submit_address(ShippingSelection::New(address)).await;
                spinner.finish_and_clear();
                result.map(|_| ())
            }
            CheckoutStep::DeliveryPayment => {
                let index = match choices.preset_delivery.take() {
                    Some(index) => index,
                    None => select_delivery(&options, choices.delivery)?,
                };
                let payment = match choices.preset_payment.take() {
                    Some(payment) => payment,
                    None => select_payment(choices.payment)?,
                };
                choices.delivery = index;
                choices.payment = payment;

                let spinner = ctx.output.spinner("Saving delivery and payment...");
                let result = checkout
                    .submit_delivery_payment(options[index].clone(), payment)
                    .await;
                spinner.finish_and_clear();
                result.map(|_| ())
            }
            CheckoutStep::Review => {
                let spinner = ctx.output.spinner("Loading order review...");
                let result = checkout.confirm_review().await;
                spinner.finish_and_clear();
                result.map(|review| print_review(&review, &ctx.output))
            }
            CheckoutStep::PlaceOrder => {
                match next_action(args.yes)? {
                    NextAction::Place => break,
                    NextAction::Revisit(step) => checkout.go_to(step),
                    NextAction::Cancel => {
                        ctx.output.warn("Checkout cancelled. Your cart is unchanged.");
                        return Ok(());
                    }
                }
            }
        };

        if let Err(e) = outcome {
            handle_step_error(e, &ctx.output)?;
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let result = checkout.place_order().await;
    spinner.finish_and_clear();
    let placed = result?;
    let link = links.take();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "order": placed.order,
            "orderNumber": placed.order.display_number(),
            "notified": placed.notified,
            "whatsappLink": link.as_ref().map(Url::as_str),
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Order {} placed. Total {}",
        placed.order.display_number(),
        placed.order.total.display()
    ));
    match link {
        Some(link) => ctx.output.info(&format!("Send the order on WhatsApp: {}", link)),
        None if ctx.config.store.notify => {
            ctx.output.warn("Order placed, but the WhatsApp message could not be prepared")
        }
        None => {}
    }
    Ok(())
}

/// Validation problems are shown and the step is asked again; anything
/// else ends the command.
fn handle_step_error(e: CheckoutError, output: &Output) -> Result<()> {
    match e.kind() {
        ErrorKind::Validation => {
            output.warn(&e.to_string());
            Ok(())
        }
        ErrorKind::Busy => Ok(()),
        ErrorKind::Backend | ErrorKind::Auth => Err(e.into()),
    }
}

fn prompt_address(
    checkout: &CheckoutSession,
    previous: Option<ShippingAddress>,
) -> Result<ShippingAddress> {
    let customer = checkout.customer();
    let previous = previous.unwrap_or_else(|| ShippingAddress {
        name: customer.name.clone(),
        phone: customer.phone.clone().unwrap_or_default(),
        ..Default::default()
    });

    let name = text_field("Full name", &previous.name)?;
    let phone = text_field("Phone", &previous.phone)?;
    let street = text_field("Street address", &previous.street)?;
    let landmark = text_field(
        "Landmark (optional)",
        previous.landmark.as_deref().unwrap_or_default(),
    )?;
    Ok(ShippingAddress {
        id: None,
        name,
        phone,
        street,
        landmark: Some(landmark).filter(|l| !l.is_empty()),
        city: text_field("City", &previous.city)?,
        state: text_field("State", &previous.state)?,
        pincode: text_field("Pincode", &previous.pincode)?,
    })
}

fn text_field(label: &str, initial: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(label)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn select_delivery(options: &[DeliveryOption], default: usize) -> Result<usize> {
    let items: Vec<String> = options
        .iter()
        .map(|o| match o.price {
            Some(price) => format!("{} ({})", o.label, shipping_label(price)),
            None => o.label.clone(),
        })
        .collect();
    Ok(Select::new()
        .with_prompt("Delivery")
        .items(&items)
        .default(default.min(items.len().saturating_sub(1)))
        .interact()?)
}

fn select_payment(default: PaymentMethod) -> Result<PaymentMethod> {
    let items: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.display_name()).collect();
    let default = PaymentMethod::ALL
        .iter()
        .position(|m| *m == default)
        .unwrap_or(0);
    let index = Select::new()
        .with_prompt("Payment")
        .items(&items)
        .default(default)
        .interact()?;
    Ok(PaymentMethod::ALL[index])
}

fn next_action(yes: bool) -> Result<NextAction> {
    if yes {
        return Ok(NextAction::Place);
    }
    let items = [
        "Place order",
        "Change address",
        "Change delivery or payment",
        "Cancel",
    ];
    let choice = Select::new()
        .with_prompt("Ready to place the order?")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(match choice {
        0 => {
            if Confirm::new()
                .with_prompt("Place this order now?")
                .default(true)
                .interact()?
            {
                NextAction::Place
            } else {
                NextAction::Cancel
            }
        }
        1 => NextAction::Revisit(CheckoutStep::Address),
        2 => NextAction::Revisit(CheckoutStep::DeliveryPayment),
        _ => NextAction::Cancel,
    })
}

fn print_review(review: &OrderReview, output: &Output) {
    output.header("Order Review");
    for item in &review.items {
        output.list_item(&format!(
            "{} x {}  {}",
            item.quantity,
            item.name,
            item.line_total().display()
        ));
    }
    if let Some(address) = &review.address {
        output.kv("Ship to", &address.one_line());
    }
    if let Some(delivery) = &review.delivery_option {
        output.kv("Delivery", delivery);
    }
    if let Some(payment) = &review.payment_method {
        let name = payment
            .parse::<PaymentMethod>()
            .map(|m| m.display_name().to_string())
            .unwrap_or_else(|_| payment.clone());
        output.kv("Payment", &name);
    }
    output.kv("Subtotal", &review.subtotal.display());
    output.kv("Shipping", &shipping_label(review.shipping_fee));
    if review.discount.is_positive() {
        output.kv("Discount", &format!("-{}", review.discount.display()));
    }
    output.kv("Total", &review.total.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_capture_keeps_last_link() {
        let capture = LinkCapture::default();
        let link = Url::parse("https://wa.me/917892783668?text=hi").unwrap();
        capture.deliver(&link).unwrap();
        assert_eq!(capture.take(), Some(link));
        assert_eq!(capture.take(), None);
    }

    #[test]
    fn test_validation_errors_reprompt() {
        let output = Output::new(false, true);
        assert!(handle_step_error(CheckoutError::EmptyCart, &output).is_ok());
        assert!(handle_step_error(CheckoutError::InFlight, &output).is_ok());
        assert!(handle_step_error(CheckoutError::NotAuthenticated, &output).is_err());
    }
}
