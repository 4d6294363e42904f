//! Checkout module.
//!
//! Contains the step flow, the order draft, addresses and selections, order
//! records and the sequencer that ties them to the backend.

mod address;
mod draft;
mod error;
mod flow;
mod guard;
mod order;
mod selection;
mod sequencer;

pub use address::ShippingAddress;
pub use draft::OrderDraft;
pub use error::{CheckoutError, ErrorKind};
pub use flow::{CheckoutFlow, CheckoutStep};
pub use guard::{InFlight, InFlightGuard, KeyedGuard, KeyedInFlight};
pub use order::{Customer, Order, OrderCustomer, OrderItem, OrderReview, OrderStatus, PlacedOrder};
pub use selection::{CheckoutSelection, DeliveryOption, PaymentMethod, ShippingSelection};
pub use sequencer::{CheckoutConfig, CheckoutSession, CheckoutSnapshot};
