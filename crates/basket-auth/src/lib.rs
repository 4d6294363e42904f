//! Authentication module for Basket.
//!
//! The backend authenticates; this crate keeps the resulting session on
//! disk, hands out the bearer token, and decides who may use the admin
//! console.

mod error;
mod guard;
mod session;
mod user;

pub use error::AuthError;
pub use guard::{require_admin, require_login};
pub use session::{AuthSession, SessionStore};
pub use user::{Credentials, Registration, Role, User};
