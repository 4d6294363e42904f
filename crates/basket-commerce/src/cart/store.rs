//! The single write path for the session's cart.
//!
//! Header badge, cart view and checkout all read and mutate the cart
//! through one [`CartStore`]. Each mutation is applied to a copy, persisted,
//! and only then made visible, so a failed write leaves the cart as it was.

use std::sync::{Mutex, MutexGuard};

use basket_cache::{Cache, Session, SessionId};

use crate::cart::{Cart, CartItem, LineItemKey};
use crate::error::CommerceError;

const CART_NAMESPACE: &str = "cart";

/// Session-scoped cart with persistence.
pub struct CartStore {
    cart: Mutex<Cart>,
    records: Session<Cart>,
    owner: SessionId,
}

impl CartStore {
    /// Open the cart belonging to `owner`, loading any persisted state.
    pub fn open(cache: Cache, owner: SessionId) -> Result<Self, CommerceError> {
        let records = Session::<Cart>::new(cache, CART_NAMESPACE);
        let cart = records.get(&owner)?.unwrap_or_default();
        tracing::debug!(owner = %owner, lines = cart.items.len(), "loaded cart");
        Ok(Self {
            cart: Mutex::new(cart),
            records,
            owner,
        })
    }

    /// A throwaway cart that persists to memory only.
    pub fn in_memory() -> Self {
        Self {
            cart: Mutex::new(Cart::default()),
            records: Session::new(Cache::in_memory(), CART_NAMESPACE),
            owner: SessionId::generate(),
        }
    }

    /// Add a product line (or merge into an existing one).
    pub fn add(&self, item: CartItem) -> Result<LineItemKey, CommerceError> {
        self.mutate(|cart| cart.add_item(item))
    }

    /// Set a line's quantity; zero removes it.
    pub fn update_quantity(&self, key: &LineItemKey, quantity: i64) -> Result<(), CommerceError> {
        self.mutate(|cart| cart.update_quantity(key, quantity))
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&self, key: &LineItemKey) -> Result<bool, CommerceError> {
        self.mutate(|cart| Ok(cart.remove_item(key)))
    }

    /// Empty the cart.
    pub fn clear(&self) -> Result<(), CommerceError> {
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Sum of quantities.
    pub fn count(&self) -> Result<i64, CommerceError> {
        Ok(self.lock()?.item_count())
    }

    pub fn is_empty(&self) -> Result<bool, CommerceError> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Result<Cart, CommerceError> {
        Ok(self.lock()?.clone())
    }

    /// Copy of the current lines.
    pub fn items(&self) -> Result<Vec<CartItem>, CommerceError> {
        Ok(self.lock()?.items.clone())
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Cart) -> Result<T, CommerceError>,
    ) -> Result<T, CommerceError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.records.set(&self.owner, &next)?;
        *guard = next;
        Ok(out)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Cart>, CommerceError> {
        self.cart
            .lock()
            .map_err(|_| CommerceError::Storage("cart lock poisoned".to_string()))
    }
}
