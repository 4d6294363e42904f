//! In-flight flags for actions that must not run twice at once.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A single processing flag.
///
/// [`try_begin`](InFlight::try_begin) sets it and hands back a guard that
/// clears it on drop, whichever way the action ends.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or `None` if the action is already running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Clears its [`InFlight`] flag when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One processing flag per key (e.g. per order id).
#[derive(Debug, Clone, Default)]
pub struct KeyedInFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl KeyedInFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if work for it is already running.
    pub fn try_begin(&self, key: &str) -> Option<KeyedGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.to_string()) {
            return None;
        }
        Some(KeyedGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct KeyedGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.key);
    }
}
