//! Per-key mutual exclusion
//!
//! Mutations of one key are serialized by a fixed array of async mutexes
//! selected by the key hash, so the lock table never grows. `clear` takes the
//! gate exclusively; every other mutation holds it shared.

use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

const STRIPES: usize = 64;

pub(crate) struct KeyLocks {
    gate: RwLock<()>,
    stripes: Vec<Mutex<()>>,
}

/// Held while mutating one key
pub(crate) struct KeyGuard<'a> {
    _stripe: MutexGuard<'a, ()>,
    _gate: RwLockReadGuard<'a, ()>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self {
            gate: RwLock::new(()),
            stripes: (0..STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    pub async fn lock(&self, hash: &str) -> KeyGuard<'_> {
        let gate = self.gate.read().await;
        let stripe = self.stripes[stripe_index(hash)].lock().await;
        KeyGuard {
            _stripe: stripe,
            _gate: gate,
        }
    }

    /// Exclude every key mutation
    pub async fn lock_all(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }
}

fn stripe_index(hash: &str) -> usize {
    hash.get(..4)
        .and_then(|prefix| u16::from_str_radix(prefix, 16).ok())
        .map_or(0, |n| usize::from(n) % STRIPES)
}
