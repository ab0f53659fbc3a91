//! Per-key rebuild gates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per source key currently being (re)built.
///
/// Gates are created on demand and removed again by the last user, so the
/// map only ever contains keys with a rebuild in progress or queued.
#[derive(Debug, Default)]
pub(crate) struct Flights {
    gates: Mutex<HashMap<String, Gate>>,
}

#[derive(Debug, Default)]
struct Gate {
    lock: Arc<AsyncMutex<()>>,
    /// Holders plus waiters, counted under the map lock.
    users: usize,
}

impl Flights {
    /// Wait for exclusive access to `key`.
    ///
    /// Dropping the returned future while it waits gives up the place in the
    /// queue and releases the gate like a finished holder would.
    pub(crate) async fn enter(&self, key: &str) -> Flight<'_> {
        let lock = {
            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            let gate = gates.entry(key.to_string()).or_default();
            gate.users += 1;
            gate.lock.clone()
        };
        let mut flight = Flight {
            flights: self,
            key: key.to_string(),
            guard: None,
        };
        flight.guard = Some(lock.lock_owned().await);
        flight
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Held while rebuilding one key; releases the gate on drop.
pub(crate) struct Flight<'a> {
    flights: &'a Flights,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut gates = self.flights.gates.lock().unwrap_or_else(PoisonError::into_inner);
        drop(self.guard.take());
        let Some(gate) = gates.get_mut(&self.key) else {
            return;
        };
        gate.users = gate.users.saturating_sub(1);
        if gate.users == 0 {
            gates.remove(&self.key);
        }
    }
}
