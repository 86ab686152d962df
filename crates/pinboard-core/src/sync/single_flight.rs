//! Coalescing of concurrent calls that share a key.
//!
//! The first caller for a key (the leader) runs the operation; callers that
//! arrive while it is in flight wait for the leader and get a clone of its
//! value. Once the leader finishes the key is released and the next call
//! starts a fresh run.
//!
//! If the leader future is dropped before completing, waiting followers
//! never wake. Callers must not cancel a `run` that may be leading.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Notify, OnceCell};

struct Flight<V> {
    value: OnceCell<V>,
    done: Notify,
}

pub struct SingleFlight<K, V> {
    in_flight: Mutex<HashMap<K, Arc<Flight<V>>>>,
}

impl<K, V> SingleFlight<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn flights(&self) -> MutexGuard<'_, HashMap<K, Arc<Flight<V>>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` for `key`, or join the run already in flight for it.
    pub async fn run<F, Fut>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let (flight, is_leader) = {
            let mut map = self.flights();
            match map.get(&key) {
                Some(flight) => (Arc::clone(flight), false),
                None => {
                    let flight = Arc::new(Flight {
                        value: OnceCell::new(),
                        done: Notify::new(),
                    });
                    map.insert(key.clone(), Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if is_leader {
            let value = f().await;
            let _ = flight.value.set(value.clone());
            self.flights().remove(&key);
            flight.done.notify_waiters();
            return value;
        }

        loop {
            // Register before checking so a notify between the two is not lost
            let notified = flight.done.notified();
            if let Some(value) = flight.value.get() {
                return value.clone();
            }
            notified.await;
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.flights().len()
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
