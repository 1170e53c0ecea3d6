use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::error;

type Callback<T> = Box<dyn Fn(T) + Send + Sync>;

/// Handle returned by [`Listeners::subscribe`]; pass it back to
/// [`Listeners::unsubscribe`] to deregister.
#[derive(Debug)]
pub struct SubscriptionToken(u64);

/// A set of synchronously-invoked listeners. A panicking listener is caught
/// and logged so it cannot block delivery to the others.
pub struct Listeners<T> {
    entries: Mutex<Vec<(u64, Callback<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone> Listeners<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, callback: impl Fn(T) + Send + Sync + 'static) -> SubscriptionToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, Box::new(callback)));
        SubscriptionToken(id)
    }

    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.lock().retain(|(id, _)| *id != token.0);
    }

    pub fn emit(&self, value: T) {
        let entries = self.lock();
        for (id, callback) in entries.iter() {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(value.clone())));
            if outcome.is_err() {
                error!(listener = id, "listener panicked during notification");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Callback<T>)>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            // catch_unwind above keeps panics out of the critical section,
            // but a poisoned registry is still usable.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T: Clone> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
