//! In-process change broadcast channel.
//!
//! # Responsibility
//! - Register zero-argument change handlers and fan out publish calls.
//! - Hand out disposers that remove exactly one registration.
//!
//! # Invariants
//! - Handlers run synchronously in registration order.
//! - Handlers run outside the registry lock, so they may subscribe, publish,
//!   or read the store reentrantly.
//! - A panicking handler never prevents later handlers from running.

use log::error;
use once_cell::sync::Lazy;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Handler = Arc<dyn Fn() + Send + Sync>;

static GLOBAL_NOTIFIER: Lazy<ChangeNotifier> = Lazy::new(ChangeNotifier::new);

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Payload-free broadcast channel.
///
/// Clones share the same registrations.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide notifier shared by default store handles.
    pub fn global() -> &'static ChangeNotifier {
        &GLOBAL_NOTIFIER
    }

    /// Registers `handler` to run on every subsequent `publish`.
    ///
    /// The registration lives until the returned `Subscription` is dropped or
    /// explicitly unsubscribed.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = lock_registry(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, Arc::new(handler)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            active: true,
        }
    }

    /// Invokes every currently registered handler in registration order.
    pub fn publish(&self) {
        let handlers: Vec<(u64, Handler)> = lock_registry(&self.registry).handlers.clone();

        for (id, handler) in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                error!(
                    "event=notify_handler_panic module=notify status=error subscription_id={}",
                    id
                );
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.registry).handlers.len()
    }
}

/// Disposer for one notifier registration.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Removes this registration. Other registrations are untouched.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Keeps the handler registered for the notifier's whole lifetime.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            let id = self.id;
            lock_registry(&registry)
                .handlers
                .retain(|(handler_id, _)| *handler_id != id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Handlers never run under this lock, so a poisoned registry is still consistent.
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::ChangeNotifier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn publish_runs_handlers_in_registration_order() {
        let notifier = ChangeNotifier::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first_order = order.clone();
        let _first = notifier.subscribe(move || first_order.lock().unwrap().push("first"));
        let second_order = order.clone();
        let _second = notifier.subscribe(move || second_order.lock().unwrap().push("second"));

        notifier.publish();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_registration() {
        let notifier = ChangeNotifier::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a_calls = calls.clone();
        let a = notifier.subscribe(move || {
            a_calls.fetch_add(1, Ordering::SeqCst);
        });
        let b_calls = calls.clone();
        let _b = notifier.subscribe(move || {
            b_calls.fetch_add(10, Ordering::SeqCst);
        });
        assert_eq!(notifier.subscriber_count(), 2);

        a.unsubscribe();
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.publish();
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn dropping_subscription_unsubscribes_but_detach_keeps_it() {
        let notifier = ChangeNotifier::new();
        {
            let _scoped = notifier.subscribe(|| {});
            assert_eq!(notifier.subscriber_count(), 1);
        }
        assert_eq!(notifier.subscriber_count(), 0);

        notifier.subscribe(|| {}).detach();
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn panicking_handler_does_not_block_later_handlers() {
        let notifier = ChangeNotifier::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let _bad = notifier.subscribe(|| panic!("handler failure"));
        let good_calls = calls.clone();
        let _good = notifier.subscribe(move || {
            good_calls.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish();
        notifier.publish();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handler_may_subscribe_reentrantly() {
        let notifier = ChangeNotifier::new();
        let inner = notifier.clone();
        let _outer = notifier.subscribe(move || inner.subscribe(|| {}).detach());

        notifier.publish();
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn clones_share_registrations() {
        let notifier = ChangeNotifier::new();
        let clone = notifier.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler_calls = calls.clone();
        let _sub = clone.subscribe(move || {
            handler_calls.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
