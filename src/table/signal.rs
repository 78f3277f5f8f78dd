// ABOUTME: Binary wake signal used to park an agent until it is admitted.
// ABOUTME: An atomic permit flag paired with a Notify, so waiting never polls.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-permit wake signal owned by a single waiting agent.
///
/// The coordinator [`grant`](WakeSignal::grant)s the permit; only the owning
/// agent consumes it. At most one permit is outstanding at a time.
#[derive(Debug, Default)]
pub(crate) struct WakeSignal {
    permit: AtomicBool,
    notify: Notify,
}

impl WakeSignal {
    /// Create an empty signal.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Deliver the permit and wake the waiter, if any.
    ///
    /// Returns false if a permit was already outstanding.
    pub(crate) fn grant(&self) -> bool {
        let fresh = !self.permit.swap(true, Ordering::AcqRel);
        self.notify.notify_one();
        fresh
    }

    /// Take the permit without waiting. Returns true if one was taken.
    pub(crate) fn try_consume(&self) -> bool {
        self.permit.swap(false, Ordering::AcqRel)
    }

    /// Returns true if a permit is waiting to be consumed.
    pub(crate) fn is_granted(&self) -> bool {
        self.permit.load(Ordering::Acquire)
    }

    /// Wait until a permit is available and consume it.
    ///
    /// Cancel safe: dropping the future never loses a granted permit.
    pub(crate) async fn wait(&self) {
        loop {
            if self.try_consume() {
                return;
            }

            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before re-checking so a grant between the check and
            // the await still wakes us.
            notified.as_mut().enable();

            if self.try_consume() {
                return;
            }

            notified.await;
        }
    }
}
