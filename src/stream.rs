//! Latest-value stream
//!
//! A single-producer/single-consumer slot. Publishing overwrites any value
//! the subscriber has not taken yet, so a slow consumer always sees the
//! newest reading and never a backlog.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

struct Slot<T> {
    value: Option<T>,
    /// Values overwritten before the subscriber took them
    dropped: u64,
    closed: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Create a connected publisher/subscriber pair
pub fn latest<T>() -> (Publisher<T>, Subscriber<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            value: None,
            dropped: 0,
            closed: false,
        }),
        ready: Condvar::new(),
    });

    (
        Publisher {
            shared: Arc::clone(&shared),
        },
        Subscriber { shared },
    )
}

/// Producing half; dropping it closes the stream
pub struct Publisher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Publisher<T> {
    /// Replace the current value and wake the subscriber
    pub fn publish(&self, value: T) {
        let mut slot = self.shared.lock();
        if slot.value.replace(value).is_some() {
            slot.dropped += 1;
        }
        drop(slot);
        self.shared.ready.notify_one();
    }

    /// Values overwritten before the subscriber took them
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }
}

impl<T> Drop for Publisher<T> {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.ready.notify_one();
    }
}

/// Consuming half
pub struct Subscriber<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Subscriber<T> {
    /// Take the pending value without blocking
    pub fn try_take(&self) -> Option<T> {
        self.shared.lock().value.take()
    }

    /// Block until a value is available
    ///
    /// Returns `None` once the publisher is gone and nothing is pending.
    pub fn recv(&self) -> Option<T> {
        let mut slot = self.shared.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return Some(value);
            }
            if slot.closed {
                return None;
            }
            slot = self.shared.ready.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Number of values overwritten before they were consumed
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_publish_then_take() {
        let (tx, rx) = latest();
        assert_eq!(rx.try_take(), None);
        tx.publish(1);
        assert_eq!(rx.try_take(), Some(1));
        assert_eq!(rx.try_take(), None);
    }

    #[test]
    fn test_unconsumed_values_are_dropped() {
        let (tx, rx) = latest();
        tx.publish(1);
        tx.publish(2);
        tx.publish(3);
        assert_eq!(rx.try_take(), Some(3));
        assert_eq!(rx.dropped(), 2);
    }

    #[test]
    fn test_recv_returns_none_after_close() {
        let (tx, rx) = latest::<u32>();
        tx.publish(7);
        drop(tx);
        assert_eq!(rx.recv(), Some(7));
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_recv_across_threads() {
        let (tx, rx) = latest();
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            while let Some(v) = rx.recv() {
                seen.push(v);
            }
            seen
        });

        for i in 0..100 {
            tx.publish(i);
        }
        drop(tx);

        let seen = handle.join().unwrap();
        // Whatever was observed is in order and ends with the last value
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last(), Some(&99));
    }
}
