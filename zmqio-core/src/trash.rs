//! Deferred reclamation queue.
//!
//! libzmq releases zero-copy send buffers from its own I/O threads. Those
//! threads must never run host-side destructors, so the release callback
//! only appends the buffer here. The owning thread waits on
//! [`Trash::wait`] and empties the whole queue with [`Trash::clear`].
//!
//! Wake signals are coalesced: any number of `add` calls between two drains
//! produce a single wakeup.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::mem;

/// Thread-safe staging list of values awaiting destruction on the owning
/// thread.
pub struct Trash<T> {
    values: Mutex<VecDeque<T>>,
    wake_tx: flume::Sender<()>,
    wake_rx: flume::Receiver<()>,
}

impl<T> Trash<T> {
    #[must_use]
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = flume::bounded(1);
        Self {
            values: Mutex::new(VecDeque::new()),
            wake_tx,
            wake_rx,
        }
    }

    /// Queues `value` for destruction. Safe from any thread.
    pub fn add(&self, value: T) {
        self.values.lock().push_back(value);
        // A full channel already holds a pending wakeup.
        let _ = self.wake_tx.try_send(());
    }

    /// Destroys everything queued so far, outside the lock. Returns the
    /// number of values destroyed.
    pub fn clear(&self) -> usize {
        let drained = mem::take(&mut *self.values.lock());
        let count = drained.len();
        drop(drained);
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    /// Resolves once at least one value was added since the last wakeup.
    pub async fn wait(&self) {
        // The sender lives in `self`, so the channel never disconnects.
        let _ = self.wake_rx.recv_async().await;
    }
}

impl<T> Default for Trash<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Trash<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_clear_destroys_everything() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let trash = Trash::new();
        for _ in 0..5 {
            trash.add(Counted(Arc::clone(&dropped)));
        }
        assert_eq!(trash.len(), 5);
        assert_eq!(dropped.load(Ordering::SeqCst), 0);

        assert_eq!(trash.clear(), 5);
        assert_eq!(dropped.load(Ordering::SeqCst), 5);
        assert!(trash.is_empty());
    }

    #[test]
    fn test_add_from_foreign_threads() {
        let trash = Arc::new(Trash::new());
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let trash = Arc::clone(&trash);
                thread::spawn(move || {
                    for j in 0..100 {
                        trash.add(i * 100 + j);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(trash.clear(), 400);
    }

    #[test]
    fn test_wakeups_are_coalesced() {
        let trash = Trash::new();
        trash.add(1);
        trash.add(2);
        trash.add(3);
        assert_eq!(trash.wake_rx.len(), 1);

        futures::executor::block_on(trash.wait());
        assert!(trash.wake_rx.is_empty());
        assert_eq!(trash.clear(), 3);
    }

    #[test]
    fn test_drop_clears() {
        let dropped = Arc::new(AtomicUsize::new(0));
        {
            let trash = Trash::new();
            trash.add(Counted(Arc::clone(&dropped)));
        }
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }
}
