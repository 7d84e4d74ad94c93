//! Edge-triggered readiness poller.
//!
//! libzmq signals "something happened" on one descriptor per socket. The
//! descriptor is edge-triggered and says nothing about which direction
//! became ready, and reading `ZMQ_EVENTS` is what re-arms it. [`Poller`]
//! turns that single signal into two independent waits, readable and
//! writable, each with its own optional deadline.
//!
//! A direction fires at most once per `poll_*` call: when the descriptor
//! wakes and the owner confirms that direction is ready, when its deadline
//! passes, or when the poller closes. Firing clears the watch before the
//! owner's callback runs, so callbacks may re-arm.
//!
//! The descriptor is a private duplicate registered with the tokio reactor
//! for the poller's whole lifetime, independent of the owner's endpoints.

use std::cell::{Cell, RefCell};
use std::future;
use std::os::fd::OwnedFd;
use std::rc::{Rc, Weak};
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{trace, warn};
use zmqio_core::error::Result;

/// Direction bits.
pub(crate) const READABLE: u8 = 0b01;
pub(crate) const WRITABLE: u8 = 0b10;

/// Owner of a [`Poller`].
pub(crate) trait PollTarget {
    /// Whether a wakeup actually made the socket readable.
    fn validate_readable(&self) -> bool;
    /// Whether a wakeup actually made the socket writable.
    fn validate_writable(&self) -> bool;
    /// Readable direction fired.
    fn readable_callback(&self);
    /// Writable direction fired.
    fn writable_callback(&self);
}

struct PollState {
    watched: Cell<u8>,
    read_deadline: Cell<Option<Instant>>,
    write_deadline: Cell<Option<Instant>>,
    changed: Notify,
    closed: Cell<bool>,
    target: RefCell<Option<Weak<dyn PollTarget>>>,
}

impl PollState {
    fn target(&self) -> Option<Rc<dyn PollTarget>> {
        self.target.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn trigger_readable(&self) {
        if self.watched.get() & READABLE == 0 {
            return;
        }
        if self.target().map_or(false, |target| target.validate_readable()) {
            self.trigger(READABLE);
        }
    }

    fn trigger_writable(&self) {
        if self.watched.get() & WRITABLE == 0 {
            return;
        }
        if self.target().map_or(false, |target| target.validate_writable()) {
            self.trigger(WRITABLE);
        }
    }

    /// Fires the watched directions in `mask`, without validation.
    fn trigger(&self, mask: u8) {
        let mask = mask & self.watched.get();
        if mask == 0 {
            return;
        }
        self.watched.set(self.watched.get() & !mask);
        if mask & READABLE != 0 {
            self.read_deadline.set(None);
        }
        if mask & WRITABLE != 0 {
            self.write_deadline.set(None);
        }
        trace!("poller trigger {:#04b}", mask);

        let Some(target) = self.target() else {
            return;
        };
        if mask & READABLE != 0 {
            target.readable_callback();
        }
        if mask & WRITABLE != 0 {
            target.writable_callback();
        }
    }

    fn watch(&self, bit: u8, deadline: &Cell<Option<Instant>>, timeout: i32) {
        debug_assert_eq!(self.watched.get() & bit, 0, "direction already watched");
        self.watched.set(self.watched.get() | bit);
        // Non-positive timeouts never expire.
        deadline.set(
            u64::try_from(timeout)
                .ok()
                .filter(|ms| *ms > 0)
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        );
        self.changed.notify_one();
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn drive(fd: AsyncFd<OwnedFd>, state: Rc<PollState>) {
    while !state.closed.get() {
        let read_deadline = state.read_deadline.get();
        let write_deadline = state.write_deadline.get();

        tokio::select! {
            ready = fd.readable() => {
                match ready {
                    Ok(mut guard) => guard.clear_ready(),
                    Err(err) => {
                        warn!("readiness descriptor failed: {}", err);
                        break;
                    }
                }
                state.trigger_readable();
                state.trigger_writable();
            }
            () = sleep_until(read_deadline) => state.trigger(READABLE),
            () = sleep_until(write_deadline) => state.trigger(WRITABLE),
            () = state.changed.notified() => {}
        }
    }
}

/// Readable/writable waits over one readiness descriptor.
pub(crate) struct Poller {
    state: Rc<PollState>,
    task: RefCell<Option<JoinHandle<()>>>,
    finalizer: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Poller {
    /// Registers `fd` with the reactor and starts watching it. Must be
    /// called inside a [`LocalSet`](tokio::task::LocalSet).
    ///
    /// # Errors
    ///
    /// The OS error if the descriptor cannot be registered.
    pub(crate) fn new(fd: OwnedFd) -> Result<Self> {
        let fd = AsyncFd::with_interest(fd, Interest::READABLE)?;
        let state = Rc::new(PollState {
            watched: Cell::new(0),
            read_deadline: Cell::new(None),
            write_deadline: Cell::new(None),
            changed: Notify::new(),
            closed: Cell::new(false),
            target: RefCell::new(None),
        });
        let task = tokio::task::spawn_local(drive(fd, Rc::clone(&state)));
        Ok(Self {
            state,
            task: RefCell::new(Some(task)),
            finalizer: RefCell::new(None),
        })
    }

    /// Runs `finalizer` once the poller is closed.
    #[must_use]
    pub(crate) fn with_finalizer(self, finalizer: impl FnOnce() + 'static) -> Self {
        *self.finalizer.borrow_mut() = Some(Box::new(finalizer));
        self
    }

    pub(crate) fn attach(&self, target: Weak<dyn PollTarget>) {
        *self.state.target.borrow_mut() = Some(target);
    }

    /// Waits for readability; `timeout` in milliseconds, non-positive waits
    /// forever. The direction must not already be watched.
    pub(crate) fn poll_readable(&self, timeout: i32) {
        self.state.watch(READABLE, &self.state.read_deadline, timeout);
    }

    /// Waits for writability; see [`poll_readable`](Self::poll_readable).
    pub(crate) fn poll_writable(&self, timeout: i32) {
        self.state.watch(WRITABLE, &self.state.write_deadline, timeout);
    }

    /// Fires the readable direction if watched and validated.
    pub(crate) fn trigger_readable(&self) {
        self.state.trigger_readable();
    }

    /// Fires the writable direction if watched and validated.
    pub(crate) fn trigger_writable(&self) {
        self.state.trigger_writable();
    }

    #[cfg(test)]
    pub(crate) fn watched(&self) -> u8 {
        self.state.watched.get()
    }

    /// Fires every watched direction, stops watching the descriptor and
    /// runs the finalizer. Idempotent.
    pub(crate) fn close(&self) {
        if self.state.closed.get() {
            return;
        }
        self.state.trigger(READABLE | WRITABLE);
        self.state.closed.set(true);
        *self.state.target.borrow_mut() = None;
        self.state.changed.notify_one();
        if let Some(task) = self.task.borrow_mut().take() {
            task.abort();
        }
        if let Some(finalizer) = self.finalizer.borrow_mut().take() {
            finalizer();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::run;
    use std::os::unix::net::UnixStream;

    #[derive(Default)]
    struct Probe {
        readable: Cell<bool>,
        writable: Cell<bool>,
        reads: Cell<u32>,
        writes: Cell<u32>,
    }

    impl PollTarget for Probe {
        fn validate_readable(&self) -> bool {
            self.readable.get()
        }
        fn validate_writable(&self) -> bool {
            self.writable.get()
        }
        fn readable_callback(&self) {
            self.reads.set(self.reads.get() + 1);
        }
        fn writable_callback(&self) {
            self.writes.set(self.writes.get() + 1);
        }
    }

    fn setup() -> (Poller, Rc<Probe>, UnixStream) {
        let (ours, theirs) = UnixStream::pair().unwrap();
        ours.set_nonblocking(true).unwrap();
        let poller = Poller::new(OwnedFd::from(ours)).unwrap();
        let probe = Rc::new(Probe::default());
        let weak: Weak<dyn PollTarget> = Rc::downgrade(&probe) as Weak<dyn PollTarget>;
        poller.attach(weak);
        (poller, probe, theirs)
    }

    #[test]
    fn test_timeout_fires_direction() {
        run(async {
            let (poller, probe, _peer) = setup();
            poller.poll_writable(20);
            assert_eq!(poller.watched(), WRITABLE);
            time::sleep(Duration::from_millis(80)).await;
            assert_eq!(probe.writes.get(), 1);
            assert_eq!(poller.watched(), 0);
        })
        .unwrap();
    }

    #[test]
    fn test_unvalidated_wakeup_does_not_fire() {
        run(async {
            let (poller, probe, mut peer) = setup();
            poller.poll_readable(-1);
            std::io::Write::write_all(&mut peer, b"x").unwrap();
            time::sleep(Duration::from_millis(30)).await;
            assert_eq!(probe.reads.get(), 0);

            probe.readable.set(true);
            poller.trigger_readable();
            assert_eq!(probe.reads.get(), 1);
            poller.trigger_readable();
            assert_eq!(probe.reads.get(), 1);
        })
        .unwrap();
    }

    #[test]
    fn test_close_fires_watched_directions() {
        run(async {
            let (poller, probe, _peer) = setup();
            let finalized = Rc::new(Cell::new(false));
            let flag = Rc::clone(&finalized);
            let poller = poller.with_finalizer(move || flag.set(true));
            poller.poll_readable(-1);
            poller.close();
            poller.close();
            assert_eq!(probe.reads.get(), 1);
            assert_eq!(probe.writes.get(), 0);
            assert!(finalized.get());
        })
        .unwrap();
    }
}
