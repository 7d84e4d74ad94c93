//! Host scheduler glue.
//!
//! zmqio objects live on one thread driven by a tokio current-thread
//! runtime and a [`LocalSet`]. Three primitives are used throughout:
//!
//! - [`defer`]: run a callback on a later turn of the local scheduler
//! - [`offload`]: run blocking work on tokio's blocking pool, then continue
//!   with the result back on the local thread
//! - [`Reply`]: a single-assignment future, either already settled or
//!   waiting on a [`Deferred`]
//!
//! [`run`] sets all of this up and tears the thread's zmqio state down once
//! the driven future completes.

use crate::agent::Agent;
use futures::future::FusedFuture;
use std::cell::Cell;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use tokio::sync::{oneshot, Notify};
use tokio::task::LocalSet;
use tracing::debug;
use zmqio_core::error::{Error, Result};

/// Runs `future` to completion on a fresh current-thread runtime.
///
/// Every socket, observer, proxy and private context still open when the
/// future completes is closed, newest first, and pending bind/unbind work
/// is allowed to finish before the thread's zmqio state is released.
///
/// # Errors
///
/// Fails only if the runtime cannot be built.
///
/// # Example
///
/// ```rust,no_run
/// use zmqio::{Socket, SocketType};
///
/// zmqio::run(async {
///     let pull = Socket::new(SocketType::Pull)?;
///     pull.bind("inproc://jobs").await?;
///     let job = pull.receive().await?;
///     println!("{:?}", job);
///     Ok::<_, zmqio::Error>(())
/// })
/// .unwrap()
/// .unwrap();
/// ```
pub fn run<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();
    let output = local.block_on(&runtime, async move {
        let output = future.await;
        Agent::shutdown().await;
        output
    });
    Ok(output)
}

/// Queues `callback` for a later scheduler turn, never re-entering the
/// current call stack.
///
/// # Panics
///
/// Outside a [`LocalSet`].
pub(crate) fn defer<F>(callback: F)
where
    F: FnOnce() + 'static,
{
    tokio::task::spawn_local(async move { callback() });
}

#[derive(Default)]
struct InFlight {
    count: Cell<usize>,
    idle: Notify,
}

thread_local! {
    static IN_FLIGHT: Rc<InFlight> = Rc::new(InFlight::default());
}

struct InFlightGuard(Rc<InFlight>);

impl InFlightGuard {
    fn enter() -> Self {
        let in_flight = IN_FLIGHT.with(Rc::clone);
        in_flight.count.set(in_flight.count.get() + 1);
        Self(in_flight)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let remaining = self.0.count.get().saturating_sub(1);
        self.0.count.set(remaining);
        if remaining == 0 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Runs `work` on the blocking pool, then `complete` with its result on the
/// local thread.
///
/// A panic in `work` resumes on the local thread.
pub(crate) fn offload<W, R, C>(work: W, complete: C)
where
    W: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
    C: FnOnce(R) + 'static,
{
    let guard = InFlightGuard::enter();
    tokio::task::spawn_local(async move {
        let result = tokio::task::spawn_blocking(work).await;
        match result {
            Ok(value) => complete(value),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => debug!("offloaded work cancelled: {}", err),
        }
        drop(guard);
    });
}

/// Resolves once no offloaded work is outstanding on this thread.
pub(crate) async fn settle_offloads() {
    let in_flight = IN_FLIGHT.with(Rc::clone);
    loop {
        let idle = in_flight.idle.notified();
        if in_flight.count.get() == 0 {
            return;
        }
        idle.await;
    }
}

/// Settling side of a pending [`Reply`].
#[must_use = "dropping a Deferred settles its Reply with a closed error"]
pub(crate) struct Deferred<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> Deferred<T> {
    pub(crate) fn pair() -> (Self, Reply<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, Reply::pending(rx))
    }

    /// Settles the reply. Settling a reply nobody awaits is a no-op.
    pub(crate) fn settle(self, result: Result<T>) {
        let _ = self.tx.send(result);
    }
}

enum ReplyState<T> {
    Ready(Option<Result<T>>),
    Pending(oneshot::Receiver<Result<T>>),
    Done,
}

/// Outcome of an asynchronous socket operation.
///
/// The operation is registered when the `Reply` is created, not when it is
/// first polled: a second `send` issued before the first `Reply` settles
/// fails as busy even if neither is awaited. Dropping a `Reply` does not
/// cancel the operation.
#[must_use = "a Reply carries the outcome of an operation that is already in progress"]
pub struct Reply<T> {
    state: ReplyState<T>,
}

impl<T> Reply<T> {
    pub(crate) fn ready(result: Result<T>) -> Self {
        Self {
            state: ReplyState::Ready(Some(result)),
        }
    }

    fn pending(rx: oneshot::Receiver<Result<T>>) -> Self {
        Self {
            state: ReplyState::Pending(rx),
        }
    }

    /// True if the outcome is already known without awaiting.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ReplyState::Ready(_))
    }
}

impl<T> Unpin for Reply<T> {}

impl<T> Future for Reply<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let output = match &mut this.state {
            ReplyState::Ready(result) => result.take().unwrap_or(Err(Error::Closed)),
            ReplyState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                // The owning object went away without settling.
                Poll::Ready(received) => received.unwrap_or(Err(Error::Closed)),
            },
            ReplyState::Done => Err(Error::Closed),
        };
        this.state = ReplyState::Done;
        Poll::Ready(output)
    }
}

impl<T> FusedFuture for Reply<T> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, ReplyState::Done)
    }
}
