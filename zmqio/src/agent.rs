//! Per-thread owner of zmqio state.
//!
//! Each host thread gets one [`Agent`] on first use. It owns, in drop order:
//!
//! 1. the object reaper, which closes sockets, observers, proxies and
//!    contexts that are still open, newest first;
//! 2. the agent's wrapper around the shared context;
//! 3. a reference to the process-wide [`Global`] state, whose last release
//!    terminates every context handed to its terminator (possibly blocking);
//! 4. the trash receiving zero-copy send buffers released by libzmq;
//! 5. the task draining that trash.
//!
//! Sockets closing during step 1 may still release buffers, so the trash
//! outlives them; contexts are terminated only after every socket closed.

use crate::context::Context;
use crate::runtime;
use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::{Arc, Weak as ArcWeak};
use std::thread;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use zmqio_core::error::Result;
use zmqio_core::options::ctx_id;
use zmqio_core::reaper::{Closable, Deleter, ReapKey, Reaper, ThreadSafeReaper};
use zmqio_core::transport::RawContext;
use zmqio_core::trash::Trash;

/// How long context termination may take before a diagnostic is logged.
pub const TERMINATE_WARNING_DELAY: Duration = Duration::from_millis(500);

/// Terminates contexts on a helper thread, warning when it takes long.
pub(crate) struct Terminator;

impl Deleter<Arc<RawContext>> for Terminator {
    fn delete(&mut self, context: Arc<RawContext>) {
        let blocky = context.get(ctx_id::BLOCKY).map_or(false, |value| value != 0);
        let (done_tx, done_rx) = flume::bounded(1);

        let worker = thread::Builder::new()
            .name("zmqio-terminator".into())
            .spawn(move || {
                let result = context.terminate();
                let _ = done_tx.send(());
                result
            });
        let worker = match worker {
            Ok(worker) => worker,
            Err(err) => {
                // The context was dropped with the closure and terminated inline.
                error!("could not spawn context terminator: {}", err);
                return;
            }
        };

        if done_rx.recv_timeout(TERMINATE_WARNING_DELAY).is_err() {
            if blocky {
                warn!(
                    "Waiting for queued ZeroMQ messages to be delivered. \
                     Set ContextOptions::with_blocky(false) to change this behaviour."
                );
            } else {
                warn!("Waiting for queued ZeroMQ messages to be delivered.");
            }
        }

        match worker.join() {
            Ok(Ok(())) => debug!("context terminated"),
            Ok(Err(errno)) => error!("context termination failed: {:?}", errno),
            Err(_) => error!("context terminator panicked"),
        }
    }
}

/// State shared by every agent in the process.
pub(crate) struct Global {
    /// Context shared by all threads so they can talk over `inproc://`.
    pub(crate) shared: Arc<RawContext>,
    /// Contexts to terminate once no agent remains.
    pub(crate) terminator: ThreadSafeReaper<Arc<RawContext>, Terminator>,
}

static GLOBAL: Lazy<Mutex<ArcWeak<Global>>> = Lazy::new(|| Mutex::new(ArcWeak::new()));

impl Global {
    /// The live instance, or a new one if every agent released the last.
    fn instance() -> Result<Arc<Self>> {
        let mut slot = GLOBAL.lock();
        if let Some(global) = slot.upgrade() {
            return Ok(global);
        }

        let shared = Arc::new(RawContext::new()?);
        let terminator = ThreadSafeReaper::new(Terminator);
        terminator.add(Arc::clone(&shared));

        let global = Arc::new(Self { shared, terminator });
        *slot = Arc::downgrade(&global);
        debug!("created shared context");
        Ok(global)
    }
}

struct DrainTask(JoinHandle<()>);

impl Drop for DrainTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Per-thread owner of zmqio state. Field order is drop order.
pub(crate) struct Agent {
    reaper: Reaper<Weak<dyn Closable>>,
    context: RefCell<Option<Context>>,
    global: Arc<Global>,
    trash: Arc<Trash<Bytes>>,
    drain: RefCell<Option<DrainTask>>,
}

thread_local! {
    static AGENT: RefCell<Option<Rc<Agent>>> = const { RefCell::new(None) };
}

impl Agent {
    fn new() -> Result<Self> {
        Ok(Self {
            reaper: Reaper::default(),
            context: RefCell::new(None),
            global: Global::instance()?,
            trash: Arc::new(Trash::new()),
            drain: RefCell::new(None),
        })
    }

    /// This thread's agent, created on first use.
    ///
    /// # Errors
    ///
    /// The native error if the shared context cannot be created.
    pub(crate) fn current() -> Result<Rc<Self>> {
        AGENT.with(|slot| {
            if let Some(agent) = slot.borrow().as_ref() {
                return Ok(Rc::clone(agent));
            }
            let agent = Rc::new(Self::new()?);
            *slot.borrow_mut() = Some(Rc::clone(&agent));
            Ok(agent)
        })
    }

    /// Closes everything still open on this thread and releases the agent.
    /// Bind/unbind work in flight is awaited, so sockets blocked by it close
    /// once it completes.
    pub(crate) async fn shutdown() {
        let Some(agent) = AGENT.with(|slot| slot.borrow().clone()) else {
            return;
        };
        debug!("shutting down agent with {} open objects", agent.reaper.len());

        agent.reaper.reap();
        runtime::settle_offloads().await;
        agent.reaper.reap();
        agent.trash.clear();

        AGENT.with(|slot| slot.borrow_mut().take());
        drop(agent);
    }

    pub(crate) fn global(&self) -> &Arc<Global> {
        &self.global
    }

    pub(crate) fn trash(&self) -> &Arc<Trash<Bytes>> {
        &self.trash
    }

    /// Wrapper around the shared context, created on first use.
    pub(crate) fn shared_context(self: &Rc<Self>) -> Context {
        if let Some(context) = self.context.borrow().as_ref() {
            return context.clone();
        }
        let context = Context::wrap_shared(self);
        *self.context.borrow_mut() = Some(context.clone());
        context
    }

    pub(crate) fn register(&self, object: Weak<dyn Closable>) -> ReapKey {
        self.reaper.add(object)
    }

    pub(crate) fn deregister(&self, key: ReapKey) {
        self.reaper.remove(key);
    }

    /// Starts the trash drain unless it is already running. Must be called
    /// inside a [`LocalSet`](tokio::task::LocalSet).
    pub(crate) fn ensure_drain(&self) {
        let mut drain = self.drain.borrow_mut();
        if drain.as_ref().map_or(false, |task| !task.0.is_finished()) {
            return;
        }
        let trash = Arc::clone(&self.trash);
        *drain = Some(DrainTask(tokio::task::spawn_local(async move {
            loop {
                trash.wait().await;
                trash.clear();
            }
        })));
    }
}
