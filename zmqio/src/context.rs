//! Messaging contexts.
//!
//! Sockets are created on a [`Context`]. By default they use the shared
//! context, one per process, which lets sockets on different threads talk
//! over `inproc://`. A private context is created with [`Context::new`]:
//! closing it shuts it down right away (pending and future operations on
//! its sockets fail with `ETERM`) and terminates it when the last thread
//! using zmqio tears down.

use crate::agent::{Agent, Global};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, error};
use zmqio_core::error::{Errno, Error, Result};
use zmqio_core::options::{ctx_id, ContextOptions};
use zmqio_core::reaper::{Closable, ReapKey};
use zmqio_core::transport::RawContext;

pub(crate) struct ContextInner {
    raw: RefCell<Option<Arc<RawContext>>>,
    shared: bool,
    global: Arc<Global>,
    agent: Weak<Agent>,
    reap_key: Cell<Option<ReapKey>>,
}

impl ContextInner {
    fn register(self: &Rc<Self>, agent: &Agent) {
        let weak: Weak<dyn Closable> = Rc::downgrade(self) as Weak<dyn Closable>;
        self.reap_key.set(Some(agent.register(weak)));
    }
}

impl Closable for ContextInner {
    fn close(&self) {
        let Some(raw) = self.raw.borrow_mut().take() else {
            return;
        };
        if let (Some(key), Some(agent)) = (self.reap_key.take(), self.agent.upgrade()) {
            agent.deregister(key);
        }

        // The shared context lives until the last agent is gone.
        if self.shared {
            return;
        }

        // Termination may block on linger; only shut down here.
        if let Err(err) = raw.shutdown() {
            error!("context shutdown failed: {}", err);
        }
        self.global.terminator.add(raw);
        debug!("closed private context");
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        self.close();
    }
}

/// A libzmq context.
///
/// Clones refer to the same context; closing any of them closes it for all.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    /// Creates a private context.
    ///
    /// # Errors
    ///
    /// The native error if libzmq cannot create the context.
    pub fn new() -> Result<Self> {
        Self::with_options(ContextOptions::default())
    }

    /// Creates a private context and applies `options` in order.
    ///
    /// # Errors
    ///
    /// The native error of context creation or of the first option that
    /// cannot be applied. The context is released in that case.
    pub fn with_options(options: ContextOptions) -> Result<Self> {
        let agent = Agent::current()?;
        let raw = Arc::new(RawContext::new()?);
        for (id, value) in options.entries() {
            raw.set(id, value)?;
        }

        let inner = Rc::new(ContextInner {
            raw: RefCell::new(Some(raw)),
            shared: false,
            global: Arc::clone(agent.global()),
            agent: Rc::downgrade(&agent),
            reap_key: Cell::new(None),
        });
        inner.register(&agent);
        debug!("created private context");
        Ok(Self { inner })
    }

    /// The process-wide shared context.
    ///
    /// # Errors
    ///
    /// The native error if the shared context cannot be created.
    pub fn shared() -> Result<Self> {
        Ok(Agent::current()?.shared_context())
    }

    pub(crate) fn wrap_shared(agent: &Rc<Agent>) -> Self {
        let inner = Rc::new(ContextInner {
            raw: RefCell::new(Some(Arc::clone(&agent.global().shared))),
            shared: true,
            global: Arc::clone(agent.global()),
            agent: Rc::downgrade(agent),
            reap_key: Cell::new(None),
        });
        inner.register(agent);
        Self { inner }
    }

    /// Closes the context. Idempotent.
    ///
    /// Closing the shared context only detaches this thread's wrapper from
    /// it; other threads keep using it.
    pub fn close(&self) {
        self.inner.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.raw.borrow().is_none()
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.inner.shared
    }

    /// Native context for creating sockets.
    ///
    /// # Errors
    ///
    /// `EFAULT` ("Context is closed") once closed.
    pub(crate) fn raw(&self) -> Result<Arc<RawContext>> {
        self.inner
            .raw
            .borrow()
            .clone()
            .ok_or(Error::native(Errno::EFAULT))
    }

    /// Reads an integer context option.
    ///
    /// # Errors
    ///
    /// Argument error for a negative identifier, `EFAULT` once closed, or
    /// the native error.
    pub fn get_option(&self, id: i32) -> Result<i32> {
        if id < 0 {
            return Err(Error::argument("Identifier must be a non-negative integer"));
        }
        self.raw()?.get(id)
    }

    /// Writes an integer context option.
    ///
    /// # Errors
    ///
    /// Argument error for a negative identifier, `EFAULT` once closed, or
    /// the native error.
    pub fn set_option(&self, id: i32, value: i32) -> Result<()> {
        if id < 0 {
            return Err(Error::argument("Identifier must be a non-negative integer"));
        }
        self.raw()?.set(id, value)
    }

    fn get_bool(&self, id: i32) -> Result<bool> {
        Ok(self.get_option(id)? != 0)
    }

    fn set_bool(&self, id: i32, value: bool) -> Result<()> {
        self.set_option(id, i32::from(value))
    }
}

macro_rules! context_options {
    ($($(#[$doc:meta])* $get:ident / $set:ident: $id:expr => $ty:ident),* $(,)?) => {
        impl Context {$(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// `EFAULT` once closed, or the native error.
            pub fn $get(&self) -> Result<$ty> {
                context_options!(@get self, $id, $ty)
            }

            /// # Errors
            ///
            /// `EFAULT` once closed, or the native error.
            pub fn $set(&self, value: $ty) -> Result<()> {
                context_options!(@set self, $id, $ty, value)
            }
        )*}
    };
    (@get $self:ident, $id:expr, bool) => { $self.get_bool($id) };
    (@get $self:ident, $id:expr, i32) => { $self.get_option($id) };
    (@set $self:ident, $id:expr, bool, $value:ident) => { $self.set_bool($id, $value) };
    (@set $self:ident, $id:expr, i32, $value:ident) => { $self.set_option($id, $value) };
}

context_options! {
    /// Whether termination waits for sockets to flush (`ZMQ_BLOCKY`).
    blocky / set_blocky: ctx_id::BLOCKY => bool,
    /// Size of libzmq's I/O thread pool.
    io_threads / set_io_threads: ctx_id::IO_THREADS => i32,
    max_message_size / set_max_message_size: ctx_id::MAX_MSGSZ => i32,
    max_sockets / set_max_sockets: ctx_id::MAX_SOCKETS => i32,
    ipv6 / set_ipv6: ctx_id::IPV6 => bool,
    thread_priority / set_thread_priority: ctx_id::THREAD_PRIORITY => i32,
    thread_scheduling_policy / set_thread_scheduling_policy: ctx_id::THREAD_SCHED_POLICY => i32,
}

impl Context {
    /// Largest number of sockets libzmq allows (`ZMQ_SOCKET_LIMIT`).
    ///
    /// # Errors
    ///
    /// `EFAULT` once closed, or the native error.
    pub fn socket_limit(&self) -> Result<i32> {
        self.get_option(ctx_id::SOCKET_LIMIT)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("shared", &self.inner.shared)
            .field("closed", &self.is_closed())
            .finish()
    }
}
