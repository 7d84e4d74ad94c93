//! Steerable proxy between two sockets.
//!
//! [`Proxy::run`] hands both sockets to libzmq's built-in proxy on the
//! blocking pool. Both are blocked while it runs and closed once it ends.
//! The run is steered with `PAUSE`, `RESUME` and `TERMINATE` commands sent
//! over a private `inproc://` DEALER pair.

use crate::agent::Agent;
use crate::runtime::{self, Deferred, Reply};
use crate::socket::{Socket, SocketInner};
use crate::variant::Basic;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use zmqio_core::error::{Error, Result};
use zmqio_core::reaper::{Closable, ReapKey};
use zmqio_core::socket_type::SocketType;
use zmqio_core::transport::{Handle, DONTWAIT};

static CONTROL_ID: AtomicU64 = AtomicU64::new(0);

const PAUSE: &[u8] = b"PAUSE";
const RESUME: &[u8] = b"RESUME";
const TERMINATE: &[u8] = b"TERMINATE";

struct ProxyInner {
    /// Sending side of the control pair, present while running.
    control: RefCell<Option<Handle>>,
    closed: Cell<bool>,
    agent: Weak<Agent>,
    reap_key: Cell<Option<ReapKey>>,
}

impl ProxyInner {
    fn command(&self, command: &'static [u8]) -> Result<()> {
        let mut control = self.control.borrow_mut();
        let control = control.as_mut().ok_or(Error::Closed)?;
        control.send_bytes(command, DONTWAIT).map_err(Error::native)
    }
}

impl Closable for ProxyInner {
    fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let (Some(key), Some(agent)) = (self.reap_key.take(), self.agent.upgrade()) {
            agent.deregister(key);
        }
        if self.control.borrow().is_some() {
            if let Err(err) = self.command(TERMINATE) {
                warn!("could not terminate running proxy: {}", err);
            }
        }
    }
}

/// Forwards messages between a frontend and a backend socket.
///
/// Dropping a running proxy terminates it.
///
/// # Example
///
/// ```rust,no_run
/// use zmqio::{Proxy, Socket, SocketType};
///
/// zmqio::run(async {
///     let frontend = Socket::new(SocketType::Router)?;
///     let backend = Socket::new(SocketType::Dealer)?;
///     frontend.bind("tcp://*:5559").await?;
///     backend.bind("tcp://*:5560").await?;
///     Proxy::new(frontend, backend)?.run().await
/// })
/// .unwrap()
/// .unwrap();
/// ```
pub struct Proxy {
    frontend: Socket,
    backend: Socket,
    inner: Rc<ProxyInner>,
}

impl Proxy {
    /// # Errors
    ///
    /// The native error if the thread's zmqio state cannot be created.
    pub fn new(frontend: Socket, backend: Socket) -> Result<Self> {
        let agent = Agent::current()?;
        let inner = Rc::new(ProxyInner {
            control: RefCell::new(None),
            closed: Cell::new(false),
            agent: Rc::downgrade(&agent),
            reap_key: Cell::new(None),
        });
        let closable: Weak<dyn Closable> = Rc::downgrade(&inner) as Weak<dyn Closable>;
        inner.reap_key.set(Some(agent.register(closable)));
        Ok(Self {
            frontend,
            backend,
            inner,
        })
    }

    #[must_use]
    pub fn frontend(&self) -> &Socket {
        &self.frontend
    }

    #[must_use]
    pub fn backend(&self) -> &Socket {
        &self.backend
    }

    /// Runs the proxy until it is terminated or the context shuts down.
    ///
    /// Both sockets must be bound or connected. They are blocked while the
    /// proxy runs and closed when it ends, whatever the outcome.
    pub fn run(&self) -> Reply<()> {
        match self.start() {
            Ok(reply) => reply,
            Err(err) => Reply::ready(Err(err)),
        }
    }

    fn start(&self) -> Result<Reply<()>> {
        if self.inner.closed.get() {
            return Err(Error::Closed);
        }
        let front = Rc::clone(self.frontend.inner());
        let back = Rc::clone(self.backend.inner());
        if front.endpoints() == 0 {
            return Err(Error::argument("Front-end socket must be bound or connected"));
        }
        if back.endpoints() == 0 {
            return Err(Error::argument("Back-end socket must be bound or connected"));
        }

        let raw = front.context()?.raw()?;
        let address = format!(
            "inproc://zmqio.proxy-control.{}",
            CONTROL_ID.fetch_add(1, Ordering::Relaxed)
        );
        let mut control = Handle::open(&raw, SocketType::Dealer)?;
        let mut listener = Handle::open(&raw, SocketType::Dealer)?;
        // Commands queue up until the proxy binds the listener.
        control.connect(&address)?;

        let mut front_handle = front.take_handle()?;
        let mut back_handle = match back.take_handle() {
            Ok(handle) => handle,
            Err(err) => {
                front.restore_handle(front_handle);
                return Err(err);
            }
        };
        *self.inner.control.borrow_mut() = Some(control);
        debug!("[{} -> {}] proxy started", front.kind(), back.kind());

        let (deferred, reply) = Deferred::pair();
        let inner = Rc::clone(&self.inner);
        runtime::offload(
            move || {
                let result = listener.bind(&address).and_then(|()| {
                    Handle::proxy_steerable(&mut front_handle, &mut back_handle, &mut listener)
                        .map_err(Error::native)
                });
                (front_handle, back_handle, result)
            },
            move |(front_handle, back_handle, result)| {
                finish(&front, front_handle);
                finish(&back, back_handle);
                drop(inner.control.borrow_mut().take());
                debug!("proxy ended");
                deferred.settle(result);
            },
        );
        Ok(reply)
    }

    /// Suspends forwarding; messages queue up on the sockets.
    ///
    /// # Errors
    ///
    /// `EBADF` if the proxy is not running, or the native error.
    pub fn pause(&self) -> Result<()> {
        self.inner.command(PAUSE)
    }

    /// Resumes forwarding after [`pause`](Self::pause).
    ///
    /// # Errors
    ///
    /// `EBADF` if the proxy is not running, or the native error.
    pub fn resume(&self) -> Result<()> {
        self.inner.command(RESUME)
    }

    /// Ends the run; [`run`](Self::run) settles once both sockets closed.
    ///
    /// # Errors
    ///
    /// `EBADF` if the proxy is not running, or the native error.
    pub fn terminate(&self) -> Result<()> {
        self.inner.command(TERMINATE)
    }

    /// Whether a run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.control.borrow().is_some()
    }
}

fn finish(socket: &SocketInner<Basic>, handle: Handle) {
    socket.restore_handle(handle);
    socket.close();
}

impl Drop for Proxy {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("frontend", &self.frontend)
            .field("backend", &self.backend)
            .field("running", &self.is_running())
            .finish()
    }
}
