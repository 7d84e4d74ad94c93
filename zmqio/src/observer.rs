//! Socket event monitoring.
//!
//! An [`Observer`] asks libzmq to publish a socket's lifecycle events on a
//! private `inproc://` endpoint and reads them from a PAIR socket connected
//! to it. Events arrive as two parts, a 6-byte header and the endpoint
//! address, decoded into [`Event`].
//!
//! Receiving the `end` event closes the observer: the monitored socket is
//! gone and nothing follows it.

use crate::agent::Agent;
use crate::context::Context;
use crate::poller::{PollTarget, Poller};
use crate::runtime::{Deferred, Reply};
use crate::socket::Socket;
use crate::variant::Variant;
use futures::stream::{self, Stream, StreamExt};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use zmqio_core::error::{Error, Result};
use zmqio_core::message::IncomingMsg;
use zmqio_core::monitor::Event;
use zmqio_core::reaper::{Closable, ReapKey};
use zmqio_core::socket_type::SocketType;
use zmqio_core::transport::{self, Handle, POLLIN};

static MONITOR_ID: AtomicU64 = AtomicU64::new(0);

fn monitor_address() -> String {
    let id = MONITOR_ID.fetch_add(1, Ordering::Relaxed);
    format!("inproc://zmqio.monitor.{id}")
}

struct ObserverInner {
    handle: RefCell<Option<Handle>>,
    closed: Cell<bool>,
    poller: Poller,
    pending: RefCell<Option<Deferred<Option<Event>>>>,
    context: RefCell<Option<Context>>,
    agent: Weak<Agent>,
    reap_key: Cell<Option<ReapKey>>,
}

impl ObserverInner {
    fn has_events(&self) -> bool {
        self.handle
            .borrow()
            .as_ref()
            .map_or(false, |handle| handle.is_actionable(POLLIN))
    }

    fn read_parts(&self) -> Result<(IncomingMsg, IncomingMsg)> {
        let mut handle = self.handle.borrow_mut();
        let handle = handle.as_mut().ok_or(Error::Closed)?;
        let header = IncomingMsg::recv(handle)?;
        let address = IncomingMsg::recv(handle)?;
        Ok((header, address))
    }

    fn receive_now(&self) -> Result<Option<Event>> {
        let (header, address) = self.read_parts()?;
        let event = Event::decode(header.raw().data(), address.raw().data())?;
        if event.is_terminal() {
            debug!("monitored socket ended, closing observer");
            self.close();
        }
        Ok(Some(event))
    }

    fn receive(&self) -> Reply<Option<Event>> {
        if self.closed.get() {
            return Reply::ready(Err(Error::Closed));
        }
        if self.pending.borrow().is_some() {
            return Reply::ready(Err(Error::observer_busy()));
        }
        if self.has_events() {
            return Reply::ready(self.receive_now());
        }

        let (deferred, reply) = Deferred::pair();
        *self.pending.borrow_mut() = Some(deferred);
        self.poller.poll_readable(-1);
        reply
    }
}

impl PollTarget for ObserverInner {
    fn validate_readable(&self) -> bool {
        self.has_events()
    }

    fn validate_writable(&self) -> bool {
        false
    }

    fn readable_callback(&self) {
        let Some(deferred) = self.pending.borrow_mut().take() else {
            return;
        };
        if self.closed.get() {
            deferred.settle(Ok(None));
        } else {
            deferred.settle(self.receive_now());
        }
    }

    fn writable_callback(&self) {}
}

impl Closable for ObserverInner {
    fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let (Some(key), Some(agent)) = (self.reap_key.take(), self.agent.upgrade()) {
            agent.deregister(key);
        }

        self.poller.close();
        if let Some(deferred) = self.pending.borrow_mut().take() {
            deferred.settle(Ok(None));
        }

        drop(self.handle.borrow_mut().take());
        drop(self.context.borrow_mut().take());
        debug!("observer closed");
    }
}

/// Event monitor for one socket.
///
/// # Example
///
/// ```rust,no_run
/// use zmqio::{Observer, Socket, SocketType};
///
/// zmqio::run(async {
///     let socket = Socket::new(SocketType::Pub)?;
///     let observer = Observer::new(&socket)?;
///     socket.bind("tcp://127.0.0.1:*").await?;
///     if let Some(event) = observer.receive().await? {
///         println!("{event}");
///     }
///     Ok::<_, zmqio::Error>(())
/// })
/// .unwrap()
/// .unwrap();
/// ```
pub struct Observer {
    inner: Rc<ObserverInner>,
}

impl Observer {
    /// Starts monitoring `socket`.
    ///
    /// # Errors
    ///
    /// Closed or blocked errors from the socket, or the native error.
    pub fn new<V: Variant>(socket: &Socket<V>) -> Result<Self> {
        let agent = Agent::current()?;
        let target = socket.inner();
        let context = target.context()?;
        let address = monitor_address();
        target.monitor(&address)?;

        let raw = context.raw()?;
        let mut handle = Handle::open(&raw, SocketType::Pair)?;
        handle.connect(&address)?;
        let poller = Poller::new(transport::duplicate_fd(handle.fd()?)?)?;

        let inner = Rc::new(ObserverInner {
            handle: RefCell::new(Some(handle)),
            closed: Cell::new(false),
            poller,
            pending: RefCell::new(None),
            context: RefCell::new(Some(context)),
            agent: Rc::downgrade(&agent),
            reap_key: Cell::new(None),
        });

        let target: Weak<dyn PollTarget> = Rc::downgrade(&inner) as Weak<dyn PollTarget>;
        inner.poller.attach(target);
        let closable: Weak<dyn Closable> = Rc::downgrade(&inner) as Weak<dyn Closable>;
        inner.reap_key.set(Some(agent.register(closable)));

        debug!("[{}] observing {}", socket.kind(), address);
        Ok(Self { inner })
    }

    /// Receives the next event.
    ///
    /// Settles with `None` if the observer closes while waiting. Only one
    /// receive may be outstanding; a second fails as busy.
    pub fn receive(&self) -> Reply<Option<Event>> {
        self.inner.receive()
    }

    /// Events until the observer closes or receiving fails.
    pub fn events(&self) -> impl Stream<Item = Result<Event>> + Unpin + '_ {
        stream::unfold(self, |observer| async move {
            match observer.receive().await {
                Ok(Some(event)) => Some((Ok(event), observer)),
                Ok(None) => None,
                Err(err) if err.is_closed() => None,
                Err(err) => {
                    // Failures repeat (ETERM); report once and stop.
                    observer.close();
                    Some((Err(err), observer))
                }
            }
        })
        .boxed_local()
    }

    /// Whether a receive is outstanding.
    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Stops monitoring. Idempotent; a pending receive settles with `None`.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
