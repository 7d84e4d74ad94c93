//! Asynchronous sockets.
//!
//! A [`Socket`] wraps one libzmq socket and makes its operations awaitable
//! on a single-threaded tokio host:
//!
//! - `send` and `receive` return a [`Reply`]. When the socket is ready (or
//!   the timeout is zero) the operation completes synchronously and the
//!   reply is already settled; otherwise it waits for the socket's
//!   readiness descriptor.
//! - At most one send and one receive are outstanding per socket. Another
//!   one issued meanwhile fails as busy and leaves the first untouched.
//! - `bind` and `unbind` run on the blocking pool. The socket is *blocked*
//!   meanwhile and every other operation fails fast; a `close` issued then
//!   is carried out once the bind or unbind completes.
//!
//! Consecutive synchronous completions are capped at
//! [`MAX_SYNC_OPERATIONS`] per socket: once exceeded, the next ready
//! operation completes on a later scheduler turn instead, so a busy socket
//! cannot starve other tasks. Any completion that went through the
//! scheduler resets the count.
//!
//! # Example
//!
//! ```rust,no_run
//! use zmqio::{Socket, SocketType};
//!
//! # fn main() -> std::io::Result<()> {
//! zmqio::run(async {
//!     let server = Socket::new(SocketType::Rep)?;
//!     server.bind("tcp://127.0.0.1:5555").await?;
//!     loop {
//!         let request = server.receive().await?;
//!         server.send(request.into_parts()).await?;
//!     }
//!     #[allow(unreachable_code)]
//!     Ok::<_, zmqio::Error>(())
//! })?
//! .map_err(Into::into)
//! # }
//! ```

use crate::agent::Agent;
use crate::context::Context;
use crate::poller::{PollTarget, Poller};
use crate::runtime::{self, Deferred, Reply};
use crate::variant::{check_kind, Basic, Received, Variant};
use bytes::Bytes;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, warn};
use zmqio_core::error::{Errno, Error, Result};
use zmqio_core::message::{IncomingMsg, Parts};
use zmqio_core::message_builder::Message;
use zmqio_core::options::{self, id, GetOption, SetOption, SocketOptions};
use zmqio_core::reaper::{Closable, ReapKey};
use zmqio_core::socket_type::SocketType;
use zmqio_core::transport::{self, Handle, RawContext, POLLIN, POLLOUT};
use zmqio_core::trash::Trash;

/// Consecutive synchronous completions allowed before deferring.
pub const MAX_SYNC_OPERATIONS: u32 = 1 << 9;

/// Lifecycle state of a [`Socket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketState {
    Open,
    /// A bind or unbind is in progress.
    Blocked,
    Closed,
}

#[derive(Debug, Clone, Copy)]
enum Blocking {
    Bind,
    Unbind,
}

impl Blocking {
    fn apply(self, handle: &mut Handle, address: &str) -> Result<()> {
        match self {
            Self::Bind => handle.bind(address),
            Self::Unbind => handle.unbind(address),
        }
    }
}

pub(crate) fn read_option<T: GetOption>(handle: &Handle, option: i32) -> Result<T> {
    let mut buf = vec![0_u8; T::CAPACITY];
    let len = handle.get_raw(option, &mut buf)?;
    T::decode(&buf[..len.min(buf.len())])
}

/// Readiness source for `handle`. Thread-safe draft sockets have no
/// `ZMQ_FD`; they are watched through a native poller instead.
fn open_poller(handle: &Handle) -> Result<Poller> {
    match handle.fd() {
        Ok(fd) => Poller::new(transport::duplicate_fd(fd)?),
        #[cfg(feature = "draft")]
        Err(_) if handle.kind().is_draft() => {
            let raw = transport::RawPoller::watch(handle)?;
            let fd = transport::duplicate_fd(raw.fd()?)?;
            Ok(Poller::new(fd)?.with_finalizer(move || drop(raw)))
        }
        Err(err) => Err(err),
    }
}

pub(crate) struct SocketInner<V: Variant> {
    kind: SocketType,
    handle: RefCell<Option<Handle>>,
    state: Cell<SocketState>,
    request_close: Cell<bool>,
    endpoints: Cell<u32>,
    send_timeout: Cell<i32>,
    receive_timeout: Cell<i32>,
    sync_operations: Cell<u32>,
    poller: Poller,
    pending_read: RefCell<Option<Deferred<Received<V::Meta>>>>,
    pending_write: RefCell<Option<(Deferred<()>, Parts)>>,
    context: RefCell<Option<Context>>,
    trash: Arc<Trash<Bytes>>,
    agent: Weak<Agent>,
    reap_key: Cell<Option<ReapKey>>,
}

impl<V: Variant> SocketInner<V> {
    fn validate_open(&self) -> Result<()> {
        match self.state.get() {
            SocketState::Open => Ok(()),
            SocketState::Blocked => Err(Error::blocked()),
            SocketState::Closed => Err(Error::Closed),
        }
    }

    /// Error for an operation that found no handle: the socket is closed,
    /// or a deadline fired while it was blocked.
    fn missing_handle(&self) -> Error {
        match self.state.get() {
            SocketState::Closed => Error::Closed,
            _ => Error::native(Errno::EAGAIN),
        }
    }

    pub(crate) fn with_handle<R>(&self, call: impl FnOnce(&mut Handle) -> Result<R>) -> Result<R> {
        let mut handle = self.handle.borrow_mut();
        let handle = handle.as_mut().ok_or_else(|| self.missing_handle())?;
        call(handle)
    }

    fn has_events(&self, mask: i32) -> bool {
        self.handle
            .borrow()
            .as_ref()
            .map_or(false, |handle| handle.is_actionable(mask))
    }

    /// Claims a synchronous completion slot.
    fn take_sync_slot(&self) -> bool {
        let taken = self.sync_operations.get();
        self.sync_operations.set(taken.saturating_add(1));
        taken < MAX_SYNC_OPERATIONS
    }

    fn send_now(&self, parts: &mut Parts) -> Result<()> {
        self.with_handle(|handle| parts.send(handle))
    }

    fn receive_now(&self) -> Result<Received<V::Meta>> {
        self.with_handle(|handle| {
            let first = IncomingMsg::recv(handle)?;
            let meta = V::meta(&first);
            let mut more = first.more();
            let mut parts = vec![first.into_bytes()];
            while more {
                let part = IncomingMsg::recv(handle)?;
                more = part.more();
                parts.push(part.into_bytes());
            }
            Ok(Received::new(parts, meta))
        })
    }

    fn send(self: &Rc<Self>, mut parts: Parts) -> Reply<()> {
        let timeout = self.send_timeout.get();
        if timeout == 0 || self.has_events(POLLOUT) {
            if timeout == 0 || self.take_sync_slot() {
                let result = self.send_now(&mut parts);
                self.poller.trigger_readable();
                return Reply::ready(result);
            }

            let (deferred, reply) = Deferred::pair();
            *self.pending_write.borrow_mut() = Some((deferred, parts));
            let inner = Rc::clone(self);
            runtime::defer(move || {
                inner.writable_callback();
                if inner.state.get() != SocketState::Closed {
                    inner.poller.trigger_readable();
                }
            });
            return reply;
        }

        let (deferred, reply) = Deferred::pair();
        *self.pending_write.borrow_mut() = Some((deferred, parts));
        self.poller.poll_writable(timeout);
        reply
    }

    fn receive(self: &Rc<Self>) -> Reply<Received<V::Meta>> {
        let timeout = self.receive_timeout.get();
        if timeout == 0 || self.has_events(POLLIN) {
            if timeout == 0 || self.take_sync_slot() {
                let result = self.receive_now();
                self.poller.trigger_writable();
                return Reply::ready(result);
            }

            let (deferred, reply) = Deferred::pair();
            *self.pending_read.borrow_mut() = Some(deferred);
            let inner = Rc::clone(self);
            runtime::defer(move || {
                inner.readable_callback();
                if inner.state.get() != SocketState::Closed {
                    inner.poller.trigger_writable();
                }
            });
            return reply;
        }

        let (deferred, reply) = Deferred::pair();
        *self.pending_read.borrow_mut() = Some(deferred);
        self.poller.poll_readable(timeout);
        reply
    }

    fn validate_write(&self) -> Result<()> {
        self.validate_open()?;
        if self.pending_write.borrow().is_some() {
            return Err(Error::busy_writing());
        }
        Ok(())
    }

    fn validate_read(&self) -> Result<()> {
        self.validate_open()?;
        if self.pending_read.borrow().is_some() {
            return Err(Error::busy_reading());
        }
        Ok(())
    }

    fn run_blocking(self: &Rc<Self>, op: Blocking, address: &str) -> Reply<()> {
        if let Err(err) = self.validate_open() {
            return Reply::ready(Err(err));
        }
        let Some(mut handle) = self.handle.borrow_mut().take() else {
            return Reply::ready(Err(self.missing_handle()));
        };
        self.state.set(SocketState::Blocked);

        let (deferred, reply) = Deferred::pair();
        let address = address.to_owned();
        let inner = Rc::clone(self);
        runtime::offload(
            move || {
                let result = op.apply(&mut handle, &address);
                (handle, result)
            },
            move |(handle, result)| inner.finish_blocking(op, handle, result, deferred),
        );
        reply
    }

    fn finish_blocking(&self, op: Blocking, handle: Handle, result: Result<()>, deferred: Deferred<()>) {
        *self.handle.borrow_mut() = Some(handle);
        self.state.set(SocketState::Open);
        if result.is_ok() {
            self.count_endpoint(op);
        }

        if self.request_close.get() {
            self.close();
        }
        deferred.settle(result);

        if self.state.get() == SocketState::Open {
            self.poller.trigger_readable();
            self.poller.trigger_writable();
        }
    }

    fn count_endpoint(&self, op: Blocking) {
        let endpoints = self.endpoints.get();
        self.endpoints.set(match op {
            Blocking::Bind => endpoints.saturating_add(1),
            Blocking::Unbind => endpoints.saturating_sub(1),
        });
    }

    fn blocking_sync(&self, op: Blocking, address: &str) -> Result<()> {
        self.validate_open()?;
        self.with_handle(|handle| op.apply(handle, address))?;
        self.count_endpoint(op);
        Ok(())
    }

    fn connect(&self, address: &str) -> Result<()> {
        self.validate_open()?;
        self.with_handle(|handle| handle.connect(address))?;
        self.endpoints.set(self.endpoints.get().saturating_add(1));
        Ok(())
    }

    fn disconnect(&self, address: &str) -> Result<()> {
        self.validate_open()?;
        self.with_handle(|handle| handle.disconnect(address))?;
        self.endpoints.set(self.endpoints.get().saturating_sub(1));
        Ok(())
    }

    fn get_option<T: GetOption>(&self, option: i32) -> Result<T> {
        options::check(option, T::KIND)?;
        self.validate_open()?;
        self.with_handle(|handle| read_option(handle, option))
    }

    fn set_option<T: SetOption>(&self, option: i32, value: T) -> Result<()> {
        options::check(option, T::KIND)?;
        self.validate_open()?;
        let encoded = value.encode();
        self.with_handle(|handle| handle.set_raw(option, &encoded))?;

        if option == id::SNDTIMEO {
            self.send_timeout.set(i32::decode(&encoded)?);
        } else if option == id::RCVTIMEO {
            self.receive_timeout.set(i32::decode(&encoded)?);
        }

        let settled = self.endpoints.get() == 0 && self.state.get() == SocketState::Open;
        if !settled && !options::is_immediate(option) {
            warn!("Socket option will not take effect until next connect/bind.");
        }
        Ok(())
    }

    /// Moves the handle out for a proxy run; the socket stays blocked until
    /// [`restore_handle`](Self::restore_handle).
    pub(crate) fn take_handle(&self) -> Result<Handle> {
        self.validate_open()?;
        let handle = self.handle.borrow_mut().take().ok_or_else(|| self.missing_handle())?;
        self.state.set(SocketState::Blocked);
        Ok(handle)
    }

    /// Unblocks the socket, carrying out a close requested meanwhile.
    pub(crate) fn restore_handle(&self, handle: Handle) {
        *self.handle.borrow_mut() = Some(handle);
        self.state.set(SocketState::Open);
        if self.request_close.get() {
            self.close();
        }
    }

    /// Publishes this socket's events on `address`.
    pub(crate) fn monitor(&self, address: &str) -> Result<()> {
        self.validate_open()?;
        self.with_handle(|handle| handle.monitor(address, transport::EVENT_ALL))
    }

    pub(crate) fn endpoints(&self) -> u32 {
        self.endpoints.get()
    }

    pub(crate) fn kind(&self) -> SocketType {
        self.kind
    }

    /// Native context the socket was created on.
    pub(crate) fn context(&self) -> Result<Context> {
        self.context.borrow().clone().ok_or(Error::Closed)
    }
}

impl<V: Variant> PollTarget for SocketInner<V> {
    fn validate_readable(&self) -> bool {
        self.has_events(POLLIN)
    }

    fn validate_writable(&self) -> bool {
        self.has_events(POLLOUT)
    }

    fn readable_callback(&self) {
        self.sync_operations.set(0);
        let Some(deferred) = self.pending_read.borrow_mut().take() else {
            return;
        };
        deferred.settle(self.receive_now());
    }

    fn writable_callback(&self) {
        self.sync_operations.set(0);
        let Some((deferred, mut parts)) = self.pending_write.borrow_mut().take() else {
            return;
        };
        deferred.settle(self.send_now(&mut parts));
    }
}

impl<V: Variant> Closable for SocketInner<V> {
    fn close(&self) {
        match self.state.get() {
            SocketState::Closed => return,
            SocketState::Blocked => {
                self.request_close.set(true);
                return;
            }
            SocketState::Open => self.request_close.set(false),
        }

        if let (Some(key), Some(agent)) = (self.reap_key.take(), self.agent.upgrade()) {
            agent.deregister(key);
        }
        self.endpoints.set(0);

        // Settles watched operations through their callbacks.
        self.poller.close();

        // Operations deferred to a later turn.
        if let Some(deferred) = self.pending_read.borrow_mut().take() {
            deferred.settle(Err(Error::native(Errno::EAGAIN)));
        }
        if let Some((deferred, _)) = self.pending_write.borrow_mut().take() {
            deferred.settle(Err(Error::native(Errno::EAGAIN)));
        }

        drop(self.handle.borrow_mut().take());
        drop(self.context.borrow_mut().take());
        self.state.set(SocketState::Closed);
        debug!("[{}] socket closed", self.kind);
    }
}

/// An asynchronous libzmq socket.
///
/// `V` selects what each send and receive carries besides the parts; see
/// [`Variant`]. Dropping a socket closes it.
pub struct Socket<V: Variant = Basic> {
    inner: Rc<SocketInner<V>>,
}

impl Socket<Basic> {
    /// Creates a socket on the shared context.
    ///
    /// # Errors
    ///
    /// Argument error for draft SERVER/PEER/RADIO/DISH types (use
    /// [`Socket::open`] with their variant), or the native error.
    ///
    /// # Panics
    ///
    /// Outside a [`LocalSet`](tokio::task::LocalSet); see [`run`](crate::run).
    pub fn new(kind: SocketType) -> Result<Self> {
        Self::open(kind, None, SocketOptions::default())
    }

    /// Creates a socket on the shared context and applies `options`.
    ///
    /// # Errors
    ///
    /// As [`Socket::new`], or the error of the first option that cannot be
    /// applied.
    pub fn with_options(kind: SocketType, options: SocketOptions) -> Result<Self> {
        Self::open(kind, None, options)
    }

    /// Creates a socket on `context`.
    ///
    /// # Errors
    ///
    /// `EFAULT` if the context is closed; otherwise as [`Socket::new`].
    pub fn with_context(kind: SocketType, context: &Context) -> Result<Self> {
        Self::open(kind, Some(context), SocketOptions::default())
    }

    /// Creates a socket on `context` and applies `options`.
    ///
    /// # Errors
    ///
    /// As [`Socket::with_context`] and [`Socket::with_options`].
    pub fn with_context_and_options(
        kind: SocketType,
        context: &Context,
        options: SocketOptions,
    ) -> Result<Self> {
        Self::open(kind, Some(context), options)
    }
}

impl<V: Variant> Socket<V> {
    /// Creates a socket of any variant.
    ///
    /// `context` defaults to the shared context. `options` are applied in
    /// order before the socket is returned; if one fails the socket is
    /// closed and the error returned.
    ///
    /// # Errors
    ///
    /// Argument error if `kind` does not belong to `V`, `EFAULT` if the
    /// context is closed, or the native error.
    pub fn open(kind: SocketType, context: Option<&Context>, options: SocketOptions) -> Result<Self> {
        check_kind::<V>(kind)?;
        let agent = Agent::current()?;
        let context = match context {
            Some(context) => context.clone(),
            None => agent.shared_context(),
        };
        let raw: Arc<RawContext> = context.raw()?;

        let mut handle = Handle::open(&raw, kind)?;
        for entry in options.entries() {
            options::check(entry.id, entry.kind)?;
            handle.set_raw(entry.id, &entry.value)?;
        }
        let send_timeout = read_option::<i32>(&handle, id::SNDTIMEO)?;
        let receive_timeout = read_option::<i32>(&handle, id::RCVTIMEO)?;
        let poller = open_poller(&handle)?;
        agent.ensure_drain();

        let inner = Rc::new(SocketInner {
            kind,
            handle: RefCell::new(Some(handle)),
            state: Cell::new(SocketState::Open),
            request_close: Cell::new(false),
            endpoints: Cell::new(0),
            send_timeout: Cell::new(send_timeout),
            receive_timeout: Cell::new(receive_timeout),
            sync_operations: Cell::new(0),
            poller,
            pending_read: RefCell::new(None),
            pending_write: RefCell::new(None),
            context: RefCell::new(Some(context)),
            trash: Arc::clone(agent.trash()),
            agent: Rc::downgrade(&agent),
            reap_key: Cell::new(None),
        });

        let target: Weak<dyn PollTarget> = Rc::downgrade(&inner) as Weak<dyn PollTarget>;
        inner.poller.attach(target);
        let closable: Weak<dyn Closable> = Rc::downgrade(&inner) as Weak<dyn Closable>;
        inner.reap_key.set(Some(agent.register(closable)));

        debug!("[{}] socket created", kind);
        Ok(Self { inner })
    }

    pub(crate) fn inner(&self) -> &Rc<SocketInner<V>> {
        &self.inner
    }

    #[must_use]
    pub fn kind(&self) -> SocketType {
        self.inner.kind
    }

    #[must_use]
    pub fn state(&self) -> SocketState {
        self.inner.state.get()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == SocketState::Closed
    }

    /// Successful binds and connects minus unbinds and disconnects.
    #[must_use]
    pub fn endpoints(&self) -> u32 {
        self.inner.endpoints.get()
    }

    /// Whether a send is outstanding.
    #[must_use]
    pub fn is_writing(&self) -> bool {
        self.inner.pending_write.borrow().is_some()
    }

    /// Whether a receive is outstanding.
    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.inner.pending_read.borrow().is_some()
    }

    /// Sends one multipart message with per-pattern routing.
    ///
    /// Busy, blocked and closed errors settle the reply immediately. With a
    /// zero send timeout a socket that cannot send right now fails with
    /// `EAGAIN`; with a positive timeout the reply fails with `EAGAIN` once
    /// it expires.
    pub fn send_with(&self, message: impl Into<Message>, route: V::Route) -> Reply<()> {
        if let Err(err) = self.inner.validate_write() {
            return Reply::ready(Err(err));
        }
        let parts = Parts::new(message.into(), &self.inner.trash).and_then(|mut parts| {
            for part in parts.iter_mut() {
                V::stamp(&route, part)?;
            }
            Ok(parts)
        });
        match parts {
            Ok(parts) => self.inner.send(parts),
            Err(err) => Reply::ready(Err(err)),
        }
    }

    /// Receives one multipart message.
    ///
    /// Busy, blocked and closed errors settle the reply immediately. A
    /// failure while reading parts fails the whole message.
    pub fn receive(&self) -> Reply<Received<V::Meta>> {
        if let Err(err) = self.inner.validate_read() {
            return Reply::ready(Err(err));
        }
        self.inner.receive()
    }

    /// Binds to `address` on the blocking pool. The socket is blocked until
    /// the reply settles; errors carry `address`.
    pub fn bind(&self, address: &str) -> Reply<()> {
        self.inner.run_blocking(Blocking::Bind, address)
    }

    /// Unbinds from `address` on the blocking pool; see [`bind`](Self::bind).
    pub fn unbind(&self, address: &str) -> Reply<()> {
        self.inner.run_blocking(Blocking::Unbind, address)
    }

    /// Binds to `address`, blocking the calling thread.
    ///
    /// # Errors
    ///
    /// Blocked or closed errors, or the native error carrying `address`.
    pub fn bind_sync(&self, address: &str) -> Result<()> {
        self.inner.blocking_sync(Blocking::Bind, address)
    }

    /// Unbinds from `address`, blocking the calling thread.
    ///
    /// # Errors
    ///
    /// Blocked or closed errors, or the native error carrying `address`.
    pub fn unbind_sync(&self, address: &str) -> Result<()> {
        self.inner.blocking_sync(Blocking::Unbind, address)
    }

    /// # Errors
    ///
    /// Blocked or closed errors, or the native error carrying `address`.
    pub fn connect(&self, address: &str) -> Result<()> {
        self.inner.connect(address)
    }

    /// Connects and names the peer with `routing_id` (ROUTER, STREAM, PEER).
    ///
    /// # Errors
    ///
    /// Argument error for other socket types; otherwise as
    /// [`connect`](Self::connect).
    pub fn connect_with_routing_id(&self, address: &str, routing_id: impl Into<Bytes>) -> Result<()> {
        if !self.inner.kind.accepts_connect_routing_id() {
            return Err(Error::argument(format!(
                "Socket type {} does not support connect routing ids",
                self.inner.kind
            )));
        }
        self.inner.validate_open()?;
        let routing_id: Bytes = routing_id.into();
        self.inner
            .with_handle(|handle| handle.set_raw(id::CONNECT_ROUTING_ID, &routing_id))?;
        self.inner.connect(address)
    }

    /// # Errors
    ///
    /// Blocked or closed errors, or the native error carrying `address`.
    pub fn disconnect(&self, address: &str) -> Result<()> {
        self.inner.disconnect(address)
    }

    /// Closes the socket. Idempotent.
    ///
    /// Outstanding operations settle, with `EAGAIN` unless they happen to
    /// complete. While blocked, closing happens as soon as the bind or
    /// unbind completes.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Reads an option.
    ///
    /// # Errors
    ///
    /// Argument error for a negative identifier or a value type that does
    /// not match a known option; blocked or closed errors; or the native
    /// error.
    pub fn get_option<T: GetOption>(&self, option: i32) -> Result<T> {
        self.inner.get_option(option)
    }

    /// Writes an option.
    ///
    /// Options that only apply to new connections log a warning when set on
    /// a socket that already has endpoints.
    ///
    /// # Errors
    ///
    /// As [`get_option`](Self::get_option).
    pub fn set_option<T: SetOption>(&self, option: i32, value: T) -> Result<()> {
        self.inner.set_option(option, value)
    }
}

impl<V: Variant<Route = ()>> Socket<V> {
    /// Sends one multipart message. See [`send_with`](Self::send_with).
    pub fn send(&self, message: impl Into<Message>) -> Reply<()> {
        self.send_with(message, ())
    }
}

impl Socket<Basic> {
    /// Subscribes a SUB/XSUB socket to messages starting with `prefix`.
    ///
    /// # Errors
    ///
    /// As [`set_option`](Self::set_option).
    pub fn subscribe(&self, prefix: impl AsRef<[u8]>) -> Result<()> {
        self.set_option(id::SUBSCRIBE, prefix.as_ref())
    }

    /// # Errors
    ///
    /// As [`set_option`](Self::set_option).
    pub fn unsubscribe(&self, prefix: impl AsRef<[u8]>) -> Result<()> {
        self.set_option(id::UNSUBSCRIBE, prefix.as_ref())
    }

    /// Subscribes to every message.
    ///
    /// # Errors
    ///
    /// As [`set_option`](Self::set_option).
    pub fn subscribe_all(&self) -> Result<()> {
        self.subscribe(b"")
    }
}

#[cfg(feature = "draft")]
impl Socket<crate::variant::Grouped> {
    /// Joins a DISH group.
    ///
    /// # Errors
    ///
    /// Blocked or closed errors, or the native error.
    pub fn join(&self, group: &str) -> Result<()> {
        self.inner.validate_open()?;
        self.inner.with_handle(|handle| handle.join(group))
    }

    /// Leaves a DISH group.
    ///
    /// # Errors
    ///
    /// Blocked or closed errors, or the native error.
    pub fn leave(&self, group: &str) -> Result<()> {
        self.inner.validate_open()?;
        self.inner.with_handle(|handle| handle.leave(group))
    }
}

macro_rules! option_getters {
    ($($(#[$doc:meta])* $get:ident: $option:path => $ty:ty;)*) => {
        impl<V: Variant> Socket<V> {$(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Blocked or closed errors, or the native error.
            pub fn $get(&self) -> Result<$ty> {
                self.get_option::<$ty>($option)
            }
        )*}
    };
}

macro_rules! option_setters {
    ($($set:ident: $option:path => $ty:ty;)*) => {
        impl<V: Variant> Socket<V> {$(
            /// # Errors
            ///
            /// Blocked or closed errors, or the native error.
            pub fn $set(&self, value: $ty) -> Result<()> {
                self.set_option($option, value)
            }
        )*}
    };
}

option_getters! {
    /// Milliseconds a send may wait; `-1` waits forever, `0` never waits.
    send_timeout: id::SNDTIMEO => i32;
    /// Milliseconds a receive may wait; `-1` waits forever, `0` never waits.
    receive_timeout: id::RCVTIMEO => i32;
    /// Milliseconds pending messages are kept after close; `-1` forever.
    linger: id::LINGER => i32;
    send_high_water_mark: id::SNDHWM => i32;
    receive_high_water_mark: id::RCVHWM => i32;
    routing_id: id::ROUTING_ID => Vec<u8>;
    /// Endpoint of the last bind or connect, with wildcards resolved.
    last_endpoint: id::LAST_ENDPOINT => Option<String>;
    immediate: id::IMMEDIATE => bool;
    ipv6: id::IPV6 => bool;
    max_message_size: id::MAXMSGSIZE => i64;
    rate: id::RATE => i32;
    reconnect_interval: id::RECONNECT_IVL => i32;
    reconnect_interval_max: id::RECONNECT_IVL_MAX => i32;
    tcp_keepalive: id::TCP_KEEPALIVE => i32;
    curve_server: id::CURVE_SERVER => bool;
    curve_public_key: id::CURVE_PUBLICKEY => Option<String>;
    curve_secret_key: id::CURVE_SECRETKEY => Option<String>;
    curve_server_key: id::CURVE_SERVERKEY => Option<String>;
    plain_server: id::PLAIN_SERVER => bool;
    plain_username: id::PLAIN_USERNAME => Option<String>;
    plain_password: id::PLAIN_PASSWORD => Option<String>;
    /// Native socket type.
    raw_type: id::TYPE => i32;
    /// `ZMQ_EVENTS` readiness bits.
    events: id::EVENTS => i32;
}

option_setters! {
    set_send_timeout: id::SNDTIMEO => i32;
    set_receive_timeout: id::RCVTIMEO => i32;
    set_linger: id::LINGER => i32;
    set_send_high_water_mark: id::SNDHWM => i32;
    set_receive_high_water_mark: id::RCVHWM => i32;
    set_routing_id: id::ROUTING_ID => &[u8];
    set_immediate: id::IMMEDIATE => bool;
    set_ipv6: id::IPV6 => bool;
    set_max_message_size: id::MAXMSGSIZE => i64;
    set_rate: id::RATE => i32;
    set_reconnect_interval: id::RECONNECT_IVL => i32;
    set_reconnect_interval_max: id::RECONNECT_IVL_MAX => i32;
    set_tcp_keepalive: id::TCP_KEEPALIVE => i32;
    set_curve_server: id::CURVE_SERVER => bool;
    set_curve_public_key: id::CURVE_PUBLICKEY => &str;
    set_curve_secret_key: id::CURVE_SECRETKEY => &str;
    set_curve_server_key: id::CURVE_SERVERKEY => &str;
    set_plain_server: id::PLAIN_SERVER => bool;
    set_plain_username: id::PLAIN_USERNAME => &str;
    set_plain_password: id::PLAIN_PASSWORD => &str;
}

impl<V: Variant> Drop for Socket<V> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl<V: Variant> fmt::Debug for Socket<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("kind", &self.inner.kind)
            .field("state", &self.inner.state.get())
            .field("endpoints", &self.inner.endpoints.get())
            .finish()
    }
}
