//! Owned handles over the libzmq C API.
//!
//! This is the only module that talks to `zmq-sys`. Each type owns exactly
//! one native resource and releases it exactly once:
//!
//! - [`RawContext`]: a `zmq_ctx`; terminated explicitly or on drop
//! - [`Handle`]: a `zmq_socket`; closed on drop
//! - [`RawMsg`]: a `zmq_msg_t`; closed on drop
//!
//! Every call that may fail with `EINTR` is retried in place.

// FFI boundary.
#![allow(unsafe_code)]

use crate::error::{Errno, Error, Result};
use crate::socket_type::SocketType;
use std::ffi::{c_char, c_void, CString};
use std::mem::{self, MaybeUninit};
use std::os::fd::{BorrowedFd, OwnedFd, RawFd};
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// `zmq_send`/`zmq_recv` flag: fail with `EAGAIN` instead of blocking.
pub const DONTWAIT: i32 = 1;
/// `zmq_send` flag: more parts follow.
pub const SNDMORE: i32 = 2;
/// `ZMQ_EVENTS` bit: a message can be received.
pub const POLLIN: i32 = 1;
/// `ZMQ_EVENTS` bit: a message can be sent.
pub const POLLOUT: i32 = 2;
/// Monitor mask selecting every socket event.
pub const EVENT_ALL: i32 = 0xFFFF;

const ZMQ_FD: i32 = 14;
const ZMQ_EVENTS: i32 = 15;

/// Runs a libzmq call until it stops failing with `EINTR`.
///
/// Returns the non-negative return code, or the error number of the first
/// failure that is not an interruption.
pub fn retry<F>(mut call: F) -> std::result::Result<i32, Errno>
where
    F: FnMut() -> i32,
{
    loop {
        let rc = call();
        if rc >= 0 {
            return Ok(rc);
        }
        let errno = Errno::last();
        if errno != Errno::EINTR {
            return Err(errno);
        }
    }
}

/// Duplicates a descriptor owned by libzmq. The copy stays valid after
/// libzmq closes the original, so it can be registered with a reactor for
/// the whole lifetime of its owner.
///
/// # Errors
///
/// The OS error of `dup`.
pub fn duplicate_fd(fd: RawFd) -> Result<OwnedFd> {
    // SAFETY: libzmq keeps fd open at least until its socket is closed,
    // which cannot happen during this call.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    Ok(borrowed.try_clone_to_owned()?)
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::argument(format!("String must not contain NUL bytes: {value:?}")))
}

/// Owned libzmq context.
///
/// Shared between threads behind an `Arc`; libzmq guarantees context calls
/// are thread-safe. Once terminated, every call fails with `EFAULT`.
pub struct RawContext {
    ptr: NonNull<c_void>,
    terminated: AtomicBool,
}

// SAFETY: libzmq contexts are thread-safe.
unsafe impl Send for RawContext {}
unsafe impl Sync for RawContext {}

impl RawContext {
    /// Creates a new libzmq context.
    ///
    /// # Errors
    ///
    /// Returns the native error if libzmq cannot allocate the context
    /// (typically `EMFILE`).
    pub fn new() -> Result<Self> {
        // SAFETY: no preconditions.
        let ptr = unsafe { zmq_sys::zmq_ctx_new() };
        let ptr = NonNull::new(ptr).ok_or_else(Error::last)?;
        Ok(Self {
            ptr,
            terminated: AtomicBool::new(false),
        })
    }

    fn live(&self) -> Result<*mut c_void> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(Error::native(Errno::EFAULT));
        }
        Ok(self.ptr.as_ptr())
    }

    /// Reads a context option.
    ///
    /// # Errors
    ///
    /// `EFAULT` after termination, `EINVAL` for unknown options.
    pub fn get(&self, option: i32) -> Result<i32> {
        let ptr = self.live()?;
        // SAFETY: ptr is a live context.
        let value = unsafe { zmq_sys::zmq_ctx_get(ptr, option) };
        if value < 0 {
            return Err(Error::last());
        }
        Ok(value)
    }

    /// Writes a context option.
    ///
    /// # Errors
    ///
    /// `EFAULT` after termination, `EINVAL` for unknown options or values.
    pub fn set(&self, option: i32, value: i32) -> Result<()> {
        let ptr = self.live()?;
        // SAFETY: ptr is a live context.
        let rc = unsafe { zmq_sys::zmq_ctx_set(ptr, option, value) };
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(())
    }

    /// Makes every blocking call on sockets of this context fail with
    /// `ETERM`. Does not free anything.
    ///
    /// # Errors
    ///
    /// `EFAULT` after termination.
    pub fn shutdown(&self) -> Result<()> {
        let ptr = self.live()?;
        // SAFETY: ptr is a live context.
        let rc = unsafe { zmq_sys::zmq_ctx_shutdown(ptr) };
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(())
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Terminates the context. Blocks until every socket of the context
    /// is closed and, depending on linger, pending messages are flushed.
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// The native error if termination fails for a reason other than
    /// `EINTR`.
    pub fn terminate(&self) -> std::result::Result<(), Errno> {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let ptr = self.ptr.as_ptr();
        // SAFETY: ptr was live and is terminated only here.
        retry(|| unsafe { zmq_sys::zmq_ctx_term(ptr) }).map(drop)
    }
}

impl Drop for RawContext {
    fn drop(&mut self) {
        if let Err(errno) = self.terminate() {
            debug_assert!(false, "context termination failed: {errno:?}");
        }
    }
}

/// Owned libzmq socket.
///
/// Not thread-safe, but may be moved to another thread as long as only
/// one thread uses it at a time.
pub struct Handle {
    ptr: NonNull<c_void>,
    kind: SocketType,
}

// SAFETY: libzmq sockets may migrate between threads with a full fence,
// which moving ownership provides.
unsafe impl Send for Handle {}

impl Handle {
    /// Creates a socket of the given type on `context`.
    ///
    /// # Errors
    ///
    /// `EFAULT` if the context is terminated, `ETERM` if it was shut down,
    /// `EMFILE` when the socket limit is reached.
    pub fn open(context: &RawContext, kind: SocketType) -> Result<Self> {
        let ctx = context.live()?;
        // SAFETY: ctx is a live context.
        let ptr = unsafe { zmq_sys::zmq_socket(ctx, kind.raw()) };
        let ptr = NonNull::new(ptr).ok_or_else(Error::last)?;
        Ok(Self { ptr, kind })
    }

    #[must_use]
    pub const fn kind(&self) -> SocketType {
        self.kind
    }

    fn address_call<F>(&mut self, address: &str, call: F) -> Result<()>
    where
        F: Fn(*mut c_void, *const c_char) -> i32,
    {
        let c_addr = c_string(address)?;
        let ptr = self.ptr.as_ptr();
        retry(|| call(ptr, c_addr.as_ptr()))
            .map(drop)
            .map_err(|errno| Error::at(errno, address))
    }

    /// Binds to `address`. Blocks for the duration of the native call.
    ///
    /// # Errors
    ///
    /// The native error, carrying `address`.
    pub fn bind(&mut self, address: &str) -> Result<()> {
        debug!("[{}] bind {}", self.kind, address);
        // SAFETY: s is a live socket and a outlives the call.
        self.address_call(address, |s, a| unsafe { zmq_sys::zmq_bind(s.cast(), a.cast()) })
    }

    /// Unbinds from `address`.
    ///
    /// # Errors
    ///
    /// The native error, carrying `address`.
    pub fn unbind(&mut self, address: &str) -> Result<()> {
        debug!("[{}] unbind {}", self.kind, address);
        // SAFETY: s is a live socket and a outlives the call.
        self.address_call(address, |s, a| unsafe { zmq_sys::zmq_unbind(s.cast(), a.cast()) })
    }

    /// Connects to `address`.
    ///
    /// # Errors
    ///
    /// The native error, carrying `address`.
    pub fn connect(&mut self, address: &str) -> Result<()> {
        debug!("[{}] connect {}", self.kind, address);
        // SAFETY: s is a live socket and a outlives the call.
        self.address_call(address, |s, a| unsafe { zmq_sys::zmq_connect(s.cast(), a.cast()) })
    }

    /// Disconnects from `address`.
    ///
    /// # Errors
    ///
    /// The native error, carrying `address`.
    pub fn disconnect(&mut self, address: &str) -> Result<()> {
        debug!("[{}] disconnect {}", self.kind, address);
        // SAFETY: s is a live socket and a outlives the call.
        self.address_call(address, |s, a| unsafe { zmq_sys::zmq_disconnect(s.cast(), a.cast()) })
    }

    /// Reads raw option bytes into `buf`, returning the length written.
    ///
    /// # Errors
    ///
    /// The native error (`EINVAL` for unknown options or short buffers).
    pub fn get_raw(&self, option: i32, buf: &mut [u8]) -> Result<usize> {
        let mut len: usize = buf.len();
        let ptr = self.ptr.as_ptr();
        // SAFETY: buf is valid for len bytes; len is a valid size_t slot.
        retry(|| unsafe {
            zmq_sys::zmq_getsockopt(
                ptr,
                option,
                buf.as_mut_ptr().cast(),
                ptr::addr_of_mut!(len).cast(),
            )
        })?;
        Ok(len)
    }

    /// Writes raw option bytes.
    ///
    /// # Errors
    ///
    /// The native error (`EINVAL` for unknown options or bad values).
    pub fn set_raw(&mut self, option: i32, value: &[u8]) -> Result<()> {
        let ptr = self.ptr.as_ptr();
        // SAFETY: value is valid for its length.
        retry(|| unsafe {
            zmq_sys::zmq_setsockopt(ptr, option, value.as_ptr().cast(), value.len() as _)
        })?;
        Ok(())
    }

    /// `ZMQ_EVENTS` bitmask. Reading it never consumes anything, but it
    /// resets the edge of the readiness descriptor.
    ///
    /// # Errors
    ///
    /// `ETERM` once the context shut down, or another native error.
    pub fn try_events(&self) -> Result<i32> {
        let mut buf = [0_u8; mem::size_of::<i32>()];
        self.get_raw(ZMQ_EVENTS, &mut buf)?;
        Ok(i32::from_ne_bytes(buf))
    }

    /// Whether an operation in `mask` would not block: either the socket is
    /// ready or it failed, so the operation reports the failure.
    #[must_use]
    pub fn is_actionable(&self, mask: i32) -> bool {
        self.try_events().map_or(true, |events| events & mask != 0)
    }

    /// Edge-triggered readiness descriptor (`ZMQ_FD`). Owned by libzmq.
    ///
    /// # Errors
    ///
    /// `EINVAL` for thread-safe (draft) sockets, which have no descriptor.
    pub fn fd(&self) -> Result<RawFd> {
        let mut buf = [0_u8; mem::size_of::<RawFd>()];
        self.get_raw(ZMQ_FD, &mut buf)?;
        Ok(RawFd::from_ne_bytes(buf))
    }

    /// Publishes socket events on an `inproc://` address.
    ///
    /// # Errors
    ///
    /// The native error, carrying `address`.
    pub fn monitor(&mut self, address: &str, events: i32) -> Result<()> {
        let c_addr = c_string(address)?;
        let ptr = self.ptr.as_ptr();
        // SAFETY: ptr is a live socket and c_addr outlives the call.
        retry(|| unsafe { zmq_sys::zmq_socket_monitor(ptr, c_addr.as_ptr(), events) })
            .map(drop)
            .map_err(|errno| Error::at(errno, address))
    }

    /// Sends one message part. On success libzmq owns the contents and
    /// `msg` is left empty.
    ///
    /// # Errors
    ///
    /// The native error; `msg` is left untouched.
    pub fn send(&mut self, msg: &mut RawMsg, flags: i32) -> std::result::Result<(), Errno> {
        let ptr = self.ptr.as_ptr();
        // SAFETY: msg is an initialised message and ptr a live socket.
        retry(|| unsafe { zmq_sys::zmq_msg_send(msg.as_mut_ptr(), ptr, flags) }).map(drop)
    }

    /// Sends a byte slice as one part, copying it.
    ///
    /// # Errors
    ///
    /// The native error.
    pub fn send_bytes(&mut self, data: &[u8], flags: i32) -> std::result::Result<(), Errno> {
        let ptr = self.ptr.as_ptr();
        // SAFETY: data is valid for its length.
        retry(|| unsafe { zmq_sys::zmq_send(ptr, data.as_ptr().cast(), data.len() as _, flags) })
            .map(drop)
    }

    /// Receives one message part into `msg`.
    ///
    /// # Errors
    ///
    /// The native error (`EAGAIN` with [`DONTWAIT`] when nothing is queued).
    pub fn recv(&mut self, msg: &mut RawMsg, flags: i32) -> std::result::Result<(), Errno> {
        let ptr = self.ptr.as_ptr();
        // SAFETY: msg is an initialised message and ptr a live socket.
        retry(|| unsafe { zmq_sys::zmq_msg_recv(msg.as_mut_ptr(), ptr, flags) }).map(drop)
    }

    /// Runs a steerable proxy until a `TERMINATE` command arrives on
    /// `control` or the context shuts down. Blocks the calling thread.
    ///
    /// # Errors
    ///
    /// The native error that ended the proxy.
    pub fn proxy_steerable(
        frontend: &mut Self,
        backend: &mut Self,
        control: &mut Self,
    ) -> std::result::Result<(), Errno> {
        let (front, back, ctrl) = (frontend.ptr.as_ptr(), backend.ptr.as_ptr(), control.ptr.as_ptr());
        // SAFETY: three distinct live sockets, exclusively borrowed.
        retry(|| unsafe { zmq_sys::zmq_proxy_steerable(front, back, ptr::null_mut(), ctrl) }).map(drop)
    }

    /// Joins a RADIO/DISH group.
    ///
    /// # Errors
    ///
    /// The native error.
    #[cfg(feature = "draft")]
    pub fn join(&mut self, group: &str) -> Result<()> {
        let c_group = c_string(group)?;
        let ptr = self.ptr.as_ptr();
        // SAFETY: ptr is a live socket and c_group outlives the call.
        retry(|| unsafe { draft::zmq_join(ptr, c_group.as_ptr()) })?;
        Ok(())
    }

    /// Leaves a RADIO/DISH group.
    ///
    /// # Errors
    ///
    /// The native error.
    #[cfg(feature = "draft")]
    pub fn leave(&mut self, group: &str) -> Result<()> {
        let c_group = c_string(group)?;
        let ptr = self.ptr.as_ptr();
        // SAFETY: ptr is a live socket and c_group outlives the call.
        retry(|| unsafe { draft::zmq_leave(ptr, c_group.as_ptr()) })?;
        Ok(())
    }

    #[cfg(feature = "draft")]
    fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        // SAFETY: the socket is live and closed only here.
        let rc = unsafe { zmq_sys::zmq_close(self.ptr.as_ptr()) };
        debug_assert_eq!(rc, 0, "zmq_close failed: {:?}", Errno::last());
    }
}

/// Release callback for zero-copy message data.
pub type ReleaseFn = extern "C" fn(data: *mut c_void, hint: *mut c_void);

/// Owned `zmq_msg_t`.
pub struct RawMsg {
    msg: zmq_sys::zmq_msg_t,
}

// SAFETY: a zmq_msg_t may be closed from any thread.
unsafe impl Send for RawMsg {}

impl RawMsg {
    /// Empty message.
    #[must_use]
    pub fn new() -> Self {
        let mut msg = MaybeUninit::<zmq_sys::zmq_msg_t>::uninit();
        // SAFETY: zmq_msg_init only writes the struct and cannot fail.
        let rc = unsafe { zmq_sys::zmq_msg_init(msg.as_mut_ptr()) };
        debug_assert_eq!(rc, 0);
        // SAFETY: initialised above.
        Self { msg: unsafe { msg.assume_init() } }
    }

    /// Message owning a private copy of `data`.
    ///
    /// # Errors
    ///
    /// `ENOMEM` if libzmq cannot allocate the buffer.
    pub fn copy_from(data: &[u8]) -> Result<Self> {
        let mut msg = MaybeUninit::<zmq_sys::zmq_msg_t>::uninit();
        // SAFETY: on success the struct is initialised.
        let rc = unsafe { zmq_sys::zmq_msg_init_size(msg.as_mut_ptr(), data.len() as _) };
        if rc < 0 {
            return Err(Error::last());
        }
        // SAFETY: initialised above.
        let mut raw = Self { msg: unsafe { msg.assume_init() } };
        raw.data_mut().copy_from_slice(data);
        Ok(raw)
    }

    /// Message borrowing `len` bytes at `data` until libzmq calls
    /// `release(data, hint)`, possibly on one of its I/O threads.
    ///
    /// # Errors
    ///
    /// The native error; `release` is not called in that case.
    ///
    /// # Safety
    ///
    /// `data` must stay valid and unmodified until `release` runs, and
    /// `release` must be safe to call from any thread.
    pub unsafe fn borrowed(
        data: *const u8,
        len: usize,
        release: ReleaseFn,
        hint: *mut c_void,
    ) -> Result<Self> {
        let mut msg = MaybeUninit::<zmq_sys::zmq_msg_t>::uninit();
        let rc = zmq_sys::zmq_msg_init_data(
            msg.as_mut_ptr(),
            data.cast_mut().cast(),
            len as _,
            Some(release),
            hint,
        );
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(Self { msg: msg.assume_init() })
    }

    fn as_mut_ptr(&mut self) -> *mut zmq_sys::zmq_msg_t {
        ptr::addr_of_mut!(self.msg)
    }

    // libzmq declares its read accessors with mutable pointers on some
    // versions; they never write through them.
    fn as_read_ptr(&self) -> *mut zmq_sys::zmq_msg_t {
        ptr::addr_of!(self.msg).cast_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        // SAFETY: the message is initialised.
        unsafe { zmq_sys::zmq_msg_size(self.as_read_ptr()) as usize }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        let len = self.len();
        if len == 0 {
            return &[];
        }
        // SAFETY: libzmq guarantees len readable bytes at zmq_msg_data.
        unsafe { std::slice::from_raw_parts(zmq_sys::zmq_msg_data(self.as_read_ptr()).cast::<u8>(), len) }
    }

    fn data_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        if len == 0 {
            return &mut [];
        }
        // SAFETY: as above, and we hold the message exclusively.
        unsafe { std::slice::from_raw_parts_mut(zmq_sys::zmq_msg_data(self.as_mut_ptr()).cast::<u8>(), len) }
    }

    /// True if more parts of the same message follow this one.
    #[must_use]
    pub fn more(&self) -> bool {
        // SAFETY: the message is initialised.
        unsafe { zmq_sys::zmq_msg_more(self.as_read_ptr()) != 0 }
    }

    #[cfg(feature = "draft")]
    #[must_use]
    pub fn routing_id(&self) -> u32 {
        // SAFETY: the message is initialised.
        unsafe { draft::zmq_msg_routing_id(self.as_read_ptr()) }
    }

    /// # Errors
    ///
    /// `EINVAL` for a zero routing id.
    #[cfg(feature = "draft")]
    pub fn set_routing_id(&mut self, id: u32) -> Result<()> {
        // SAFETY: the message is initialised.
        let rc = unsafe { draft::zmq_msg_set_routing_id(self.as_mut_ptr(), id) };
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(())
    }

    #[cfg(feature = "draft")]
    #[must_use]
    pub fn group(&self) -> String {
        // SAFETY: the message is initialised; the group is NUL-terminated
        // storage inside it.
        let group = unsafe { draft::zmq_msg_group(self.as_read_ptr()) };
        if group.is_null() {
            return String::new();
        }
        // SAFETY: non-null, NUL-terminated.
        unsafe { std::ffi::CStr::from_ptr(group) }.to_string_lossy().into_owned()
    }

    /// # Errors
    ///
    /// `EINVAL` when the group is too long.
    #[cfg(feature = "draft")]
    pub fn set_group(&mut self, group: &str) -> Result<()> {
        let c_group = c_string(group)?;
        // SAFETY: the message is initialised and c_group outlives the call.
        let rc = unsafe { draft::zmq_msg_set_group(self.as_mut_ptr(), c_group.as_ptr()) };
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(())
    }
}

impl Default for RawMsg {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for RawMsg {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

impl Drop for RawMsg {
    fn drop(&mut self) {
        // SAFETY: the message is initialised and closed only here.
        let rc = unsafe { zmq_sys::zmq_msg_close(self.as_mut_ptr()) };
        debug_assert_eq!(rc, 0);
    }
}

/// Readiness source for thread-safe (draft) sockets, which expose no
/// `ZMQ_FD`: a `zmq_poller` watching the socket for input.
#[cfg(feature = "draft")]
pub struct RawPoller {
    ptr: NonNull<c_void>,
}

#[cfg(feature = "draft")]
// SAFETY: only the owning thread touches the poller; it is destroyed once.
unsafe impl Send for RawPoller {}

#[cfg(feature = "draft")]
impl RawPoller {
    /// Creates a poller watching `handle`.
    ///
    /// # Errors
    ///
    /// The native error.
    pub fn watch(handle: &Handle) -> Result<Self> {
        // SAFETY: no preconditions.
        let ptr = NonNull::new(unsafe { draft::zmq_poller_new() }).ok_or_else(Error::last)?;
        let poller = Self { ptr };
        // SAFETY: both pointers are live.
        let rc = unsafe {
            draft::zmq_poller_add(poller.ptr.as_ptr(), handle.as_ptr(), ptr::null_mut(), POLLIN as _)
        };
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(poller)
    }

    /// # Errors
    ///
    /// The native error.
    pub fn fd(&self) -> Result<RawFd> {
        let mut fd: RawFd = -1;
        // SAFETY: fd is a valid out slot.
        let rc = unsafe { draft::zmq_poller_fd(self.ptr.as_ptr(), ptr::addr_of_mut!(fd)) };
        if rc < 0 {
            return Err(Error::last());
        }
        Ok(fd)
    }
}

#[cfg(feature = "draft")]
impl Drop for RawPoller {
    fn drop(&mut self) {
        let mut ptr = self.ptr.as_ptr();
        // SAFETY: destroyed only here.
        let rc = unsafe { draft::zmq_poller_destroy(ptr::addr_of_mut!(ptr)) };
        debug_assert_eq!(rc, 0);
    }
}

#[cfg(feature = "draft")]
mod draft {
    use std::ffi::{c_char, c_int, c_short, c_void};
    use zmq_sys::zmq_msg_t;

    extern "C" {
        pub fn zmq_poller_new() -> *mut c_void;
        pub fn zmq_poller_destroy(poller: *mut *mut c_void) -> c_int;
        pub fn zmq_poller_add(
            poller: *mut c_void,
            socket: *mut c_void,
            user_data: *mut c_void,
            events: c_short,
        ) -> c_int;
        pub fn zmq_poller_fd(poller: *mut c_void, fd: *mut c_int) -> c_int;
        pub fn zmq_msg_set_routing_id(msg: *mut zmq_msg_t, routing_id: u32) -> c_int;
        pub fn zmq_msg_routing_id(msg: *mut zmq_msg_t) -> u32;
        pub fn zmq_msg_set_group(msg: *mut zmq_msg_t, group: *const c_char) -> c_int;
        pub fn zmq_msg_group(msg: *mut zmq_msg_t) -> *const c_char;
        pub fn zmq_join(socket: *mut c_void, group: *const c_char) -> c_int;
        pub fn zmq_leave(socket: *mut c_void, group: *const c_char) -> c_int;
    }
}
