//! Just enough sd-bus to make a blocking method call and walk the reply.
//!
//! `Bus` and `Message` are refcounted by libsystemd itself; `clone()` takes another reference to
//! the same object. Clones of a `Message` therefore also share its read position.
//!
//! Strings handed out while reading point into the message buffer. They are tied to the borrow
//! of the [`MessageIter`], which is shorter than what sd-bus guarantees.

use ffi::{c_char, c_int};
use foreign_types::{foreign_type, ForeignType, ForeignTypeRef};
use std::ffi::CStr;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::{fmt, io, ptr, result};
use utf8_cstr::Utf8CStr;

use crate::dump::{Cursor, Scalar, WireKind};

mod error;
mod names;
pub mod types;

pub use self::error::{Error, RawError};
pub use self::names::{BusName, InterfaceName, MemberName, ObjectPath};

/// Outcome of an operation that goes over the bus. The error may still be local: sd-bus
/// reports timeouts and unreachable peers the same way as replies of type error.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageType {
    MethodCall,
    MethodReturn,
    MethodError,
    Signal,
}

impl MessageType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        use ffi::bus::*;
        Some(match c_int::from(raw) {
            SD_BUS_MESSAGE_METHOD_CALL => MessageType::MethodCall,
            SD_BUS_MESSAGE_METHOD_RETURN => MessageType::MethodReturn,
            SD_BUS_MESSAGE_METHOD_ERROR => MessageType::MethodError,
            SD_BUS_MESSAGE_SIGNAL => MessageType::Signal,
            _ => return None,
        })
    }
}

foreign_type! {
    /// A bus connection.
    pub unsafe type Bus {
        type CType = ffi::bus::sd_bus;
        fn drop = ffi::bus::sd_bus_unref;
        fn clone = ffi::bus::sd_bus_ref;
    }
}

type OpenFn = unsafe extern "C" fn(*mut *mut ffi::bus::sd_bus) -> c_int;

impl Bus {
    fn open(f: OpenFn) -> crate::Result<Bus> {
        let mut b = MaybeUninit::uninit();
        sd_try!(f(b.as_mut_ptr()));
        Ok(unsafe { Bus::from_ptr(b.assume_init()) })
    }

    /// The per-thread default bus: the user bus when running inside a user session, the system
    /// bus otherwise. See `sd_bus_default(3)`.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> crate::Result<Bus> {
        Bus::open(ffi::bus::sd_bus_default)
    }

    pub fn default_user() -> crate::Result<Bus> {
        Bus::open(ffi::bus::sd_bus_default_user)
    }

    pub fn default_system() -> crate::Result<Bus> {
        Bus::open(ffi::bus::sd_bus_default_system)
    }
}

impl fmt::Debug for BusRef {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Bus")
            .field("unique_name", &self.unique_name().ok())
            .field("method_call_timeout", &self.method_call_timeout().ok())
            .finish()
    }
}

impl BusRef {
    /// Our own address on the bus, for example `:1.42`.
    pub fn unique_name(&self) -> crate::Result<&BusName> {
        let mut n = ptr::null();
        sd_try!(ffi::bus::sd_bus_get_unique_name(self.as_ptr(), &mut n));
        Ok(unsafe { BusName::from_ptr_unchecked(n) })
    }

    /// Microseconds a method call waits for its reply when called with a timeout of `0`.
    pub fn method_call_timeout(&self) -> crate::Result<u64> {
        let mut usec = 0;
        sd_try!(ffi::bus::sd_bus_get_method_call_timeout(
            self.as_ptr(),
            &mut usec
        ));
        Ok(usec)
    }

    /// An empty method call message addressed to `member` of `interface` on object `path` of
    /// `dest`. See `sd_bus_message_new_method_call(3)`.
    pub fn new_method_call(
        &mut self,
        dest: &BusName,
        path: &ObjectPath,
        interface: &InterfaceName,
        member: &MemberName,
    ) -> crate::Result<Message> {
        let mut m = MaybeUninit::uninit();
        sd_try!(ffi::bus::sd_bus_message_new_method_call(
            self.as_ptr(),
            m.as_mut_ptr(),
            dest.as_ptr(),
            path.as_ptr(),
            interface.as_ptr(),
            member.as_ptr()
        ));
        Ok(unsafe { Message::from_ptr(m.assume_init()) })
    }
}

foreign_type! {
    /// A message, either built locally or received.
    pub unsafe type Message {
        type CType = ffi::bus::sd_bus_message;
        fn drop = ffi::bus::sd_bus_message_unref;
        fn clone = ffi::bus::sd_bus_message_ref;
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, fmt)
    }
}

impl fmt::Debug for MessageRef {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Message")
            .field("type", &self.type_().ok().flatten())
            .field("signature", &self.signature())
            .field("destination", &self.destination())
            .field("path", &self.path())
            .field("interface", &self.interface())
            .field("member", &self.member())
            .field("sender", &self.sender())
            .finish()
    }
}

fn opt_cstr<'a>(p: *const c_char) -> Option<&'a CStr> {
    if p.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(p) })
}

fn at_end() -> io::Error {
    io::Error::from_raw_os_error(libc::ENXIO)
}

impl MessageRef {
    /// `None` for a type this crate does not know about.
    pub fn type_(&self) -> crate::Result<Option<MessageType>> {
        let mut t = 0u8;
        crate::ffi_result(unsafe { ffi::bus::sd_bus_message_get_type(self.as_ptr(), &mut t) })?;
        Ok(MessageType::from_raw(t))
    }

    pub fn destination(&self) -> Option<&CStr> {
        opt_cstr(unsafe { ffi::bus::sd_bus_message_get_destination(self.as_ptr()) })
    }

    pub fn path(&self) -> Option<&CStr> {
        opt_cstr(unsafe { ffi::bus::sd_bus_message_get_path(self.as_ptr()) })
    }

    pub fn interface(&self) -> Option<&CStr> {
        opt_cstr(unsafe { ffi::bus::sd_bus_message_get_interface(self.as_ptr()) })
    }

    pub fn member(&self) -> Option<&CStr> {
        opt_cstr(unsafe { ffi::bus::sd_bus_message_get_member(self.as_ptr()) })
    }

    /// Only set on messages that came in over a bus.
    pub fn sender(&self) -> Option<&CStr> {
        opt_cstr(unsafe { ffi::bus::sd_bus_message_get_sender(self.as_ptr()) })
    }

    /// Signature of the complete body, `a{sv}` for a `GetAll` reply.
    pub fn signature(&self) -> &CStr {
        opt_cstr(unsafe { ffi::bus::sd_bus_message_get_signature(self.as_ptr(), 1) })
            .unwrap_or_default()
    }

    /// Append one basic value. Fails once the message is sealed.
    ///
    /// # Safety
    ///
    /// `v` must point at what `sd_bus_message_append_basic(3)` reads for `dbus_type`: the value
    /// itself for fixed size types, a nul terminated string for `s`, `o` and `g`.
    pub unsafe fn append_basic_raw(
        &mut self,
        dbus_type: u8,
        v: *const ffi::c_void,
    ) -> crate::Result<()> {
        crate::ffi_result(ffi::bus::sd_bus_message_append_basic(
            self.as_ptr(),
            dbus_type as c_char,
            v,
        ))
        .map(drop)
    }

    pub fn append<V: types::ToSdBusMessage>(&mut self, v: V) -> crate::Result<()> {
        v.to_message(self)
    }

    /// Send this method call and block for the reply, at most `usec` microseconds (`0` is the
    /// bus default). The message is sealed afterwards.
    ///
    /// An error reply, a timeout and a failure to send all end up as `Err`.
    pub fn call(&mut self, usec: u64) -> Result<Message> {
        let mut reply = ptr::null_mut();
        let mut e = RawError::default();
        let r = unsafe {
            ffi::bus::sd_bus_call(ptr::null_mut(), self.as_ptr(), usec, e.as_mut_ptr(), &mut reply)
        };
        if r < 0 && !e.is_set() {
            e.set_errno(r);
        }
        e.check()?;
        Ok(unsafe { Message::from_ptr(reply) })
    }

    /// A reader positioned at the start of the body. Each call rewinds, so a message can be
    /// walked any number of times. The message must be sealed, as received ones are.
    pub fn iter(&mut self) -> crate::Result<MessageIter<'_>> {
        sd_try!(ffi::bus::sd_bus_message_rewind(self.as_ptr(), 1));
        Ok(MessageIter {
            raw: self.as_ptr(),
            life: PhantomData,
        })
    }
}

/// The read position of a [`Message`].
///
/// sd-bus keeps the position inside the message, so this only borrows it.
pub struct MessageIter<'a> {
    raw: *mut ffi::bus::sd_bus_message,
    life: PhantomData<&'a mut MessageRef>,
}

impl MessageIter<'_> {
    /// Read the next value, which must have type `dbus_type`. `Ok(None)` at the end of the
    /// current container.
    ///
    /// # Safety
    ///
    /// `R` must be the C type `sd_bus_message_read_basic(3)` stores for `dbus_type`.
    pub unsafe fn read_basic_raw<R, T, F: FnOnce(R) -> T>(
        &mut self,
        dbus_type: u8,
        cons: F,
    ) -> crate::Result<Option<T>> {
        let mut v = MaybeUninit::<R>::uninit();
        let r = crate::ffi_result(ffi::bus::sd_bus_message_read_basic(
            self.raw,
            dbus_type as c_char,
            v.as_mut_ptr() as *mut ffi::c_void,
        ))?;
        if r == 0 {
            return Ok(None);
        }
        Ok(Some(cons(v.assume_init())))
    }

    /// Type code of the next value plus, for containers, the signature of their contents.
    /// `None` at the end of the current container.
    pub fn peek(&mut self) -> crate::Result<Option<(u8, &str)>> {
        let mut t: c_char = 0;
        let mut contents: *const c_char = ptr::null();
        let r = crate::ffi_result(unsafe {
            ffi::bus::sd_bus_message_peek_type(self.raw, &mut t, &mut contents)
        })?;
        if r == 0 {
            return Ok(None);
        }
        let contents: &str = match opt_cstr(contents) {
            Some(c) => unsafe { Utf8CStr::from_cstr_unchecked(c) }.as_ref(),
            None => "",
        };
        Ok(Some((t as u8, contents)))
    }

    /// Step into the container at the read position, `code` being one of `a`, `v`, `r`, `e`.
    pub fn enter_container(&mut self, code: u8) -> crate::Result<()> {
        let r = sd_try!(ffi::bus::sd_bus_message_enter_container(
            self.raw,
            code as c_char,
            ptr::null()
        ));
        if r == 0 {
            return Err(at_end());
        }
        Ok(())
    }

    /// Step out of the current container.
    pub fn exit_container(&mut self) -> crate::Result<()> {
        sd_try!(ffi::bus::sd_bus_message_exit_container(self.raw));
        Ok(())
    }

    /// Pass over the next complete value without decoding it.
    pub fn skip_value(&mut self) -> crate::Result<()> {
        let r = sd_try!(ffi::bus::sd_bus_message_skip(self.raw, ptr::null()));
        if r == 0 {
            return Err(at_end());
        }
        Ok(())
    }

    /// Read the next value as a basic value of `kind`. Containers are `EINVAL`.
    pub fn read_scalar(&mut self, kind: WireKind) -> crate::Result<Scalar<'_>> {
        let code = kind.code();
        let read = unsafe {
            match kind {
                WireKind::Byte => self.read_basic_raw(code, Scalar::Byte),
                WireKind::Boolean => self.read_basic_raw(code, |b: c_int| Scalar::Boolean(b != 0)),
                WireKind::Int16 => self.read_basic_raw(code, Scalar::Int16),
                WireKind::UInt16 => self.read_basic_raw(code, Scalar::UInt16),
                WireKind::Int32 => self.read_basic_raw(code, Scalar::Int32),
                WireKind::UInt32 => self.read_basic_raw(code, Scalar::UInt32),
                WireKind::Int64 => self.read_basic_raw(code, Scalar::Int64),
                WireKind::UInt64 => self.read_basic_raw(code, Scalar::UInt64),
                WireKind::Double => self.read_basic_raw(code, Scalar::Double),
                WireKind::UnixFd => self.read_basic_raw(code, Scalar::UnixFd),
                // sd-bus validated these as utf-8 when the message arrived
                WireKind::String => self.read_basic_raw(code, |p: *const c_char| {
                    Scalar::String(Utf8CStr::from_ptr_unchecked(p).as_ref())
                }),
                WireKind::ObjectPath => self.read_basic_raw(code, |p: *const c_char| {
                    Scalar::ObjectPath(Utf8CStr::from_ptr_unchecked(p).as_ref())
                }),
                WireKind::Signature => self.read_basic_raw(code, |p: *const c_char| {
                    Scalar::Signature(Utf8CStr::from_ptr_unchecked(p).as_ref())
                }),
                WireKind::Array | WireKind::Variant | WireKind::Struct | WireKind::DictEntry => {
                    return Err(io::Error::from_raw_os_error(libc::EINVAL))
                }
            }
        }?;
        read.ok_or_else(at_end)
    }
}

impl Cursor for MessageIter<'_> {
    fn peek_type(&mut self) -> io::Result<Option<u8>> {
        self.peek().map(|p| p.map(|(code, _)| code))
    }

    fn read(&mut self, kind: WireKind) -> io::Result<Scalar<'_>> {
        self.read_scalar(kind)
    }

    fn skip(&mut self) -> io::Result<()> {
        self.skip_value()
    }

    fn enter(&mut self, code: u8) -> io::Result<()> {
        self.enter_container(code)
    }

    fn exit(&mut self) -> io::Result<()> {
        self.exit_container()
    }
}
