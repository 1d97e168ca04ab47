use ffi::c_int;
use std::ffi::CStr;
use std::{error, fmt, io, ptr};
use utf8_cstr::Utf8CStr;

/// Owner of an `sd_bus_error` slot, set or not. Freed on drop.
#[repr(C)]
pub struct RawError {
    inner: ffi::bus::sd_bus_error,
}

impl Default for RawError {
    fn default() -> Self {
        // SD_BUS_ERROR_NULL
        RawError {
            inner: ffi::bus::sd_bus_error {
                name: ptr::null(),
                message: ptr::null(),
                need_free: 0,
            },
        }
    }
}

impl RawError {
    pub(super) fn set_errno(&mut self, errno: c_int) {
        unsafe { ffi::bus::sd_bus_error_set_errno(&mut self.inner, errno) };
    }

    pub(super) fn is_set(&self) -> bool {
        !self.inner.name.is_null()
    }

    pub(super) fn as_mut_ptr(&mut self) -> *mut ffi::bus::sd_bus_error {
        &mut self.inner
    }

    /// `Err` carrying this error if something filled it in.
    pub(super) fn check(self) -> super::Result<()> {
        if !self.is_set() {
            return Ok(());
        }
        Err(unsafe { Error::from_raw(self) })
    }

    pub fn name(&self) -> Option<&Utf8CStr> {
        if !self.is_set() {
            return None;
        }
        Some(unsafe { Utf8CStr::from_ptr_unchecked(self.inner.name) })
    }

    pub fn message(&self) -> Option<&Utf8CStr> {
        if !self.is_set() || self.inner.message.is_null() {
            return None;
        }
        Some(unsafe { Utf8CStr::from_ptr_unchecked(self.inner.message) })
    }
}

impl Drop for RawError {
    fn drop(&mut self) {
        unsafe { ffi::bus::sd_bus_error_free(&mut self.inner) };
    }
}

impl fmt::Debug for RawError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("RawError")
            .field("name", &self.name())
            .field("message", &self.message())
            .finish()
    }
}

/// A D-Bus error, either returned by the peer or synthesized locally by sd-bus.
///
/// The name is something like `org.freedesktop.DBus.Error.UnknownObject`; the message is free
/// text and may be missing.
pub struct Error {
    raw: RawError,
    // lengths including the nul, measured once
    name_len: usize,
    message_len: usize,
}

impl Error {
    /// # Safety
    ///
    /// `raw` must be set, with `name` (and `message`, if non-null) pointing to valid strings.
    unsafe fn from_raw(raw: RawError) -> Error {
        let name_len = CStr::from_ptr(raw.inner.name).to_bytes_with_nul().len();
        let message_len = if raw.inner.message.is_null() {
            0
        } else {
            CStr::from_ptr(raw.inner.message).to_bytes_with_nul().len()
        };
        Error {
            raw,
            name_len,
            message_len,
        }
    }

    /// The error sd-bus would produce for `errno` (either sign). Well known values get their
    /// standard names (`ENOENT` becomes `org.freedesktop.DBus.Error.FileNotFound`), anything else
    /// `System.Error.<NAME>`. An `errno` of 0 is treated as `EIO`.
    pub fn from_errno(errno: c_int) -> Error {
        let mut raw = RawError::default();
        raw.set_errno(errno);
        if !raw.is_set() {
            raw.set_errno(libc::EIO);
        }
        unsafe { Error::from_raw(raw) }
    }

    pub fn name(&self) -> &Utf8CStr {
        unsafe { Utf8CStr::from_raw_parts(self.raw.inner.name, self.name_len) }
    }

    pub fn message(&self) -> Option<&Utf8CStr> {
        if self.message_len == 0 {
            return None;
        }
        Some(unsafe { Utf8CStr::from_raw_parts(self.raw.inner.message, self.message_len) })
    }

    /// Positive errno matching the error name, `EIO` for names sd-bus does not know.
    pub fn errno(&self) -> c_int {
        unsafe { ffi::bus::sd_bus_error_get_errno(&self.raw.inner) }
    }
}

impl error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Error")
            .field("name", &self.name())
            .field("message", &self.message())
            .field("errno", &self.errno())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Dbus Error: {}", self.name())?;
        if let Some(m) = self.message() {
            write!(fmt, ": {}", m)?;
        }
        Ok(())
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        io::Error::from_raw_os_error(e.errno())
    }
}

#[test]
fn t_error_from_errno() {
    let e = Error::from_errno(libc::ENOENT);
    assert_eq!(e.errno(), libc::ENOENT);
    let name: &str = e.name().as_ref();
    assert_eq!(name, "org.freedesktop.DBus.Error.FileNotFound");

    let e = Error::from_errno(-libc::EACCES);
    assert_eq!(e.errno(), libc::EACCES);
    assert_eq!(io::Error::from(e).raw_os_error(), Some(libc::EACCES));

    let e = Error::from_errno(0);
    assert_eq!(e.errno(), libc::EIO);
}

#[test]
fn t_raw_error_unset() {
    let e = RawError::default();
    assert!(!e.is_set());
    assert!(e.name().is_none());
    assert!(e.check().is_ok());
}
