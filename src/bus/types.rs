/*!
 * Conversion of rust values into method call arguments.
 *
 * Reading goes the other way through [`crate::dump::Cursor`], which hands out
 * [`crate::dump::Scalar`]s instead of converting into caller chosen types.
 */

use super::{MessageRef, ObjectPath};
use ffi::c_int;
use utf8_cstr::Utf8CStr;

/// Fixed size values sd-bus can copy straight out of memory, given a pointer to them and their
/// type code.
///
/// # Safety
///
/// `dbus_type()` must name a fixed size basic type whose C representation is exactly `Self`;
/// sd-bus reads that many bytes from the pointer it gets.
pub unsafe trait SdBusMessageDirect {
    fn dbus_type() -> u8;
}

/// A value that can be appended to a method call as one argument.
pub trait ToSdBusMessage {
    fn to_message(&self, m: &mut MessageRef) -> crate::Result<()>;
}

impl<T: SdBusMessageDirect> ToSdBusMessage for T {
    fn to_message(&self, m: &mut MessageRef) -> crate::Result<()> {
        unsafe { m.append_basic_raw(T::dbus_type(), self as *const T as *const _) }
    }
}

macro_rules! msg_basic {
    ($($typ:ty : $dbus_type:expr),* $(,)?) => {
        $(
            unsafe impl SdBusMessageDirect for $typ {
                fn dbus_type() -> u8 { $dbus_type }
            }
        )*
    };
}

msg_basic! {
    u8: b'y',
    i16: b'n',
    u16: b'q',
    i32: b'i',
    u32: b'u',
    i64: b'x',
    u64: b't',
    f64: b'd',
}

impl ToSdBusMessage for bool {
    fn to_message(&self, m: &mut MessageRef) -> crate::Result<()> {
        // booleans go over the wire as a C int
        let b = c_int::from(*self);
        unsafe { m.append_basic_raw(b'b', &b as *const c_int as *const _) }
    }
}

// String likes are passed as the `const char *` itself.
impl ToSdBusMessage for &ObjectPath {
    fn to_message(&self, m: &mut MessageRef) -> crate::Result<()> {
        unsafe { m.append_basic_raw(b'o', self.as_ptr() as *const _) }
    }
}

impl ToSdBusMessage for &Utf8CStr {
    fn to_message(&self, m: &mut MessageRef) -> crate::Result<()> {
        unsafe { m.append_basic_raw(b's', self.as_ptr() as *const _) }
    }
}
