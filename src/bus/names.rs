//! Validated, nul terminated names used to address a method call.
//!
//! Rules are those of the dbus specification (0.26). sd-bus additionally requires every name to
//! be nul (`'\0'`) terminated, so all constructors take the terminating byte as part of the input.

use ffi::c_char;
use std::ffi::CStr;
use std::fmt;
use std::ops::Deref;
use std::result;

const MAX_NAME_LEN: usize = 255;

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident, $validate:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        pub struct $name {
            inner: CStr,
        }

        impl $name {
            /// Create a reference from a `'\0'` terminated byte slice, checking all the
            /// requirements of this kind of name.
            pub fn from_bytes(b: &[u8]) -> result::Result<&Self, &'static str> {
                $validate(b)?;
                Ok(unsafe { Self::from_bytes_unchecked(b) })
            }

            pub fn from_cstr(s: &CStr) -> result::Result<&Self, &'static str> {
                Self::from_bytes(s.to_bytes_with_nul())
            }

            /// # Safety
            ///
            /// - `b` must be nul (`'\0'`) terminated, with no interior nul bytes
            /// - `b` must be a valid name of this kind
            #[inline]
            pub unsafe fn from_bytes_unchecked(b: &[u8]) -> &Self {
                &*(CStr::from_bytes_with_nul_unchecked(b) as *const CStr as *const Self)
            }

            /// # Safety
            ///
            /// - `b` must point to a nul terminated string which lives at least as long as `'a`
            /// - the string must be a valid name of this kind
            #[inline]
            pub unsafe fn from_ptr_unchecked<'a>(b: *const c_char) -> &'a Self {
                Self::from_bytes_unchecked(CStr::from_ptr(b).to_bytes_with_nul())
            }

            /// The name without its terminating nul byte.
            pub fn as_str(&self) -> &str {
                // validation only admits ascii
                unsafe { std::str::from_utf8_unchecked(self.inner.to_bytes()) }
            }
        }

        impl Deref for $name {
            type Target = CStr;
            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.debug_tuple(stringify!($name)).field(&self.as_str()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.write_str(self.as_str())
            }
        }
    };
}

/// Split off the terminating nul, rejecting input that has none or that has one too early.
fn body(b: &[u8]) -> result::Result<&[u8], &'static str> {
    match memchr::memchr(0, b) {
        Some(i) if i + 1 == b.len() => Ok(&b[..i]),
        Some(_) => Err("Name must not contain '\\0' before its end"),
        None => Err("Name must be terminated in a '\\0' byte (for use by sd-bus)"),
    }
}

name_type! {
    /// A valid dbus object path.
    ///
    /// - begins with '/' and consists of elements separated by '/'
    /// - elements only contain '[A-Z][a-z][0-9]_' and are never empty
    /// - no trailing '/', unless the path is the root path
    ObjectPath, validate_object_path
}

fn validate_object_path(b: &[u8]) -> result::Result<(), &'static str> {
    let p = body(b)?;
    if p.is_empty() {
        return Err("Path must have at least 1 character ('/')");
    }
    if p[0] != b'/' {
        return Err("Path must begin with '/'");
    }
    if p.len() > 1 && p[p.len() - 1] == b'/' {
        return Err("Path must not end in '/' unless it is the root path");
    }

    let mut prev = b'/';
    for &c in &p[1..] {
        match c {
            b'/' if prev == b'/' => return Err("Path must not have 2 '/' next to each other"),
            b'/' | b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' => {}
            _ => return Err("Invalid character in path, only '[A-Z][a-z][0-9]_/' allowed"),
        }
        prev = c;
    }
    Ok(())
}

name_type! {
    /// A valid dbus interface name.
    ///
    /// - at least 2 elements separated by '.', none of them empty
    /// - elements only contain '[A-Z][a-z][0-9]_' and do not begin with a digit
    /// - at most 255 characters
    InterfaceName, validate_interface_name
}

fn validate_interface_name(b: &[u8]) -> result::Result<(), &'static str> {
    let n = body(b)?;
    if n.is_empty() {
        return Err("Name must have more than 0 characters");
    }
    if n.len() > MAX_NAME_LEN {
        return Err("Must be shorter than 255 characters");
    }

    let mut elements = 0;
    for e in n.split(|c| *c == b'.') {
        match e.first() {
            None => return Err("Elements may not be empty"),
            Some(b'0'..=b'9') => return Err("Name element must not start with '[0-9]'"),
            Some(_) => {}
        }
        if !e.iter().all(|c| c.is_ascii_alphanumeric() || *c == b'_') {
            return Err("Invalid character in interface name, only '[A-Z][a-z][0-9]_\\.' allowed");
        }
        elements += 1;
    }

    if elements < 2 {
        return Err("Name must have at least 2 elements");
    }
    Ok(())
}

name_type! {
    /// A valid dbus bus name, either unique (`:1.42`) or well-known (`org.freedesktop.systemd1`).
    ///
    /// - at least 2 elements separated by '.', none of them empty
    /// - elements only contain '[A-Z][a-z][0-9]_-'
    /// - only elements of unique names may begin with a digit
    /// - at most 255 characters
    BusName, validate_bus_name
}

fn validate_bus_name(b: &[u8]) -> result::Result<(), &'static str> {
    let n = body(b)?;
    if n.is_empty() {
        return Err("Name must have more than 0 characters");
    }
    if n.len() > MAX_NAME_LEN {
        return Err("Must be shorter than 255 characters");
    }

    let (is_unique, n) = match n.split_first() {
        Some((b':', rest)) => (true, rest),
        _ => (false, n),
    };

    let mut elements = 0;
    for e in n.split(|c| *c == b'.') {
        match e.first() {
            None => return Err("Elements may not be empty"),
            Some(b'0'..=b'9') if !is_unique => {
                return Err("Name element must not start with '[0-9]'")
            }
            Some(_) => {}
        }
        if !e
            .iter()
            .all(|c| c.is_ascii_alphanumeric() || *c == b'_' || *c == b'-')
        {
            return Err("Invalid character in bus name, only '[A-Z][a-z][0-9]_-\\.' allowed");
        }
        elements += 1;
    }

    if elements < 2 {
        return Err("Name must have at least 2 elements");
    }
    Ok(())
}

name_type! {
    /// A valid dbus member (method or signal) name.
    ///
    /// - only '[A-Z][a-z][0-9]_', not beginning with a digit
    /// - between 1 and 255 characters
    MemberName, validate_member_name
}

fn validate_member_name(b: &[u8]) -> result::Result<(), &'static str> {
    let n = body(b)?;
    match n.first() {
        None => return Err("Name must have more than 0 characters"),
        Some(b'0'..=b'9') => return Err("Must begin with '[A-Z][a-z]_'"),
        Some(_) => {}
    }
    if n.len() > MAX_NAME_LEN {
        return Err("Must be shorter than 255 characters");
    }
    if !n.iter().all(|c| c.is_ascii_alphanumeric() || *c == b'_') {
        return Err("Invalid character in member name, only '[A-Z][a-z][0-9]_' allowed");
    }
    Ok(())
}

#[test]
fn t_path() {
    ObjectPath::from_bytes(b"/\0").unwrap();
    ObjectPath::from_bytes(b"\0").err().unwrap();
    ObjectPath::from_bytes(b"/").err().unwrap();
    ObjectPath::from_bytes(b"/h\0").unwrap();
    ObjectPath::from_bytes(b"/hello\0").unwrap();
    ObjectPath::from_bytes(b"/hello/\0").err().unwrap();
    ObjectPath::from_bytes(b"//hello\0").err().unwrap();
    ObjectPath::from_bytes(b"/hello/goodbye/013/4/HA\0").unwrap();
    ObjectPath::from_bytes(b"/hello/goodbye/013/4?/HA\0")
        .err()
        .unwrap();
    ObjectPath::from_bytes(b"/org/freedesktop/systemd1/unit/foobar_2eservice\0").unwrap();
    ObjectPath::from_bytes(b"/a\0b\0").err().unwrap();
}

#[test]
fn t_interface() {
    InterfaceName::from_bytes(b"12\0").err().unwrap();
    InterfaceName::from_bytes(b"a\0").err().unwrap();
    InterfaceName::from_bytes(b"a.b\0").unwrap();
    InterfaceName::from_bytes(b"a.b.3\0").err().unwrap();
    InterfaceName::from_bytes(b"A.Z.xar.yfds.d3490\0").unwrap();
    InterfaceName::from_bytes(b"a.b.c\0").unwrap();
    InterfaceName::from_bytes(b"a.b.c?\0").err().unwrap();
    InterfaceName::from_bytes(b"a..b\0").err().unwrap();
    InterfaceName::from_bytes(b"a.b.\0").err().unwrap();
    InterfaceName::from_bytes(b"org.freedesktop.DBus.Properties\0").unwrap();
}

#[test]
fn t_busname() {
    BusName::from_bytes(b"a.b\0").unwrap();
    BusName::from_bytes(b"a.b").err().unwrap();
    BusName::from_bytes(b"a\0").err().unwrap();
    BusName::from_bytes(b"a.b?\0").err().unwrap();
    BusName::from_bytes(b"a.b-c.a0\0").unwrap();
    BusName::from_bytes(b"a.b-c.0a\0").err().unwrap();
    BusName::from_bytes(b":a.b-c\0").unwrap();
    BusName::from_bytes(b":a.b-c.1\0").unwrap();
    BusName::from_bytes(b":1.42\0").unwrap();
    BusName::from_bytes(b".a.b\0").err().unwrap();
    assert_eq!(
        BusName::from_bytes(b"org.freedesktop.systemd1\0")
            .unwrap()
            .as_str(),
        "org.freedesktop.systemd1"
    );
}

#[test]
fn t_member_name() {
    MemberName::from_bytes(b"abc13\0").unwrap();
    MemberName::from_bytes(b"abc.13\0").err().unwrap();
    MemberName::from_bytes(b"1234abc\0").err().unwrap();
    MemberName::from_bytes(b"abc").err().unwrap();
    MemberName::from_bytes(b"\0").err().unwrap();
    MemberName::from_bytes(b"a\0").unwrap();
    MemberName::from_bytes(b"GetAll\0").unwrap();
}
