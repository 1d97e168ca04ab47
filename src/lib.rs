#![warn(rust_2018_idioms)]
#![cfg_attr(feature = "unstable-doc-cfg", feature(doc_cfg))]

//! Render the payload of sd-bus messages as text.
//!
//! The core is [`dump`], a depth-first walk over any [`dump::Cursor`]. Cursors exist for real
//! replies received over the bus ([`bus::MessageIter`]) and for in-memory values
//! ([`value::ValueCursor`]).

#[macro_use]
extern crate log;
#[cfg(feature = "bus")]
extern crate libsystemd_sys as ffi;

pub use std::io::{Error, Result};

/// An analogue of `try!()` for systemd FFI calls.
///
/// The parameter should be a call to a systemd FFI fn with an i32 return
/// value. It is called, and if the return is negative then `sd_try!()`
/// interprets it as an error code and returns IoError from the enclosing fn.
/// Otherwise, the value of `sd_try!()` is the non-negative value returned by
/// the FFI call.
#[cfg(feature = "bus")]
macro_rules! sd_try {
    ($e:expr) => {{
        let ret: i32;
        #[allow(unused_unsafe)]
        unsafe {
            ret = $e;
        }
        if ret < 0 {
            return Err($crate::Error::from_raw_os_error(-ret));
        }
        ret
    }};
}

/// Convert a systemd ffi return value into a Result
#[cfg(feature = "bus")]
pub(crate) fn ffi_result(ret: ffi::c_int) -> Result<ffi::c_int> {
    if ret < 0 {
        Err(Error::from_raw_os_error(-ret))
    } else {
        Ok(ret)
    }
}

/// Walk a message payload and print it.
pub mod dump;

/// Owned message payloads and a cursor over them.
pub mod value;

/// Helpers for naming systemd units on the bus.
pub mod unit;

/// Safe wrappers for the sd-bus calls needed to fetch a reply.
#[cfg(feature = "bus")]
#[cfg_attr(feature = "unstable-doc-cfg", doc(cfg(feature = "bus")))]
pub mod bus;

/// Where a method call goes and what it carries.
#[cfg(feature = "bus")]
#[cfg_attr(feature = "unstable-doc-cfg", doc(cfg(feature = "bus")))]
pub mod target;

pub use dump::{dump, DecodeError, Layout, Printer};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
