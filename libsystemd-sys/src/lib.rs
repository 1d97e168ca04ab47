//! Low-level bindings to the parts of libsystemd used for synchronous sd-bus method calls.
//!
//! Items in this crate corresponding to systemd functions are documented by the systemd man
//! pages (`man 3 sd-bus`).

pub use libc::{c_char, c_int, c_void};

#[cfg(feature = "bus")]
pub mod bus;
