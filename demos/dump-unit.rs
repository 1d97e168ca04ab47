#![warn(rust_2018_idioms)]

// Print every property `foobar.service` has on org.freedesktop.systemd1.Service, approximately:
//     busctl --system call org.freedesktop.systemd1 /org/freedesktop/systemd1/unit/foobar_2eservice org.freedesktop.DBus.Properties GetAll "s" "org.freedesktop.systemd1.Service"
//
// Set RUST_LOG=debug to see the call being made.

use log::error;
use sdbus_dump::bus::Bus;
use sdbus_dump::target::Target;
use std::io::{self, Write};
use std::process;

fn fail(step: &str, e: &dyn std::fmt::Display, errno: Option<i32>) -> ! {
    error!("{}: {}", step, e);
    process::exit(errno.unwrap_or(1))
}

fn main() {
    pretty_env_logger::init();

    let mut bus = match Bus::default_system() {
        Ok(bus) => bus,
        Err(e) => fail("failed to connect to system bus", &e, e.raw_os_error().map(|e| -e)),
    };

    let target = Target::default();
    let mut reply = match target.call(&mut bus) {
        Ok(reply) => reply,
        Err(e) => fail("failed to issue method call", &e, e.errno()),
    };

    let mut iter = match reply.iter() {
        Ok(iter) => iter,
        Err(e) => fail("failed to read reply", &e, e.raw_os_error().map(|e| -e)),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = sdbus_dump::dump(&mut iter, &mut out) {
        fail("failed to parse response message", &e, e.errno());
    }
    if let Err(e) = out.flush() {
        fail("failed to write output", &e, e.raw_os_error().map(|e| -e));
    }
}
