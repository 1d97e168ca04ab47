use crate::bus::{self, BusName, BusRef, InterfaceName, MemberName, Message, ObjectPath};
use crate::unit;
use cstr_argument::CStrArgument;
use std::error;
use std::ffi::CStr;
use std::fmt;
use std::io;
use utf8_cstr::Utf8CStr;

pub const SYSTEMD_DESTINATION: &str = "org.freedesktop.systemd1";
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
pub const SERVICE_INTERFACE: &str = "org.freedesktop.systemd1.Service";

/// A method call to make: who receives it, on which object and interface, and its string
/// arguments.
///
/// The default is `GetAll` of the service properties of `foobar.service`, roughly:
///
/// ```text
/// busctl --system call org.freedesktop.systemd1 /org/freedesktop/systemd1/unit/foobar_2eservice \
///     org.freedesktop.DBus.Properties GetAll s org.freedesktop.systemd1.Service
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub destination: String,
    pub path: String,
    pub interface: String,
    pub member: String,
    /// Appended in order, each with the signature `s`.
    pub args: Vec<String>,
}

impl Target {
    pub fn new<D, P, I, M>(destination: D, path: P, interface: I, member: M) -> Self
    where
        D: Into<String>,
        P: Into<String>,
        I: Into<String>,
        M: Into<String>,
    {
        Target {
            destination: destination.into(),
            path: path.into(),
            interface: interface.into(),
            member: member.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `org.freedesktop.DBus.Properties.GetAll` for the properties `unit` has on
    /// `unit_interface` (for example `org.freedesktop.systemd1.Service`).
    pub fn unit_properties(unit: &str, unit_interface: &str) -> Self {
        Target::new(
            SYSTEMD_DESTINATION,
            unit::object_path(unit),
            PROPERTIES_INTERFACE,
            "GetAll",
        )
        .arg(unit_interface)
    }

    /// Send the call over `bus` and wait for the reply, using the bus' default timeout.
    pub fn call(&self, bus: &mut BusRef) -> Result<Message, TransportError> {
        let destination = cstr(self.destination.as_str())?;
        let path = cstr(self.path.as_str())?;
        let interface = cstr(self.interface.as_str())?;
        let member = cstr(self.member.as_str())?;

        let destination =
            BusName::from_cstr(destination.as_ref()).map_err(TransportError::Invalid)?;
        let path = ObjectPath::from_cstr(path.as_ref()).map_err(TransportError::Invalid)?;
        let interface =
            InterfaceName::from_cstr(interface.as_ref()).map_err(TransportError::Invalid)?;
        let member = MemberName::from_cstr(member.as_ref()).map_err(TransportError::Invalid)?;

        let mut m = bus
            .new_method_call(destination, path, interface, member)
            .map_err(TransportError::Io)?;

        for arg in &self.args {
            let arg = cstr(arg.as_str())?;
            let arg: &CStr = arg.as_ref();
            let arg = Utf8CStr::from_bytes(arg.to_bytes_with_nul())
                .map_err(|_| TransportError::Invalid("Argument must be valid utf-8"))?;
            m.append(arg).map_err(TransportError::Io)?;
        }

        debug!("calling {}", self);
        let reply = m.call(0).map_err(TransportError::Bus)?;
        debug!("reply from {}: {:?}", self.destination, reply.signature());
        Ok(reply)
    }
}

fn cstr<A: CStrArgument>(a: A) -> Result<A::Output, TransportError> {
    a.try_into_cstr()
        .map_err(|_| TransportError::Invalid("Names and arguments must not contain '\\0'"))
}

impl Default for Target {
    fn default() -> Self {
        Target::unit_properties("foobar.service", SERVICE_INTERFACE)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "{} {} {}.{}(",
            self.destination, self.path, self.interface, self.member
        )?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                fmt.write_str(", ")?;
            }
            write!(fmt, "{:?}", arg)?;
        }
        fmt.write_str(")")
    }
}

/// A method call that did not produce a reply.
#[derive(Debug)]
pub enum TransportError {
    /// A name or argument of the [`Target`] is not valid.
    Invalid(&'static str),
    /// Building the call failed locally.
    Io(io::Error),
    /// The call failed: the peer replied with an error, or the bus could not deliver it.
    Bus(bus::Error),
}

impl TransportError {
    /// The negative errno describing this failure, in the style of sd-bus return values.
    pub fn errno(&self) -> Option<i32> {
        match self {
            TransportError::Invalid(_) => Some(-libc::EINVAL),
            TransportError::Io(e) => e.raw_os_error().map(|e| -e),
            TransportError::Bus(e) => Some(-e.errno()),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Invalid(e) => write!(fmt, "invalid target: {}", e),
            TransportError::Io(e) => write!(fmt, "{}", e),
            TransportError::Bus(e) => write!(fmt, "{}", e),
        }
    }
}

impl error::Error for TransportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            TransportError::Invalid(_) => None,
            TransportError::Io(e) => Some(e),
            TransportError::Bus(e) => Some(e),
        }
    }
}

impl From<bus::Error> for TransportError {
    fn from(e: bus::Error) -> Self {
        TransportError::Bus(e)
    }
}

#[test]
fn t_default_target() {
    let t = Target::default();
    assert_eq!(t.destination, "org.freedesktop.systemd1");
    assert_eq!(t.path, "/org/freedesktop/systemd1/unit/foobar_2eservice");
    assert_eq!(t.interface, "org.freedesktop.DBus.Properties");
    assert_eq!(t.member, "GetAll");
    assert_eq!(t.args, vec!["org.freedesktop.systemd1.Service".to_owned()]);
    assert_eq!(
        t.to_string(),
        "org.freedesktop.systemd1 /org/freedesktop/systemd1/unit/foobar_2eservice \
         org.freedesktop.DBus.Properties.GetAll(\"org.freedesktop.systemd1.Service\")"
    );
}

#[test]
fn t_transport_errno() {
    assert_eq!(TransportError::Invalid("x").errno(), Some(-libc::EINVAL));
    let e = TransportError::Io(io::Error::from_raw_os_error(libc::ECONNREFUSED));
    assert_eq!(e.errno(), Some(-libc::ECONNREFUSED));
    let e = TransportError::from(bus::Error::from_errno(libc::EACCES));
    assert_eq!(e.errno(), Some(-libc::EACCES));
}
