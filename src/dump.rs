//! The message tree printer.
//!
//! A payload is printed as one bracketed block:
//!
//! ```text
//! [
//! 'Type' 'simple'
//! 'ExecMainPID' 1234
//! ]
//! ```
//!
//! Primitive values are separated by single spaces. A line ends whenever a container closes back
//! to the top two nesting levels, so every entry of a top-level array (for example every property
//! of a `Properties.GetAll` reply) lands on its own line.
//!
//! The walk is an explicit loop over a [`Cursor`] with an integer depth counter, so deeply nested
//! payloads do not grow the call stack.

use memchr::memchr;
use std::error;
use std::fmt;
use std::io::{self, Write};

/// Printed in place of a value whose type code is not one we know how to decode.
pub const UNDEFINED_TYPE: &str = "<type not defined>";

/// Depth while reading the top-level sequence, before any container was entered.
const NOT_ENTERED: i32 = -1;

/// Type codes `sd_bus_message_peek_type()` reports for containers.
const CONTAINER_CODES: &[u8] = b"avre";

/// Returns true if `code` is the type code of an array, variant, struct or dict entry.
#[inline]
pub fn is_container(code: u8) -> bool {
    memchr(code, CONTAINER_CODES).is_some()
}

/// The kinds of values that may appear in a D-Bus message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WireKind {
    Byte,
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    UnixFd,
    Array,
    Variant,
    Struct,
    DictEntry,
}

impl WireKind {
    /// Map a type code, as returned by a cursor peek, to its kind.
    ///
    /// Structs and dict entries use the codes `'r'` and `'e'`, not their signature delimiters.
    pub fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            b'y' => WireKind::Byte,
            b'b' => WireKind::Boolean,
            b'n' => WireKind::Int16,
            b'q' => WireKind::UInt16,
            b'i' => WireKind::Int32,
            b'u' => WireKind::UInt32,
            b'x' => WireKind::Int64,
            b't' => WireKind::UInt64,
            b'd' => WireKind::Double,
            b's' => WireKind::String,
            b'o' => WireKind::ObjectPath,
            b'g' => WireKind::Signature,
            b'h' => WireKind::UnixFd,
            b'a' => WireKind::Array,
            b'v' => WireKind::Variant,
            b'r' => WireKind::Struct,
            b'e' => WireKind::DictEntry,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> u8 {
        match self {
            WireKind::Byte => b'y',
            WireKind::Boolean => b'b',
            WireKind::Int16 => b'n',
            WireKind::UInt16 => b'q',
            WireKind::Int32 => b'i',
            WireKind::UInt32 => b'u',
            WireKind::Int64 => b'x',
            WireKind::UInt64 => b't',
            WireKind::Double => b'd',
            WireKind::String => b's',
            WireKind::ObjectPath => b'o',
            WireKind::Signature => b'g',
            WireKind::UnixFd => b'h',
            WireKind::Array => b'a',
            WireKind::Variant => b'v',
            WireKind::Struct => b'r',
            WireKind::DictEntry => b'e',
        }
    }

    #[inline]
    pub fn is_container(self) -> bool {
        is_container(self.code())
    }
}

/// A primitive value read out of a message.
///
/// String-like values borrow from the cursor they were read from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Scalar<'a> {
    Byte(u8),
    Boolean(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(&'a str),
    ObjectPath(&'a str),
    Signature(&'a str),
    /// The raw descriptor number, which is not checked for validity.
    UnixFd(i32),
}

impl Scalar<'_> {
    pub fn kind(&self) -> WireKind {
        match self {
            Scalar::Byte(_) => WireKind::Byte,
            Scalar::Boolean(_) => WireKind::Boolean,
            Scalar::Int16(_) => WireKind::Int16,
            Scalar::UInt16(_) => WireKind::UInt16,
            Scalar::Int32(_) => WireKind::Int32,
            Scalar::UInt32(_) => WireKind::UInt32,
            Scalar::Int64(_) => WireKind::Int64,
            Scalar::UInt64(_) => WireKind::UInt64,
            Scalar::Double(_) => WireKind::Double,
            Scalar::String(_) => WireKind::String,
            Scalar::ObjectPath(_) => WireKind::ObjectPath,
            Scalar::Signature(_) => WireKind::Signature,
            Scalar::UnixFd(_) => WireKind::UnixFd,
        }
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scalar::Byte(v) => write!(fmt, "{}", v),
            Scalar::Boolean(v) => write!(fmt, "{}", v as u8),
            Scalar::Int16(v) => write!(fmt, "{}", v),
            Scalar::UInt16(v) => write!(fmt, "{}", v),
            Scalar::Int32(v) => write!(fmt, "{}", v),
            Scalar::UInt32(v) => write!(fmt, "{}", v),
            Scalar::Int64(v) => write!(fmt, "{}", v),
            Scalar::UInt64(v) => write!(fmt, "{}", v),
            Scalar::Double(v) => write!(fmt, "{}", v),
            Scalar::String(s) | Scalar::ObjectPath(s) | Scalar::Signature(s) => {
                write!(fmt, "'{}'", s)
            }
            Scalar::UnixFd(v) => write!(fmt, "{}", v),
        }
    }
}

/// A forward-only reader over the values of a message.
///
/// Errors are reported as `io::Error`s carrying the (positive) errno of the failure, matching
/// what sd-bus returns for the same conditions.
pub trait Cursor {
    /// Type code of the next value in the current container, or `None` once the container (or
    /// the top-level sequence) has no more values.
    fn peek_type(&mut self) -> io::Result<Option<u8>>;

    /// Consume the next value, which must be a primitive of `kind`.
    fn read(&mut self, kind: WireKind) -> io::Result<Scalar<'_>>;

    /// Consume the next value without decoding it.
    fn skip(&mut self) -> io::Result<()>;

    /// Enter the container at the cursor. `code` must match its type code.
    fn enter(&mut self, code: u8) -> io::Result<()>;

    /// Leave the current container. All of its values must have been consumed.
    fn exit(&mut self) -> io::Result<()>;
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn peek_type(&mut self) -> io::Result<Option<u8>> {
        (**self).peek_type()
    }

    fn read(&mut self, kind: WireKind) -> io::Result<Scalar<'_>> {
        (**self).read(kind)
    }

    fn skip(&mut self) -> io::Result<()> {
        (**self).skip()
    }

    fn enter(&mut self, code: u8) -> io::Result<()> {
        (**self).enter(code)
    }

    fn exit(&mut self) -> io::Result<()> {
        (**self).exit()
    }
}

/// The cursor operation that failed during a dump.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CursorOp {
    Peek,
    Read,
    Skip,
    Enter,
    Exit,
}

impl fmt::Display for CursorOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            CursorOp::Peek => "peek type",
            CursorOp::Read => "read value",
            CursorOp::Skip => "skip value",
            CursorOp::Enter => "enter container",
            CursorOp::Exit => "exit container",
        })
    }
}

/// Why a dump stopped early.
#[derive(Debug)]
pub enum DecodeError {
    /// A cursor operation failed. The walk does not continue past it.
    Cursor { op: CursorOp, source: io::Error },
    /// Writing to the output failed.
    Output(io::Error),
}

impl DecodeError {
    fn cursor(op: CursorOp) -> impl FnOnce(io::Error) -> DecodeError {
        move |source| DecodeError::Cursor { op, source }
    }

    /// The failing cursor operation, if the failure came from the cursor.
    pub fn op(&self) -> Option<CursorOp> {
        match self {
            DecodeError::Cursor { op, .. } => Some(*op),
            DecodeError::Output(_) => None,
        }
    }

    /// The negative status of the failure, in the style of sd-bus return values.
    pub fn errno(&self) -> Option<i32> {
        let e = match self {
            DecodeError::Cursor { source, .. } => source,
            DecodeError::Output(e) => e,
        };
        e.raw_os_error().map(|e| -e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Cursor { op, source } => write!(fmt, "failed to {}: {}", op, source),
            DecodeError::Output(e) => write!(fmt, "failed to write output: {}", e),
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DecodeError::Cursor { source, .. } => Some(source),
            DecodeError::Output(e) => Some(e),
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        DecodeError::Output(e)
    }
}

/// How containers show up in the output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Containers print nothing themselves, nesting is only visible through line breaks.
    Flat,
    /// Each container is wrapped in delimiters: `[..]` for arrays, `(..)` for structs, `{..}`
    /// for dict entries and `<..>` for variants.
    Nested,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Flat
    }
}

fn delimiters(code: u8) -> (&'static str, &'static str) {
    match code {
        b'a' => ("[", "]"),
        b'r' => ("(", ")"),
        b'e' => ("{", "}"),
        _ => ("<", ">"),
    }
}

/// Prints message payloads to a writer.
///
/// A `Printer` may be reused for several dumps; each dump starts from a clean state.
#[derive(Debug)]
pub struct Printer<W> {
    out: W,
    layout: Layout,
    depth: i32,
    // closing delimiters of the containers we are in, only tracked for `Layout::Nested`
    closers: Vec<&'static str>,
    line_open: bool,
    glue: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Printer {
            out,
            layout: Layout::default(),
            depth: NOT_ENTERED,
            closers: Vec::new(),
            line_open: false,
            glue: false,
        }
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Walk every remaining value of `cursor` and print it.
    ///
    /// The first failing cursor operation aborts the walk; nothing is written after it.
    pub fn dump<C: Cursor + ?Sized>(&mut self, cursor: &mut C) -> Result<(), DecodeError> {
        self.depth = NOT_ENTERED;
        self.closers.clear();
        self.line_open = false;
        self.glue = false;

        debug!("dump: start");
        self.out.write_all(b"[\n")?;

        loop {
            let code = cursor
                .peek_type()
                .map_err(DecodeError::cursor(CursorOp::Peek))?;

            match code {
                Some(code) if is_container(code) => {
                    cursor
                        .enter(code)
                        .map_err(DecodeError::cursor(CursorOp::Enter))?;
                    self.depth += 1;
                    trace!("dump: entered {:?} at depth {}", code as char, self.depth);
                    if self.layout == Layout::Nested {
                        let (open, close) = delimiters(code);
                        self.closers.push(close);
                        self.open(open)?;
                    }
                }
                Some(code) => match WireKind::from_code(code) {
                    Some(kind) => {
                        let value = cursor
                            .read(kind)
                            .map_err(DecodeError::cursor(CursorOp::Read))?;
                        self.token(value)?;
                    }
                    None => {
                        warn!("dump: type code {:?} is not defined, skipping", code as char);
                        cursor.skip().map_err(DecodeError::cursor(CursorOp::Skip))?;
                        self.token(UNDEFINED_TYPE)?;
                    }
                },
                None if self.depth == NOT_ENTERED => break,
                None => {
                    cursor
                        .exit()
                        .map_err(DecodeError::cursor(CursorOp::Exit))?;
                    self.depth -= 1;
                    trace!("dump: exited to depth {}", self.depth);
                    if let Some(close) = self.closers.pop() {
                        self.close(close)?;
                    }
                    if self.depth <= 0 {
                        self.end_line()?;
                    }
                }
            }
        }

        self.end_line()?;
        self.out.write_all(b"]\n")?;
        debug!("dump: done");
        Ok(())
    }

    fn token<T: fmt::Display>(&mut self, t: T) -> io::Result<()> {
        if self.line_open && !self.glue {
            self.out.write_all(b" ")?;
        }
        write!(self.out, "{}", t)?;
        self.line_open = true;
        self.glue = false;
        Ok(())
    }

    fn open(&mut self, delim: &str) -> io::Result<()> {
        self.token(delim)?;
        self.glue = true;
        Ok(())
    }

    fn close(&mut self, delim: &str) -> io::Result<()> {
        self.out.write_all(delim.as_bytes())?;
        self.line_open = true;
        self.glue = false;
        Ok(())
    }

    fn end_line(&mut self) -> io::Result<()> {
        if self.line_open {
            self.out.write_all(b"\n")?;
        }
        self.line_open = false;
        self.glue = false;
        Ok(())
    }
}

/// Print every remaining value of `cursor` to `out` using the default [`Layout`].
pub fn dump<C: Cursor + ?Sized, W: Write>(cursor: &mut C, out: W) -> Result<(), DecodeError> {
    Printer::new(out).dump(cursor)
}

/// Render every remaining value of `cursor` into a `String`.
pub fn to_string<C: Cursor + ?Sized>(cursor: &mut C, layout: Layout) -> Result<String, DecodeError> {
    let mut p = Printer::new(Vec::new()).layout(layout);
    p.dump(cursor)?;
    // everything written is either ascii or taken from `&str` values
    Ok(String::from_utf8_lossy(&p.into_inner()).into_owned())
}

#[test]
fn t_container_codes() {
    for c in b"avre" {
        assert!(is_container(*c));
        assert!(WireKind::from_code(*c).unwrap().is_container());
    }
    for c in b"ybnqiuxtdsogh" {
        assert!(!is_container(*c));
        assert_eq!(WireKind::from_code(*c).unwrap().code(), *c);
    }
    assert!(!is_container(b'('));
    assert!(!is_container(0));
    assert_eq!(WireKind::from_code(b'{'), None);
    assert_eq!(WireKind::from_code(b'z'), None);
}

#[test]
fn t_scalar_display() {
    let samples = vec![
        (Scalar::Byte(255), "255"),
        (Scalar::Boolean(true), "1"),
        (Scalar::Boolean(false), "0"),
        (Scalar::Int16(-3), "-3"),
        (Scalar::UInt16(65535), "65535"),
        (Scalar::Int32(i32::MIN), "-2147483648"),
        (Scalar::UInt32(42), "42"),
        (Scalar::Int64(-9000000000), "-9000000000"),
        (Scalar::UInt64(u64::MAX), "18446744073709551615"),
        (Scalar::Double(1.5), "1.5"),
        (Scalar::Double(0.1), "0.1"),
        (Scalar::Double(2.0), "2"),
        (Scalar::String("it's"), "'it's'"),
        (Scalar::ObjectPath("/org/freedesktop/systemd1"), "'/org/freedesktop/systemd1'"),
        (Scalar::Signature("a{sv}"), "'a{sv}'"),
        (Scalar::UnixFd(-1), "-1"),
    ];

    for (value, expected) in samples {
        assert_eq!(value.to_string(), expected, "{:?}", value);
    }
}

#[test]
fn t_decode_error() {
    let e = DecodeError::Cursor {
        op: CursorOp::Exit,
        source: io::Error::from_raw_os_error(libc::EBUSY),
    };
    assert_eq!(e.op(), Some(CursorOp::Exit));
    assert_eq!(e.errno(), Some(-libc::EBUSY));
    assert!(e.to_string().starts_with("failed to exit container: "));

    let e = DecodeError::from(io::Error::new(io::ErrorKind::WriteZero, "full"));
    assert_eq!(e.op(), None);
    assert_eq!(e.errno(), None);
}
