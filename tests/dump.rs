extern crate sdbus_dump;

use sdbus_dump::dump::{self, Cursor, CursorOp, Scalar, WireKind};
use sdbus_dump::value::{Value, ValueCursor};
use sdbus_dump::{DecodeError, Layout, Printer};
use std::io;

fn flat(values: &[Value]) -> String {
    dump::to_string(&mut ValueCursor::new(values), Layout::Flat).unwrap()
}

fn nested(values: &[Value]) -> String {
    dump::to_string(&mut ValueCursor::new(values), Layout::Nested).unwrap()
}

#[test]
fn primitives_share_a_line() {
    let values = [Value::from("ok"), Value::from(42i32)];
    assert_eq!(flat(&values), "[\n'ok' 42\n]\n");
}

#[test]
fn empty_payload() {
    assert_eq!(flat(&[]), "[\n]\n");
    assert_eq!(nested(&[]), "[\n]\n");
}

#[test]
fn top_level_array_ends_line() {
    let values = [
        Value::from("x"),
        Value::array("i", vec![1i32.into(), 2i32.into()]),
    ];
    assert_eq!(flat(&values), "[\n'x' 1 2\n]\n");
    assert_eq!(nested(&values), "[\n'x' [1 2]\n]\n");
}

#[test]
fn empty_containers_print_nothing_flat() {
    let values = [
        Value::array("s", vec![]),
        Value::Struct(vec![]),
        Value::from(true),
    ];
    assert_eq!(flat(&values), "[\n1\n]\n");
    assert_eq!(nested(&values), "[\n[]\n()\n1\n]\n");
}

#[test]
fn every_kind() {
    let values = [
        Value::Byte(7),
        Value::Boolean(false),
        Value::Int16(-2),
        Value::UInt16(2),
        Value::Int32(-4),
        Value::UInt32(4),
        Value::Int64(-8),
        Value::UInt64(8),
        Value::Double(0.25),
        Value::String("s".into()),
        Value::ObjectPath("/o".into()),
        Value::Signature("a{sv}".into()),
        Value::UnixFd(3),
    ];
    assert_eq!(
        flat(&values),
        "[\n7 0 -2 2 -4 4 -8 8 0.25 's' '/o' 'a{sv}' 3\n]\n"
    );
}

#[test]
fn properties_one_per_line() {
    let props = [Value::properties(vec![
        ("Type", Value::from("simple")),
        ("MainPID", Value::from(1234u32)),
        ("Restart", Value::from("no")),
        (
            "ExecStart",
            Value::array(
                "(sasb)",
                vec![Value::Struct(vec![
                    Value::from("/usr/bin/foobar"),
                    Value::array("s", vec!["/usr/bin/foobar".into(), "-v".into()]),
                    Value::from(false),
                ])],
            ),
        ),
    ])];

    assert_eq!(
        flat(&props),
        "[\n\
         'Type' 'simple'\n\
         'MainPID' 1234\n\
         'Restart' 'no'\n\
         'ExecStart' '/usr/bin/foobar' '/usr/bin/foobar' '-v' 0\n\
         ]\n"
    );

    assert_eq!(
        nested(&props),
        "[\n\
         [{'Type' <'simple'>}\n\
         {'MainPID' <1234>}\n\
         {'Restart' <'no'>}\n\
         {'ExecStart' <[('/usr/bin/foobar' ['/usr/bin/foobar' '-v'] 0)]>}\n\
         ]\n\
         ]\n"
    );
}

#[test]
fn deep_nesting() {
    let mut v = Value::from(1u8);
    for _ in 0..1000 {
        v = Value::variant(v);
    }
    let values = [v, Value::from(2u8)];
    assert_eq!(flat(&values), "[\n1\n2\n]\n");
}

#[test]
fn unknown_type_is_skipped() {
    let values = [
        Value::from("a"),
        Value::Unknown(b'z'),
        Value::from("b"),
        Value::array("y", vec![Value::Unknown(b'm'), 5u8.into()]),
    ];
    assert_eq!(
        flat(&values),
        "[\n'a' <type not defined> 'b' <type not defined> 5\n]\n"
    );
}

#[test]
fn idempotent() {
    let values = [Value::properties(vec![("A", 1i32), ("B", 2i32)])];
    let first = flat(&values);
    assert_eq!(first, "[\n'A' 1\n'B' 2\n]\n");
    assert_eq!(flat(&values), first);
}

/// Fails every peek after `ok` successful ones.
struct FailingPeek<C> {
    inner: C,
    ok: usize,
}

impl<C: Cursor> Cursor for FailingPeek<C> {
    fn peek_type(&mut self) -> io::Result<Option<u8>> {
        if self.ok == 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADMSG));
        }
        self.ok -= 1;
        self.inner.peek_type()
    }

    fn read(&mut self, kind: WireKind) -> io::Result<Scalar<'_>> {
        self.inner.read(kind)
    }

    fn skip(&mut self) -> io::Result<()> {
        self.inner.skip()
    }

    fn enter(&mut self, code: u8) -> io::Result<()> {
        self.inner.enter(code)
    }

    fn exit(&mut self) -> io::Result<()> {
        self.inner.exit()
    }
}

#[test]
fn cursor_failure_stops_output() {
    let values = [Value::from("ok"), Value::from(42i32)];
    let mut c = FailingPeek {
        inner: ValueCursor::new(&values),
        ok: 1,
    };

    let mut p = Printer::new(Vec::new());
    let e = p.dump(&mut c).unwrap_err();
    assert_eq!(e.op(), Some(CursorOp::Peek));
    assert_eq!(e.errno(), Some(-libc::EBADMSG));
    assert!(e.errno().unwrap() < 0);
    assert_eq!(p.get_ref().as_slice(), b"[\n'ok'");
}

/// Reports a struct as drained one value too early, so the walk tries to leave it while it still
/// holds a value.
struct ShortStruct<'a> {
    inner: ValueCursor<'a>,
}

impl Cursor for ShortStruct<'_> {
    fn peek_type(&mut self) -> io::Result<Option<u8>> {
        if self.inner.depth() > 0 {
            return Ok(None);
        }
        self.inner.peek_type()
    }

    fn read(&mut self, kind: WireKind) -> io::Result<Scalar<'_>> {
        self.inner.read(kind)
    }

    fn skip(&mut self) -> io::Result<()> {
        self.inner.skip()
    }

    fn enter(&mut self, code: u8) -> io::Result<()> {
        self.inner.enter(code)
    }

    fn exit(&mut self) -> io::Result<()> {
        self.inner.exit()
    }
}

#[test]
fn structural_error() {
    let values = [Value::Struct(vec![1u8.into()])];
    let mut p = Printer::new(Vec::new()).layout(Layout::Nested);

    let e = p
        .dump(&mut ShortStruct {
            inner: ValueCursor::new(&values),
        })
        .unwrap_err();
    match e {
        DecodeError::Cursor {
            op: CursorOp::Exit,
            ref source,
        } => assert_eq!(source.raw_os_error(), Some(libc::EBUSY)),
        ref e => panic!("unexpected error: {}", e),
    }
    assert_eq!(e.errno(), Some(-libc::EBUSY));
    assert_eq!(p.get_ref().as_slice(), b"[\n(");

    // the printer starts over on the next dump
    p.dump(&mut ValueCursor::new(&values)).unwrap();
    assert_eq!(p.into_inner(), b"[\n([\n(1)\n]\n".to_vec());
}

#[test]
fn printer_reuse() {
    let a = [Value::from(1u8)];
    let b = [Value::array("y", vec![2u8.into()]), Value::from(3u8)];

    let mut p = Printer::new(Vec::new());
    p.dump(&mut ValueCursor::new(&a)).unwrap();
    p.dump(&mut ValueCursor::new(&b)).unwrap();
    assert_eq!(p.into_inner(), b"[\n1\n]\n[\n2\n3\n]\n".to_vec());
}

struct Full;

impl io::Write for Full {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::from_raw_os_error(libc::ENOSPC))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn output_error() {
    let values = [Value::from(1u8)];
    let e = sdbus_dump::dump(&mut ValueCursor::new(&values), Full).unwrap_err();
    assert!(matches!(e, DecodeError::Output(_)));
    assert_eq!(e.op(), None);
    assert_eq!(e.errno(), Some(-libc::ENOSPC));
}
