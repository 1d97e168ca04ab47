//! Owned message payloads.
//!
//! [`Value`] is a tree of D-Bus values that can be built by hand, and [`ValueCursor`] walks it
//! with the same semantics as a cursor over a received sd-bus message: entering advances past
//! the container, non-array containers must be fully consumed before they are left, and type
//! mismatches fail with `ENXIO`.

use crate::dump::{Cursor, Scalar, WireKind};
use std::io;
use std::slice;

/// One typed value of a message payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(u8),
    Boolean(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(String),
    ObjectPath(String),
    Signature(String),
    UnixFd(i32),
    /// `element` is the signature of a single item, for example `"{sv}"`.
    Array { element: String, items: Vec<Value> },
    Struct(Vec<Value>),
    DictEntry(Box<[Value; 2]>),
    Variant(Box<Value>),
    /// A well-formed value whose type code is none of the known ones.
    ///
    /// The code must not be one of the codes [`WireKind::from_code`] knows.
    Unknown(u8),
}

impl Value {
    pub fn array<S: Into<String>>(element: S, items: Vec<Value>) -> Self {
        Value::Array {
            element: element.into(),
            items,
        }
    }

    pub fn dict_entry<K: Into<Value>, V: Into<Value>>(key: K, value: V) -> Self {
        Value::DictEntry(Box::new([key.into(), value.into()]))
    }

    pub fn variant<V: Into<Value>>(v: V) -> Self {
        Value::Variant(Box::new(v.into()))
    }

    /// An `a{sv}` property map, as returned by `org.freedesktop.DBus.Properties.GetAll`.
    pub fn properties<K, V, I>(props: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let items = props
            .into_iter()
            .map(|(k, v)| Value::dict_entry(Value::String(k.into()), Value::variant(v)))
            .collect();
        Value::array("{sv}", items)
    }

    pub fn kind(&self) -> Option<WireKind> {
        WireKind::from_code(self.type_code())
    }

    /// The code a cursor reports when peeking at this value.
    pub fn type_code(&self) -> u8 {
        match self {
            Value::Byte(_) => b'y',
            Value::Boolean(_) => b'b',
            Value::Int16(_) => b'n',
            Value::UInt16(_) => b'q',
            Value::Int32(_) => b'i',
            Value::UInt32(_) => b'u',
            Value::Int64(_) => b'x',
            Value::UInt64(_) => b't',
            Value::Double(_) => b'd',
            Value::String(_) => b's',
            Value::ObjectPath(_) => b'o',
            Value::Signature(_) => b'g',
            Value::UnixFd(_) => b'h',
            Value::Array { .. } => b'a',
            Value::Struct(_) => b'r',
            Value::DictEntry(_) => b'e',
            Value::Variant(_) => b'v',
            Value::Unknown(c) => *c,
        }
    }

    /// The D-Bus signature of this value.
    pub fn signature(&self) -> String {
        let mut s = String::new();
        self.push_signature(&mut s);
        s
    }

    fn push_signature(&self, s: &mut String) {
        match self {
            Value::Array { element, .. } => {
                s.push('a');
                s.push_str(element);
            }
            Value::Struct(fields) => {
                s.push('(');
                for f in fields {
                    f.push_signature(s);
                }
                s.push(')');
            }
            Value::DictEntry(entry) => {
                s.push('{');
                entry[0].push_signature(s);
                entry[1].push_signature(s);
                s.push('}');
            }
            v => s.push(char::from(v.type_code())),
        }
    }

    /// Values contained in this one. Empty for primitives.
    pub fn children(&self) -> &[Value] {
        match self {
            Value::Array { items, .. } => items,
            Value::Struct(fields) => fields,
            Value::DictEntry(entry) => &entry[..],
            Value::Variant(inner) => slice::from_ref(&**inner),
            _ => &[],
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar<'_>> {
        let s = match self {
            Value::Byte(v) => Scalar::Byte(*v),
            Value::Boolean(v) => Scalar::Boolean(*v),
            Value::Int16(v) => Scalar::Int16(*v),
            Value::UInt16(v) => Scalar::UInt16(*v),
            Value::Int32(v) => Scalar::Int32(*v),
            Value::UInt32(v) => Scalar::UInt32(*v),
            Value::Int64(v) => Scalar::Int64(*v),
            Value::UInt64(v) => Scalar::UInt64(*v),
            Value::Double(v) => Scalar::Double(*v),
            Value::String(v) => Scalar::String(v),
            Value::ObjectPath(v) => Scalar::ObjectPath(v),
            Value::Signature(v) => Scalar::Signature(v),
            Value::UnixFd(v) => Scalar::UnixFd(*v),
            _ => return None,
        };
        Some(s)
    }
}

macro_rules! value_from {
    ($($typ:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$typ> for Value {
                fn from(v: $typ) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    u8 => Byte,
    bool => Boolean,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f64 => Double,
    String => String,
    &str => String,
}

#[derive(Debug)]
struct Frame<'a> {
    values: &'a [Value],
    pos: usize,
    code: u8,
}

/// A [`Cursor`] over a borrowed sequence of [`Value`]s.
#[derive(Debug)]
pub struct ValueCursor<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> ValueCursor<'a> {
    /// A cursor positioned before the first of `values`.
    pub fn new(values: &'a [Value]) -> Self {
        ValueCursor {
            stack: vec![Frame {
                values,
                pos: 0,
                code: 0,
            }],
        }
    }

    /// Number of containers currently entered.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn frame(&mut self) -> &mut Frame<'a> {
        // the top-level frame is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn current(&mut self) -> io::Result<&'a Value> {
        let f = self.frame();
        let values: &'a [Value] = f.values;
        values
            .get(f.pos)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENXIO))
    }
}

impl<'a> Cursor for ValueCursor<'a> {
    fn peek_type(&mut self) -> io::Result<Option<u8>> {
        let f = self.frame();
        Ok(f.values.get(f.pos).map(Value::type_code))
    }

    fn read(&mut self, kind: WireKind) -> io::Result<Scalar<'_>> {
        let v = self.current()?;
        match v.as_scalar() {
            Some(s) if s.kind() == kind => {
                self.frame().pos += 1;
                Ok(s)
            }
            _ => Err(io::Error::from_raw_os_error(libc::ENXIO)),
        }
    }

    fn skip(&mut self) -> io::Result<()> {
        self.current()?;
        self.frame().pos += 1;
        Ok(())
    }

    fn enter(&mut self, code: u8) -> io::Result<()> {
        let v = self.current()?;
        let is_container = v.kind().map_or(false, WireKind::is_container);
        if !is_container || v.type_code() != code {
            return Err(io::Error::from_raw_os_error(libc::ENXIO));
        }
        self.frame().pos += 1;
        self.stack.push(Frame {
            values: v.children(),
            pos: 0,
            code,
        });
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if self.stack.len() == 1 {
            return Err(io::Error::from_raw_os_error(libc::ENXIO));
        }
        let f = self.frame();
        // Like sd-bus, the rest of an array may be abandoned, other containers must be drained.
        if f.code != b'a' && f.pos < f.values.len() {
            return Err(io::Error::from_raw_os_error(libc::EBUSY));
        }
        self.stack.pop();
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        match self {
            Value::Byte(v) => serializer.serialize_u8(*v),
            Value::Boolean(v) => serializer.serialize_bool(*v),
            Value::Int16(v) => serializer.serialize_i16(*v),
            Value::UInt16(v) => serializer.serialize_u16(*v),
            Value::Int32(v) => serializer.serialize_i32(*v),
            Value::UInt32(v) => serializer.serialize_u32(*v),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::UInt64(v) => serializer.serialize_u64(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::String(v) | Value::ObjectPath(v) | Value::Signature(v) => {
                serializer.serialize_str(v)
            }
            Value::UnixFd(v) => serializer.serialize_i32(*v),
            Value::Variant(v) => (**v).serialize(serializer),
            Value::Unknown(_) => serializer.serialize_unit(),
            v => {
                let children = v.children();
                let mut seq = serializer.serialize_seq(Some(children.len()))?;
                for c in children {
                    seq.serialize_element(c)?;
                }
                seq.end()
            }
        }
    }
}

#[test]
fn t_signature() {
    let props = Value::properties(vec![("MainPID", Value::UInt32(1))]);
    assert_eq!(props.signature(), "a{sv}");
    assert_eq!(props.type_code(), b'a');

    let s = Value::Struct(vec![
        Value::from("unit"),
        Value::ObjectPath("/".into()),
        Value::array("s", vec![]),
    ]);
    assert_eq!(s.signature(), "(soas)");
    assert_eq!(s.type_code(), b'r');
    assert_eq!(Value::variant(1.5f64).signature(), "v");
    assert_eq!(Value::Unknown(b'z').kind(), None);
}

#[test]
fn t_cursor_walk() {
    let values = [Value::from("x"), Value::array("i", vec![1i32.into(), 2i32.into()])];
    let mut c = ValueCursor::new(&values);

    assert_eq!(c.peek_type().unwrap(), Some(b's'));
    assert_eq!(c.read(WireKind::String).unwrap(), Scalar::String("x"));
    assert_eq!(c.peek_type().unwrap(), Some(b'a'));
    c.enter(b'a').unwrap();
    assert_eq!(c.depth(), 1);
    assert_eq!(c.read(WireKind::Int32).unwrap(), Scalar::Int32(1));
    assert_eq!(c.read(WireKind::Int32).unwrap(), Scalar::Int32(2));
    assert_eq!(c.peek_type().unwrap(), None);
    c.exit().unwrap();
    assert_eq!(c.depth(), 0);
    assert_eq!(c.peek_type().unwrap(), None);
}

#[test]
fn t_cursor_errors() {
    let values = [
        Value::Struct(vec![Value::from(1u8), Value::from(2u8)]),
        Value::from(7u32),
    ];
    let mut c = ValueCursor::new(&values);

    // exit without a container
    assert_eq!(c.exit().unwrap_err().raw_os_error(), Some(libc::ENXIO));
    // wrong container type
    assert_eq!(c.enter(b'a').unwrap_err().raw_os_error(), Some(libc::ENXIO));
    c.enter(b'r').unwrap();
    // wrong scalar type
    assert_eq!(
        c.read(WireKind::Int32).unwrap_err().raw_os_error(),
        Some(libc::ENXIO)
    );
    c.read(WireKind::Byte).unwrap();
    // struct not fully read
    assert_eq!(c.exit().unwrap_err().raw_os_error(), Some(libc::EBUSY));
    c.skip().unwrap();
    c.exit().unwrap();
    // not a container
    assert_eq!(c.enter(b'u').unwrap_err().raw_os_error(), Some(libc::ENXIO));
    c.skip().unwrap();
    assert_eq!(c.skip().unwrap_err().raw_os_error(), Some(libc::ENXIO));
}

#[test]
fn t_cursor_array_early_exit() {
    let values = [Value::array("y", vec![1u8.into(), 2u8.into()])];
    let mut c = ValueCursor::new(&values);
    c.enter(b'a').unwrap();
    c.exit().unwrap();
    assert_eq!(c.peek_type().unwrap(), None);
}
