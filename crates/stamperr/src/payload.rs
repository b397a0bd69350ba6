//! Typed payloads and their canonical text encoding.
//!
//! The set of shapes is closed: [`Payload`] has one variant per supported
//! shape and [`DataType`] is sealed to exactly the matching Rust types.
//! Adding a shape means adding a variant and a `data_type!` line, nothing else.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use serde::de::DeserializeOwned;

use crate::error::StampError;

// ─── Payload ──────────────────────────────────────────────────────────────────

/// A natively built payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Int(i64),
    Float32(f32),
    Float64(f64),
    Str(String),
    IntList(Vec<i64>),
    Float32List(Vec<f32>),
    Float64List(Vec<f64>),
    StrList(Vec<String>),
    IntMap(BTreeMap<String, i64>),
    Float32Map(BTreeMap<String, f32>),
    Float64Map(BTreeMap<String, f64>),
    StrMap(BTreeMap<String, String>),
}

impl Payload {
    /// Short name of the shape, as used in decode errors and by the CLI.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Int(_) => i64::SHAPE,
            Self::Float32(_) => f32::SHAPE,
            Self::Float64(_) => f64::SHAPE,
            Self::Str(_) => String::SHAPE,
            Self::IntList(_) => <Vec<i64>>::SHAPE,
            Self::Float32List(_) => <Vec<f32>>::SHAPE,
            Self::Float64List(_) => <Vec<f64>>::SHAPE,
            Self::StrList(_) => <Vec<String>>::SHAPE,
            Self::IntMap(_) => <BTreeMap<String, i64>>::SHAPE,
            Self::Float32Map(_) => <BTreeMap<String, f32>>::SHAPE,
            Self::Float64Map(_) => <BTreeMap<String, f64>>::SHAPE,
            Self::StrMap(_) => <BTreeMap<String, String>>::SHAPE,
        }
    }

    /// Reject values that have no text form which decodes back to them.
    pub fn validate(&self) -> Result<(), StampError> {
        let floats: Box<dyn Iterator<Item = f64> + '_> = match self {
            Self::Float32(v) => Box::new(std::iter::once(f64::from(*v))),
            Self::Float64(v) => Box::new(std::iter::once(*v)),
            Self::Float32List(l) => Box::new(l.iter().map(|v| f64::from(*v))),
            Self::Float64List(l) => Box::new(l.iter().copied()),
            Self::Float32Map(m) => Box::new(m.values().map(|v| f64::from(*v))),
            Self::Float64Map(m) => Box::new(m.values().copied()),
            _ => return Ok(()),
        };
        for value in floats {
            if !value.is_finite() {
                return Err(StampError::NonFiniteFloat { value });
            }
        }
        Ok(())
    }

    /// The canonical text form embedded after `data ` in a frame.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Str(s) => write_quoted(f, s),
            Self::IntList(l) => write_list(f, l, |f, v| write!(f, "{v}")),
            Self::Float32List(l) => write_list(f, l, |f, v| write!(f, "{v}")),
            Self::Float64List(l) => write_list(f, l, |f, v| write!(f, "{v}")),
            Self::StrList(l) => write_list(f, l, |f, v| write_quoted(f, v)),
            Self::IntMap(m) => write_map(f, m, |f, v| write!(f, "{v}")),
            Self::Float32Map(m) => write_map(f, m, |f, v| write!(f, "{v}")),
            Self::Float64Map(m) => write_map(f, m, |f, v| write!(f, "{v}")),
            Self::StrMap(m) => write_map(f, m, |f, v| write_quoted(f, v)),
        }
    }
}

/// JSON string literal, with the grammar's own delimiters escaped as well so
/// the frame scanner never sees a bare `[`, `]` or `;` inside data.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '[' | ']' | ';' => write!(f, "\\u{:04x}", c as u32)?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_char('[')?;
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        item(f, v)?;
    }
    f.write_char(']')
}

fn write_map<T>(
    f: &mut fmt::Formatter<'_>,
    map: &BTreeMap<String, T>,
    mut value: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_char('{')?;
    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write_quoted(f, k)?;
        f.write_char(':')?;
        value(f, v)?;
    }
    f.write_char('}')
}

// ─── DataType ─────────────────────────────────────────────────────────────────

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that can be carried as error data.
///
/// Implemented for `i64`, `f32`, `f64`, `String`, `Vec` of each of those, and
/// `BTreeMap<String, _>` of each of those. Sealed: no other shape exists.
pub trait DataType: DeserializeOwned + sealed::Sealed + Sized {
    /// Shape name used in diagnostics.
    const SHAPE: &'static str;

    fn into_payload(self) -> Payload;

    /// Native path: succeeds only when the payload holds exactly this shape.
    fn from_payload(payload: &Payload) -> Option<Self>;

    /// Text path: decode a canonical encoding into this shape.
    fn decode(raw: &str) -> Result<Self, StampError> {
        serde_json::from_str(raw.trim()).map_err(|source| StampError::Decode {
            expected: Self::SHAPE,
            raw: raw.to_string(),
            source,
        })
    }
}

macro_rules! data_type {
    ($ty:ty, $variant:ident, $shape:literal) => {
        impl sealed::Sealed for $ty {}

        impl DataType for $ty {
            const SHAPE: &'static str = $shape;

            fn into_payload(self) -> Payload {
                Payload::$variant(self)
            }

            fn from_payload(payload: &Payload) -> Option<Self> {
                match payload {
                    Payload::$variant(v) => Some(v.to_owned()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Payload {
            fn from(v: $ty) -> Self {
                Payload::$variant(v)
            }
        }
    };
}

data_type!(i64, Int, "int");
data_type!(f32, Float32, "f32");
data_type!(f64, Float64, "f64");
data_type!(String, Str, "string");
data_type!(Vec<i64>, IntList, "int-list");
data_type!(Vec<f32>, Float32List, "f32-list");
data_type!(Vec<f64>, Float64List, "f64-list");
data_type!(Vec<String>, StrList, "string-list");
data_type!(BTreeMap<String, i64>, IntMap, "int-map");
data_type!(BTreeMap<String, f32>, Float32Map, "f32-map");
data_type!(BTreeMap<String, f64>, Float64Map, "f64-map");
data_type!(BTreeMap<String, String>, StrMap, "string-map");

impl From<i32> for Payload {
    fn from(v: i32) -> Self {
        Payload::Int(i64::from(v))
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::Str(v.to_string())
    }
}

// ─── DataSlot ─────────────────────────────────────────────────────────────────

/// The data held by a node: a typed value when built natively, the raw
/// encoded text when rebuilt from a string.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSlot {
    Value(Payload),
    Encoded(String),
}

impl DataSlot {
    /// Canonical encoding, regardless of how the node was built.
    pub fn encoded(&self) -> Cow<'_, str> {
        match self {
            Self::Value(p) => Cow::Owned(p.encode()),
            Self::Encoded(raw) => Cow::Borrowed(raw),
        }
    }

    /// Produce the requested type.
    ///
    /// A typed value of a different shape is re-read through its encoding, so
    /// a native node answers exactly as the same node rebuilt from text would.
    pub fn get<T: DataType>(&self) -> Result<T, StampError> {
        match self {
            Self::Value(p) => match T::from_payload(p) {
                Some(v) => Ok(v),
                None => T::decode(&p.encode()),
            },
            Self::Encoded(raw) => T::decode(raw),
        }
    }
}
