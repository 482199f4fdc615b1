// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive wire codecs.
//!
//! Writers always emit the widest fixed form of each primitive
//! (4-byte int, 32-bit size prefixes) so encoded layout is stable;
//! symbols alone use the compact 8-bit form when they fit, since
//! descriptor names appear in front of every composite body. Readers
//! accept every encoding the wire grammar allows for the type.

use std::any::Any;

use uuid::Uuid;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{AmqpError, Result};
use crate::format::{self, PrimitiveKind};
use crate::registry::{PathSet, Registry};
use crate::value::{AnyBox, Symbol, Timestamp, Value};

/// One wire codec: primitives, enums, composites and reference
/// wrappers all encode through this interface.
///
/// `write`/`read` handle the nullable outer position (a `None` value
/// encodes as the null format code); `write_raw`/`read_raw` handle the
/// body once a non-null format code is decided.
pub(crate) trait Encoder: Send + Sync {
    fn write(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: Option<&dyn Any>,
        path: &mut PathSet,
    ) -> Result<()>;

    fn write_raw(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        path: &mut PathSet,
    ) -> Result<()>;

    fn read(&self, reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>>;

    fn read_raw(&self, reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox>;
}

fn mismatch(expected: &'static str) -> AmqpError {
    AmqpError::TypeMismatch { expected }
}

pub(crate) fn expect_code(expected: u8, found: u8) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(AmqpError::FormatMismatch { expected, found })
    }
}

/// Codec for one [`PrimitiveKind`], keyed in the registry by the
/// native Rust type it carries.
pub(crate) struct PrimitiveCodec(pub(crate) PrimitiveKind);

impl Encoder for PrimitiveCodec {
    fn write(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: Option<&dyn Any>,
        path: &mut PathSet,
    ) -> Result<()> {
        let Some(value) = value else {
            cur.write_u8(format::NULL);
            return Ok(());
        };
        match self.0 {
            // Booleans fit entirely in the format code.
            PrimitiveKind::Bool => {
                let b = value.downcast_ref::<bool>().ok_or_else(|| mismatch("bool"))?;
                cur.write_u8(if *b { format::BOOL_TRUE } else { format::BOOL_FALSE });
                Ok(())
            }
            PrimitiveKind::Symbol => {
                let sym = value
                    .downcast_ref::<Symbol>()
                    .ok_or_else(|| mismatch("Symbol"))?;
                write_symbol(cur, sym.as_str());
                Ok(())
            }
            _ => {
                cur.write_u8(self.0.format_code());
                self.write_raw(reg, cur, value, path)
            }
        }
    }

    fn write_raw(
        &self,
        _reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        _path: &mut PathSet,
    ) -> Result<()> {
        match self.0 {
            PrimitiveKind::Null => {}
            PrimitiveKind::Bool => {
                // The 1-byte-body form, for callers that already
                // committed to the 0x56 code.
                let b = value.downcast_ref::<bool>().ok_or_else(|| mismatch("bool"))?;
                cur.write_u8(u8::from(*b));
            }
            PrimitiveKind::Ubyte => {
                cur.write_u8(*value.downcast_ref::<u8>().ok_or_else(|| mismatch("u8"))?)
            }
            PrimitiveKind::Ushort => cur.write_u16_be(
                *value.downcast_ref::<u16>().ok_or_else(|| mismatch("u16"))?,
            ),
            PrimitiveKind::Uint => cur.write_u32_be(
                *value.downcast_ref::<u32>().ok_or_else(|| mismatch("u32"))?,
            ),
            PrimitiveKind::Ulong => cur.write_u64_be(
                *value.downcast_ref::<u64>().ok_or_else(|| mismatch("u64"))?,
            ),
            PrimitiveKind::Byte => {
                cur.write_i8(*value.downcast_ref::<i8>().ok_or_else(|| mismatch("i8"))?)
            }
            PrimitiveKind::Short => cur.write_i16_be(
                *value.downcast_ref::<i16>().ok_or_else(|| mismatch("i16"))?,
            ),
            PrimitiveKind::Int => cur.write_i32_be(
                *value.downcast_ref::<i32>().ok_or_else(|| mismatch("i32"))?,
            ),
            PrimitiveKind::Long => cur.write_i64_be(
                *value.downcast_ref::<i64>().ok_or_else(|| mismatch("i64"))?,
            ),
            PrimitiveKind::Float => cur.write_f32_be(
                *value.downcast_ref::<f32>().ok_or_else(|| mismatch("f32"))?,
            ),
            PrimitiveKind::Double => cur.write_f64_be(
                *value.downcast_ref::<f64>().ok_or_else(|| mismatch("f64"))?,
            ),
            PrimitiveKind::Char => {
                let c = *value.downcast_ref::<char>().ok_or_else(|| mismatch("char"))?;
                // Code points above U+FFFF truncate to their low 16
                // bits, zero-extended into the 4-byte payload.
                cur.write_u32_be(u32::from(c) & 0xffff);
            }
            PrimitiveKind::Timestamp => {
                let t = value
                    .downcast_ref::<Timestamp>()
                    .ok_or_else(|| mismatch("Timestamp"))?;
                cur.write_i64_be(t.millis());
            }
            PrimitiveKind::Uuid => {
                let u = value.downcast_ref::<Uuid>().ok_or_else(|| mismatch("Uuid"))?;
                let (hi, lo) = u.as_u64_pair();
                cur.write_u64_be(hi);
                cur.write_u64_be(lo);
            }
            PrimitiveKind::Binary => {
                let bytes = value
                    .downcast_ref::<Vec<u8>>()
                    .ok_or_else(|| mismatch("Vec<u8>"))?;
                cur.write_u32_be(bytes.len() as u32);
                cur.write_bytes(bytes);
            }
            PrimitiveKind::String => {
                let s = value
                    .downcast_ref::<String>()
                    .ok_or_else(|| mismatch("String"))?;
                cur.write_u32_be(s.len() as u32);
                cur.write_bytes(s.as_bytes());
            }
            PrimitiveKind::Symbol => {
                let sym = value
                    .downcast_ref::<Symbol>()
                    .ok_or_else(|| mismatch("Symbol"))?;
                cur.write_u32_be(sym.as_str().len() as u32);
                cur.write_bytes(sym.as_str().as_bytes());
            }
            PrimitiveKind::List => {
                let items = value
                    .downcast_ref::<Vec<Value>>()
                    .ok_or_else(|| mismatch("Vec<Value>"))?;
                write_list_body(cur, items)?;
            }
            PrimitiveKind::Map => {
                let pairs = value
                    .downcast_ref::<Vec<(Value, Value)>>()
                    .ok_or_else(|| mismatch("Vec<(Value, Value)>"))?;
                write_map_body(cur, pairs)?;
            }
        }
        Ok(())
    }

    fn read(&self, _reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let code = cur.read_u8()?;
        if code == format::NULL {
            return Ok(None);
        }
        Ok(Some(read_raw_value(self.0, cur, code)?.into_any()))
    }

    fn read_raw(&self, _reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox> {
        Ok(read_raw_value(self.0, cur, code)?.into_any())
    }
}

/// Codec registered for [`Value`] itself: fields typed `Value` accept
/// any primitive the wire carries.
pub(crate) struct ValueCodec;

impl Encoder for ValueCodec {
    fn write(
        &self,
        _reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: Option<&dyn Any>,
        _path: &mut PathSet,
    ) -> Result<()> {
        let Some(value) = value else {
            cur.write_u8(format::NULL);
            return Ok(());
        };
        let v = value
            .downcast_ref::<Value>()
            .ok_or_else(|| mismatch("Value"))?;
        write_value(cur, v)
    }

    fn write_raw(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        path: &mut PathSet,
    ) -> Result<()> {
        self.write(reg, cur, Some(value), path)
    }

    fn read(&self, _reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let code = cur.read_u8()?;
        if code == format::NULL {
            return Ok(None);
        }
        let kind =
            format::primitive_for(code).ok_or(AmqpError::UnknownFormatCode(code))?;
        Ok(Some(Box::new(read_raw_value(kind, cur, code)?)))
    }

    fn read_raw(&self, _reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox> {
        let kind =
            format::primitive_for(code).ok_or(AmqpError::UnknownFormatCode(code))?;
        Ok(Box::new(read_raw_value(kind, cur, code)?))
    }
}

/// Encode a dynamic value, format code included.
pub(crate) fn write_value(cur: &mut WriteCursor<'_>, value: &Value) -> Result<()> {
    match value {
        Value::Null => cur.write_u8(format::NULL),
        Value::Bool(true) => cur.write_u8(format::BOOL_TRUE),
        Value::Bool(false) => cur.write_u8(format::BOOL_FALSE),
        Value::Ubyte(v) => {
            cur.write_u8(format::UBYTE);
            cur.write_u8(*v);
        }
        Value::Ushort(v) => {
            cur.write_u8(format::USHORT);
            cur.write_u16_be(*v);
        }
        Value::Uint(v) => {
            cur.write_u8(format::UINT);
            cur.write_u32_be(*v);
        }
        Value::Ulong(v) => {
            cur.write_u8(format::ULONG);
            cur.write_u64_be(*v);
        }
        Value::Byte(v) => {
            cur.write_u8(format::BYTE);
            cur.write_i8(*v);
        }
        Value::Short(v) => {
            cur.write_u8(format::SHORT);
            cur.write_i16_be(*v);
        }
        Value::Int(v) => {
            cur.write_u8(format::INT);
            cur.write_i32_be(*v);
        }
        Value::Long(v) => {
            cur.write_u8(format::LONG);
            cur.write_i64_be(*v);
        }
        Value::Float(v) => {
            cur.write_u8(format::FLOAT);
            cur.write_f32_be(*v);
        }
        Value::Double(v) => {
            cur.write_u8(format::DOUBLE);
            cur.write_f64_be(*v);
        }
        Value::Char(c) => {
            cur.write_u8(format::CHAR);
            cur.write_u32_be(u32::from(*c) & 0xffff);
        }
        Value::Timestamp(t) => {
            cur.write_u8(format::TIMESTAMP);
            cur.write_i64_be(t.millis());
        }
        Value::Uuid(u) => {
            cur.write_u8(format::UUID);
            let (hi, lo) = u.as_u64_pair();
            cur.write_u64_be(hi);
            cur.write_u64_be(lo);
        }
        Value::Binary(bytes) => {
            cur.write_u8(format::VBIN32);
            cur.write_u32_be(bytes.len() as u32);
            cur.write_bytes(bytes);
        }
        Value::String(s) => {
            cur.write_u8(format::STR32);
            cur.write_u32_be(s.len() as u32);
            cur.write_bytes(s.as_bytes());
        }
        Value::Symbol(sym) => write_symbol(cur, sym.as_str()),
        Value::List(items) => {
            cur.write_u8(format::LIST32);
            write_list_body(cur, items)?;
        }
        Value::Map(pairs) => {
            cur.write_u8(format::MAP32);
            write_map_body(cur, pairs)?;
        }
    }
    Ok(())
}

/// Body of a 32-bit list: size placeholder, count, then elements.
/// The size covers everything after the size field itself.
pub(crate) fn write_list_body(cur: &mut WriteCursor<'_>, items: &[Value]) -> Result<()> {
    let size_pos = cur.position();
    cur.write_u32_be(0);
    cur.write_u32_be(items.len() as u32);
    for item in items {
        write_value(cur, item)?;
    }
    cur.patch_u32(size_pos, (cur.position() - size_pos - 4) as u32)
}

/// Body of a 32-bit map: the count is keys plus values.
pub(crate) fn write_map_body(cur: &mut WriteCursor<'_>, pairs: &[(Value, Value)]) -> Result<()> {
    let size_pos = cur.position();
    cur.write_u32_be(0);
    cur.write_u32_be((pairs.len() * 2) as u32);
    for (k, v) in pairs {
        write_value(cur, k)?;
        write_value(cur, v)?;
    }
    cur.patch_u32(size_pos, (cur.position() - size_pos - 4) as u32)
}

/// Decode any primitive value, format code included.
pub(crate) fn read_value(cur: &mut ReadCursor<'_>) -> Result<Value> {
    let code = cur.read_u8()?;
    if code == format::NULL {
        return Ok(Value::Null);
    }
    let kind = format::primitive_for(code).ok_or(AmqpError::UnknownFormatCode(code))?;
    read_raw_value(kind, cur, code)
}

/// Decode the body of a primitive whose format code was already read.
/// Every valid wire form of the kind is accepted, with one deliberate
/// exception: `int` rejects the small form, matching peers that only
/// ever emit the 4-byte encoding.
pub(crate) fn read_raw_value(
    kind: PrimitiveKind,
    cur: &mut ReadCursor<'_>,
    code: u8,
) -> Result<Value> {
    let value = match kind {
        PrimitiveKind::Null => Value::Null,
        PrimitiveKind::Bool => match code {
            format::BOOL_TRUE => Value::Bool(true),
            format::BOOL_FALSE => Value::Bool(false),
            format::BOOL => Value::Bool(cur.read_u8()? != 0),
            other => return Err(AmqpError::FormatMismatch {
                expected: format::BOOL,
                found: other,
            }),
        },
        PrimitiveKind::Ubyte => {
            expect_code(format::UBYTE, code)?;
            Value::Ubyte(cur.read_u8()?)
        }
        PrimitiveKind::Ushort => {
            expect_code(format::USHORT, code)?;
            Value::Ushort(cur.read_u16_be()?)
        }
        PrimitiveKind::Uint => match code {
            format::UINT0 => Value::Uint(0),
            format::SMALL_UINT => Value::Uint(u32::from(cur.read_u8()?)),
            format::UINT => Value::Uint(cur.read_u32_be()?),
            other => return Err(AmqpError::FormatMismatch {
                expected: format::UINT,
                found: other,
            }),
        },
        PrimitiveKind::Ulong => match code {
            format::ULONG0 => Value::Ulong(0),
            format::SMALL_ULONG => Value::Ulong(u64::from(cur.read_u8()?)),
            format::ULONG => Value::Ulong(cur.read_u64_be()?),
            other => return Err(AmqpError::FormatMismatch {
                expected: format::ULONG,
                found: other,
            }),
        },
        PrimitiveKind::Byte => {
            expect_code(format::BYTE, code)?;
            Value::Byte(cur.read_i8()?)
        }
        PrimitiveKind::Short => {
            expect_code(format::SHORT, code)?;
            Value::Short(cur.read_i16_be()?)
        }
        PrimitiveKind::Int => {
            expect_code(format::INT, code)?;
            Value::Int(cur.read_i32_be()?)
        }
        PrimitiveKind::Long => match code {
            format::SMALL_LONG => Value::Long(i64::from(cur.read_i8()?)),
            format::LONG => Value::Long(cur.read_i64_be()?),
            other => return Err(AmqpError::FormatMismatch {
                expected: format::LONG,
                found: other,
            }),
        },
        PrimitiveKind::Float => {
            expect_code(format::FLOAT, code)?;
            Value::Float(cur.read_f32_be()?)
        }
        PrimitiveKind::Double => {
            expect_code(format::DOUBLE, code)?;
            Value::Double(cur.read_f64_be()?)
        }
        PrimitiveKind::Char => {
            expect_code(format::CHAR, code)?;
            let bits = cur.read_u32_be()? & 0xffff;
            let c = char::from_u32(bits).ok_or_else(|| {
                AmqpError::InvalidData(format!("invalid char code point {bits:#06x}"))
            })?;
            Value::Char(c)
        }
        PrimitiveKind::Timestamp => {
            expect_code(format::TIMESTAMP, code)?;
            Value::Timestamp(Timestamp(cur.read_i64_be()?))
        }
        PrimitiveKind::Uuid => {
            expect_code(format::UUID, code)?;
            let hi = cur.read_u64_be()?;
            let lo = cur.read_u64_be()?;
            Value::Uuid(Uuid::from_u64_pair(hi, lo))
        }
        PrimitiveKind::Binary => {
            let len = match code {
                format::VBIN8 => usize::from(cur.read_u8()?),
                format::VBIN32 => cur.read_u32_be()? as usize,
                other => return Err(AmqpError::FormatMismatch {
                    expected: format::VBIN32,
                    found: other,
                }),
            };
            Value::Binary(cur.read_bytes(len)?.to_vec())
        }
        PrimitiveKind::String => {
            let len = match code {
                format::STR8 => usize::from(cur.read_u8()?),
                format::STR32 => cur.read_u32_be()? as usize,
                other => return Err(AmqpError::FormatMismatch {
                    expected: format::STR32,
                    found: other,
                }),
            };
            let bytes = cur.read_bytes(len)?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| AmqpError::InvalidData(format!("invalid utf-8 string: {e}")))?;
            Value::String(s.to_owned())
        }
        PrimitiveKind::Symbol => Value::Symbol(read_symbol_body(cur, code)?),
        PrimitiveKind::List => {
            let count = read_count(cur, code, Some(format::LIST0), format::LIST8, format::LIST32)?;
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(read_value(cur)?);
            }
            Value::List(items)
        }
        PrimitiveKind::Map => {
            let count = read_count(cur, code, None, format::MAP8, format::MAP32)?;
            if count % 2 != 0 {
                return Err(AmqpError::InvalidData(format!(
                    "odd map element count {count}"
                )));
            }
            let mut pairs = Vec::with_capacity((count / 2).min(1024));
            for _ in 0..count / 2 {
                let k = read_value(cur)?;
                let v = read_value(cur)?;
                pairs.push((k, v));
            }
            Value::Map(pairs)
        }
    };
    Ok(value)
}

/// Symbols get the compact form when the name fits in one byte.
/// Callers guarantee ASCII content.
pub(crate) fn write_symbol(cur: &mut WriteCursor<'_>, sym: &str) {
    let bytes = sym.as_bytes();
    if bytes.len() < 256 {
        cur.write_u8(format::SYM8);
        cur.write_u8(bytes.len() as u8);
    } else {
        cur.write_u8(format::SYM32);
        cur.write_u32_be(bytes.len() as u32);
    }
    cur.write_bytes(bytes);
}

/// Read a symbol, format code included.
pub(crate) fn read_symbol(cur: &mut ReadCursor<'_>) -> Result<Symbol> {
    let code = cur.read_u8()?;
    read_symbol_body(cur, code)
}

fn read_symbol_body(cur: &mut ReadCursor<'_>, code: u8) -> Result<Symbol> {
    let len = match code {
        format::SYM8 => usize::from(cur.read_u8()?),
        format::SYM32 => cur.read_u32_be()? as usize,
        other => {
            return Err(AmqpError::FormatMismatch {
                expected: format::SYM8,
                found: other,
            })
        }
    };
    let bytes = cur.read_bytes(len)?;
    let s = std::str::from_utf8(bytes)
        .map_err(|e| AmqpError::InvalidData(format!("invalid symbol bytes: {e}")))?;
    Symbol::new(s)
}

/// Read the element count of a list or map body, discarding the size
/// field of whichever width the format code implies.
pub(crate) fn read_count(
    cur: &mut ReadCursor<'_>,
    code: u8,
    zero: Option<u8>,
    small: u8,
    big: u8,
) -> Result<usize> {
    if zero == Some(code) {
        return Ok(0);
    }
    if code == small {
        let _size = cur.read_u8()?;
        return Ok(usize::from(cur.read_u8()?));
    }
    if code == big {
        let _size = cur.read_u32_be()?;
        return Ok(cur.read_u32_be()? as usize);
    }
    Err(AmqpError::FormatMismatch {
        expected: big,
        found: code,
    })
}
