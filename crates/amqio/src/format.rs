// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AMQP 1.0 format codes and the primitive dispatch table.
//!
//! Every encoded value starts with a single format-code byte tagging the
//! physical encoding of the payload that follows. Dispatch is two-level:
//! the high nibble (offset so 0x4 maps to index 0) selects a category,
//! the low nibble indexes a small per-category table. Slots with no
//! mapping (reserved, decimal, array) decode as unknown.

/// Marker byte opening a described (composite) value.
pub const DESCRIBED: u8 = 0x00;

pub const NULL: u8 = 0x40;
pub const BOOL_TRUE: u8 = 0x41;
pub const BOOL_FALSE: u8 = 0x42;
pub const UINT0: u8 = 0x43;
pub const ULONG0: u8 = 0x44;
pub const LIST0: u8 = 0x45;
pub const UBYTE: u8 = 0x50;
pub const BYTE: u8 = 0x51;
pub const SMALL_UINT: u8 = 0x52;
pub const SMALL_ULONG: u8 = 0x53;
pub const SMALL_INT: u8 = 0x54;
pub const SMALL_LONG: u8 = 0x55;
pub const BOOL: u8 = 0x56;
pub const USHORT: u8 = 0x60;
pub const SHORT: u8 = 0x61;
pub const UINT: u8 = 0x70;
pub const INT: u8 = 0x71;
pub const FLOAT: u8 = 0x72;
pub const CHAR: u8 = 0x73;
pub const DECIMAL32: u8 = 0x74;
pub const ULONG: u8 = 0x80;
pub const LONG: u8 = 0x81;
pub const DOUBLE: u8 = 0x82;
pub const TIMESTAMP: u8 = 0x83;
pub const DECIMAL64: u8 = 0x84;
pub const DECIMAL128: u8 = 0x94;
pub const UUID: u8 = 0x98;
pub const VBIN8: u8 = 0xa0;
pub const STR8: u8 = 0xa1;
pub const SYM8: u8 = 0xa3;
pub const VBIN32: u8 = 0xb0;
pub const STR32: u8 = 0xb1;
pub const SYM32: u8 = 0xb3;
pub const LIST8: u8 = 0xc0;
pub const MAP8: u8 = 0xc1;
pub const LIST32: u8 = 0xd0;
pub const MAP32: u8 = 0xd1;
pub const ARRAY8: u8 = 0xe0;
pub const ARRAY32: u8 = 0xf0;

/// Primitive kinds of the AMQP 1.0 type system.
///
/// Decimal and array types are intentionally absent: their format codes
/// have no mapping and decode as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Null,
    Bool,
    Ubyte,
    Ushort,
    Uint,
    Ulong,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Timestamp,
    Uuid,
    Binary,
    String,
    Symbol,
    List,
    Map,
}

impl PrimitiveKind {
    /// The format code emitted on write.
    ///
    /// Variable-size kinds always use the widest (32-bit) form so size
    /// prefixes can be patched in place after the payload is measured.
    /// Symbols are the exception: descriptor names and map keys are
    /// short, so the 8-bit form is used when the name fits.
    pub fn format_code(self) -> u8 {
        match self {
            Self::Null => NULL,
            Self::Bool => BOOL,
            Self::Ubyte => UBYTE,
            Self::Ushort => USHORT,
            Self::Uint => UINT,
            Self::Ulong => ULONG,
            Self::Byte => BYTE,
            Self::Short => SHORT,
            Self::Int => INT,
            Self::Long => LONG,
            Self::Float => FLOAT,
            Self::Double => DOUBLE,
            Self::Char => CHAR,
            Self::Timestamp => TIMESTAMP,
            Self::Uuid => UUID,
            Self::Binary => VBIN32,
            Self::String => STR32,
            Self::Symbol => SYM32,
            Self::List => LIST32,
            Self::Map => MAP32,
        }
    }
}

use PrimitiveKind as K;

// Per-category slot tables, indexed by the low nibble. None marks a
// reserved, decimal or array slot.
const CAT_4: [Option<K>; 6] = [
    Some(K::Null),  // 0x40
    Some(K::Bool),  // 0x41 fixed true
    Some(K::Bool),  // 0x42 fixed false
    Some(K::Uint),  // 0x43 uint0
    Some(K::Ulong), // 0x44 ulong0
    Some(K::List),  // 0x45 list0
];
const CAT_5: [Option<K>; 7] = [
    Some(K::Ubyte), // 0x50
    Some(K::Byte),  // 0x51
    Some(K::Uint),  // 0x52 small uint
    Some(K::Ulong), // 0x53 small ulong
    Some(K::Int),   // 0x54 small int
    Some(K::Long),  // 0x55 small long
    Some(K::Bool),  // 0x56
];
const CAT_6: [Option<K>; 2] = [Some(K::Ushort), Some(K::Short)];
const CAT_7: [Option<K>; 5] = [
    Some(K::Uint),
    Some(K::Int),
    Some(K::Float),
    Some(K::Char),
    None, // 0x74 decimal32
];
const CAT_8: [Option<K>; 5] = [
    Some(K::Ulong),
    Some(K::Long),
    Some(K::Double),
    Some(K::Timestamp),
    None, // 0x84 decimal64
];
const CAT_9: [Option<K>; 9] = [
    None,
    None,
    None,
    None,
    None, // 0x94 decimal128
    None,
    None,
    None,
    Some(K::Uuid), // 0x98
];
const CAT_A: [Option<K>; 4] = [Some(K::Binary), Some(K::String), None, Some(K::Symbol)];
const CAT_B: [Option<K>; 4] = [Some(K::Binary), Some(K::String), None, Some(K::Symbol)];
const CAT_C: [Option<K>; 2] = [Some(K::List), Some(K::Map)];
const CAT_D: [Option<K>; 2] = [Some(K::List), Some(K::Map)];
const CAT_E: [Option<K>; 1] = [None]; // 0xe0 array8
const CAT_F: [Option<K>; 1] = [None]; // 0xf0 array32

static DISPATCH: [&[Option<K>]; 12] = [
    &CAT_4, &CAT_5, &CAT_6, &CAT_7, &CAT_8, &CAT_9, &CAT_A, &CAT_B, &CAT_C, &CAT_D, &CAT_E, &CAT_F,
];

/// Look up the primitive kind designated by a format code.
///
/// Returns `None` for codes below 0x40 (other than via [`DESCRIBED`],
/// which is handled by composite decoding) and for reserved, decimal
/// and array slots.
pub fn primitive_for(code: u8) -> Option<PrimitiveKind> {
    let category = usize::from(code >> 4).checked_sub(4)?;
    let slot = usize::from(code & 0x0f);
    DISPATCH.get(category)?.get(slot).copied().flatten()
}
