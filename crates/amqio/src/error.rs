// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the AMQP type-system codec.

use thiserror::Error;

/// Errors raised while encoding or decoding AMQP values.
///
/// All failures are fatal for the current call: a partially written
/// buffer is left as-is and must be discarded by the caller.
#[derive(Debug, Error)]
pub enum AmqpError {
    /// No encoder is registered for the runtime type of a value.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// An object identity reappeared on the current encode path.
    #[error("cyclic object reference not supported")]
    CyclicReference,

    /// Schema-level failure detected while building a composite encoder
    /// (duplicate field order, unregistered descriptor, double registration).
    #[error("schema error: {0}")]
    Schema(String),

    /// A decoded format code does not match the expected code at a
    /// fixed-shape position.
    #[error("format mismatch: expected 0x{expected:02x}, found 0x{found:02x}")]
    FormatMismatch { expected: u8, found: u8 },

    /// A format code with no mapping in the primitive dispatch table.
    #[error("no encoder for format code 0x{0:02x}")]
    UnknownFormatCode(u8),

    /// A described value carried a descriptor symbol with no matching
    /// self-name or permitted-subtype entry.
    #[error("unknown type descriptor {0:?}")]
    UnknownDescriptor(String),

    /// A map-encoded composite carried a key with no matching field.
    #[error("field not found {0:?}")]
    UnknownField(String),

    /// An enum ordinal beyond the registered constant set.
    #[error("{type_name}: ordinal out of range {ordinal}")]
    OrdinalOutOfRange { type_name: &'static str, ordinal: i32 },

    /// A value's runtime type does not match the type its position requires.
    #[error("value does not match expected type {expected}")]
    TypeMismatch { expected: &'static str },

    /// Buffer underrun or malformed payload while reading.
    #[error("read failed at offset {offset}: {reason}")]
    ReadFailed { offset: usize, reason: String },

    /// Failed to patch a previously written size prefix.
    #[error("write failed at offset {offset}: {reason}")]
    WriteFailed { offset: usize, reason: String },

    /// Payload bytes that violate the encoding rules (bad UTF-8,
    /// non-ASCII symbol, invalid char scalar).
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, AmqpError>;
