// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors for AMQP buffer manipulation.
//!
//! AMQP is network byte order, so all multi-byte accessors are
//! big-endian. The write cursor grows its backing `Vec` and supports
//! patching a previously written 32-bit size prefix once the payload
//! length is known.

use crate::error::{AmqpError, Result};

/// Generate write methods for primitive types (eliminates code duplication)
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    };
}

/// Generate read methods for primitive types (eliminates code duplication)
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `AmqpError::ReadFailed` if overflow)
/// 2. Reads N bytes from buffer
/// 3. Converts bytes to value via `from_be_bytes()`
/// 4. Advances offset
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            if self.offset + $size > self.buf.len() {
                return Err(AmqpError::ReadFailed {
                    offset: self.offset,
                    reason: "unexpected end of buffer".into(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buf[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Growable write cursor (append-only, plus in-place size patching).
pub struct WriteCursor<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    /// Current write position (= bytes written so far).
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    impl_write_be!(write_i8, i8);
    impl_write_be!(write_u16_be, u16);
    impl_write_be!(write_i16_be, i16);
    impl_write_be!(write_u32_be, u32);
    impl_write_be!(write_i32_be, i32);
    impl_write_be!(write_u64_be, u64);
    impl_write_be!(write_i64_be, i64);

    pub fn write_f32_be(&mut self, value: f32) {
        self.write_u32_be(value.to_bits());
    }

    pub fn write_f64_be(&mut self, value: f64) {
        self.write_u64_be(value.to_bits());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Patch a 32-bit size prefix written earlier at `pos`.
    pub fn patch_u32(&mut self, pos: usize, value: u32) -> Result<()> {
        if pos + 4 > self.buf.len() {
            return Err(AmqpError::WriteFailed {
                offset: pos,
                reason: "patch position out of range".into(),
            });
        }
        self.buf[pos..pos + 4].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }
}

/// Bounds-checked read cursor (zero-copy).
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Current read position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buf.len()
    }

    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_i8, i8, 1);
    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_i16_be, i16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_i32_be, i32, 4);
    impl_read_be!(read_u64_be, u64, 8);
    impl_read_be!(read_i64_be, i64, 8);

    pub fn read_f32_be(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32_be()?))
    }

    pub fn read_f64_be(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64_be()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.offset + len > self.buf.len() {
            return Err(AmqpError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }
}
