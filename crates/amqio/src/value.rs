// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime value model for schemaless AMQP payloads.
//!
//! [`Value`] is the dynamic counterpart of the static primitive types:
//! every AMQP primitive maps onto exactly one variant, and `Value`
//! trees can be encoded and decoded without a registered schema.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::{AmqpError, Result};

/// Type-erased owned value, the currency of the polymorphic codec paths.
pub type AnyBox = Box<dyn Any + Send + Sync>;

/// Milliseconds since the Unix epoch (AMQP `timestamp`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    pub fn millis(self) -> i64 {
        self.0
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        // Times before the epoch map to negative millis.
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp(d.as_millis() as i64),
            Err(e) => Timestamp(-(e.duration().as_millis() as i64)),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// AMQP `symbol`: ASCII-only string, typically a descriptor or key name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Build a symbol, rejecting non-ASCII content.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if !s.is_ascii() {
            return Err(AmqpError::InvalidData(format!(
                "symbol must be ASCII: {s:?}"
            )));
        }
        Ok(Symbol(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dynamic AMQP value.
///
/// Maps are kept as ordered pairs rather than a hash map so that
/// encode order is deterministic and duplicate-tolerant decode stays
/// faithful to the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Ubyte(u8),
    Ushort(u16),
    Uint(u32),
    Ulong(u64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Timestamp(Timestamp),
    Uuid(Uuid),
    Binary(Vec<u8>),
    String(String),
    Symbol(Symbol),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Ubyte(v) => Some(u64::from(*v)),
            Value::Ushort(v) => Some(u64::from(*v)),
            Value::Uint(v) => Some(u64::from(*v)),
            Value::Ulong(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// First value whose key equals `key` (linear scan).
    pub fn map_get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Re-box as the native Rust payload each variant corresponds to,
    /// so dynamic decode output downcasts the same way schema-driven
    /// decode output does.
    pub(crate) fn into_any(self) -> AnyBox {
        match self {
            Value::Null => Box::new(Value::Null),
            Value::Bool(v) => Box::new(v),
            Value::Ubyte(v) => Box::new(v),
            Value::Ushort(v) => Box::new(v),
            Value::Uint(v) => Box::new(v),
            Value::Ulong(v) => Box::new(v),
            Value::Byte(v) => Box::new(v),
            Value::Short(v) => Box::new(v),
            Value::Int(v) => Box::new(v),
            Value::Long(v) => Box::new(v),
            Value::Float(v) => Box::new(v),
            Value::Double(v) => Box::new(v),
            Value::Char(v) => Box::new(v),
            Value::Timestamp(v) => Box::new(v),
            Value::Uuid(v) => Box::new(v),
            Value::Binary(v) => Box::new(v),
            Value::String(v) => Box::new(v),
            Value::Symbol(v) => Box::new(v),
            Value::List(v) => Box::new(v),
            Value::Map(v) => Box::new(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Symbol> for Value {
    fn from(v: Symbol) -> Self {
        Value::Symbol(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Shared mutable handle for object graphs that may contain cycles.
///
/// Plain ownership cannot express a back-reference; `Shared<T>` wraps
/// the node in `Arc<RwLock<_>>` so two objects can point at each other.
/// The serializer uses pointer identity to detect when such a graph
/// loops back on itself.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Stable identity of the shared allocation.
    pub(crate) fn ptr_id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T: PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.read() == *other.read()
    }
}
