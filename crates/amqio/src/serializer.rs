// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer facade.
//!
//! An [`AmqpSerializer`] owns one type registry. Registering schemas
//! is explicit: there is no reflection, so a type the registry has not
//! seen fails with [`AmqpError::UnsupportedType`] instead of falling
//! back to a guessed encoding.

use std::any::{Any, TypeId};
use std::sync::OnceLock;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{AmqpError, Result};
use crate::primitive::{read_value, write_value};
use crate::registry::{PathSet, Registry};
use crate::schema::SchemaDescriptor;
use crate::value::{AnyBox, Value};

/// Bidirectional AMQP 1.0 codec over a set of registered types.
#[derive(Default)]
pub struct AmqpSerializer {
    registry: Registry,
}

static GLOBAL: OnceLock<AmqpSerializer> = OnceLock::new();

impl AmqpSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide serializer instance, for callers that share one
    /// registry across the program.
    pub fn global() -> &'static AmqpSerializer {
        GLOBAL.get_or_init(AmqpSerializer::new)
    }

    /// Register a composite type under its schema.
    pub fn register<T>(&self, schema: SchemaDescriptor) -> Result<()>
    where
        T: Any + Default + Send + Sync,
    {
        self.registry.register::<T>(schema)
    }

    /// Register an enum-like type; the wire carries the index of the
    /// value in `constants`.
    pub fn register_enum<T>(&self, constants: Vec<T>)
    where
        T: Any + Clone + PartialEq + Send + Sync,
    {
        self.registry.register_enum(constants)
    }

    /// Encode `value` onto the end of `buf`.
    pub fn serialize<T: Any>(&self, buf: &mut Vec<u8>, value: &T) -> Result<()> {
        if !self.registry.is_registered(TypeId::of::<T>()) {
            return Err(AmqpError::UnsupportedType(
                std::any::type_name::<T>().to_owned(),
            ));
        }
        let mut cur = WriteCursor::new(buf);
        let mut path = PathSet::new();
        self.registry.write_any(&mut cur, value, &mut path)
    }

    /// Encode a dynamic value without a schema.
    pub fn serialize_value(&self, buf: &mut Vec<u8>, value: &Value) -> Result<()> {
        write_value(&mut WriteCursor::new(buf), value)
    }

    /// Decode a value of type `T`. Returns `Ok(None)` when the wire
    /// carries null. When the wire carries a registered subtype of
    /// `T`, the downcast fails; use [`deserialize_dyn`] for
    /// polymorphic reads.
    ///
    /// [`deserialize_dyn`]: AmqpSerializer::deserialize_dyn
    pub fn deserialize<T: Any>(&self, cur: &mut ReadCursor<'_>) -> Result<Option<T>> {
        match self.deserialize_dyn::<T>(cur)? {
            Some(value) => {
                let value: Box<T> = value.downcast().map_err(|_| AmqpError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                })?;
                Ok(Some(*value))
            }
            None => Ok(None),
        }
    }

    /// Decode a value declared as `T`, keeping the result type-erased
    /// so the caller can downcast to whichever registered subtype the
    /// wire descriptor named.
    pub fn deserialize_dyn<T: Any>(&self, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let encoder = self.registry.resolve(TypeId::of::<T>())?;
        encoder.read(&self.registry, cur)
    }

    /// Decode any primitive value without a schema.
    pub fn deserialize_value(&self, cur: &mut ReadCursor<'_>) -> Result<Value> {
        read_value(cur)
    }
}
