// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composite type schemas.
//!
//! A [`SchemaDescriptor`] tells the registry how one Rust struct maps
//! onto an AMQP described type: the descriptor symbol, whether the body
//! is list- or map-encoded, the fields (with their wire order and
//! type-erased accessors), and any registered subtypes that decode may
//! substitute when the wire carries their descriptor instead.

use std::any::{Any, TypeId};

use crate::error::{AmqpError, Result};
use crate::value::AnyBox;

/// Body encoding for a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingKind {
    /// Positional body: field slots ordered by `FieldSpec::order`.
    List,
    /// Keyed body: `symbol -> value` pairs, order-independent on read.
    Map,
}

type Getter = Box<dyn for<'a> Fn(&'a dyn Any) -> Result<Option<&'a dyn Any>> + Send + Sync>;
type Setter = Box<dyn Fn(&mut dyn Any, AnyBox) -> Result<()> + Send + Sync>;

/// One field of a composite type: name, wire order, value type, and
/// erased get/set closures over the owning struct.
pub struct FieldSpec {
    name: String,
    order: i32,
    value_type: TypeId,
    value_type_name: &'static str,
    get: Getter,
    set: Setter,
}

fn mismatch(expected: &'static str) -> AmqpError {
    AmqpError::TypeMismatch { expected }
}

impl FieldSpec {
    /// Field whose value is always present.
    pub fn required<T, V>(
        name: impl Into<String>,
        order: i32,
        get: fn(&T) -> &V,
        set: fn(&mut T, V),
    ) -> Self
    where
        T: Any,
        V: Any + Send + Sync,
    {
        FieldSpec {
            name: name.into(),
            order,
            value_type: TypeId::of::<V>(),
            value_type_name: std::any::type_name::<V>(),
            get: Box::new(move |obj| {
                let obj = obj
                    .downcast_ref::<T>()
                    .ok_or_else(|| mismatch(std::any::type_name::<T>()))?;
                Ok(Some(get(obj) as &dyn Any))
            }),
            set: Box::new(move |obj, value| {
                let obj = obj
                    .downcast_mut::<T>()
                    .ok_or_else(|| mismatch(std::any::type_name::<T>()))?;
                let value = value
                    .downcast::<V>()
                    .map_err(|_| mismatch(std::any::type_name::<V>()))?;
                set(obj, *value);
                Ok(())
            }),
        }
    }

    /// Field stored as `Option<V>`; `None` encodes as AMQP null.
    pub fn optional<T, V>(
        name: impl Into<String>,
        order: i32,
        get: fn(&T) -> Option<&V>,
        set: fn(&mut T, V),
    ) -> Self
    where
        T: Any,
        V: Any + Send + Sync,
    {
        FieldSpec {
            name: name.into(),
            order,
            value_type: TypeId::of::<V>(),
            value_type_name: std::any::type_name::<V>(),
            get: Box::new(move |obj| {
                let obj = obj
                    .downcast_ref::<T>()
                    .ok_or_else(|| mismatch(std::any::type_name::<T>()))?;
                Ok(get(obj).map(|v| v as &dyn Any))
            }),
            set: Box::new(move |obj, value| {
                let obj = obj
                    .downcast_mut::<T>()
                    .ok_or_else(|| mismatch(std::any::type_name::<T>()))?;
                let value = value
                    .downcast::<V>()
                    .map_err(|_| mismatch(std::any::type_name::<V>()))?;
                set(obj, *value);
                Ok(())
            }),
        }
    }

    /// Field holding a type-erased payload whose concrete codec is
    /// chosen by the registered type `B` on write and by the wire
    /// descriptor on read.
    pub fn polymorphic<T, B>(
        name: impl Into<String>,
        order: i32,
        get: fn(&T) -> Option<&AnyBox>,
        set: fn(&mut T, AnyBox),
    ) -> Self
    where
        T: Any,
        B: Any,
    {
        FieldSpec {
            name: name.into(),
            order,
            value_type: TypeId::of::<B>(),
            value_type_name: std::any::type_name::<B>(),
            get: Box::new(move |obj| {
                let obj = obj
                    .downcast_ref::<T>()
                    .ok_or_else(|| mismatch(std::any::type_name::<T>()))?;
                Ok(get(obj).map(|v| v.as_ref() as &dyn Any))
            }),
            set: Box::new(move |obj, value| {
                let obj = obj
                    .downcast_mut::<T>()
                    .ok_or_else(|| mismatch(std::any::type_name::<T>()))?;
                set(obj, value);
                Ok(())
            }),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn order(&self) -> i32 {
        self.order
    }

    pub(crate) fn value_type(&self) -> TypeId {
        self.value_type
    }

    pub(crate) fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    pub(crate) fn get_value<'a>(&self, obj: &'a dyn Any) -> Result<Option<&'a dyn Any>> {
        (self.get)(obj)
    }

    pub(crate) fn set_value(&self, obj: &mut dyn Any, value: AnyBox) -> Result<()> {
        (self.set)(obj, value)
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("value_type", &self.value_type_name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SubtypeSpec {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
}

/// Schema for one described type. Built fluently:
///
/// ```ignore
/// SchemaDescriptor::list("example:person")
///     .field(FieldSpec::optional("name", 1, Person::name_ref, Person::set_name))
///     .subtype::<Student>()
/// ```
#[derive(Debug)]
pub struct SchemaDescriptor {
    kind: EncodingKind,
    name: String,
    fields: Vec<FieldSpec>,
    subtypes: Vec<SubtypeSpec>,
}

impl SchemaDescriptor {
    /// List-encoded described type with the given descriptor symbol.
    pub fn list(name: impl Into<String>) -> Self {
        SchemaDescriptor {
            kind: EncodingKind::List,
            name: name.into(),
            fields: Vec::new(),
            subtypes: Vec::new(),
        }
    }

    /// Map-encoded described type with the given descriptor symbol.
    pub fn map(name: impl Into<String>) -> Self {
        SchemaDescriptor {
            kind: EncodingKind::Map,
            name: name.into(),
            fields: Vec::new(),
            subtypes: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare that decode may produce `S` when the wire descriptor
    /// names the schema registered for `S`.
    pub fn subtype<S: Any>(mut self) -> Self {
        self.subtypes.push(SubtypeSpec {
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
        });
        self
    }

    pub(crate) fn kind(&self) -> EncodingKind {
        self.kind
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub(crate) fn subtypes(&self) -> &[SubtypeSpec] {
        &self.subtypes
    }
}
