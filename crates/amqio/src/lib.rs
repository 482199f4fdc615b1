// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # amqio — AMQP 1.0 type-system codec in pure Rust
//!
//! amqio encodes and decodes values in the AMQP 1.0 type system:
//! the full primitive set, described composite types (list- or
//! map-encoded), and polymorphic decoding where the wire descriptor
//! selects a registered subtype at runtime.
//!
//! ## Quick start
//!
//! ```
//! use amqio::{AmqpSerializer, FieldSpec, ReadCursor, SchemaDescriptor};
//!
//! #[derive(Default, PartialEq, Debug)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let amqp = AmqpSerializer::new();
//! amqp.register::<Point>(
//!     SchemaDescriptor::list("example:point")
//!         .field(FieldSpec::required("x", 0, |p: &Point| &p.x, |p: &mut Point, v| p.x = v))
//!         .field(FieldSpec::required("y", 1, |p: &Point| &p.y, |p: &mut Point, v| p.y = v)),
//! )?;
//!
//! let mut buf = Vec::new();
//! amqp.serialize(&mut buf, &Point { x: 3, y: -1 })?;
//!
//! let decoded = amqp.deserialize::<Point>(&mut ReadCursor::new(&buf))?;
//! assert_eq!(decoded, Some(Point { x: 3, y: -1 }));
//! # Ok::<(), amqio::AmqpError>(())
//! ```
//!
//! ## Key types
//!
//! | Type | Role |
//! |------|------|
//! | [`AmqpSerializer`] | Facade: registration plus serialize/deserialize |
//! | [`SchemaDescriptor`] | Wire schema of one described type |
//! | [`FieldSpec`] | One field: name, order, erased accessors |
//! | [`Value`] | Dynamic primitive value, no schema required |
//! | [`Shared<T>`] | `Arc<RwLock<T>>` handle for graphs with back-references |
//! | [`WriteCursor`] / [`ReadCursor`] | Big-endian buffer cursors |
//!
//! Writers emit the widest stable form of every primitive; readers
//! accept all wire forms. Cyclic object graphs are rejected at write
//! time with [`AmqpError::CyclicReference`], while cyclic *type*
//! definitions (via `Box` or [`Shared`] fields) are fully supported.

pub mod format;

mod cursor;
mod error;
mod primitive;
mod registry;
mod schema;
mod serializer;
mod value;

pub use cursor::{ReadCursor, WriteCursor};
pub use error::{AmqpError, Result};
pub use schema::{EncodingKind, FieldSpec, SchemaDescriptor};
pub use serializer::AmqpSerializer;
pub use value::{AnyBox, Shared, Symbol, Timestamp, Value};

#[cfg(test)]
mod tests;
