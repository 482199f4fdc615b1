// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry and composite codecs.
//!
//! The registry maps Rust `TypeId`s to wire codecs. Primitive codecs
//! are installed up front; composite codecs are built lazily from
//! registered [`SchemaDescriptor`]s. Building is cycle-tolerant:
//! mutually recursive schemas (A has a `Box<B>` field, B a `Box<A>`)
//! resolve against a shell codec whose field table is filled in once,
//! after the whole strongly connected group has been walked.
//!
//! Object graphs are a different matter from type graphs: a cycle of
//! live references cannot be written to a flat wire, so write tracks
//! the ancestor path and fails with [`AmqpError::CyclicReference`]
//! when a value reappears on its own path.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::{debug, trace};

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{AmqpError, Result};
use crate::format::{self, PrimitiveKind};
use crate::primitive::{
    expect_code, read_count, read_symbol, read_value, write_symbol, Encoder, PrimitiveCodec,
    ValueCodec,
};
use crate::schema::{EncodingKind, SchemaDescriptor};
use crate::value::{AnyBox, Shared, Symbol, Timestamp, Value};

/// Identities of the `Shared` allocations on the current encode path,
/// from the root down to the value in hand. A repeat entry means the
/// graph loops.
#[derive(Debug, Default)]
pub(crate) struct PathSet(HashSet<usize>);

impl PathSet {
    pub(crate) fn new() -> Self {
        PathSet(HashSet::new())
    }

    pub(crate) fn enter(&mut self, addr: usize) -> Result<()> {
        if self.0.insert(addr) {
            Ok(())
        } else {
            Err(AmqpError::CyclicReference)
        }
    }

    pub(crate) fn leave(&mut self, addr: usize) {
        self.0.remove(&addr);
    }
}

type Ctor = Arc<dyn Fn() -> AnyBox + Send + Sync>;
type BuildSet = HashMap<TypeId, Arc<CompositeEncoder>>;

/// Codec registry, keyed by `TypeId`.
pub(crate) struct Registry {
    primitives: HashMap<TypeId, Arc<dyn Encoder>>,
    schemas: DashMap<TypeId, Arc<SchemaDescriptor>>,
    ctors: DashMap<TypeId, Ctor>,
    enums: DashMap<TypeId, Arc<dyn Encoder>>,
    wrappers: DashMap<TypeId, Arc<dyn Encoder>>,
    composites: DashMap<TypeId, Arc<CompositeEncoder>>,
    names: DashMap<TypeId, &'static str>,
}

fn primitive_entry<T: Any>(kind: PrimitiveKind) -> (TypeId, Arc<dyn Encoder>) {
    (TypeId::of::<T>(), Arc::new(PrimitiveCodec(kind)))
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        let mut primitives: HashMap<TypeId, Arc<dyn Encoder>> = HashMap::from([
            primitive_entry::<bool>(PrimitiveKind::Bool),
            primitive_entry::<u8>(PrimitiveKind::Ubyte),
            primitive_entry::<u16>(PrimitiveKind::Ushort),
            primitive_entry::<u32>(PrimitiveKind::Uint),
            primitive_entry::<u64>(PrimitiveKind::Ulong),
            primitive_entry::<i8>(PrimitiveKind::Byte),
            primitive_entry::<i16>(PrimitiveKind::Short),
            primitive_entry::<i32>(PrimitiveKind::Int),
            primitive_entry::<i64>(PrimitiveKind::Long),
            primitive_entry::<f32>(PrimitiveKind::Float),
            primitive_entry::<f64>(PrimitiveKind::Double),
            primitive_entry::<char>(PrimitiveKind::Char),
            primitive_entry::<Timestamp>(PrimitiveKind::Timestamp),
            primitive_entry::<uuid::Uuid>(PrimitiveKind::Uuid),
            primitive_entry::<Vec<u8>>(PrimitiveKind::Binary),
            primitive_entry::<String>(PrimitiveKind::String),
            primitive_entry::<Symbol>(PrimitiveKind::Symbol),
            primitive_entry::<Vec<Value>>(PrimitiveKind::List),
            primitive_entry::<Vec<(Value, Value)>>(PrimitiveKind::Map),
        ]);
        primitives.insert(TypeId::of::<Value>(), Arc::new(ValueCodec));

        Registry {
            primitives,
            schemas: DashMap::new(),
            ctors: DashMap::new(),
            enums: DashMap::new(),
            wrappers: DashMap::new(),
            composites: DashMap::new(),
            names: DashMap::new(),
        }
    }

    /// Register a composite type. `Box<T>` and `Shared<T>` become
    /// encodable alongside `T` itself.
    pub(crate) fn register<T>(&self, schema: SchemaDescriptor) -> Result<()>
    where
        T: Any + Default + Send + Sync,
    {
        if schema.name().is_empty() || !schema.name().is_ascii() {
            return Err(AmqpError::Schema(format!(
                "descriptor name must be non-empty ASCII: {:?}",
                schema.name()
            )));
        }
        // Field names become map keys on the wire; a name the symbol
        // codec cannot read back must never encode.
        for field in schema.fields() {
            if field.name().is_empty() || !field.name().is_ascii() {
                return Err(AmqpError::Schema(format!(
                    "field name must be non-empty ASCII: {:?} in {:?}",
                    field.name(),
                    schema.name()
                )));
            }
        }
        let tid = TypeId::of::<T>();
        for entry in self.schemas.iter() {
            if entry.value().name() == schema.name() && *entry.key() != tid {
                return Err(AmqpError::Schema(format!(
                    "descriptor {:?} already registered for another type",
                    schema.name()
                )));
            }
        }
        debug!(
            "registering {} as {:?} ({} fields)",
            std::any::type_name::<T>(),
            schema.name(),
            schema.fields().len()
        );
        self.schemas.insert(tid, Arc::new(schema));
        self.ctors
            .insert(tid, Arc::new(|| Box::new(T::default()) as AnyBox) as Ctor);
        self.names.insert(tid, std::any::type_name::<T>());
        self.wrappers.insert(
            TypeId::of::<Box<T>>(),
            Arc::new(BoxedCodec::<T>(PhantomData)),
        );
        self.wrappers.insert(
            TypeId::of::<Shared<T>>(),
            Arc::new(SharedCodec::<T>(PhantomData)),
        );
        // Re-registration invalidates any built codec.
        self.composites.remove(&tid);
        Ok(())
    }

    /// Register an enum-like type encoded as the ordinal of its
    /// position in `constants`.
    pub(crate) fn register_enum<T>(&self, constants: Vec<T>)
    where
        T: Any + Clone + PartialEq + Send + Sync,
    {
        let tid = TypeId::of::<T>();
        debug!(
            "registering enum {} ({} constants)",
            std::any::type_name::<T>(),
            constants.len()
        );
        self.names.insert(tid, std::any::type_name::<T>());
        self.enums.insert(
            tid,
            Arc::new(EnumCodec {
                constants,
                type_name: std::any::type_name::<T>(),
            }),
        );
    }

    pub(crate) fn is_registered(&self, tid: TypeId) -> bool {
        self.primitives.contains_key(&tid)
            || self.wrappers.contains_key(&tid)
            || self.enums.contains_key(&tid)
            || self.schemas.contains_key(&tid)
    }

    fn name_of(&self, tid: TypeId) -> String {
        self.names
            .get(&tid)
            .map(|n| (*n).to_owned())
            .unwrap_or_else(|| format!("{tid:?}"))
    }

    /// Codec for a type, building composite codecs on first use.
    pub(crate) fn resolve(&self, tid: TypeId) -> Result<Arc<dyn Encoder>> {
        let mut in_build = BuildSet::new();
        self.resolve_with(tid, &mut in_build)
    }

    fn resolve_with(&self, tid: TypeId, in_build: &mut BuildSet) -> Result<Arc<dyn Encoder>> {
        if let Some(enc) = self.primitives.get(&tid) {
            return Ok(Arc::clone(enc));
        }
        if let Some(enc) = self.wrappers.get(&tid) {
            return Ok(Arc::clone(enc.value()));
        }
        if let Some(enc) = self.enums.get(&tid) {
            return Ok(Arc::clone(enc.value()));
        }
        if self.schemas.contains_key(&tid) {
            return Ok(self.build_composite(tid, in_build)?);
        }
        Err(AmqpError::UnsupportedType(self.name_of(tid)))
    }

    /// Build (or fetch) the composite codec for `tid`. A shell enters
    /// `in_build` before field resolution so recursive type references
    /// bind to it instead of recursing forever.
    fn build_composite(
        &self,
        tid: TypeId,
        in_build: &mut BuildSet,
    ) -> Result<Arc<CompositeEncoder>> {
        if let Some(enc) = self.composites.get(&tid) {
            return Ok(Arc::clone(enc.value()));
        }
        if let Some(shell) = in_build.get(&tid) {
            return Ok(Arc::clone(shell));
        }
        let schema = self
            .schemas
            .get(&tid)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| AmqpError::UnsupportedType(self.name_of(tid)))?;
        let ctor = self
            .ctors
            .get(&tid)
            .map(|c| Arc::clone(c.value()))
            .ok_or_else(|| AmqpError::UnsupportedType(self.name_of(tid)))?;

        let shell = Arc::new(CompositeEncoder {
            descriptor: Arc::clone(&schema),
            ctor,
            body: OnceLock::new(),
        });
        in_build.insert(tid, Arc::clone(&shell));

        let mut fields = Vec::with_capacity(schema.fields().len());
        for (index, field) in schema.fields().iter().enumerate() {
            let encoder = self.resolve_with(field.value_type(), in_build).map_err(|e| {
                AmqpError::Schema(format!(
                    "field {:?} of {:?} ({}): {e}",
                    field.name(),
                    schema.name(),
                    field.value_type_name()
                ))
            })?;
            fields.push(BoundField { index, encoder });
        }
        fields.sort_by_key(|bf| schema.fields()[bf.index].order());
        for pair in fields.windows(2) {
            let a = &schema.fields()[pair[0].index];
            let b = &schema.fields()[pair[1].index];
            if schema.kind() == EncodingKind::List && a.order() == b.order() {
                return Err(AmqpError::Schema(format!(
                    "fields {:?} and {:?} of {:?} share order {}",
                    a.name(),
                    b.name(),
                    schema.name(),
                    a.order()
                )));
            }
            if a.name() == b.name() {
                return Err(AmqpError::Schema(format!(
                    "duplicate field {:?} in {:?}",
                    a.name(),
                    schema.name()
                )));
            }
        }

        let mut subtypes = HashMap::new();
        for sub in schema.subtypes() {
            let codec = self.build_composite(sub.type_id, in_build).map_err(|e| {
                AmqpError::Schema(format!(
                    "subtype {} of {:?}: {e}",
                    sub.type_name,
                    schema.name()
                ))
            })?;
            subtypes.insert(codec.descriptor.name().to_owned(), codec);
        }

        let _ = shell.body.set(CompositeBody { fields, subtypes });
        in_build.remove(&tid);
        self.composites.insert(tid, Arc::clone(&shell));
        debug!("built codec for descriptor {:?}", schema.name());
        Ok(shell)
    }

    /// Write a value by its runtime type. Plain borrowed ownership
    /// cannot form cycles (a struct's first field even shares its
    /// parent's address), so only `Shared` handles enter the ancestor
    /// path, by their allocation identity.
    pub(crate) fn write_any(
        &self,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        path: &mut PathSet,
    ) -> Result<()> {
        let encoder = self.resolve(value.type_id())?;
        encoder.write(self, cur, Some(value), path)
    }
}

struct BoundField {
    /// Index into the descriptor's declaration-order field slice.
    index: usize,
    encoder: Arc<dyn Encoder>,
}

struct CompositeBody {
    /// Fields sorted by wire order.
    fields: Vec<BoundField>,
    /// Descriptor name -> codec, for polymorphic decode.
    subtypes: HashMap<String, Arc<CompositeEncoder>>,
}

/// Codec for one described type.
pub(crate) struct CompositeEncoder {
    descriptor: Arc<SchemaDescriptor>,
    ctor: Ctor,
    body: OnceLock<CompositeBody>,
}

impl CompositeEncoder {
    fn body(&self) -> Result<&CompositeBody> {
        self.body.get().ok_or_else(|| {
            AmqpError::Schema(format!(
                "codec for {:?} is not fully built",
                self.descriptor.name()
            ))
        })
    }

    fn read_fields_list(
        &self,
        reg: &Registry,
        cur: &mut ReadCursor<'_>,
        code: u8,
    ) -> Result<AnyBox> {
        let body = self.body()?;
        let count = read_count(cur, code, Some(format::LIST0), format::LIST8, format::LIST32)?;
        let mut obj = (self.ctor)();
        for slot in 0..count {
            match body.fields.get(slot) {
                Some(bf) => {
                    if let Some(value) = bf.encoder.read(reg, cur)? {
                        let field = &self.descriptor.fields()[bf.index];
                        field.set_value(obj.as_mut(), value)?;
                    }
                }
                // Peers may append trailing fields we do not know.
                None => {
                    read_value(cur)?;
                }
            }
        }
        Ok(obj)
    }

    fn read_fields_map(
        &self,
        reg: &Registry,
        cur: &mut ReadCursor<'_>,
        code: u8,
    ) -> Result<AnyBox> {
        let body = self.body()?;
        let count = read_count(cur, code, None, format::MAP8, format::MAP32)?;
        if count % 2 != 0 {
            return Err(AmqpError::InvalidData(format!(
                "odd map element count {count} in {:?}",
                self.descriptor.name()
            )));
        }
        let mut obj = (self.ctor)();
        for _ in 0..count / 2 {
            let key = read_symbol(cur)?;
            let bf = body
                .fields
                .iter()
                .find(|bf| self.descriptor.fields()[bf.index].name() == key.as_str())
                .ok_or_else(|| AmqpError::UnknownField(key.into_string()))?;
            if let Some(value) = bf.encoder.read(reg, cur)? {
                let field = &self.descriptor.fields()[bf.index];
                field.set_value(obj.as_mut(), value)?;
            }
        }
        Ok(obj)
    }
}

impl Encoder for CompositeEncoder {
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
        cur.write_u8(format::DESCRIBED);
        write_symbol(cur, self.descriptor.name());
        self.write_raw(reg, cur, value, path)
    }

    fn write_raw(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        path: &mut PathSet,
    ) -> Result<()> {
        let body = self.body()?;
        match self.descriptor.kind() {
            EncodingKind::List => {
                cur.write_u8(format::LIST32);
                let size_pos = cur.position();
                cur.write_u32_be(0);
                cur.write_u32_be(body.fields.len() as u32);
                for bf in &body.fields {
                    let field = &self.descriptor.fields()[bf.index];
                    // Dispatch on the runtime type so subtype values in
                    // polymorphic fields carry their own descriptor.
                    match field.get_value(value)? {
                        Some(v) => reg.write_any(cur, v, path)?,
                        None => cur.write_u8(format::NULL),
                    }
                }
                cur.patch_u32(size_pos, (cur.position() - size_pos - 4) as u32)
            }
            EncodingKind::Map => {
                cur.write_u8(format::MAP32);
                let size_pos = cur.position();
                cur.write_u32_be(0);
                cur.write_u32_be((body.fields.len() * 2) as u32);
                for bf in &body.fields {
                    let field = &self.descriptor.fields()[bf.index];
                    write_symbol(cur, field.name());
                    match field.get_value(value)? {
                        Some(v) => reg.write_any(cur, v, path)?,
                        None => cur.write_u8(format::NULL),
                    }
                }
                cur.patch_u32(size_pos, (cur.position() - size_pos - 4) as u32)
            }
        }
    }

    fn read(&self, reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let code = cur.read_u8()?;
        if code == format::NULL {
            return Ok(None);
        }
        expect_code(format::DESCRIBED, code)?;
        let name = read_symbol(cur)?;
        let body_code = cur.read_u8()?;
        if name.as_str() == self.descriptor.name() {
            return Ok(Some(self.read_raw(reg, cur, body_code)?));
        }
        let body = self.body()?;
        match body.subtypes.get(name.as_str()) {
            Some(sub) => {
                trace!(
                    "descriptor {:?} substitutes for {:?}",
                    name.as_str(),
                    self.descriptor.name()
                );
                Ok(Some(sub.read_raw(reg, cur, body_code)?))
            }
            None => Err(AmqpError::UnknownDescriptor(name.into_string())),
        }
    }

    fn read_raw(&self, reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox> {
        match self.descriptor.kind() {
            EncodingKind::List => self.read_fields_list(reg, cur, code),
            EncodingKind::Map => self.read_fields_map(reg, cur, code),
        }
    }
}

/// Ordinal codec for enum-like types: the wire carries the position of
/// the constant in the registered constant list, as a 4-byte int.
struct EnumCodec<T> {
    constants: Vec<T>,
    type_name: &'static str,
}

impl<T> EnumCodec<T>
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    fn ordinal_of(&self, value: &dyn Any) -> Result<i32> {
        let value = value
            .downcast_ref::<T>()
            .ok_or(AmqpError::TypeMismatch {
                expected: self.type_name,
            })?;
        self.constants
            .iter()
            .position(|c| c == value)
            .map(|p| p as i32)
            .ok_or_else(|| {
                AmqpError::InvalidData(format!(
                    "value is not a registered constant of {}",
                    self.type_name
                ))
            })
    }

    fn constant_at(&self, ordinal: i32) -> Result<T> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| self.constants.get(i))
            .cloned()
            .ok_or(AmqpError::OrdinalOutOfRange {
                type_name: self.type_name,
                ordinal,
            })
    }
}

impl<T> Encoder for EnumCodec<T>
where
    T: Any + Clone + PartialEq + Send + Sync,
{
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
        let ordinal = self.ordinal_of(value)?;
        cur.write_u8(format::INT);
        cur.write_i32_be(ordinal);
        Ok(())
    }

    fn write_raw(
        &self,
        _reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        _path: &mut PathSet,
    ) -> Result<()> {
        cur.write_i32_be(self.ordinal_of(value)?);
        Ok(())
    }

    fn read(&self, reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let code = cur.read_u8()?;
        if code == format::NULL {
            return Ok(None);
        }
        Ok(Some(self.read_raw(reg, cur, code)?))
    }

    fn read_raw(&self, _reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox> {
        expect_code(format::INT, code)?;
        let ordinal = cur.read_i32_be()?;
        Ok(Box::new(self.constant_at(ordinal)?))
    }
}

/// Codec for `Box<T>` fields, used to break recursive type layouts.
struct BoxedCodec<T>(PhantomData<fn() -> T>);

impl<T> Encoder for BoxedCodec<T>
where
    T: Any + Send + Sync,
{
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
        let boxed = value.downcast_ref::<Box<T>>().ok_or(AmqpError::TypeMismatch {
            expected: std::any::type_name::<Box<T>>(),
        })?;
        let inner = reg.resolve(TypeId::of::<T>())?;
        inner.write(reg, cur, Some(boxed.as_ref() as &dyn Any), path)
    }

    fn write_raw(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        path: &mut PathSet,
    ) -> Result<()> {
        let boxed = value.downcast_ref::<Box<T>>().ok_or(AmqpError::TypeMismatch {
            expected: std::any::type_name::<Box<T>>(),
        })?;
        let inner = reg.resolve(TypeId::of::<T>())?;
        inner.write_raw(reg, cur, boxed.as_ref() as &dyn Any, path)
    }

    fn read(&self, reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let inner = reg.resolve(TypeId::of::<T>())?;
        match inner.read(reg, cur)? {
            Some(value) => {
                let value: Box<T> = value.downcast().map_err(|_| AmqpError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                })?;
                Ok(Some(Box::new(value)))
            }
            None => Ok(None),
        }
    }

    fn read_raw(&self, reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox> {
        let inner = reg.resolve(TypeId::of::<T>())?;
        let value: Box<T> = inner
            .read_raw(reg, cur, code)?
            .downcast()
            .map_err(|_| AmqpError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })?;
        Ok(Box::new(value))
    }
}

/// Codec for `Shared<T>` fields. Write locks the node for reading and
/// guards the shared allocation's identity on the ancestor path, which
/// is what turns a cyclic object graph into a clean error instead of
/// unbounded recursion.
struct SharedCodec<T>(PhantomData<fn() -> T>);

impl<T> Encoder for SharedCodec<T>
where
    T: Any + Send + Sync,
{
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
        let shared = value
            .downcast_ref::<Shared<T>>()
            .ok_or(AmqpError::TypeMismatch {
                expected: std::any::type_name::<Shared<T>>(),
            })?;
        let inner = reg.resolve(TypeId::of::<T>())?;
        let id = shared.ptr_id();
        path.enter(id)?;
        let result = {
            let guard = shared.read();
            inner.write(reg, cur, Some(&*guard as &dyn Any), path)
        };
        path.leave(id);
        result
    }

    fn write_raw(
        &self,
        reg: &Registry,
        cur: &mut WriteCursor<'_>,
        value: &dyn Any,
        path: &mut PathSet,
    ) -> Result<()> {
        let shared = value
            .downcast_ref::<Shared<T>>()
            .ok_or(AmqpError::TypeMismatch {
                expected: std::any::type_name::<Shared<T>>(),
            })?;
        let inner = reg.resolve(TypeId::of::<T>())?;
        let id = shared.ptr_id();
        path.enter(id)?;
        let result = {
            let guard = shared.read();
            inner.write_raw(reg, cur, &*guard as &dyn Any, path)
        };
        path.leave(id);
        result
    }

    fn read(&self, reg: &Registry, cur: &mut ReadCursor<'_>) -> Result<Option<AnyBox>> {
        let inner = reg.resolve(TypeId::of::<T>())?;
        match inner.read(reg, cur)? {
            Some(value) => {
                let value: Box<T> = value.downcast().map_err(|_| AmqpError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                })?;
                Ok(Some(Box::new(Shared::new(*value))))
            }
            None => Ok(None),
        }
    }

    fn read_raw(&self, reg: &Registry, cur: &mut ReadCursor<'_>, code: u8) -> Result<AnyBox> {
        let inner = reg.resolve(TypeId::of::<T>())?;
        let value: Box<T> = inner
            .read_raw(reg, cur, code)?
            .downcast()
            .map_err(|_| AmqpError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })?;
        Ok(Box::new(Shared::new(*value)))
    }
}
