// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end serializer tests over registered composite types.

use crate::{
    AmqpError, AmqpSerializer, AnyBox, FieldSpec, ReadCursor, SchemaDescriptor, Shared, Timestamp,
    Value,
};

#[derive(Default, Debug, PartialEq)]
struct Address {
    city: Option<String>,
    zip: Option<i32>,
}

#[derive(Default, Debug, PartialEq)]
struct Person {
    name: Option<String>,
    age: Option<i32>,
    date_of_birth: Option<Timestamp>,
    properties: Option<Vec<(Value, Value)>>,
}

#[derive(Default, Debug, PartialEq)]
struct Student {
    name: Option<String>,
    age: Option<i32>,
    date_of_birth: Option<Timestamp>,
    properties: Option<Vec<(Value, Value)>>,
    school: Option<String>,
}

#[derive(Default, Debug, PartialEq)]
struct Teacher {
    name: Option<String>,
    age: Option<i32>,
    date_of_birth: Option<Timestamp>,
    properties: Option<Vec<(Value, Value)>>,
    subject: Option<String>,
}

fn person_fields<T: 'static>(
    schema: SchemaDescriptor,
    name: fn(&T) -> Option<&String>,
    set_name: fn(&mut T, String),
    age: fn(&T) -> Option<&i32>,
    set_age: fn(&mut T, i32),
    dob: fn(&T) -> Option<&Timestamp>,
    set_dob: fn(&mut T, Timestamp),
    props: fn(&T) -> Option<&Vec<(Value, Value)>>,
    set_props: fn(&mut T, Vec<(Value, Value)>),
) -> SchemaDescriptor {
    schema
        .field(FieldSpec::optional("name", 1, name, set_name))
        .field(FieldSpec::optional("age", 2, age, set_age))
        .field(FieldSpec::optional("date-of-birth", 3, dob, set_dob))
        .field(FieldSpec::optional("properties", 8, props, set_props))
}

fn people_serializer() -> AmqpSerializer {
    let amqp = AmqpSerializer::new();
    amqp.register::<Student>(
        person_fields::<Student>(
            SchemaDescriptor::list("test:student"),
            |s| s.name.as_ref(),
            |s, v| s.name = Some(v),
            |s| s.age.as_ref(),
            |s, v| s.age = Some(v),
            |s| s.date_of_birth.as_ref(),
            |s, v| s.date_of_birth = Some(v),
            |s| s.properties.as_ref(),
            |s, v| s.properties = Some(v),
        )
        .field(FieldSpec::optional(
            "school",
            9,
            |s: &Student| s.school.as_ref(),
            |s: &mut Student, v| s.school = Some(v),
        )),
    )
    .expect("register Student");
    amqp.register::<Teacher>(
        person_fields::<Teacher>(
            SchemaDescriptor::list("test:teacher"),
            |t| t.name.as_ref(),
            |t, v| t.name = Some(v),
            |t| t.age.as_ref(),
            |t, v| t.age = Some(v),
            |t| t.date_of_birth.as_ref(),
            |t, v| t.date_of_birth = Some(v),
            |t| t.properties.as_ref(),
            |t, v| t.properties = Some(v),
        )
        .field(FieldSpec::optional(
            "subject",
            9,
            |t: &Teacher| t.subject.as_ref(),
            |t: &mut Teacher, v| t.subject = Some(v),
        )),
    )
    .expect("register Teacher");
    amqp.register::<Person>(
        person_fields::<Person>(
            SchemaDescriptor::list("test:person"),
            |p| p.name.as_ref(),
            |p, v| p.name = Some(v),
            |p| p.age.as_ref(),
            |p, v| p.age = Some(v),
            |p| p.date_of_birth.as_ref(),
            |p, v| p.date_of_birth = Some(v),
            |p| p.properties.as_ref(),
            |p, v| p.properties = Some(v),
        )
        .subtype::<Student>()
        .subtype::<Teacher>(),
    )
    .expect("register Person");
    amqp.register::<Address>(address_schema())
        .expect("register Address");
    amqp
}

fn address_schema() -> SchemaDescriptor {
    SchemaDescriptor::list("test:address")
        .field(FieldSpec::optional(
            "city",
            0,
            |a: &Address| a.city.as_ref(),
            |a: &mut Address, v| a.city = Some(v),
        ))
        .field(FieldSpec::optional(
            "zip",
            1,
            |a: &Address| a.zip.as_ref(),
            |a: &mut Address, v| a.zip = Some(v),
        ))
}

fn roundtrip<T: std::any::Any + PartialEq + std::fmt::Debug>(amqp: &AmqpSerializer, value: &T) -> T
where
    T: Default,
{
    let mut buf = Vec::new();
    amqp.serialize(&mut buf, value).expect("serialize");
    let mut cur = ReadCursor::new(&buf);
    let decoded = amqp
        .deserialize::<T>(&mut cur)
        .expect("deserialize")
        .expect("non-null");
    assert!(cur.is_eof(), "cursor not fully consumed");
    decoded
}

#[test]
fn test_composite_wire_layout() {
    let amqp = people_serializer();
    let mut buf = Vec::new();
    amqp.serialize(
        &mut buf,
        &Address {
            city: Some("LA".into()),
            zip: Some(7),
        },
    )
    .expect("serialize");

    let mut expected = vec![0x00, 0xa3, 12];
    expected.extend_from_slice(b"test:address");
    expected.push(0xd0);
    expected.extend_from_slice(&16u32.to_be_bytes());
    expected.extend_from_slice(&2u32.to_be_bytes());
    expected.extend_from_slice(&[0xb1, 0, 0, 0, 2, b'L', b'A']);
    expected.extend_from_slice(&[0x71, 0, 0, 0, 7]);
    assert_eq!(buf, expected);
}

#[test]
fn test_bool_fields_use_fixed_codes() {
    #[derive(Default, Debug, PartialEq)]
    struct Flags {
        armed: Option<bool>,
        muted: Option<bool>,
    }

    let amqp = AmqpSerializer::new();
    amqp.register::<Flags>(
        SchemaDescriptor::list("test:flags")
            .field(FieldSpec::optional(
                "armed",
                0,
                |f: &Flags| f.armed.as_ref(),
                |f: &mut Flags, v| f.armed = Some(v),
            ))
            .field(FieldSpec::optional(
                "muted",
                1,
                |f: &Flags| f.muted.as_ref(),
                |f: &mut Flags, v| f.muted = Some(v),
            )),
    )
    .expect("register Flags");

    let flags = Flags {
        armed: Some(true),
        muted: Some(false),
    };
    let mut buf = Vec::new();
    amqp.serialize(&mut buf, &flags).expect("serialize");

    // Each boolean body is the fixed code itself, one byte per slot.
    let mut expected = vec![0x00, 0xa3, 10];
    expected.extend_from_slice(b"test:flags");
    expected.push(0xd0);
    expected.extend_from_slice(&6u32.to_be_bytes());
    expected.extend_from_slice(&2u32.to_be_bytes());
    expected.extend_from_slice(&[0x41, 0x42]);
    assert_eq!(buf, expected);

    let decoded = amqp
        .deserialize::<Flags>(&mut ReadCursor::new(&buf))
        .expect("deserialize");
    assert_eq!(decoded, Some(flags));
}

#[test]
fn test_composite_roundtrip_with_null_slot() {
    let amqp = people_serializer();
    let person = Person {
        name: Some("Ann".into()),
        age: None,
        date_of_birth: Some(Timestamp(318_211_200_000)),
        properties: Some(vec![(Value::from("height"), Value::Double(1.71))]),
    };
    assert_eq!(roundtrip(&amqp, &person), person);
}

#[test]
fn test_null_toplevel_decodes_to_none() {
    let amqp = people_serializer();
    let buf = [0x40];
    let decoded = amqp
        .deserialize::<Person>(&mut ReadCursor::new(&buf))
        .expect("deserialize");
    assert_eq!(decoded, None);
}

#[test]
fn test_polymorphic_decode_by_descriptor() {
    let amqp = people_serializer();
    let student = Student {
        name: Some("Bea".into()),
        age: Some(20),
        school: Some("MIT".into()),
        ..Student::default()
    };
    let mut buf = Vec::new();
    amqp.serialize(&mut buf, &student).expect("serialize");

    // Declared as Person, the wire descriptor picks Student.
    let decoded = amqp
        .deserialize_dyn::<Person>(&mut ReadCursor::new(&buf))
        .expect("deserialize")
        .expect("non-null");
    let decoded = decoded.downcast::<Student>().expect("student");
    assert_eq!(*decoded, student);
}

#[test]
fn test_static_decode_of_subtype_is_type_mismatch() {
    let amqp = people_serializer();
    let mut buf = Vec::new();
    amqp.serialize(&mut buf, &Student::default()).expect("serialize");

    let err = amqp
        .deserialize::<Person>(&mut ReadCursor::new(&buf))
        .unwrap_err();
    assert!(matches!(err, AmqpError::TypeMismatch { .. }));
}

#[test]
fn test_unknown_descriptor_rejected() {
    let amqp = people_serializer();
    let mut buf = Vec::new();
    amqp.serialize(&mut buf, &Address::default()).expect("serialize");

    // Address is not a registered subtype of Person.
    let err = amqp
        .deserialize::<Person>(&mut ReadCursor::new(&buf))
        .unwrap_err();
    assert!(matches!(err, AmqpError::UnknownDescriptor(name) if name == "test:address"));
}

#[test]
fn test_unsupported_type() {
    struct Unregistered;
    let amqp = people_serializer();
    let mut buf = Vec::new();
    let err = amqp.serialize(&mut buf, &Unregistered).unwrap_err();
    assert!(matches!(err, AmqpError::UnsupportedType(name) if name.contains("Unregistered")));
}

// Decoding with fewer declared fields than the wire carries must
// discard the tail; decoding with more must leave the tail defaulted.
mod schema_evolution {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct MiniPerson {
        name: Option<String>,
        age: Option<i32>,
    }

    fn mini_serializer() -> AmqpSerializer {
        let amqp = AmqpSerializer::new();
        amqp.register::<MiniPerson>(
            SchemaDescriptor::list("test:person")
                .field(FieldSpec::optional(
                    "name",
                    1,
                    |p: &MiniPerson| p.name.as_ref(),
                    |p: &mut MiniPerson, v| p.name = Some(v),
                ))
                .field(FieldSpec::optional(
                    "age",
                    2,
                    |p: &MiniPerson| p.age.as_ref(),
                    |p: &mut MiniPerson, v| p.age = Some(v),
                )),
        )
        .expect("register MiniPerson");
        amqp
    }

    #[test]
    fn test_truncated_tail_leaves_defaults() {
        let mini = mini_serializer();
        let full = people_serializer();

        let mut buf = Vec::new();
        mini.serialize(
            &mut buf,
            &MiniPerson {
                name: Some("Cid".into()),
                age: Some(41),
            },
        )
        .expect("serialize");

        let person = full
            .deserialize::<Person>(&mut ReadCursor::new(&buf))
            .expect("deserialize")
            .expect("non-null");
        assert_eq!(person.name.as_deref(), Some("Cid"));
        assert_eq!(person.age, Some(41));
        assert_eq!(person.date_of_birth, None);
        assert_eq!(person.properties, None);
    }

    #[test]
    fn test_extra_tail_fields_are_skipped() {
        let mini = mini_serializer();
        let full = people_serializer();

        let mut buf = Vec::new();
        full.serialize(
            &mut buf,
            &Person {
                name: Some("Dot".into()),
                age: Some(9),
                date_of_birth: Some(Timestamp(1_000)),
                properties: Some(vec![(Value::from("k"), Value::Int(1))]),
            },
        )
        .expect("serialize");

        let mut cur = ReadCursor::new(&buf);
        let person = mini
            .deserialize::<MiniPerson>(&mut cur)
            .expect("deserialize")
            .expect("non-null");
        assert_eq!(person.name.as_deref(), Some("Dot"));
        assert_eq!(person.age, Some(9));
        // Skipping must consume the extra slots exactly.
        assert!(cur.is_eof());
    }
}

mod polymorphic_fields {
    use super::*;

    #[derive(Default)]
    struct Enrollment {
        person: Option<AnyBox>,
        year: Option<i32>,
    }

    fn enrollment_serializer() -> AmqpSerializer {
        let amqp = people_serializer();
        amqp.register::<Enrollment>(
            SchemaDescriptor::list("test:enrollment")
                .field(FieldSpec::polymorphic::<Enrollment, Person>(
                    "person",
                    0,
                    |e| e.person.as_ref(),
                    |e, v| e.person = Some(v),
                ))
                .field(FieldSpec::optional(
                    "year",
                    1,
                    |e: &Enrollment| e.year.as_ref(),
                    |e: &mut Enrollment, v| e.year = Some(v),
                )),
        )
        .expect("register Enrollment");
        amqp
    }

    #[test]
    fn test_polymorphic_field_carries_subtype_descriptor() {
        let amqp = enrollment_serializer();
        let enrollment = Enrollment {
            person: Some(Box::new(Teacher {
                name: Some("Eva".into()),
                subject: Some("math".into()),
                ..Teacher::default()
            })),
            year: Some(2026),
        };

        let mut buf = Vec::new();
        amqp.serialize(&mut buf, &enrollment).expect("serialize");

        let decoded = amqp
            .deserialize::<Enrollment>(&mut ReadCursor::new(&buf))
            .expect("deserialize")
            .expect("non-null");
        assert_eq!(decoded.year, Some(2026));
        let teacher = decoded
            .person
            .expect("person set")
            .downcast::<Teacher>()
            .expect("teacher");
        assert_eq!(teacher.name.as_deref(), Some("Eva"));
        assert_eq!(teacher.subject.as_deref(), Some("math"));
    }
}

mod reference_graphs {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Worker {
        name: Option<String>,
        peer: Option<Shared<Worker>>,
        buddy: Option<Shared<Worker>>,
    }

    fn worker_serializer() -> AmqpSerializer {
        let amqp = AmqpSerializer::new();
        amqp.register::<Worker>(
            SchemaDescriptor::list("test:worker")
                .field(FieldSpec::optional(
                    "name",
                    0,
                    |w: &Worker| w.name.as_ref(),
                    |w: &mut Worker, v| w.name = Some(v),
                ))
                .field(FieldSpec::optional(
                    "peer",
                    1,
                    |w: &Worker| w.peer.as_ref(),
                    |w: &mut Worker, v| w.peer = Some(v),
                ))
                .field(FieldSpec::optional(
                    "buddy",
                    2,
                    |w: &Worker| w.buddy.as_ref(),
                    |w: &mut Worker, v| w.buddy = Some(v),
                )),
        )
        .expect("register Worker");
        amqp
    }

    #[test]
    fn test_inline_nested_value_is_not_a_cycle() {
        // A struct's first field lives at (or near) its parent's own
        // address; identity tracking must not mistake that for a loop.
        #[derive(Default, Debug, PartialEq)]
        struct Contact {
            address: Address,
            phone: Option<String>,
        }

        let amqp = people_serializer();
        amqp.register::<Contact>(
            SchemaDescriptor::list("test:contact")
                .field(FieldSpec::required(
                    "address",
                    0,
                    |c: &Contact| &c.address,
                    |c: &mut Contact, v| c.address = v,
                ))
                .field(FieldSpec::optional(
                    "phone",
                    1,
                    |c: &Contact| c.phone.as_ref(),
                    |c: &mut Contact, v| c.phone = Some(v),
                )),
        )
        .expect("register Contact");

        let contact = Contact {
            address: Address {
                city: Some("Oslo".into()),
                zip: Some(350),
            },
            phone: Some("555-0199".into()),
        };
        assert_eq!(roundtrip(&amqp, &contact), contact);
    }

    #[test]
    fn test_acyclic_shared_chain_roundtrips() {
        let amqp = worker_serializer();
        let worker = Worker {
            name: Some("a".into()),
            peer: Some(Shared::new(Worker {
                name: Some("b".into()),
                ..Worker::default()
            })),
            buddy: None,
        };
        assert_eq!(roundtrip(&amqp, &worker), worker);
    }

    #[test]
    fn test_diamond_sharing_is_not_a_cycle() {
        let amqp = worker_serializer();
        let shared = Shared::new(Worker {
            name: Some("c".into()),
            ..Worker::default()
        });
        // Same node referenced twice as siblings sits on two distinct
        // root-to-leaf paths, so both writes succeed.
        let worker = Worker {
            name: Some("a".into()),
            peer: Some(shared.clone()),
            buddy: Some(shared),
        };
        let mut buf = Vec::new();
        amqp.serialize(&mut buf, &worker).expect("serialize");
    }

    #[test]
    fn test_cyclic_graph_rejected() {
        let amqp = worker_serializer();
        let a = Shared::new(Worker {
            name: Some("a".into()),
            ..Worker::default()
        });
        let b = Shared::new(Worker {
            name: Some("b".into()),
            peer: Some(a.clone()),
            ..Worker::default()
        });
        a.write().peer = Some(b);

        let mut buf = Vec::new();
        let err = amqp.serialize(&mut buf, &a).unwrap_err();
        assert!(matches!(err, AmqpError::CyclicReference));
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn test_self_reference_rejected() {
        let amqp = worker_serializer();
        let a = Shared::new(Worker::default());
        a.write().peer = Some(a.clone());

        let mut buf = Vec::new();
        assert!(matches!(
            amqp.serialize(&mut buf, &a).unwrap_err(),
            AmqpError::CyclicReference
        ));
    }
}

mod recursive_types {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Outer {
        label: Option<String>,
        inner: Option<Box<Inner>>,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Inner {
        label: Option<String>,
        outer: Option<Box<Outer>>,
    }

    fn tree_serializer() -> AmqpSerializer {
        let amqp = AmqpSerializer::new();
        amqp.register::<Outer>(
            SchemaDescriptor::list("test:outer")
                .field(FieldSpec::optional(
                    "label",
                    0,
                    |o: &Outer| o.label.as_ref(),
                    |o: &mut Outer, v| o.label = Some(v),
                ))
                .field(FieldSpec::optional(
                    "inner",
                    1,
                    |o: &Outer| o.inner.as_ref(),
                    |o: &mut Outer, v| o.inner = Some(v),
                )),
        )
        .expect("register Outer");
        amqp.register::<Inner>(
            SchemaDescriptor::list("test:inner")
                .field(FieldSpec::optional(
                    "label",
                    0,
                    |i: &Inner| i.label.as_ref(),
                    |i: &mut Inner, v| i.label = Some(v),
                ))
                .field(FieldSpec::optional(
                    "outer",
                    1,
                    |i: &Inner| i.outer.as_ref(),
                    |i: &mut Inner, v| i.outer = Some(v),
                )),
        )
        .expect("register Inner");
        amqp
    }

    #[test]
    fn test_mutually_recursive_types_roundtrip() {
        let amqp = tree_serializer();
        let value = Outer {
            label: Some("o1".into()),
            inner: Some(Box::new(Inner {
                label: Some("i1".into()),
                outer: Some(Box::new(Outer {
                    label: Some("o2".into()),
                    inner: None,
                })),
            })),
        };
        assert_eq!(roundtrip(&amqp, &value), value);
    }
}

mod map_encoded {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    enum Category {
        Food,
        Tools,
        Books,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Product {
        sku: Option<String>,
        price: Option<f64>,
        category: Option<Category>,
    }

    fn product_serializer(reversed: bool) -> AmqpSerializer {
        let amqp = AmqpSerializer::new();
        amqp.register_enum(vec![Category::Food, Category::Tools, Category::Books]);
        let sku = |order| {
            FieldSpec::optional(
                "sku",
                order,
                |p: &Product| p.sku.as_ref(),
                |p: &mut Product, v| p.sku = Some(v),
            )
        };
        let price = |order| {
            FieldSpec::optional(
                "price",
                order,
                |p: &Product| p.price.as_ref(),
                |p: &mut Product, v| p.price = Some(v),
            )
        };
        let category = |order| {
            FieldSpec::optional(
                "category",
                order,
                |p: &Product| p.category.as_ref(),
                |p: &mut Product, v| p.category = Some(v),
            )
        };
        // The reversed registration flips the wire order so that a
        // payload from one peer hits the other with its keys in an
        // order the reader never emits itself.
        let schema = if reversed {
            SchemaDescriptor::map("test:product")
                .field(category(0))
                .field(price(1))
                .field(sku(2))
        } else {
            SchemaDescriptor::map("test:product")
                .field(sku(0))
                .field(price(1))
                .field(category(2))
        };
        amqp.register::<Product>(schema).expect("register Product");
        amqp
    }

    #[test]
    fn test_map_encoded_roundtrip_with_enum_field() {
        let amqp = product_serializer(false);
        let product = Product {
            sku: Some("X-1".into()),
            price: Some(12.5),
            category: Some(Category::Books),
        };
        assert_eq!(roundtrip(&amqp, &product), product);
    }

    #[test]
    fn test_map_fields_resolved_by_key_not_position() {
        let forward = product_serializer(false);
        let reversed = product_serializer(true);

        let product = Product {
            sku: Some("Y-2".into()),
            price: Some(3.25),
            category: Some(Category::Tools),
        };
        let mut buf = Vec::new();
        forward.serialize(&mut buf, &product).expect("serialize");

        let decoded = reversed
            .deserialize::<Product>(&mut ReadCursor::new(&buf))
            .expect("deserialize")
            .expect("non-null");
        assert_eq!(decoded, product);
    }

    #[test]
    fn test_unknown_map_key_rejected() {
        let amqp = product_serializer(false);
        // DESCRIBED, descriptor symbol, MAP8 body with one bogus pair.
        let mut buf = vec![0x00, 0xa3, 12];
        buf.extend_from_slice(b"test:product");
        buf.extend_from_slice(&[0xc1, 7, 2, 0xa3, 3, b'z', b'z', b'z', 0x40]);

        let err = amqp
            .deserialize::<Product>(&mut ReadCursor::new(&buf))
            .unwrap_err();
        assert!(matches!(err, AmqpError::UnknownField(name) if name == "zzz"));
    }
}

mod randomized {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Event {
        flag: Option<bool>,
        count: Option<u8>,
        port: Option<u16>,
        window: Option<u32>,
        span: Option<u64>,
        delta: Option<i8>,
        depth: Option<i16>,
        code: Option<i32>,
        total: Option<i64>,
        ratio: Option<f64>,
        label: Option<String>,
        stamp: Option<Timestamp>,
    }

    fn event_serializer() -> AmqpSerializer {
        let amqp = AmqpSerializer::new();
        amqp.register::<Event>(
            SchemaDescriptor::list("test:event")
                .field(FieldSpec::optional(
                    "flag",
                    0,
                    |e: &Event| e.flag.as_ref(),
                    |e: &mut Event, v| e.flag = Some(v),
                ))
                .field(FieldSpec::optional(
                    "count",
                    1,
                    |e: &Event| e.count.as_ref(),
                    |e: &mut Event, v| e.count = Some(v),
                ))
                .field(FieldSpec::optional(
                    "port",
                    2,
                    |e: &Event| e.port.as_ref(),
                    |e: &mut Event, v| e.port = Some(v),
                ))
                .field(FieldSpec::optional(
                    "window",
                    3,
                    |e: &Event| e.window.as_ref(),
                    |e: &mut Event, v| e.window = Some(v),
                ))
                .field(FieldSpec::optional(
                    "span",
                    4,
                    |e: &Event| e.span.as_ref(),
                    |e: &mut Event, v| e.span = Some(v),
                ))
                .field(FieldSpec::optional(
                    "delta",
                    5,
                    |e: &Event| e.delta.as_ref(),
                    |e: &mut Event, v| e.delta = Some(v),
                ))
                .field(FieldSpec::optional(
                    "depth",
                    6,
                    |e: &Event| e.depth.as_ref(),
                    |e: &mut Event, v| e.depth = Some(v),
                ))
                .field(FieldSpec::optional(
                    "code",
                    7,
                    |e: &Event| e.code.as_ref(),
                    |e: &mut Event, v| e.code = Some(v),
                ))
                .field(FieldSpec::optional(
                    "total",
                    8,
                    |e: &Event| e.total.as_ref(),
                    |e: &mut Event, v| e.total = Some(v),
                ))
                .field(FieldSpec::optional(
                    "ratio",
                    9,
                    |e: &Event| e.ratio.as_ref(),
                    |e: &mut Event, v| e.ratio = Some(v),
                ))
                .field(FieldSpec::optional(
                    "label",
                    10,
                    |e: &Event| e.label.as_ref(),
                    |e: &mut Event, v| e.label = Some(v),
                ))
                .field(FieldSpec::optional(
                    "stamp",
                    11,
                    |e: &Event| e.stamp.as_ref(),
                    |e: &mut Event, v| e.stamp = Some(v),
                )),
        )
        .expect("register Event");
        amqp
    }

    fn random_event(rng: &mut fastrand::Rng) -> Event {
        let mut event = Event::default();
        if rng.bool() {
            event.flag = Some(rng.bool());
        }
        if rng.bool() {
            event.count = Some(rng.u8(..));
        }
        if rng.bool() {
            event.port = Some(rng.u16(..));
        }
        if rng.bool() {
            event.window = Some(rng.u32(..));
        }
        if rng.bool() {
            event.span = Some(rng.u64(..));
        }
        if rng.bool() {
            event.delta = Some(rng.i8(..));
        }
        if rng.bool() {
            event.depth = Some(rng.i16(..));
        }
        if rng.bool() {
            event.code = Some(rng.i32(..));
        }
        if rng.bool() {
            event.total = Some(rng.i64(..));
        }
        if rng.bool() {
            event.ratio = Some(f64::from(rng.i32(..)) / 16.0);
        }
        if rng.bool() {
            let len = rng.usize(0..12);
            event.label = Some((0..len).map(|_| rng.alphanumeric()).collect());
        }
        if rng.bool() {
            event.stamp = Some(Timestamp(rng.i64(..)));
        }
        event
    }

    #[test]
    fn test_randomized_event_roundtrips() {
        let amqp = event_serializer();
        let mut rng = fastrand::Rng::with_seed(0x00a1_71d0);
        for _ in 0..64 {
            let event = random_event(&mut rng);
            assert_eq!(roundtrip(&amqp, &event), event, "event {event:?}");
        }
    }
}

#[test]
fn test_fields_outside_the_schema_are_not_serialized() {
    #[derive(Default, Debug, PartialEq)]
    struct Session {
        id: Option<u32>,
        // Never declared in the schema below.
        local_note: Option<String>,
    }

    let amqp = AmqpSerializer::new();
    amqp.register::<Session>(SchemaDescriptor::list("test:session").field(
        FieldSpec::optional(
            "id",
            0,
            |s: &Session| s.id.as_ref(),
            |s: &mut Session, v| s.id = Some(v),
        ),
    ))
    .expect("register Session");

    let session = Session {
        id: Some(11),
        local_note: Some("scratch".into()),
    };
    let mut buf = Vec::new();
    amqp.serialize(&mut buf, &session).expect("serialize");

    let decoded = amqp
        .deserialize::<Session>(&mut ReadCursor::new(&buf))
        .expect("deserialize")
        .expect("non-null");
    assert_eq!(decoded.id, Some(11));
    assert_eq!(decoded.local_note, None);
}

#[test]
fn test_dynamic_value_facade_roundtrip() {
    let amqp = AmqpSerializer::new();
    let value = Value::List(vec![
        Value::from("id"),
        Value::Uint(42),
        Value::Map(vec![(Value::from("ok"), Value::Bool(true))]),
    ]);
    let mut buf = Vec::new();
    amqp.serialize_value(&mut buf, &value).expect("serialize");
    let mut cur = ReadCursor::new(&buf);
    assert_eq!(amqp.deserialize_value(&mut cur).expect("deserialize"), value);
    assert!(cur.is_eof());
}

#[test]
fn test_global_serializer_is_shared() {
    #[derive(Default, Debug, PartialEq)]
    struct Ping {
        seq: Option<u32>,
    }

    let amqp = AmqpSerializer::global();
    amqp.register::<Ping>(SchemaDescriptor::list("test:ping").field(FieldSpec::optional(
        "seq",
        0,
        |p: &Ping| p.seq.as_ref(),
        |p: &mut Ping, v| p.seq = Some(v),
    )))
    .expect("register Ping");

    let ping = Ping { seq: Some(3) };
    assert_eq!(roundtrip(AmqpSerializer::global(), &ping), ping);
}
