//! Tests for the type codec registry and record descriptions
//!
//! These tests verify:
//! - Primitive classification over the supported type universe
//! - Nullable and enumeration tagging
//! - Record shapes classify as opaque composites
//! - Member descriptions keep declared order and accessors

#[path = "../common/mod.rs"]
mod common;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use common::*;
use lsondb::record::ElementDescription;
use lsondb::{classify, Field, PrimitiveKind, Record, Shape, TypeCode, Value};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

// =============================================================================
// Primitive Classification
// =============================================================================

#[test]
fn test_classify_primitives() {
    let cases = [
        (classify::<bool>(), PrimitiveKind::Boolean),
        (classify::<char>(), PrimitiveKind::Char),
        (classify::<i8>(), PrimitiveKind::I8),
        (classify::<i16>(), PrimitiveKind::I16),
        (classify::<i32>(), PrimitiveKind::I32),
        (classify::<i64>(), PrimitiveKind::I64),
        (classify::<u8>(), PrimitiveKind::U8),
        (classify::<u16>(), PrimitiveKind::U16),
        (classify::<u32>(), PrimitiveKind::U32),
        (classify::<u64>(), PrimitiveKind::U64),
        (classify::<BigInt>(), PrimitiveKind::BigInt),
        (classify::<f32>(), PrimitiveKind::F32),
        (classify::<f64>(), PrimitiveKind::F64),
        (classify::<Decimal>(), PrimitiveKind::Decimal),
        (classify::<NaiveDateTime>(), PrimitiveKind::DateTime),
        (classify::<DateTime<FixedOffset>>(), PrimitiveKind::DateTimeOffset),
        (classify::<TimeDelta>(), PrimitiveKind::Duration),
        (classify::<Uuid>(), PrimitiveKind::Uuid),
        (classify::<Url>(), PrimitiveKind::Uri),
        (classify::<String>(), PrimitiveKind::Text),
        (classify::<Vec<u8>>(), PrimitiveKind::Bytes),
    ];

    for (code, kind) in cases {
        assert_eq!(code, TypeCode::new(kind));
        assert!(!code.nullable);
        assert!(!code.enumeration);
    }
}

#[test]
fn test_classify_nullable_is_distinct() {
    let plain = classify::<i32>();
    let nullable = classify::<Option<i32>>();

    assert_eq!(nullable.kind, PrimitiveKind::I32);
    assert!(nullable.nullable);
    assert_ne!(plain, nullable);
}

#[test]
fn test_classify_enumeration_uses_underlying_integer() {
    let color = classify::<Color>();
    assert_eq!(color.kind, PrimitiveKind::I32);
    assert!(color.enumeration);

    let priority = classify::<Priority>();
    assert_eq!(priority.kind, PrimitiveKind::U8);
    assert!(priority.enumeration);

    let maybe_color = classify::<Option<Color>>();
    assert!(maybe_color.enumeration);
    assert!(maybe_color.nullable);
}

#[test]
fn test_classify_record_is_opaque() {
    assert_eq!(classify::<SubClass>(), TypeCode::OPAQUE);
    assert_eq!(classify::<Option<SubClass>>(), TypeCode::OPAQUE.into_nullable());
}

#[test]
fn test_integer_kinds() {
    assert!(PrimitiveKind::U16.is_integer());
    assert!(PrimitiveKind::I64.is_integer());
    assert!(!PrimitiveKind::BigInt.is_integer());
    assert!(!PrimitiveKind::F64.is_integer());
}

// =============================================================================
// Member Descriptions
// =============================================================================

#[test]
fn test_describe_keeps_declared_order() {
    let names: Vec<&str> = Person::describe().iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["name", "age"]);

    let all = AllTypes::describe();
    assert_eq!(all.first().map(|m| m.name), Some("flag"));
    assert_eq!(all.last().map(|m| m.name), Some("subs"));
    assert_eq!(all.len(), 45);
}

#[test]
fn test_describe_is_cached() {
    let first = Person::describe().as_ptr();
    let second = Person::describe().as_ptr();
    assert_eq!(first, second);
}

#[test]
fn test_empty_record_has_no_members() {
    assert!(Empty::describe().is_empty());
}

#[test]
fn test_member_shapes() {
    let members = AllTypes::describe();
    let shape_of = |name: &str| {
        members
            .iter()
            .find(|m| m.name == name)
            .map(|m| (m.shape.clone(), m.sequence))
            .unwrap()
    };

    assert_eq!(
        shape_of("maybe_int"),
        (Shape::Primitive(TypeCode::new(PrimitiveKind::I32).into_nullable()), false)
    );
    assert_eq!(
        shape_of("numbers"),
        (Shape::Primitive(TypeCode::new(PrimitiveKind::I32)), true)
    );

    match shape_of("color").0 {
        Shape::Enum { variants, code } => {
            assert_eq!(variants, &["Red", "Green", "Blue"]);
            assert!(code.enumeration);
        }
        other => panic!("expected enum shape, got {:?}", other),
    }

    let (sub_shape, sequence) = shape_of("subs");
    assert!(sequence);
    assert_eq!(
        sub_shape,
        Shape::Composite {
            nullable: false,
            members: vec![
                ElementDescription {
                    name: "id",
                    shape: i32::shape(),
                    sequence: false,
                },
                ElementDescription {
                    name: "label",
                    shape: String::shape(),
                    sequence: false,
                },
                ElementDescription {
                    name: "weight",
                    shape: Option::<f64>::shape(),
                    sequence: false,
                },
            ],
        }
    );
    assert!(shape_of("maybe_sub").0.is_nullable());
}

#[test]
fn test_member_accessors() {
    let members = Person::describe();
    let mut row = person("Ada", 30);

    assert_eq!(members[0].get(&row), Value::Text("Ada".to_string()));
    assert_eq!(members[1].get(&row), Value::I32(30));

    members[1].set(&mut row, Value::I32(31)).unwrap();
    assert_eq!(row.age, 31);

    let mismatch = members[1].set(&mut row, Value::Text("x".to_string()));
    assert!(mismatch.is_err());
    assert_eq!(row.age, 31);
}

#[test]
fn test_enum_field_values() {
    assert_eq!(Color::Green.to_value(), Value::Enum("Green"));
    assert_eq!(Color::from_value(Value::Enum("Blue")).unwrap(), Color::Blue);
    assert!(Color::from_value(Value::Enum("Purple")).is_err());
    assert_eq!(Option::<Color>::from_value(Value::Null).unwrap(), None);
}
