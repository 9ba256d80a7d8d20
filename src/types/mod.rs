//! Type Codec Registry
//!
//! Maps a member's static type to the primitive kind that drives format
//! selection in the row codec.
//!
//! ## Classification
//! ```text
//!   i32            → TypeCode { kind: I32,    nullable: false, enumeration: false }
//!   Option<i32>    → TypeCode { kind: I32,    nullable: true,  enumeration: false }
//!   SomeEnum       → TypeCode { kind: I32,    nullable: false, enumeration: true  }
//!   SomeRecord     → TypeCode { kind: Opaque, nullable: false, enumeration: false }
//! ```
//!
//! Classification is resolved at compile time through the [`Classify`]
//! trait: pure, stateless and total over every type that implements it.
//! Enumerations resolve to their underlying integer kind but carry the
//! `enumeration` tag so the codec writes them by name. Record shapes
//! (nested composites) classify as `Opaque`.

pub mod value;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

pub use value::{Value, ValueMismatch};

/// Primitive kind of a member, selecting its text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Not a primitive: composites and anything unrecognized
    Opaque,
    Char,
    Boolean,
    I8,
    I16,
    U16,
    I32,
    U8,
    U32,
    I64,
    U64,
    F32,
    F64,
    DateTime,
    DateTimeOffset,
    Decimal,
    Uuid,
    Duration,
    BigInt,
    Uri,
    Text,
    Bytes,
}

impl PrimitiveKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8
                | PrimitiveKind::I16
                | PrimitiveKind::I32
                | PrimitiveKind::I64
                | PrimitiveKind::U8
                | PrimitiveKind::U16
                | PrimitiveKind::U32
                | PrimitiveKind::U64
        )
    }
}

/// Classification result: kind plus the nullable and enumeration tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeCode {
    pub kind: PrimitiveKind,
    pub nullable: bool,
    pub enumeration: bool,
}

impl TypeCode {
    pub const OPAQUE: TypeCode = TypeCode::new(PrimitiveKind::Opaque);

    pub const fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            nullable: false,
            enumeration: false,
        }
    }

    /// The nullable counterpart of this code
    pub const fn into_nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// Tag an integer code as an enumeration
    pub const fn into_enumeration(self) -> Self {
        Self {
            enumeration: true,
            ..self
        }
    }
}

/// Compile-time classification of a member type
pub trait Classify {
    const TYPE_CODE: TypeCode;
}

/// Classify `T`
pub fn classify<T: Classify + ?Sized>() -> TypeCode {
    T::TYPE_CODE
}

macro_rules! classify_primitives {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Classify for $ty {
                const TYPE_CODE: TypeCode = TypeCode::new(PrimitiveKind::$kind);
            }
        )*
    };
}

classify_primitives! {
    char => Char,
    bool => Boolean,
    i8 => I8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u8 => U8,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    Decimal => Decimal,
    Uuid => Uuid,
    TimeDelta => Duration,
    BigInt => BigInt,
    Url => Uri,
    String => Text,
    Vec<u8> => Bytes,
}

impl<T: Classify> Classify for Option<T> {
    const TYPE_CODE: TypeCode = T::TYPE_CODE.into_nullable();
}
