//! Record Module
//!
//! Describes record shapes to the codec.
//!
//! ## Responsibilities
//! - Ordered, stable member list per record type (the positional contract)
//! - Typed get/set accessors bridging struct fields and [`Value`]s
//! - Shape of every member: primitive, enumeration or nested composite
//!
//! Shapes are registered once per type with the [`record!`](crate::record!)
//! and [`enumeration!`](crate::enumeration!) macros; descriptions are built
//! lazily and cached for the life of the process.
//!
//! ```ignore
//! #[derive(Debug, Clone, Default)]
//! struct Person { name: String, age: i32, tags: Vec<String> }
//!
//! lsondb::record!(Person { name, age, tags: list });
//! ```

mod field;

use crate::types::{TypeCode, Value, ValueMismatch};

pub use field::Field;

type Getter<R> = Box<dyn Fn(&R) -> Value + Send + Sync>;
type Setter<R> = Box<dyn Fn(&mut R, Value) -> Result<(), ValueMismatch> + Send + Sync>;

/// A record shape the codec can persist
pub trait Record: Default + Clone + Send + Sync + 'static {
    /// Serializable members in declared (wire) order
    fn describe() -> &'static [MemberDescription<Self>];
}

/// How a member (or a sequence element) is laid out
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A primitive from the type registry
    Primitive(TypeCode),

    /// An enumeration written by constant name
    Enum {
        code: TypeCode,
        variants: &'static [&'static str],
    },

    /// A nested record whose members share one token
    Composite {
        nullable: bool,
        members: Vec<ElementDescription>,
    },
}

impl Shape {
    pub fn type_code(&self) -> TypeCode {
        match self {
            Shape::Primitive(code) | Shape::Enum { code, .. } => *code,
            Shape::Composite { nullable: true, .. } => TypeCode::OPAQUE.into_nullable(),
            Shape::Composite { nullable: false, .. } => TypeCode::OPAQUE,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.type_code().nullable
    }

    /// The shape of `Option<T>` given the shape of `T`
    pub fn into_nullable(self) -> Self {
        match self {
            Shape::Primitive(code) => Shape::Primitive(code.into_nullable()),
            Shape::Enum { code, variants } => Shape::Enum {
                code: code.into_nullable(),
                variants,
            },
            Shape::Composite { members, .. } => Shape::Composite {
                nullable: true,
                members,
            },
        }
    }
}

/// Sub-member of a composite
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescription {
    pub name: &'static str,
    pub shape: Shape,
    pub sequence: bool,
}

/// One serializable member of a record
pub struct MemberDescription<R> {
    pub name: &'static str,
    pub shape: Shape,
    /// The member is an ordered sequence of `shape` elements
    pub sequence: bool,
    get: Getter<R>,
    set: Setter<R>,
}

impl<R: 'static> MemberDescription<R> {
    /// A scalar, enumeration or composite member
    pub fn field<T>(name: &'static str, get: fn(&R) -> &T, get_mut: fn(&mut R) -> &mut T) -> Self
    where
        T: Field + 'static,
    {
        Self {
            name,
            shape: T::shape(),
            sequence: false,
            get: Box::new(move |row: &R| get(row).to_value()),
            set: Box::new(move |row: &mut R, value: Value| {
                *get_mut(row) = T::from_value(value)?;
                Ok(())
            }),
        }
    }

    /// An ordered sequence member
    pub fn sequence<T>(
        name: &'static str,
        get: fn(&R) -> &Vec<T>,
        get_mut: fn(&mut R) -> &mut Vec<T>,
    ) -> Self
    where
        T: Field + 'static,
    {
        Self {
            name,
            shape: T::shape(),
            sequence: true,
            get: Box::new(move |row: &R| {
                Value::List(get(row).iter().map(Field::to_value).collect())
            }),
            set: Box::new(move |row: &mut R, value: Value| match value {
                Value::List(items) => {
                    *get_mut(row) = items
                        .into_iter()
                        .map(T::from_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(())
                }
                other => Err(ValueMismatch::new("list", &other)),
            }),
        }
    }

    pub fn get(&self, row: &R) -> Value {
        (self.get)(row)
    }

    pub fn set(&self, row: &mut R, value: Value) -> Result<(), ValueMismatch> {
        (self.set)(row, value)
    }
}

impl<R> std::fmt::Debug for MemberDescription<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberDescription")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Composite helpers (used by `record!`)
// =============================================================================

#[doc(hidden)]
pub fn composite_shape<R: Record>() -> Shape {
    Shape::Composite {
        nullable: false,
        members: R::describe()
            .iter()
            .map(|member| ElementDescription {
                name: member.name,
                shape: member.shape.clone(),
                sequence: member.sequence,
            })
            .collect(),
    }
}

#[doc(hidden)]
pub fn composite_to_value<R: Record>(row: &R) -> Value {
    Value::Composite(R::describe().iter().map(|member| member.get(row)).collect())
}

#[doc(hidden)]
pub fn composite_from_value<R: Record>(value: Value) -> Result<R, ValueMismatch> {
    match value {
        Value::Composite(values) => {
            let mut row = R::default();
            for (member, value) in R::describe().iter().zip(values) {
                if value.is_null() {
                    continue;
                }
                member.set(&mut row, value)?;
            }
            Ok(row)
        }
        other => Err(ValueMismatch::new("composite", &other)),
    }
}

// =============================================================================
// Registration macros
// =============================================================================

/// Register a struct as a record shape.
///
/// Members are listed in wire order; sequence members (`Vec<T>`) are marked
/// with `: list`. The struct must implement `Default` and `Clone`.
#[macro_export]
macro_rules! record {
    (@member $ty:ty, $field:ident) => {
        $crate::record::MemberDescription::<$ty>::field(
            stringify!($field),
            |row| &row.$field,
            |row| &mut row.$field,
        )
    };
    (@member $ty:ty, $field:ident, list) => {
        $crate::record::MemberDescription::<$ty>::sequence(
            stringify!($field),
            |row| &row.$field,
            |row| &mut row.$field,
        )
    };
    ($ty:ident { $($field:ident $(: $list:ident)?),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            fn describe() -> &'static [$crate::record::MemberDescription<$ty>] {
                static MEMBERS: ::std::sync::OnceLock<
                    ::std::vec::Vec<$crate::record::MemberDescription<$ty>>,
                > = ::std::sync::OnceLock::new();
                MEMBERS.get_or_init(|| {
                    ::std::vec![$($crate::record!(@member $ty, $field $(, $list)?)),*]
                })
            }
        }

        impl $crate::types::Classify for $ty {
            const TYPE_CODE: $crate::types::TypeCode = $crate::types::TypeCode::OPAQUE;
        }

        impl $crate::record::Field for $ty {
            fn shape() -> $crate::record::Shape {
                $crate::record::composite_shape::<$ty>()
            }

            fn to_value(&self) -> $crate::types::Value {
                $crate::record::composite_to_value(self)
            }

            fn from_value(
                value: $crate::types::Value,
            ) -> ::std::result::Result<Self, $crate::types::ValueMismatch> {
                $crate::record::composite_from_value(value)
            }
        }
    };
}

/// Register a fieldless enum as an enumeration member type.
///
/// Constants are written by name; the optional `: repr` names the
/// underlying integer type (default `i32`).
#[macro_export]
macro_rules! enumeration {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        $crate::enumeration!($ty: i32 { $($variant),+ });
    };
    ($ty:ident : $repr:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::types::Classify for $ty {
            const TYPE_CODE: $crate::types::TypeCode =
                <$repr as $crate::types::Classify>::TYPE_CODE.into_enumeration();
        }

        impl $crate::record::Field for $ty {
            fn shape() -> $crate::record::Shape {
                $crate::record::Shape::Enum {
                    code: <$ty as $crate::types::Classify>::TYPE_CODE,
                    variants: &[$(stringify!($variant)),+],
                }
            }

            fn to_value(&self) -> $crate::types::Value {
                $crate::types::Value::Enum(match self {
                    $($ty::$variant => stringify!($variant),)+
                })
            }

            fn from_value(
                value: $crate::types::Value,
            ) -> ::std::result::Result<Self, $crate::types::ValueMismatch> {
                match value {
                    $($crate::types::Value::Enum(name) if name == stringify!($variant) => {
                        Ok($ty::$variant)
                    })+
                    other => Err($crate::types::ValueMismatch::new("enumeration", &other)),
                }
            }
        }
    };
}
