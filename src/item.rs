//! Native item model: the values written into and read back out of arrays.
//!
//! An [`Item`] is one non-null element; nulls are expressed with `Option<Item>`.
//! Every item has an [`ItemClass`], the key the registry dispatches on.

use std::{fmt, sync::Arc};

use arrow_schema::TimeUnit;
use half::f16;

mod int_enum;
mod record;
mod tensor;

pub use int_enum::{EnumClass, EnumValue};
pub use record::{RecordClass, RecordField, RecordValue};
pub use tensor::Tensor;
pub(crate) use tensor::is_tensor_value_type;

/// Primitive item classes, one per supported Arrow base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseClass {
    /// Always-null column.
    Null,
    /// Boolean.
    Boolean,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Half precision float.
    Float16,
    /// Single precision float.
    Float32,
    /// Double precision float.
    Float64,
    /// UTF-8 string.
    Utf8,
    /// Opaque bytes.
    Binary,
    /// Point in time with a unit, no timezone.
    Timestamp(TimeUnit),
    /// Elapsed time with a unit.
    Duration(TimeUnit),
}

impl BaseClass {
    /// Short lowercase name, e.g. `int64` or `timestamp[ms]`.
    pub fn name(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Boolean => "bool".into(),
            Self::Int8 => "int8".into(),
            Self::Int16 => "int16".into(),
            Self::Int32 => "int32".into(),
            Self::Int64 => "int64".into(),
            Self::UInt8 => "uint8".into(),
            Self::UInt16 => "uint16".into(),
            Self::UInt32 => "uint32".into(),
            Self::UInt64 => "uint64".into(),
            Self::Float16 => "float16".into(),
            Self::Float32 => "float32".into(),
            Self::Float64 => "float64".into(),
            Self::Utf8 => "utf8".into(),
            Self::Binary => "binary".into(),
            Self::Timestamp(unit) => format!("timestamp[{}]", unit_str(*unit)),
            Self::Duration(unit) => format!("duration[{}]", unit_str(*unit)),
        }
    }
}

/// Abbreviation of a time unit: `s`, `ms`, `us` or `ns`.
pub fn unit_str(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

/// A timestamp or duration value that keeps its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    /// Raw count of `unit` ticks.
    pub value: i64,
    /// Tick unit.
    pub unit: TimeUnit,
}

impl TimeValue {
    /// Construct from a raw count and a unit.
    pub fn new(value: i64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// Whole seconds.
    pub fn seconds(value: i64) -> Self {
        Self::new(value, TimeUnit::Second)
    }

    /// Milliseconds.
    pub fn millis(value: i64) -> Self {
        Self::new(value, TimeUnit::Millisecond)
    }

    /// Microseconds.
    pub fn micros(value: i64) -> Self {
        Self::new(value, TimeUnit::Microsecond)
    }

    /// Nanoseconds.
    pub fn nanos(value: i64) -> Self {
        Self::new(value, TimeUnit::Nanosecond)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, unit_str(self.unit))
    }
}

/// The class of an item: what the registry matches extension types against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemClass {
    /// Primitive class with a direct Arrow type.
    Base(BaseClass),
    /// Record described by its ordered fields.
    Record(Arc<RecordClass>),
    /// Integer enumeration described by its members.
    Enum(Arc<EnumClass>),
    /// Variable-shape numeric tensor.
    Tensor,
}

impl ItemClass {
    /// Display name, also written to extension metadata.
    pub fn name(&self) -> String {
        match self {
            Self::Base(base) => base.name(),
            Self::Record(record) => record.name().to_string(),
            Self::Enum(class) => class.name().to_string(),
            Self::Tensor => "Tensor".to_string(),
        }
    }

    /// Whether the class is handled by an extension type rather than a primitive column.
    pub fn is_extension(&self) -> bool {
        !matches!(self, Self::Base(_))
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<BaseClass> for ItemClass {
    fn from(base: BaseClass) -> Self {
        Self::Base(base)
    }
}

impl From<RecordClass> for ItemClass {
    fn from(class: RecordClass) -> Self {
        Self::Record(Arc::new(class))
    }
}

impl From<Arc<RecordClass>> for ItemClass {
    fn from(class: Arc<RecordClass>) -> Self {
        Self::Record(class)
    }
}

impl From<EnumClass> for ItemClass {
    fn from(class: EnumClass) -> Self {
        Self::Enum(Arc::new(class))
    }
}

impl From<Arc<EnumClass>> for ItemClass {
    fn from(class: Arc<EnumClass>) -> Self {
        Self::Enum(class)
    }
}

/// One non-null element of an array.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Boolean value.
    Boolean(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Half precision float.
    Float16(f16),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Opaque bytes.
    Binary(Vec<u8>),
    /// Timestamp with unit.
    Timestamp(TimeValue),
    /// Duration with unit.
    Duration(TimeValue),
    /// Record value.
    Record(RecordValue),
    /// Enumeration member.
    Enum(EnumValue),
    /// Tensor value.
    Tensor(Tensor),
}

impl Item {
    /// Class of this item.
    pub fn class(&self) -> ItemClass {
        match self {
            Self::Boolean(_) => BaseClass::Boolean.into(),
            Self::Int8(_) => BaseClass::Int8.into(),
            Self::Int16(_) => BaseClass::Int16.into(),
            Self::Int32(_) => BaseClass::Int32.into(),
            Self::Int64(_) => BaseClass::Int64.into(),
            Self::UInt8(_) => BaseClass::UInt8.into(),
            Self::UInt16(_) => BaseClass::UInt16.into(),
            Self::UInt32(_) => BaseClass::UInt32.into(),
            Self::UInt64(_) => BaseClass::UInt64.into(),
            Self::Float16(_) => BaseClass::Float16.into(),
            Self::Float32(_) => BaseClass::Float32.into(),
            Self::Float64(_) => BaseClass::Float64.into(),
            Self::Utf8(_) => BaseClass::Utf8.into(),
            Self::Binary(_) => BaseClass::Binary.into(),
            Self::Timestamp(t) => BaseClass::Timestamp(t.unit).into(),
            Self::Duration(t) => BaseClass::Duration(t.unit).into(),
            Self::Record(r) => ItemClass::Record(Arc::clone(r.class())),
            Self::Enum(e) => ItemClass::Enum(Arc::clone(e.class())),
            Self::Tensor(_) => ItemClass::Tensor,
        }
    }
}

macro_rules! impl_item_from {
    ($($rust:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$rust> for Item {
                fn from(v: $rust) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_item_from!(
    bool => Boolean,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f16 => Float16,
    f32 => Float32,
    f64 => Float64,
    String => Utf8,
    Vec<u8> => Binary,
    RecordValue => Record,
    EnumValue => Enum,
    Tensor => Tensor,
);

impl From<&str> for Item {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}
