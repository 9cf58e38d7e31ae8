//! Primitive column encoding and decoding for base item classes.
//!
//! The encoder mirrors a dynamic builder: one Arrow builder per supported base type,
//! selected from the first non-null item's class.

use std::sync::Arc;

use arrow_array::{
    Array, ArrayRef, builder as b, cast::AsArray, new_null_array, types as t,
};
use arrow_schema::{DataType, TimeUnit};

use crate::{
    base_types::shape_of,
    error::{ExtError, Result},
    item::{Item, TimeValue},
    utils::first_valid_item,
};

enum Inner {
    Null(b::NullBuilder),
    Bool(b::BooleanBuilder),
    I8(b::PrimitiveBuilder<t::Int8Type>),
    I16(b::PrimitiveBuilder<t::Int16Type>),
    I32(b::PrimitiveBuilder<t::Int32Type>),
    I64(b::PrimitiveBuilder<t::Int64Type>),
    U8(b::PrimitiveBuilder<t::UInt8Type>),
    U16(b::PrimitiveBuilder<t::UInt16Type>),
    U32(b::PrimitiveBuilder<t::UInt32Type>),
    U64(b::PrimitiveBuilder<t::UInt64Type>),
    F16(b::PrimitiveBuilder<t::Float16Type>),
    F32(b::PrimitiveBuilder<t::Float32Type>),
    F64(b::PrimitiveBuilder<t::Float64Type>),
    Utf8(b::StringBuilder),
    Binary(b::BinaryBuilder),
    TimestampSecond(b::PrimitiveBuilder<t::TimestampSecondType>),
    TimestampMillisecond(b::PrimitiveBuilder<t::TimestampMillisecondType>),
    TimestampMicrosecond(b::PrimitiveBuilder<t::TimestampMicrosecondType>),
    TimestampNanosecond(b::PrimitiveBuilder<t::TimestampNanosecondType>),
    DurationSecond(b::PrimitiveBuilder<t::DurationSecondType>),
    DurationMillisecond(b::PrimitiveBuilder<t::DurationMillisecondType>),
    DurationMicrosecond(b::PrimitiveBuilder<t::DurationMicrosecondType>),
    DurationNanosecond(b::PrimitiveBuilder<t::DurationNanosecondType>),
}

/// Builder for one primitive column.
pub struct BaseColumnBuilder {
    data_type: DataType,
    inner: Inner,
}

impl BaseColumnBuilder {
    /// Create a builder for `data_type`.
    ///
    /// # Errors
    /// Returns [`ExtError::UnmappedType`] when `data_type` is not a supported base type.
    pub fn try_new(data_type: &DataType, capacity: usize) -> Result<Self> {
        let inner = match data_type {
            DataType::Null => Inner::Null(b::NullBuilder::new()),
            DataType::Boolean => Inner::Bool(b::BooleanBuilder::with_capacity(capacity)),
            DataType::Int8 => Inner::I8(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Int16 => Inner::I16(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Int32 => Inner::I32(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Int64 => Inner::I64(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::UInt8 => Inner::U8(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::UInt16 => Inner::U16(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::UInt32 => Inner::U32(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::UInt64 => Inner::U64(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Float16 => Inner::F16(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Float32 => Inner::F32(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Float64 => Inner::F64(b::PrimitiveBuilder::with_capacity(capacity)),
            DataType::Utf8 => Inner::Utf8(b::StringBuilder::with_capacity(capacity, 0)),
            DataType::Binary => Inner::Binary(b::BinaryBuilder::with_capacity(capacity, 0)),
            DataType::Timestamp(TimeUnit::Second, None) => {
                Inner::TimestampSecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Timestamp(TimeUnit::Millisecond, None) => {
                Inner::TimestampMillisecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Timestamp(TimeUnit::Microsecond, None) => {
                Inner::TimestampMicrosecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Timestamp(TimeUnit::Nanosecond, None) => {
                Inner::TimestampNanosecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Duration(TimeUnit::Second) => {
                Inner::DurationSecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Duration(TimeUnit::Millisecond) => {
                Inner::DurationMillisecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Duration(TimeUnit::Microsecond) => {
                Inner::DurationMicrosecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            DataType::Duration(TimeUnit::Nanosecond) => {
                Inner::DurationNanosecond(b::PrimitiveBuilder::with_capacity(capacity))
            }
            other => return Err(ExtError::UnmappedType(other.clone())),
        };
        Ok(Self {
            data_type: data_type.clone(),
            inner,
        })
    }

    /// Column type being built.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Append a null slot.
    pub fn append_null(&mut self) {
        match &mut self.inner {
            Inner::Null(b) => b.append_null(),
            Inner::Bool(b) => b.append_null(),
            Inner::I8(b) => b.append_null(),
            Inner::I16(b) => b.append_null(),
            Inner::I32(b) => b.append_null(),
            Inner::I64(b) => b.append_null(),
            Inner::U8(b) => b.append_null(),
            Inner::U16(b) => b.append_null(),
            Inner::U32(b) => b.append_null(),
            Inner::U64(b) => b.append_null(),
            Inner::F16(b) => b.append_null(),
            Inner::F32(b) => b.append_null(),
            Inner::F64(b) => b.append_null(),
            Inner::Utf8(b) => b.append_null(),
            Inner::Binary(b) => b.append_null(),
            Inner::TimestampSecond(b) => b.append_null(),
            Inner::TimestampMillisecond(b) => b.append_null(),
            Inner::TimestampMicrosecond(b) => b.append_null(),
            Inner::TimestampNanosecond(b) => b.append_null(),
            Inner::DurationSecond(b) => b.append_null(),
            Inner::DurationMillisecond(b) => b.append_null(),
            Inner::DurationMicrosecond(b) => b.append_null(),
            Inner::DurationNanosecond(b) => b.append_null(),
        }
    }

    /// Append an optional item.
    ///
    /// # Errors
    /// Returns [`ExtError::UnsupportedItem`] when the item's class does not match the column.
    pub fn append(&mut self, item: Option<Item>) -> Result<()> {
        let Some(item) = item else {
            self.append_null();
            return Ok(());
        };
        match (&mut self.inner, item) {
            (Inner::Bool(b), Item::Boolean(v)) => b.append_value(v),
            (Inner::I8(b), Item::Int8(v)) => b.append_value(v),
            (Inner::I16(b), Item::Int16(v)) => b.append_value(v),
            (Inner::I32(b), Item::Int32(v)) => b.append_value(v),
            (Inner::I64(b), Item::Int64(v)) => b.append_value(v),
            (Inner::U8(b), Item::UInt8(v)) => b.append_value(v),
            (Inner::U16(b), Item::UInt16(v)) => b.append_value(v),
            (Inner::U32(b), Item::UInt32(v)) => b.append_value(v),
            (Inner::U64(b), Item::UInt64(v)) => b.append_value(v),
            (Inner::F16(b), Item::Float16(v)) => b.append_value(v),
            (Inner::F32(b), Item::Float32(v)) => b.append_value(v),
            (Inner::F64(b), Item::Float64(v)) => b.append_value(v),
            (Inner::Utf8(b), Item::Utf8(v)) => b.append_value(v),
            (Inner::Binary(b), Item::Binary(v)) => b.append_value(v),
            (Inner::TimestampSecond(b), Item::Timestamp(v)) if v.unit == TimeUnit::Second => {
                b.append_value(v.value)
            }
            (Inner::TimestampMillisecond(b), Item::Timestamp(v))
                if v.unit == TimeUnit::Millisecond =>
            {
                b.append_value(v.value)
            }
            (Inner::TimestampMicrosecond(b), Item::Timestamp(v))
                if v.unit == TimeUnit::Microsecond =>
            {
                b.append_value(v.value)
            }
            (Inner::TimestampNanosecond(b), Item::Timestamp(v))
                if v.unit == TimeUnit::Nanosecond =>
            {
                b.append_value(v.value)
            }
            (Inner::DurationSecond(b), Item::Duration(v)) if v.unit == TimeUnit::Second => {
                b.append_value(v.value)
            }
            (Inner::DurationMillisecond(b), Item::Duration(v))
                if v.unit == TimeUnit::Millisecond =>
            {
                b.append_value(v.value)
            }
            (Inner::DurationMicrosecond(b), Item::Duration(v))
                if v.unit == TimeUnit::Microsecond =>
            {
                b.append_value(v.value)
            }
            (Inner::DurationNanosecond(b), Item::Duration(v))
                if v.unit == TimeUnit::Nanosecond =>
            {
                b.append_value(v.value)
            }
            (_, other) => {
                return Err(ExtError::unsupported(
                    self.data_type.to_string(),
                    other.class().name(),
                ));
            }
        }
        Ok(())
    }

    /// Finish the column.
    pub fn finish(&mut self) -> ArrayRef {
        match &mut self.inner {
            Inner::Null(b) => Arc::new(b.finish()),
            Inner::Bool(b) => Arc::new(b.finish()),
            Inner::I8(b) => Arc::new(b.finish()),
            Inner::I16(b) => Arc::new(b.finish()),
            Inner::I32(b) => Arc::new(b.finish()),
            Inner::I64(b) => Arc::new(b.finish()),
            Inner::U8(b) => Arc::new(b.finish()),
            Inner::U16(b) => Arc::new(b.finish()),
            Inner::U32(b) => Arc::new(b.finish()),
            Inner::U64(b) => Arc::new(b.finish()),
            Inner::F16(b) => Arc::new(b.finish()),
            Inner::F32(b) => Arc::new(b.finish()),
            Inner::F64(b) => Arc::new(b.finish()),
            Inner::Utf8(b) => Arc::new(b.finish()),
            Inner::Binary(b) => Arc::new(b.finish()),
            Inner::TimestampSecond(b) => Arc::new(b.finish()),
            Inner::TimestampMillisecond(b) => Arc::new(b.finish()),
            Inner::TimestampMicrosecond(b) => Arc::new(b.finish()),
            Inner::TimestampNanosecond(b) => Arc::new(b.finish()),
            Inner::DurationSecond(b) => Arc::new(b.finish()),
            Inner::DurationMillisecond(b) => Arc::new(b.finish()),
            Inner::DurationMicrosecond(b) => Arc::new(b.finish()),
            Inner::DurationNanosecond(b) => Arc::new(b.finish()),
        }
    }
}

/// Encode base items into a primitive column.
///
/// The column type comes from the first non-null item. With `size`, the output is truncated
/// or null-padded to exactly `size` slots; an all-null input yields a `Null` column of
/// `min(size, scanned)` slots.
///
/// # Errors
/// Extension items fail with [`ExtError::NoPrimitiveType`]; items whose class differs from
/// the first one fail with [`ExtError::UnsupportedItem`].
pub fn base_array<I>(items: I, size: Option<usize>) -> Result<ArrayRef>
where
    I: IntoIterator<Item = Option<Item>>,
{
    let (consumed, first, items) = first_valid_item(items);
    let Some(first) = first else {
        let len = size.map_or(consumed, |size| size.min(consumed));
        return Ok(new_null_array(&DataType::Null, len));
    };
    let data_type = shape_of(Some(&first.class()))?;
    let mut builder = BaseColumnBuilder::try_new(&data_type, size.unwrap_or(consumed + 1))?;
    let mut written = 0;
    for item in items.take(size.unwrap_or(usize::MAX)) {
        builder.append(item)?;
        written += 1;
    }
    for _ in written..size.unwrap_or(written) {
        builder.append_null();
    }
    Ok(builder.finish())
}

/// Read the base item at `index` of a primitive column.
///
/// # Errors
/// Fails with [`ExtError::OutOfBounds`] past the end and [`ExtError::UnmappedType`] for a
/// column that is not a supported base type.
pub fn read_base_item(array: &dyn Array, index: usize) -> Result<Option<Item>> {
    if index >= array.len() {
        return Err(ExtError::OutOfBounds {
            index: index as i64,
            len: array.len(),
        });
    }
    if array.data_type() == &DataType::Null || array.is_null(index) {
        return Ok(None);
    }
    let item = match array.data_type() {
        DataType::Boolean => Item::Boolean(array.as_boolean().value(index)),
        DataType::Int8 => Item::Int8(array.as_primitive::<t::Int8Type>().value(index)),
        DataType::Int16 => Item::Int16(array.as_primitive::<t::Int16Type>().value(index)),
        DataType::Int32 => Item::Int32(array.as_primitive::<t::Int32Type>().value(index)),
        DataType::Int64 => Item::Int64(array.as_primitive::<t::Int64Type>().value(index)),
        DataType::UInt8 => Item::UInt8(array.as_primitive::<t::UInt8Type>().value(index)),
        DataType::UInt16 => Item::UInt16(array.as_primitive::<t::UInt16Type>().value(index)),
        DataType::UInt32 => Item::UInt32(array.as_primitive::<t::UInt32Type>().value(index)),
        DataType::UInt64 => Item::UInt64(array.as_primitive::<t::UInt64Type>().value(index)),
        DataType::Float16 => Item::Float16(array.as_primitive::<t::Float16Type>().value(index)),
        DataType::Float32 => Item::Float32(array.as_primitive::<t::Float32Type>().value(index)),
        DataType::Float64 => Item::Float64(array.as_primitive::<t::Float64Type>().value(index)),
        DataType::Utf8 => Item::Utf8(array.as_string::<i32>().value(index).to_string()),
        DataType::Binary => Item::Binary(array.as_binary::<i32>().value(index).to_vec()),
        DataType::Timestamp(unit, None) => {
            let value = match unit {
                TimeUnit::Second => array.as_primitive::<t::TimestampSecondType>().value(index),
                TimeUnit::Millisecond => {
                    array.as_primitive::<t::TimestampMillisecondType>().value(index)
                }
                TimeUnit::Microsecond => {
                    array.as_primitive::<t::TimestampMicrosecondType>().value(index)
                }
                TimeUnit::Nanosecond => {
                    array.as_primitive::<t::TimestampNanosecondType>().value(index)
                }
            };
            Item::Timestamp(TimeValue::new(value, *unit))
        }
        DataType::Duration(unit) => {
            let value = match unit {
                TimeUnit::Second => array.as_primitive::<t::DurationSecondType>().value(index),
                TimeUnit::Millisecond => {
                    array.as_primitive::<t::DurationMillisecondType>().value(index)
                }
                TimeUnit::Microsecond => {
                    array.as_primitive::<t::DurationMicrosecondType>().value(index)
                }
                TimeUnit::Nanosecond => {
                    array.as_primitive::<t::DurationNanosecondType>().value(index)
                }
            };
            Item::Duration(TimeValue::new(value, *unit))
        }
        other => return Err(ExtError::UnmappedType(other.clone())),
    };
    Ok(Some(item))
}
