//! Mapping between primitive Arrow types and base item classes.

use arrow_schema::{DataType, TimeUnit};

use crate::{
    error::{ExtError, Result},
    item::{BaseClass, ItemClass},
};

impl BaseClass {
    /// Arrow type of columns holding this class.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean => DataType::Boolean,
            Self::Int8 => DataType::Int8,
            Self::Int16 => DataType::Int16,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::UInt8 => DataType::UInt8,
            Self::UInt16 => DataType::UInt16,
            Self::UInt32 => DataType::UInt32,
            Self::UInt64 => DataType::UInt64,
            Self::Float16 => DataType::Float16,
            Self::Float32 => DataType::Float32,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
            Self::Binary => DataType::Binary,
            Self::Timestamp(unit) => DataType::Timestamp(*unit, None),
            Self::Duration(unit) => DataType::Duration(*unit),
        }
    }
}

/// Whether `data_type` has a base item class.
pub fn is_supported_base_type(data_type: &DataType) -> bool {
    semantic_class_of(data_type).is_ok()
}

/// Base item class of a primitive Arrow type.
///
/// Timestamps must be timezone-naive; zoned timestamps are not mapped.
///
/// # Errors
/// Returns [`ExtError::UnmappedType`] (a lookup error) for any other type.
pub fn semantic_class_of(data_type: &DataType) -> Result<BaseClass> {
    let class = match data_type {
        DataType::Null => BaseClass::Null,
        DataType::Boolean => BaseClass::Boolean,
        DataType::Int8 => BaseClass::Int8,
        DataType::Int16 => BaseClass::Int16,
        DataType::Int32 => BaseClass::Int32,
        DataType::Int64 => BaseClass::Int64,
        DataType::UInt8 => BaseClass::UInt8,
        DataType::UInt16 => BaseClass::UInt16,
        DataType::UInt32 => BaseClass::UInt32,
        DataType::UInt64 => BaseClass::UInt64,
        DataType::Float16 => BaseClass::Float16,
        DataType::Float32 => BaseClass::Float32,
        DataType::Float64 => BaseClass::Float64,
        DataType::Utf8 => BaseClass::Utf8,
        DataType::Binary => BaseClass::Binary,
        DataType::Timestamp(unit, None) => BaseClass::Timestamp(*unit),
        DataType::Duration(unit) => BaseClass::Duration(*unit),
        other => return Err(ExtError::UnmappedType(other.clone())),
    };
    Ok(class)
}

/// Arrow type of an item class; `None` stands for "no item" and maps to `Null`.
///
/// # Errors
/// Extension classes (records, enums, tensors) have no primitive type and fail with
/// [`ExtError::NoPrimitiveType`].
pub fn shape_of(class: Option<&ItemClass>) -> Result<DataType> {
    match class {
        None => Ok(DataType::Null),
        Some(ItemClass::Base(base)) => Ok(base.data_type()),
        Some(other) => Err(ExtError::NoPrimitiveType {
            item_class: other.name(),
        }),
    }
}

/// All time units, coarse to fine.
pub const TIME_UNITS: [TimeUnit; 4] = [
    TimeUnit::Second,
    TimeUnit::Millisecond,
    TimeUnit::Microsecond,
    TimeUnit::Nanosecond,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_base_class_round_trips_through_its_data_type() {
        let mut classes = vec![
            BaseClass::Null,
            BaseClass::Boolean,
            BaseClass::Int8,
            BaseClass::Int16,
            BaseClass::Int32,
            BaseClass::Int64,
            BaseClass::UInt8,
            BaseClass::UInt16,
            BaseClass::UInt32,
            BaseClass::UInt64,
            BaseClass::Float16,
            BaseClass::Float32,
            BaseClass::Float64,
            BaseClass::Utf8,
            BaseClass::Binary,
        ];
        for unit in TIME_UNITS {
            classes.push(BaseClass::Timestamp(unit));
            classes.push(BaseClass::Duration(unit));
        }
        for class in classes {
            assert_eq!(semantic_class_of(&class.data_type()).unwrap(), class);
        }
    }
}
