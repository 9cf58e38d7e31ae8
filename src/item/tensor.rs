use std::sync::Arc;

use arrow_array::{Array, ArrayRef, ArrowPrimitiveType, PrimitiveArray, cast::AsArray};
use arrow_schema::DataType;

use crate::error::{ExtError, Result};

/// Whether a type can hold tensor values.
pub(crate) fn is_tensor_value_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

/// A dense n-dimensional numeric value stored row-major in a flat Arrow array.
///
/// The values array may be a zero-copy slice of a larger buffer, which is how
/// tensor arrays hand out their items.
#[derive(Debug, Clone)]
pub struct Tensor {
    values: ArrayRef,
    shape: Vec<usize>,
}

impl Tensor {
    /// Wrap flat values with a shape.
    ///
    /// # Errors
    /// Non-numeric values fail with [`ExtError::UnsupportedItem`]; a shape whose product
    /// differs from the value count fails with [`ExtError::ShapeMismatch`].
    pub fn try_new(values: ArrayRef, shape: Vec<usize>) -> Result<Self> {
        if !is_tensor_value_type(values.data_type()) {
            return Err(ExtError::unsupported(
                "numeric tensor values",
                values.data_type().to_string(),
            ));
        }
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(ExtError::ShapeMismatch {
                shape,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { values, shape })
    }

    /// Build from native values.
    pub fn from_vec<T: ArrowPrimitiveType>(values: Vec<T::Native>, shape: Vec<usize>) -> Result<Self> {
        Self::try_new(
            Arc::new(PrimitiveArray::<T>::from_iter_values(values)),
            shape,
        )
    }

    /// Dimension sizes.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tensor holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat row-major values.
    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    /// Element type.
    pub fn data_type(&self) -> &DataType {
        self.values.data_type()
    }

    /// Flat values as a native slice, when `T` matches the element type.
    pub fn values_as<T: ArrowPrimitiveType>(&self) -> Option<&[T::Native]> {
        self.values
            .as_primitive_opt::<T>()
            .map(|array| &array.values()[..])
    }

    /// Same values under a new shape.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Self> {
        Self::try_new(Arc::clone(&self.values), shape)
    }

    /// Sub-tensor at `index` along the leading axis, sharing the values buffer.
    pub fn row(&self, index: usize) -> Result<Self> {
        let Some((&rows, rest)) = self.shape.split_first() else {
            return Err(ExtError::InsufficientRank {
                shape: self.shape.clone(),
            });
        };
        if index >= rows {
            return Err(ExtError::OutOfBounds {
                index: index as i64,
                len: rows,
            });
        }
        let row_len: usize = rest.iter().product();
        Ok(Self {
            values: self.values.slice(index * row_len, row_len),
            shape: rest.to_vec(),
        })
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.values.to_data() == other.values.to_data()
    }
}
