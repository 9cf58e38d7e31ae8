//! Generic array construction, dispatching items to extension types or primitive columns.

use arrow_array::new_null_array;
use arrow_schema::DataType;

use crate::{
    array::AnyArray,
    error::{ExtError, Result},
    item::Item,
    primitive::base_array,
    registry::Registry,
    utils::first_valid_item,
};

/// Build an array from items.
///
/// The first non-null item selects the encoding: a registered item class delegates to its
/// root extension type, anything else goes to the primitive encoder. An input with no
/// non-null item becomes a `Null` column of `min(size, scanned)` slots.
///
/// # Errors
/// Propagates encoding errors, e.g. mixed item classes.
pub fn array<I>(items: I, size: Option<usize>, registry: &Registry) -> Result<AnyArray>
where
    I: IntoIterator<Item = Option<Item>>,
{
    let (consumed, first, mut items) = first_valid_item(items);
    let Some(first) = first else {
        let len = size.map_or(consumed, |size| size.min(consumed));
        return Ok(AnyArray::Base(new_null_array(&DataType::Null, len)));
    };
    match registry.find(&first.class(), None) {
        Ok(root) => root
            .build_array(&mut items, size, registry)
            .map(AnyArray::Extension),
        Err(ExtError::UnregisteredClass { .. }) => base_array(items, size).map(AnyArray::Base),
        Err(err) => Err(err),
    }
}

/// Input accepted where a column is expected: an existing array or raw items.
#[derive(Debug, Clone)]
pub enum ColumnInput {
    /// Already encoded.
    Array(AnyArray),
    /// Items still to encode.
    Items(Vec<Option<Item>>),
}

impl From<AnyArray> for ColumnInput {
    fn from(array: AnyArray) -> Self {
        Self::Array(array)
    }
}

impl From<crate::array::ExtensionArray> for ColumnInput {
    fn from(array: crate::array::ExtensionArray) -> Self {
        Self::Array(array.into())
    }
}

impl From<arrow_array::ArrayRef> for ColumnInput {
    fn from(array: arrow_array::ArrayRef) -> Self {
        Self::Array(array.into())
    }
}

impl From<Vec<Option<Item>>> for ColumnInput {
    fn from(items: Vec<Option<Item>>) -> Self {
        Self::Items(items)
    }
}

/// Pass arrays through unchanged, encode raw items with [`array`].
pub fn asarray(
    input: impl Into<ColumnInput>,
    size: Option<usize>,
    registry: &Registry,
) -> Result<AnyArray> {
    match input.into() {
        ColumnInput::Array(array) => Ok(array),
        ColumnInput::Items(items) => array(items, size, registry),
    }
}

/// Read the item at `index` of any column, recursing into extension arrays.
pub fn read_item(array: &AnyArray, index: usize) -> Result<Option<Item>> {
    array.get_item(index)
}
