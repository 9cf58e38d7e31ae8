//! Built-in extension types and their array wrappers.

mod int_enum;
mod record;
mod tensor;

pub use int_enum::{EnumArray, IntEnumType};
pub use record::{RecordArray, RecordType};
pub use tensor::{TensorArray, TensorType};

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, new_null_array};
use arrow_schema::DataType;

use crate::{
    array::ExtensionArray,
    error::Result,
    extension::{ExtensionType, ExtensionTypeRef},
    item::Item,
    primitive::read_base_item,
};

/// All-null array of a root type.
fn null_extension_array(root: ExtensionTypeRef, len: usize) -> Result<ExtensionArray> {
    ExtensionArray::try_new(root, new_null_array(&DataType::Null, len))
}

/// Item at `index` of a child column, decoded through its extension type when it has one.
fn read_child(ext_type: Option<&ExtensionTypeRef>, column: &ArrayRef, index: usize) -> Result<Option<Item>> {
    match ext_type {
        Some(ext) => {
            if ext.storage_type() == &DataType::Null || column.is_null(index) {
                Ok(None)
            } else {
                ext.item_at(column, index)
            }
        }
        None => read_base_item(column.as_ref(), index),
    }
}

/// Collect at most `size` items, null-padding up to `size`.
fn collect_sized(items: &mut dyn Iterator<Item = Option<Item>>, size: Option<usize>) -> Vec<Option<Item>> {
    match size {
        Some(size) => {
            let mut collected: Vec<Option<Item>> = items.take(size).collect();
            collected.resize(size, None);
            collected
        }
        None => items.collect(),
    }
}

/// Shared root handle for an instance that may already be specialized.
fn root_of<T: ExtensionType>(ext: Arc<T>, make_root: impl FnOnce(&T) -> T) -> ExtensionTypeRef {
    if ext.item_class().is_none() {
        ext
    } else {
        Arc::new(make_root(&ext))
    }
}
