//! Extension arrays and the array handle shared by primitive and extension columns.

use std::{
    ops::{Range, RangeFrom, RangeFull, RangeTo},
    sync::Arc,
};

use arrow_array::{Array, ArrayRef};
use arrow_schema::{DataType, Field};

use crate::{
    bridge::ItemType,
    error::{ExtError, Result},
    extension::{ExtensionTypeRef, decode_field},
    item::{Item, ItemClass},
    primitive::read_base_item,
    registry::Registry,
};

/// Key accepted by [`ExtensionArray::index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    /// Single position; negative values count from the end.
    Position(i64),
    /// Half-open range, clamped to the array bounds.
    Range {
        /// First position, `None` for the start.
        start: Option<usize>,
        /// Position past the last one, `None` for the end.
        end: Option<usize>,
    },
}

impl From<usize> for IndexKey {
    fn from(index: usize) -> Self {
        Self::Position(index as i64)
    }
}

impl From<i64> for IndexKey {
    fn from(index: i64) -> Self {
        Self::Position(index)
    }
}

impl From<i32> for IndexKey {
    fn from(index: i32) -> Self {
        Self::Position(i64::from(index))
    }
}

impl From<Range<usize>> for IndexKey {
    fn from(range: Range<usize>) -> Self {
        Self::Range {
            start: Some(range.start),
            end: Some(range.end),
        }
    }
}

impl From<RangeFrom<usize>> for IndexKey {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::Range {
            start: Some(range.start),
            end: None,
        }
    }
}

impl From<RangeTo<usize>> for IndexKey {
    fn from(range: RangeTo<usize>) -> Self {
        Self::Range {
            start: None,
            end: Some(range.end),
        }
    }
}

impl From<RangeFull> for IndexKey {
    fn from(_: RangeFull) -> Self {
        Self::Range {
            start: None,
            end: None,
        }
    }
}

/// Result of [`ExtensionArray::index`].
#[derive(Debug, Clone)]
pub enum Indexed {
    /// A position was requested.
    Item(Option<Item>),
    /// A range was requested.
    Array(ExtensionArray),
}

/// A storage array paired with the extension type describing it.
///
/// Index `i` is null iff the storage slot `i` is null; a `Null` storage is entirely null.
#[derive(Debug, Clone)]
pub struct ExtensionArray {
    ext_type: ExtensionTypeRef,
    storage: ArrayRef,
}

impl ExtensionArray {
    /// Pair a storage array with its type.
    ///
    /// # Errors
    /// Fails with [`ExtError::InvalidStorage`] when the storage type differs from the
    /// extension type's storage type.
    pub fn try_new(ext_type: ExtensionTypeRef, storage: ArrayRef) -> Result<Self> {
        if storage.data_type() != ext_type.storage_type() {
            return Err(ExtError::invalid_storage(
                ext_type.basename(),
                format!(
                    "array of type {} for extension storage {}",
                    storage.data_type(),
                    ext_type.storage_type()
                ),
            ));
        }
        Ok(Self { ext_type, storage })
    }

    /// Extension type.
    pub fn ext_type(&self) -> &ExtensionTypeRef {
        &self.ext_type
    }

    /// Underlying storage.
    pub fn storage(&self) -> &ArrayRef {
        &self.storage
    }

    /// Item class of the extension type.
    pub fn item_class(&self) -> Option<&ItemClass> {
        self.ext_type.item_class()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Whether slot `index` is null.
    pub fn is_null(&self, index: usize) -> bool {
        self.storage.data_type() == &DataType::Null || self.storage.is_null(index)
    }

    /// Number of null slots.
    pub fn null_count(&self) -> usize {
        if self.storage.data_type() == &DataType::Null {
            self.storage.len()
        } else {
            self.storage.null_count()
        }
    }

    /// Item at `index`, `None` for a null slot.
    ///
    /// # Errors
    /// Fails with [`ExtError::OutOfBounds`] past the end, and with decoding errors of the
    /// extension type.
    pub fn get_item(&self, index: usize) -> Result<Option<Item>> {
        if index >= self.len() {
            return Err(ExtError::OutOfBounds {
                index: index as i64,
                len: self.len(),
            });
        }
        if self.is_null(index) {
            return Ok(None);
        }
        self.ext_type.item_at(&self.storage, index)
    }

    /// Unified indexing: a position yields an item, a range yields a sliced array.
    pub fn index(&self, key: impl Into<IndexKey>) -> Result<Indexed> {
        match key.into() {
            IndexKey::Position(position) => {
                let len = self.len() as i64;
                let resolved = if position < 0 { position + len } else { position };
                if resolved < 0 || resolved >= len {
                    return Err(ExtError::OutOfBounds {
                        index: position,
                        len: self.len(),
                    });
                }
                self.get_item(resolved as usize).map(Indexed::Item)
            }
            IndexKey::Range { start, end } => {
                let end = end.unwrap_or(self.len()).min(self.len());
                let start = start.unwrap_or(0).min(end);
                self.slice(start, end - start).map(Indexed::Array)
            }
        }
    }

    /// Zero-copy slice sharing the extension type.
    ///
    /// # Errors
    /// Fails with [`ExtError::OutOfBounds`] when the range exceeds the array.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        if offset.saturating_add(length) > self.len() {
            return Err(ExtError::OutOfBounds {
                index: offset.saturating_add(length) as i64,
                len: self.len(),
            });
        }
        Ok(Self {
            ext_type: Arc::clone(&self.ext_type),
            storage: self.storage.slice(offset, length),
        })
    }

    /// Iterate over items.
    pub fn iter(&self) -> ExtensionArrayIter<'_> {
        ExtensionArrayIter {
            array: self,
            index: 0,
        }
    }

    /// Decode every slot.
    pub fn to_list(&self) -> Result<Vec<Option<Item>>> {
        self.iter().collect()
    }

    /// Decode every slot into a typed binding.
    pub fn to_vec<T: ItemType>(&self) -> Result<Vec<Option<T>>> {
        self.iter()
            .map(|item| item.and_then(|item| item.map(|i| T::from_item(Some(i))).transpose()))
            .collect()
    }

    /// Nullable Arrow field carrying the extension name and metadata.
    pub fn to_field(&self, name: impl Into<String>) -> Result<Field> {
        self.ext_type.to_field(name, true)
    }

    /// Whether both arrays share the same type instance and storage allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ext_type, &other.ext_type) && Arc::ptr_eq(&self.storage, &other.storage)
    }
}

/// Iterator over the items of an [`ExtensionArray`].
#[derive(Debug)]
pub struct ExtensionArrayIter<'a> {
    array: &'a ExtensionArray,
    index: usize,
}

impl Iterator for ExtensionArrayIter<'_> {
    type Item = Result<Option<Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.array.len() {
            return None;
        }
        let item = self.array.get_item(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ExtensionArrayIter<'_> {}

impl<'a> IntoIterator for &'a ExtensionArray {
    type Item = Result<Option<Item>>;
    type IntoIter = ExtensionArrayIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Either a primitive Arrow column or an extension array.
#[derive(Debug, Clone)]
pub enum AnyArray {
    /// Primitive column.
    Base(ArrayRef),
    /// Extension array.
    Extension(ExtensionArray),
}

impl AnyArray {
    /// Wrap a column read from a schema, decoding the extension carried by its field.
    pub fn from_field(field: &Field, array: ArrayRef, registry: &Registry) -> Result<Self> {
        match decode_field(field, registry)? {
            Some(ext_type) => ExtensionArray::try_new(ext_type, array).map(Self::Extension),
            None => Ok(Self::Base(array)),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.storage().len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physical Arrow array.
    pub fn storage(&self) -> &ArrayRef {
        match self {
            Self::Base(array) => array,
            Self::Extension(array) => array.storage(),
        }
    }

    /// Physical Arrow type.
    pub fn data_type(&self) -> &DataType {
        self.storage().data_type()
    }

    /// Extension type, if any.
    pub fn ext_type(&self) -> Option<&ExtensionTypeRef> {
        match self {
            Self::Base(_) => None,
            Self::Extension(array) => Some(array.ext_type()),
        }
    }

    /// Borrow as an extension array.
    pub fn as_extension(&self) -> Option<&ExtensionArray> {
        match self {
            Self::Base(_) => None,
            Self::Extension(array) => Some(array),
        }
    }

    /// Convert into an extension array.
    pub fn into_extension(self) -> Option<ExtensionArray> {
        match self {
            Self::Base(_) => None,
            Self::Extension(array) => Some(array),
        }
    }

    /// Item at `index`: extension arrays decode through their type, primitive columns through
    /// the base mapping.
    pub fn get_item(&self, index: usize) -> Result<Option<Item>> {
        match self {
            Self::Base(array) => read_base_item(array.as_ref(), index),
            Self::Extension(array) => array.get_item(index),
        }
    }

    /// Decode every slot.
    pub fn to_list(&self) -> Result<Vec<Option<Item>>> {
        (0..self.len()).map(|i| self.get_item(i)).collect()
    }

    /// Decode every slot into a typed binding.
    pub fn to_vec<T: ItemType>(&self) -> Result<Vec<Option<T>>> {
        (0..self.len())
            .map(|i| {
                self.get_item(i)?
                    .map(|item| T::from_item(Some(item)))
                    .transpose()
            })
            .collect()
    }

    /// Zero-copy slice.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        match self {
            Self::Base(array) => {
                if offset.saturating_add(length) > array.len() {
                    return Err(ExtError::OutOfBounds {
                        index: offset.saturating_add(length) as i64,
                        len: array.len(),
                    });
                }
                Ok(Self::Base(array.slice(offset, length)))
            }
            Self::Extension(array) => array.slice(offset, length).map(Self::Extension),
        }
    }

    /// Nullable Arrow field for this column, with extension metadata when applicable.
    pub fn to_field(&self, name: impl Into<String>) -> Result<Field> {
        match self {
            Self::Base(array) => Ok(Field::new(name, array.data_type().clone(), true)),
            Self::Extension(array) => array.to_field(name),
        }
    }
}

impl From<ArrayRef> for AnyArray {
    fn from(array: ArrayRef) -> Self {
        Self::Base(array)
    }
}

impl From<ExtensionArray> for AnyArray {
    fn from(array: ExtensionArray) -> Self {
        Self::Extension(array)
    }
}
