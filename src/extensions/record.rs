use std::{any::Any, ops::Deref, sync::Arc};

use arrow_array::{Array, ArrayRef, StructArray, cast::AsArray};
use arrow_buffer::NullBuffer;
use arrow_schema::{DataType, Field, Fields};

use super::{collect_sized, null_extension_array, read_child, root_of};
use crate::{
    array::{AnyArray, ExtensionArray},
    base_types::semantic_class_of,
    error::{ExtError, Result},
    extension::{
        DEFAULT_MODULE, ExtensionMetadata, ExtensionType, ExtensionTypeRef, FieldMetadata,
        decode_field, extension_name, resolve_specialized,
    },
    factory::{ColumnInput, array, asarray},
    item::{BaseClass, Item, ItemClass, RecordClass, RecordField, RecordValue},
    registry::Registry,
    utils::first_valid_in_slice,
};

const BASENAME: &str = "record";

fn check_storage(storage_type: &DataType) -> Result<()> {
    match storage_type {
        DataType::Null | DataType::Struct(_) => Ok(()),
        other => Err(ExtError::invalid_storage(
            BASENAME,
            format!("expected struct or null storage, not {other}"),
        )),
    }
}

/// Struct-of-columns encoding of record items, one child column per declared field.
///
/// Child columns holding extension arrays keep their own extension metadata on the struct
/// field, so a specialized record type knows how to decode every child.
#[derive(Debug, Clone)]
pub struct RecordType {
    module_name: String,
    item_class: Option<ItemClass>,
    storage_type: DataType,
    children: Vec<Option<ExtensionTypeRef>>,
}

impl RecordType {
    /// Root instance in the default module.
    pub fn new() -> Self {
        Self::with_module(DEFAULT_MODULE)
    }

    /// Root instance in a custom module.
    pub fn with_module(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            item_class: None,
            storage_type: DataType::Null,
            children: Vec::new(),
        }
    }

    fn from_parts(
        module_name: String,
        class: Arc<RecordClass>,
        storage_type: DataType,
        children: Vec<Option<ExtensionTypeRef>>,
    ) -> Self {
        Self {
            module_name,
            item_class: Some(ItemClass::Record(class)),
            storage_type,
            children,
        }
    }

    /// Bound record class.
    pub fn record_class(&self) -> Option<&Arc<RecordClass>> {
        match &self.item_class {
            Some(ItemClass::Record(class)) => Some(class),
            _ => None,
        }
    }

    /// Extension types of the child columns, `None` for primitive children.
    pub fn children(&self) -> &[Option<ExtensionTypeRef>] {
        &self.children
    }
}

impl Default for RecordType {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionType for RecordType {
    fn basename(&self) -> &'static str {
        BASENAME
    }

    fn priority(&self) -> i32 {
        1
    }

    fn module_name(&self) -> &str {
        &self.module_name
    }

    fn item_class(&self) -> Option<&ItemClass> {
        self.item_class.as_ref()
    }

    fn storage_type(&self) -> &DataType {
        &self.storage_type
    }

    fn supports(&self, item_class: &ItemClass) -> bool {
        matches!(item_class, ItemClass::Record(_))
    }

    fn specialize(
        &self,
        storage_type: &DataType,
        item_class: &ItemClass,
        registry: &Registry,
    ) -> Result<ExtensionTypeRef> {
        check_storage(storage_type)?;
        let ItemClass::Record(class) = item_class else {
            return Err(ExtError::unsupported("record class", item_class.name()));
        };
        let children = match storage_type {
            DataType::Struct(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.name().as_str()).collect();
                if !names.iter().copied().eq(class.keys()) {
                    return Err(ExtError::invalid_storage(
                        BASENAME,
                        format!(
                            "struct fields {names:?} do not match record '{}' fields {:?}",
                            class.name(),
                            class.keys().collect::<Vec<_>>()
                        ),
                    ));
                }
                fields
                    .iter()
                    .map(|f| decode_field(f, registry))
                    .collect::<Result<Vec<_>>>()?
            }
            _ => Vec::new(),
        };
        Ok(Arc::new(Self::from_parts(
            self.module_name.clone(),
            Arc::clone(class),
            storage_type.clone(),
            children,
        )))
    }

    fn metadata(&self) -> ExtensionMetadata {
        let mut metadata = ExtensionMetadata::base(self);
        metadata.fields = self.record_class().map(|class| {
            class
                .fields()
                .iter()
                .map(|f| FieldMetadata {
                    name: f.name().to_string(),
                    nullable: f.nullable(),
                })
                .collect()
        });
        metadata
    }

    fn reconstruct_item_class(
        &self,
        storage_type: &DataType,
        metadata: &ExtensionMetadata,
        registry: &Registry,
    ) -> Result<ItemClass> {
        check_storage(storage_type)?;
        let DataType::Struct(fields) = storage_type else {
            return Err(ExtError::invalid_storage(
                BASENAME,
                "cannot rebuild a record class from null storage",
            ));
        };
        let name = metadata
            .item_class_name
            .as_deref()
            .ok_or_else(|| ExtError::metadata("record metadata without item class name"))?;
        let declared = metadata.fields.as_deref().unwrap_or_default();
        let record_fields = fields
            .iter()
            .map(|field| {
                let class = match decode_field(field, registry)? {
                    Some(ext) => ext
                        .item_class()
                        .cloned()
                        .unwrap_or(ItemClass::Base(BaseClass::Null)),
                    None => semantic_class_of(field.data_type())
                        .map(ItemClass::Base)
                        .map_err(|_| {
                            ExtError::unsupported("record field type", field.to_string())
                        })?,
                };
                let nullable = declared
                    .iter()
                    .find(|d| d.name == *field.name())
                    .map_or(field.is_nullable(), |d| d.nullable);
                Ok(RecordField::new(field.name().clone(), class, nullable))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordClass::new(name, record_fields)?.into())
    }

    fn build_array(
        self: Arc<Self>,
        items: &mut dyn Iterator<Item = Option<Item>>,
        size: Option<usize>,
        registry: &Registry,
    ) -> Result<ExtensionArray> {
        // Eager: the struct type is only known once every child column is built.
        let items = collect_sized(items, size);
        let (_, first) = first_valid_in_slice(&items);
        let Some(first) = first else {
            let len = items.len();
            let root = root_of(self, |ext| Self::with_module(ext.module_name.clone()));
            return null_extension_array(root, len);
        };
        let Item::Record(first) = first else {
            return Err(ExtError::unsupported("record item", first.class().name()));
        };
        let class = Arc::clone(first.class());
        for item in items.iter().flatten() {
            match item {
                Item::Record(r) if r.class() == &class => {}
                other => {
                    return Err(ExtError::unsupported(class.name(), other.class().name()));
                }
            }
        }

        let mut fields = Vec::with_capacity(class.len());
        let mut columns = Vec::with_capacity(class.len());
        for (idx, field) in class.fields().iter().enumerate() {
            let values = items.iter().map(|item| match item {
                Some(Item::Record(r)) => r.values()[idx].clone(),
                _ => None,
            });
            let column = array(values, None, registry)?;
            fields.push(column.to_field(field.name())?);
            columns.push(Arc::clone(column.storage()));
        }
        let validity = NullBuffer::from(items.iter().map(Option::is_some).collect::<Vec<bool>>());
        let validity = (validity.null_count() > 0).then_some(validity);
        let storage = if columns.is_empty() {
            StructArray::new_empty_fields(items.len(), validity)
        } else {
            StructArray::try_new(Fields::from(fields), columns, validity)?
        };

        let item_class = ItemClass::Record(class);
        let ext = resolve_specialized(self.as_ref(), &item_class, storage.data_type(), registry)?;
        ExtensionArray::try_new(ext, Arc::new(storage))
    }

    fn item_at(&self, storage: &ArrayRef, index: usize) -> Result<Option<Item>> {
        let (Some(class), Some(columns)) = (self.record_class(), storage.as_struct_opt()) else {
            return Ok(None);
        };
        let values = columns
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                read_child(self.children.get(idx).and_then(Option::as_ref), column, index)
            })
            .collect::<Result<Vec<_>>>()?;
        RecordValue::new(Arc::clone(class), values).map(|r| Some(Item::Record(r)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Array of record items backed by a struct column.
#[derive(Debug, Clone)]
pub struct RecordArray(ExtensionArray);

impl RecordArray {
    /// Wrap an extension array of [`RecordType`].
    ///
    /// # Errors
    /// Fails with [`ExtError::UnsupportedItem`] for any other extension type.
    pub fn try_new(array: ExtensionArray) -> Result<Self> {
        if array.ext_type().as_any().downcast_ref::<RecordType>().is_none() {
            return Err(ExtError::unsupported(
                "record extension array",
                array.ext_type().extension_name(),
            ));
        }
        Ok(Self(array))
    }

    /// Encode record items.
    pub fn from_items<I>(items: I, size: Option<usize>, registry: &Registry) -> Result<Self>
    where
        I: IntoIterator<Item = Option<Item>>,
    {
        let root = registry
            .root_by_name(&extension_name(DEFAULT_MODULE, BASENAME))
            .unwrap_or_else(|| Arc::new(RecordType::new()));
        let mut items = items.into_iter();
        root.build_array(&mut items, size, registry).map(Self)
    }

    fn record_type(&self) -> Option<&RecordType> {
        self.0.ext_type().as_any().downcast_ref::<RecordType>()
    }

    /// Bound record class.
    pub fn record_class(&self) -> Option<&Arc<RecordClass>> {
        self.record_type().and_then(RecordType::record_class)
    }

    /// Child column names, in order. Empty for an all-null array.
    pub fn keys(&self) -> Vec<String> {
        match self.0.storage().data_type() {
            DataType::Struct(fields) => fields.iter().map(|f| f.name().clone()).collect(),
            _ => Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.keys()
            .iter()
            .position(|k| k == name)
            .ok_or_else(|| ExtError::UnknownField {
                record: self
                    .record_class()
                    .map_or_else(|| BASENAME.to_string(), |c| c.name().to_string()),
                field: name.to_string(),
            })
    }

    /// Child column of a field.
    ///
    /// # Errors
    /// Fails with [`ExtError::UnknownField`] for an undeclared name.
    pub fn field(&self, name: &str) -> Result<AnyArray> {
        let idx = self.position(name)?;
        let columns = self.0.storage().as_struct();
        let column = Arc::clone(columns.column(idx));
        match self.record_type().and_then(|t| t.children.get(idx).cloned().flatten()) {
            Some(ext) => ExtensionArray::try_new(ext, column).map(AnyArray::Extension),
            None => Ok(AnyArray::Base(column)),
        }
    }

    /// New array with some child columns replaced.
    ///
    /// Raw item inputs are encoded with [`asarray`]. Validity is kept from this array. The
    /// extension type is reused when the struct type does not change, and an empty
    /// replacement set returns a clone sharing type and storage.
    ///
    /// # Errors
    /// Fails with [`ExtError::UnknownField`] for an undeclared name (checked before any
    /// encoding) and [`ExtError::LengthMismatch`] for a column of the wrong length.
    pub fn replace<K, C, I>(&self, replacements: I, registry: &Registry) -> Result<Self>
    where
        K: AsRef<str>,
        C: Into<ColumnInput>,
        I: IntoIterator<Item = (K, C)>,
    {
        let replacements = replacements
            .into_iter()
            .map(|(name, input)| Ok((self.position(name.as_ref())?, name, input)))
            .collect::<Result<Vec<_>>>()?;
        if replacements.is_empty() {
            return Ok(self.clone());
        }
        let (Some(record_type), Some(class), Some(storage)) = (
            self.record_type(),
            self.record_class(),
            self.0.storage().as_struct_opt(),
        ) else {
            return Ok(self.clone());
        };

        let mut columns: Vec<ArrayRef> = storage.columns().to_vec();
        let mut children = record_type.children.clone();
        for (idx, name, input) in replacements {
            let column = asarray(input, None, registry)?;
            if column.len() != self.len() {
                return Err(ExtError::LengthMismatch {
                    column: name.as_ref().to_string(),
                    expected: self.len(),
                    actual: column.len(),
                });
            }
            children[idx] = column.ext_type().cloned();
            columns[idx] = Arc::clone(column.storage());
        }
        let fields = storage
            .fields()
            .iter()
            .zip(&columns)
            .zip(&children)
            .map(|((field, column), child)| match child {
                Some(ext) => ext.to_field(field.name().clone(), true),
                None => Ok(Field::new(field.name().clone(), column.data_type().clone(), true)),
            })
            .collect::<Result<Vec<_>>>()?;
        let rebuilt = StructArray::try_new(Fields::from(fields), columns, storage.nulls().cloned())?;

        let ext_type: ExtensionTypeRef = if rebuilt.data_type() == self.0.storage().data_type() {
            Arc::clone(self.0.ext_type())
        } else {
            Arc::new(RecordType::from_parts(
                record_type.module_name.clone(),
                Arc::clone(class),
                rebuilt.data_type().clone(),
                children,
            ))
        };
        ExtensionArray::try_new(ext_type, Arc::new(rebuilt)).map(Self)
    }

    /// Underlying extension array.
    pub fn into_inner(self) -> ExtensionArray {
        self.0
    }
}

impl Deref for RecordArray {
    type Target = ExtensionArray;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<RecordArray> for AnyArray {
    fn from(array: RecordArray) -> Self {
        Self::Extension(array.0)
    }
}
