use std::{any::Any, ops::Deref, sync::Arc};

use arrow_array::{ArrayRef, Int64Array, builder::Int64Builder, cast::AsArray, types::Int64Type};
use arrow_schema::DataType;

use super::{null_extension_array, root_of};
use crate::{
    array::{AnyArray, ExtensionArray},
    error::{ExtError, Result},
    extension::{
        DEFAULT_MODULE, ExtensionMetadata, ExtensionType, ExtensionTypeRef, extension_name,
        resolve_specialized,
    },
    item::{EnumClass, EnumValue, Item, ItemClass},
    registry::Registry,
    utils::first_valid_item,
};

const BASENAME: &str = "int_enum";

fn check_storage(storage_type: &DataType) -> Result<()> {
    match storage_type {
        DataType::Null | DataType::Int64 => Ok(()),
        other => Err(ExtError::invalid_storage(
            BASENAME,
            format!("expected int64 or null storage, not {other}"),
        )),
    }
}

/// Int64 encoding of enumeration members; the member table lives in the metadata.
#[derive(Debug, Clone)]
pub struct IntEnumType {
    module_name: String,
    item_class: Option<ItemClass>,
    storage_type: DataType,
}

impl IntEnumType {
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
        }
    }

    /// Bound enumeration class.
    pub fn enum_class(&self) -> Option<&Arc<EnumClass>> {
        match &self.item_class {
            Some(ItemClass::Enum(class)) => Some(class),
            _ => None,
        }
    }
}

impl Default for IntEnumType {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionType for IntEnumType {
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
        matches!(item_class, ItemClass::Enum(_))
    }

    fn specialize(
        &self,
        storage_type: &DataType,
        item_class: &ItemClass,
        _registry: &Registry,
    ) -> Result<ExtensionTypeRef> {
        check_storage(storage_type)?;
        let ItemClass::Enum(class) = item_class else {
            return Err(ExtError::unsupported("enum class", item_class.name()));
        };
        class.check_distinct_values()?;
        Ok(Arc::new(Self {
            module_name: self.module_name.clone(),
            item_class: Some(item_class.clone()),
            storage_type: storage_type.clone(),
        }))
    }

    fn metadata(&self) -> ExtensionMetadata {
        let mut metadata = ExtensionMetadata::base(self);
        metadata.int_enum_fields = self
            .enum_class()
            .map(|class| class.members().iter().cloned().collect());
        metadata
    }

    fn reconstruct_item_class(
        &self,
        storage_type: &DataType,
        metadata: &ExtensionMetadata,
        _registry: &Registry,
    ) -> Result<ItemClass> {
        check_storage(storage_type)?;
        let name = metadata
            .item_class_name
            .as_deref()
            .ok_or_else(|| ExtError::metadata("enum metadata without item class name"))?;
        let members = metadata
            .int_enum_fields
            .as_ref()
            .ok_or_else(|| ExtError::metadata("enum metadata without 'int_enum_fields'"))?;
        let class = EnumClass::new(name, members.iter().map(|(n, v)| (n.clone(), *v)))?;
        Ok(class.into())
    }

    fn build_array(
        self: Arc<Self>,
        items: &mut dyn Iterator<Item = Option<Item>>,
        size: Option<usize>,
        registry: &Registry,
    ) -> Result<ExtensionArray> {
        let limit = size.unwrap_or(usize::MAX);
        let (consumed, first, items) = first_valid_item(items.take(limit));
        let Some(first) = first else {
            let root = root_of(self, |ext| Self::with_module(ext.module_name.clone()));
            return null_extension_array(root, consumed);
        };
        let class = match &first {
            Item::Enum(member) => Arc::clone(member.class()),
            other => return Err(ExtError::unsupported("enum item", other.class().name())),
        };

        let mut builder = Int64Builder::with_capacity(size.unwrap_or(consumed + 1));
        let mut written = 0;
        for item in items {
            match item {
                None => builder.append_null(),
                Some(Item::Enum(member)) if member.class() == &class => {
                    builder.append_value(member.value())
                }
                Some(other) => {
                    return Err(ExtError::unsupported(class.name(), other.class().name()));
                }
            }
            written += 1;
        }
        if let Some(size) = size {
            builder.append_nulls(size.saturating_sub(written));
        }

        let item_class = ItemClass::Enum(class);
        let ext = resolve_specialized(self.as_ref(), &item_class, &DataType::Int64, registry)?;
        ExtensionArray::try_new(ext, Arc::new(builder.finish()))
    }

    fn item_at(&self, storage: &ArrayRef, index: usize) -> Result<Option<Item>> {
        let (Some(class), Some(values)) = (self.enum_class(), storage.as_primitive_opt::<Int64Type>())
        else {
            return Ok(None);
        };
        EnumValue::from_value(class, values.value(index)).map(|member| Some(Item::Enum(member)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Array of enumeration members backed by an int64 column.
#[derive(Debug, Clone)]
pub struct EnumArray(ExtensionArray);

impl EnumArray {
    /// Wrap an extension array of [`IntEnumType`].
    ///
    /// # Errors
    /// Fails with [`ExtError::UnsupportedItem`] for any other extension type.
    pub fn try_new(array: ExtensionArray) -> Result<Self> {
        if array.ext_type().as_any().downcast_ref::<IntEnumType>().is_none() {
            return Err(ExtError::unsupported(
                "int enum extension array",
                array.ext_type().extension_name(),
            ));
        }
        Ok(Self(array))
    }

    /// Encode enumeration members.
    pub fn from_items<I>(items: I, size: Option<usize>, registry: &Registry) -> Result<Self>
    where
        I: IntoIterator<Item = Option<Item>>,
    {
        let root = registry
            .root_by_name(&extension_name(DEFAULT_MODULE, BASENAME))
            .unwrap_or_else(|| Arc::new(IntEnumType::new()));
        let mut items = items.into_iter();
        root.build_array(&mut items, size, registry).map(Self)
    }

    /// Bound enumeration class.
    pub fn enum_class(&self) -> Option<&Arc<EnumClass>> {
        self.0
            .ext_type()
            .as_any()
            .downcast_ref::<IntEnumType>()
            .and_then(IntEnumType::enum_class)
    }

    /// Raw member values; `None` for an all-null array.
    pub fn values(&self) -> Option<&Int64Array> {
        self.0.storage().as_primitive_opt::<Int64Type>()
    }

    /// Underlying extension array.
    pub fn into_inner(self) -> ExtensionArray {
        self.0
    }
}

impl Deref for EnumArray {
    type Target = ExtensionArray;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<EnumArray> for AnyArray {
    fn from(array: EnumArray) -> Self {
        Self::Extension(array.0)
    }
}
