use std::{any::Any, iter, ops::Deref, sync::Arc};

use arrow_array::{
    Array, ArrayRef, Int64Array, ListArray, StructArray, cast::AsArray, make_array,
    types::Int64Type,
};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_data::transform::MutableArrayData;
use arrow_schema::{DataType, Field, Fields};

use super::{collect_sized, null_extension_array, root_of};
use crate::{
    array::{AnyArray, ExtensionArray},
    error::{ExtError, Result},
    extension::{
        DEFAULT_MODULE, ExtensionMetadata, ExtensionType, ExtensionTypeRef, extension_name,
        resolve_specialized,
    },
    item::{Item, ItemClass, Tensor},
    registry::Registry,
};

const BASENAME: &str = "tensor";

fn is_numeric_list(data_type: &DataType) -> bool {
    match data_type {
        DataType::List(item) => crate::item::is_tensor_value_type(item.data_type()),
        _ => false,
    }
}

fn check_storage(storage_type: &DataType) -> Result<()> {
    let fields = match storage_type {
        DataType::Null => return Ok(()),
        DataType::Struct(fields) if fields.len() == 2 => fields,
        other => {
            return Err(ExtError::invalid_storage(
                BASENAME,
                format!("storage must be a struct with two fields, not {other}"),
            ));
        }
    };
    let (data, shape) = (&fields[0], &fields[1]);
    if data.name() != "data" {
        return Err(ExtError::invalid_storage(
            BASENAME,
            format!("first field should be 'data', not '{}'", data.name()),
        ));
    }
    if !is_numeric_list(data.data_type()) {
        return Err(ExtError::invalid_storage(
            BASENAME,
            format!("field 'data' must be a list of numeric values, not {}", data.data_type()),
        ));
    }
    let shape_ok = shape.name() == "shape"
        && matches!(shape.data_type(), DataType::List(item) if item.data_type() == &DataType::Int64);
    if !shape_ok {
        return Err(ExtError::invalid_storage(
            BASENAME,
            format!("second field should be 'shape' with list<int64> values, not {shape}"),
        ));
    }
    Ok(())
}

/// Ragged encoding of tensors as `struct<data: list<numeric>, shape: list<int64>>`.
///
/// `data` holds each tensor's values flattened row-major; `shape` holds its dimension sizes,
/// empty for null slots.
#[derive(Debug, Clone)]
pub struct TensorType {
    module_name: String,
    item_class: Option<ItemClass>,
    storage_type: DataType,
}

impl TensorType {
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
}

impl Default for TensorType {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionType for TensorType {
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
        matches!(item_class, ItemClass::Tensor)
    }

    fn specialize(
        &self,
        storage_type: &DataType,
        item_class: &ItemClass,
        _registry: &Registry,
    ) -> Result<ExtensionTypeRef> {
        check_storage(storage_type)?;
        if !self.supports(item_class) {
            return Err(ExtError::unsupported("tensor class", item_class.name()));
        }
        Ok(Arc::new(Self {
            module_name: self.module_name.clone(),
            item_class: Some(ItemClass::Tensor),
            storage_type: storage_type.clone(),
        }))
    }

    fn metadata(&self) -> ExtensionMetadata {
        ExtensionMetadata::base(self)
    }

    fn reconstruct_item_class(
        &self,
        storage_type: &DataType,
        _metadata: &ExtensionMetadata,
        _registry: &Registry,
    ) -> Result<ItemClass> {
        check_storage(storage_type)?;
        Ok(ItemClass::Tensor)
    }

    fn build_array(
        self: Arc<Self>,
        items: &mut dyn Iterator<Item = Option<Item>>,
        size: Option<usize>,
        registry: &Registry,
    ) -> Result<ExtensionArray> {
        let items = collect_sized(items, size);
        let mut tensors = Vec::with_capacity(items.len());
        for item in &items {
            match item {
                None => tensors.push(None),
                Some(Item::Tensor(tensor)) => tensors.push(Some(tensor)),
                Some(other) => {
                    return Err(ExtError::unsupported("tensor item", other.class().name()));
                }
            }
        }
        let Some(value_type) = tensors.iter().flatten().map(|t| t.data_type().clone()).next()
        else {
            let root = root_of(self, |ext| Self::with_module(ext.module_name.clone()));
            return null_extension_array(root, items.len());
        };

        let value_data = tensors
            .iter()
            .flatten()
            .map(|t| {
                if t.data_type() == &value_type {
                    Ok(t.values().to_data())
                } else {
                    Err(ExtError::unsupported(
                        format!("tensor of {value_type}"),
                        format!("tensor of {}", t.data_type()),
                    ))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let total: usize = value_data.iter().map(|d| d.len()).sum();
        let mut values = MutableArrayData::new(value_data.iter().collect(), false, total);
        for (idx, data) in value_data.iter().enumerate() {
            values.extend(idx, 0, data.len());
        }
        let values = make_array(values.freeze());

        let data_offsets =
            OffsetBuffer::from_lengths(tensors.iter().map(|t| t.map_or(0, |t| t.len())));
        let validity = NullBuffer::from(tensors.iter().map(Option::is_some).collect::<Vec<_>>());
        let validity = (validity.null_count() > 0).then_some(validity);
        let data = ListArray::try_new(
            Arc::new(Field::new_list_field(value_type, true)),
            data_offsets,
            values,
            validity.clone(),
        )?;

        let dims: Vec<i64> = tensors
            .iter()
            .flatten()
            .flat_map(|t| t.shape().iter().map(|d| *d as i64))
            .collect();
        let shape_offsets =
            OffsetBuffer::from_lengths(tensors.iter().map(|t| t.map_or(0, |t| t.ndim())));
        let shape = ListArray::try_new(
            Arc::new(Field::new_list_field(DataType::Int64, true)),
            shape_offsets,
            Arc::new(Int64Array::from(dims)),
            None,
        )?;

        assemble(self.as_ref(), data, shape, validity, registry)
    }

    fn item_at(&self, storage: &ArrayRef, index: usize) -> Result<Option<Item>> {
        let Some(columns) = storage.as_struct_opt() else {
            return Ok(None);
        };
        let (Some(data), Some(shape)) = (
            columns.column(0).as_list_opt::<i32>(),
            columns.column(1).as_list_opt::<i32>(),
        ) else {
            return Ok(None);
        };
        if data.is_null(index) {
            return Ok(None);
        }
        let offsets = data.value_offsets();
        let start = offsets[index] as usize;
        let end = offsets[index + 1] as usize;
        let values = data.values().slice(start, end - start);
        let dims = shape
            .value(index)
            .as_primitive::<Int64Type>()
            .values()
            .iter()
            .map(|d| {
                usize::try_from(*d).map_err(|_| {
                    ExtError::invalid_storage(BASENAME, format!("negative dimension {d}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Tensor::try_new(values, dims).map(|t| Some(Item::Tensor(t)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Struct storage from `data`/`shape` columns, wrapped with the matching specialization.
fn assemble(
    root: &dyn ExtensionType,
    data: ListArray,
    shape: ListArray,
    mask: Option<NullBuffer>,
    registry: &Registry,
) -> Result<ExtensionArray> {
    let fields = Fields::from(vec![
        Field::new("data", data.data_type().clone(), true),
        Field::new("shape", shape.data_type().clone(), true),
    ]);
    let storage = StructArray::try_new(fields, vec![Arc::new(data), Arc::new(shape)], mask)?;
    let ext = resolve_specialized(root, &ItemClass::Tensor, storage.data_type(), registry)?;
    ExtensionArray::try_new(ext, Arc::new(storage))
}

/// Array of tensors, each slot with its own shape.
#[derive(Debug, Clone)]
pub struct TensorArray(ExtensionArray);

impl TensorArray {
    /// Wrap an extension array of [`TensorType`].
    ///
    /// # Errors
    /// Fails with [`ExtError::UnsupportedItem`] for any other extension type.
    pub fn try_new(array: ExtensionArray) -> Result<Self> {
        if array.ext_type().as_any().downcast_ref::<TensorType>().is_none() {
            return Err(ExtError::unsupported(
                "tensor extension array",
                array.ext_type().extension_name(),
            ));
        }
        Ok(Self(array))
    }

    fn root(registry: &Registry) -> ExtensionTypeRef {
        registry
            .root_by_name(&extension_name(DEFAULT_MODULE, BASENAME))
            .unwrap_or_else(|| Arc::new(TensorType::new()))
    }

    /// Encode tensor items.
    pub fn from_items<I>(items: I, size: Option<usize>, registry: &Registry) -> Result<Self>
    where
        I: IntoIterator<Item = Option<Item>>,
    {
        let mut items = items.into_iter();
        Self::root(registry)
            .build_array(&mut items, size, registry)
            .map(Self)
    }

    /// Assemble from prebuilt `data` and `shape` list columns and an optional validity mask.
    ///
    /// # Errors
    /// Fails when the columns do not form a valid tensor storage.
    pub fn from_data_shape(
        data: ListArray,
        shape: ListArray,
        mask: Option<NullBuffer>,
        registry: &Registry,
    ) -> Result<Self> {
        assemble(Self::root(registry).as_ref(), data, shape, mask, registry).map(Self)
    }

    /// Split a tensor along its leading axis into equally shaped items.
    ///
    /// # Errors
    /// Fails with [`ExtError::InsufficientRank`] for fewer than two dimensions.
    pub fn from_tensor(tensor: &Tensor, registry: &Registry) -> Result<Self> {
        let Some((&rows, item_shape)) = tensor.shape().split_first().filter(|_| tensor.ndim() >= 2)
        else {
            return Err(ExtError::InsufficientRank {
                shape: tensor.shape().to_vec(),
            });
        };
        let item_len: usize = item_shape.iter().product();
        let data = ListArray::try_new(
            Arc::new(Field::new_list_field(tensor.data_type().clone(), true)),
            OffsetBuffer::from_lengths(iter::repeat_n(item_len, rows)),
            Arc::clone(tensor.values()),
            None,
        )?;
        let dims: Vec<i64> = iter::repeat_n(item_shape, rows)
            .flatten()
            .map(|d| *d as i64)
            .collect();
        let shape = ListArray::try_new(
            Arc::new(Field::new_list_field(DataType::Int64, true)),
            OffsetBuffer::from_lengths(iter::repeat_n(item_shape.len(), rows)),
            Arc::new(Int64Array::from(dims)),
            None,
        )?;
        Self::from_data_shape(data, shape, None, registry)
    }

    /// Underlying extension array.
    pub fn into_inner(self) -> ExtensionArray {
        self.0
    }
}

impl Deref for TensorArray {
    type Target = ExtensionArray;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<TensorArray> for AnyArray {
    fn from(array: TensorArray) -> Self {
        Self::Extension(array.0)
    }
}
