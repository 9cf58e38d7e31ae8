//! Extension type contract, identity names and the JSON metadata format.
//!
//! An extension type is carried by an Arrow [`Field`] through two metadata entries: the
//! identity name under [`EXTENSION_TYPE_NAME_KEY`] and the JSON encoded
//! [`ExtensionMetadata`] under [`EXTENSION_TYPE_METADATA_KEY`].

use std::{any::Any, collections::HashMap, fmt, sync::Arc, sync::LazyLock};

use arrow_array::ArrayRef;
use arrow_schema::{
    DataType, Field,
    extension::{EXTENSION_TYPE_METADATA_KEY, EXTENSION_TYPE_NAME_KEY},
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    array::ExtensionArray,
    error::{ExtError, Result},
    item::{Item, ItemClass},
    registry::Registry,
};

/// Leading segment of every identity name.
pub const NAMESPACE: &str = "typed_arrow_ext";

/// Module used when a root type is created without one.
pub const DEFAULT_MODULE: &str = "core";

/// Shared handle to an extension type.
pub type ExtensionTypeRef = Arc<dyn ExtensionType>;

/// Identity name `typed_arrow_ext.<module>.<basename>`.
pub fn extension_name(module_name: &str, basename: &str) -> String {
    format!("{NAMESPACE}.{module_name}.{basename}")
}

/// Per-field entry of record metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMetadata {
    /// Field name.
    pub name: String,
    /// Whether the declared field accepts nulls.
    pub nullable: bool,
}

/// Decoded form of the JSON stored under `ARROW:extension:metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionMetadata {
    /// Basename of the encoding scheme.
    pub extension_basename: String,
    /// Module the root type was registered under.
    pub module_name: String,
    /// Name of the bound item class, `null` for a root type.
    #[serde(rename = "item_pyclass_name")]
    pub item_class_name: Option<String>,
    /// Record fields, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldMetadata>>,
    /// Enum members, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_enum_fields: Option<IndexMap<String, i64>>,
}

impl ExtensionMetadata {
    /// Common entries of any extension type.
    pub fn base<T: ExtensionType + ?Sized>(ext: &T) -> Self {
        Self {
            extension_basename: ext.basename().to_string(),
            module_name: ext.module_name().to_string(),
            item_class_name: ext.item_class().map(ItemClass::name),
            fields: None,
            int_enum_fields: None,
        }
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON, rejecting unknown keys and missing required ones.
    pub fn from_json(serialized: &str) -> Result<Self> {
        Ok(serde_json::from_str(serialized)?)
    }
}

/// One columnar encoding scheme, either as a root or specialized for an item class.
///
/// A root has no item class and a `Null` storage type. Specialized instances are produced by
/// [`ExtensionType::specialize`] and cached by the [`Registry`].
pub trait ExtensionType: fmt::Debug + Send + Sync + 'static {
    /// Stable scheme name, e.g. `record`.
    fn basename(&self) -> &'static str;

    /// Registry ordering; higher is matched first.
    fn priority(&self) -> i32 {
        0
    }

    /// Namespace segment of the identity name.
    fn module_name(&self) -> &str;

    /// Bound item class, `None` for a root.
    fn item_class(&self) -> Option<&ItemClass>;

    /// Storage type of arrays of this type.
    fn storage_type(&self) -> &DataType;

    /// Whether this scheme can encode items of `item_class`.
    fn supports(&self, item_class: &ItemClass) -> bool;

    /// New instance of the same scheme and module bound to an item class and storage type.
    ///
    /// # Errors
    /// Fails when the storage type or the item class is not acceptable for the scheme.
    fn specialize(
        &self,
        storage_type: &DataType,
        item_class: &ItemClass,
        registry: &Registry,
    ) -> Result<ExtensionTypeRef>;

    /// Metadata describing this instance.
    fn metadata(&self) -> ExtensionMetadata {
        ExtensionMetadata::base(self)
    }

    /// Rebuild the item class from a storage type and decoded metadata.
    fn reconstruct_item_class(
        &self,
        storage_type: &DataType,
        metadata: &ExtensionMetadata,
        registry: &Registry,
    ) -> Result<ItemClass>;

    /// Encode items into an array of this scheme, truncating or null-padding to `size`.
    fn build_array(
        self: Arc<Self>,
        items: &mut dyn Iterator<Item = Option<Item>>,
        size: Option<usize>,
        registry: &Registry,
    ) -> Result<ExtensionArray>;

    /// Decode the non-null slot `index` of `storage`.
    fn item_at(&self, storage: &ArrayRef, index: usize) -> Result<Option<Item>>;

    /// Downcasting hook.
    fn as_any(&self) -> &dyn Any;
}

impl dyn ExtensionType {
    /// Identity name shared by a root and all its specializations.
    pub fn extension_name(&self) -> String {
        extension_name(self.module_name(), self.basename())
    }

    /// Identity name extended with the bound item class name, if any.
    pub fn qualified_name(&self) -> String {
        match self.item_class() {
            Some(class) => format!("{}.{}", self.extension_name(), class.name()),
            None => self.extension_name(),
        }
    }

    /// Whether no item class is bound.
    pub fn is_root(&self) -> bool {
        self.item_class().is_none()
    }

    /// JSON metadata of this instance.
    pub fn serialize_metadata(&self) -> Result<String> {
        self.metadata().to_json()
    }

    /// Arrow field of this type, carrying the extension name and metadata.
    pub fn to_field(&self, name: impl Into<String>, nullable: bool) -> Result<Field> {
        let metadata = HashMap::from([
            (EXTENSION_TYPE_NAME_KEY.to_string(), self.extension_name()),
            (
                EXTENSION_TYPE_METADATA_KEY.to_string(),
                self.serialize_metadata()?,
            ),
        ]);
        Ok(Field::new(name, self.storage_type().clone(), nullable).with_metadata(metadata))
    }
}

/// Rebuild an instance of `root`'s scheme from a storage type and serialized metadata.
///
/// Registered item classes resolve through the registry so identical types are shared;
/// otherwise a fresh specialization is built without touching the registry.
///
/// # Errors
/// Fails on malformed JSON, on metadata naming another scheme or module, and on storage or item
/// class errors raised by the scheme.
pub fn deserialize_extension_type(
    root: &ExtensionTypeRef,
    storage_type: &DataType,
    serialized: &str,
    registry: &Registry,
) -> Result<ExtensionTypeRef> {
    let metadata = ExtensionMetadata::from_json(serialized)?;
    if metadata.extension_basename != root.basename() {
        return Err(ExtError::metadata(format!(
            "basename '{}' does not match extension type '{}'",
            metadata.extension_basename,
            root.extension_name()
        )));
    }
    if metadata.module_name != root.module_name() {
        return Err(ExtError::metadata(format!(
            "module '{}' does not match extension type '{}'",
            metadata.module_name,
            root.extension_name()
        )));
    }
    if metadata.item_class_name.is_none() {
        if storage_type != &DataType::Null {
            return Err(ExtError::metadata(format!(
                "root '{}' metadata on non-null storage {storage_type}",
                root.extension_name()
            )));
        }
        return Ok(Arc::clone(root));
    }
    let item_class = root.reconstruct_item_class(storage_type, &metadata, registry)?;
    resolve_specialized(root.as_ref(), &item_class, storage_type, registry)
}

/// Specialization of `root` for an item class and storage type.
///
/// Goes through the registry cache when the class is registered there under `root`'s identity;
/// otherwise `root` is specialized directly and the result is not cached.
pub(crate) fn resolve_specialized(
    root: &dyn ExtensionType,
    item_class: &ItemClass,
    storage_type: &DataType,
    registry: &Registry,
) -> Result<ExtensionTypeRef> {
    match registry.find(item_class, Some(storage_type)) {
        Ok(found) if found.extension_name() == root.extension_name() => Ok(found),
        // Unregistered, or registered under another root.
        Ok(_) | Err(ExtError::UnregisteredClass { .. }) => {
            root.specialize(storage_type, item_class, registry)
        }
        Err(err) => Err(err),
    }
}

/// Extension type carried by a field, if it has one.
///
/// The name is resolved against `registry` first, then against the process-wide engine
/// table.
///
/// # Errors
/// Fails with [`ExtError::UnknownExtension`] for a name nobody registered, and with the
/// errors of [`deserialize_extension_type`].
pub fn decode_field(field: &Field, registry: &Registry) -> Result<Option<ExtensionTypeRef>> {
    let Some(name) = field.metadata().get(EXTENSION_TYPE_NAME_KEY) else {
        return Ok(None);
    };
    let root = registry
        .root_by_name(name)
        .or_else(|| engine_extension_type(name))
        .ok_or_else(|| ExtError::UnknownExtension { name: name.clone() })?;
    let serialized = field
        .metadata()
        .get(EXTENSION_TYPE_METADATA_KEY)
        .ok_or_else(|| ExtError::metadata(format!("field '{}' has no extension metadata", field.name())))?;
    deserialize_extension_type(&root, field.data_type(), serialized, registry).map(Some)
}

static ENGINE_TYPES: LazyLock<RwLock<HashMap<String, ExtensionTypeRef>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Add a root to the process-wide engine table, keyed by identity name.
///
/// # Errors
/// Fails with [`ExtError::DuplicateExtension`] when the name is taken.
pub fn register_engine_extension_type(root: ExtensionTypeRef) -> Result<()> {
    let name = root.extension_name();
    let mut engine = ENGINE_TYPES.write();
    if engine.contains_key(&name) {
        return Err(ExtError::DuplicateExtension { name });
    }
    engine.insert(name, root);
    Ok(())
}

/// Remove a root from the engine table.
pub fn unregister_engine_extension_type(name: &str) -> Option<ExtensionTypeRef> {
    ENGINE_TYPES.write().remove(name)
}

/// Root registered in the engine table under `name`.
pub fn engine_extension_type(name: &str) -> Option<ExtensionTypeRef> {
    ENGINE_TYPES.read().get(name).cloned()
}
