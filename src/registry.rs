//! Registry mapping item classes to extension types.
//!
//! Roots are kept in descending priority order (ties keep insertion order). Each registered
//! item class owns a cache of specializations keyed by storage type; the `Null` entry always
//! points at the root the class was matched to.

use std::{
    cmp::Reverse,
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock},
};

use arrow_schema::DataType;
use parking_lot::RwLock;

use crate::{
    bridge::ItemType,
    error::{ExtError, Result},
    extension::{
        ExtensionTypeRef, register_engine_extension_type, unregister_engine_extension_type,
    },
    extensions::{IntEnumType, RecordType, TensorType},
    item::ItemClass,
};

type Specializations = HashMap<DataType, ExtensionTypeRef>;

/// Item class to extension type dispatch table.
///
/// A registry is `Send + Sync`. Lookups never hold a lock while an extension type is being
/// specialized, and concurrent misses for the same key settle on the first cached instance.
pub struct Registry {
    sync_with_engine: bool,
    roots: RwLock<Vec<ExtensionTypeRef>>,
    classes: RwLock<HashMap<ItemClass, Specializations>>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry {
        sync_with_engine: true,
        ..Registry::new()
    };
    registry.install_defaults();
    registry
});

impl Registry {
    /// Empty registry, detached from the engine table.
    pub fn new() -> Self {
        Self {
            sync_with_engine: false,
            roots: RwLock::new(Vec::new()),
            classes: RwLock::new(HashMap::new()),
        }
    }

    /// Private registry holding the record, enum and tensor roots, with the tensor class
    /// registered.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.install_defaults();
        registry
    }

    /// Process-wide default registry, created on first use with the defaults installed.
    ///
    /// Its roots are mirrored into the engine table so fields written by one registry can be
    /// decoded by another. It lives for the whole process; use a private registry when state
    /// must be torn down.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    fn install_defaults(&self) {
        let defaults: [ExtensionTypeRef; 3] = [
            Arc::new(RecordType::new()),
            Arc::new(IntEnumType::new()),
            Arc::new(TensorType::new()),
        ];
        for root in defaults {
            if let Err(err) = self.register_root(root) {
                tracing::warn!(error = %err, "default extension type not installed");
            }
        }
        if let Err(err) = self.register_item_class(&ItemClass::Tensor) {
            tracing::warn!(error = %err, "tensor item class not registered");
        }
    }

    /// Register a root extension type.
    ///
    /// # Errors
    /// Fails with [`ExtError::NotRoot`] when the type has an item class bound, and with
    /// [`ExtError::DuplicateExtension`] when its identity name is already registered.
    pub fn register_root(&self, root: ExtensionTypeRef) -> Result<()> {
        if let Some(class) = root.item_class() {
            return Err(ExtError::NotRoot {
                name: root.extension_name(),
                item_class: class.name(),
            });
        }
        let name = root.extension_name();
        let mut roots = self.roots.write();
        if roots.iter().any(|r| r.extension_name() == name) {
            return Err(ExtError::DuplicateExtension { name });
        }
        if self.sync_with_engine {
            register_engine_extension_type(Arc::clone(&root))?;
        }
        roots.push(root);
        roots.sort_by_key(|r| Reverse(r.priority()));
        tracing::debug!(extension = %name, "registered root extension type");
        Ok(())
    }

    /// Remove a root by identity name. Cached item classes keep resolving to it.
    pub fn unregister_root(&self, name: &str) -> Option<ExtensionTypeRef> {
        let mut roots = self.roots.write();
        let idx = roots.iter().position(|r| r.extension_name() == name)?;
        if self.sync_with_engine {
            unregister_engine_extension_type(name);
        }
        Some(roots.remove(idx))
    }

    /// Roots in matching order.
    pub fn root_extension_types(&self) -> Vec<ExtensionTypeRef> {
        self.roots.read().clone()
    }

    /// Root registered under an identity name.
    pub fn root_by_name(&self, name: &str) -> Option<ExtensionTypeRef> {
        self.roots
            .read()
            .iter()
            .find(|r| r.extension_name() == name)
            .cloned()
    }

    /// Match an item class to a root and seed its cache.
    ///
    /// Registering a class twice is not an error: a warning is logged and the root found the
    /// first time is returned.
    ///
    /// # Errors
    /// Fails with [`ExtError::NoMatchingExtension`] when no root supports the class.
    pub fn register_item_class(&self, item_class: &ItemClass) -> Result<ExtensionTypeRef> {
        if let Some(root) = self.cached(item_class, &DataType::Null) {
            tracing::warn!(item_class = %item_class, "item class already registered");
            return Ok(root);
        }
        let root = self
            .roots
            .read()
            .iter()
            .find(|r| r.supports(item_class))
            .cloned()
            .ok_or_else(|| ExtError::NoMatchingExtension {
                item_class: item_class.name(),
            })?;
        let mut classes = self.classes.write();
        let cache = classes
            .entry(item_class.clone())
            .or_insert_with(|| HashMap::from([(DataType::Null, Arc::clone(&root))]));
        Ok(cache.get(&DataType::Null).cloned().unwrap_or(root))
    }

    /// Register the item class of a typed binding.
    pub fn register<T: ItemType>(&self) -> Result<ExtensionTypeRef> {
        self.register_item_class(&T::item_class())
    }

    /// Drop an item class and its specializations.
    ///
    /// Unregistering an unknown class is a no-op returning `None`; otherwise the root the class
    /// was matched to is returned.
    pub fn unregister_item_class(&self, item_class: &ItemClass) -> Option<ExtensionTypeRef> {
        let mut cache = self.classes.write().remove(item_class)?;
        cache.remove(&DataType::Null)
    }

    /// Whether the class has been registered.
    pub fn contains(&self, item_class: &ItemClass) -> bool {
        self.classes.read().contains_key(item_class)
    }

    /// Extension type for an item class.
    ///
    /// Without a storage type, the root is returned. Otherwise the cached specialization for
    /// that exact storage type is returned, creating and caching it on first use. Repeated
    /// calls with the same arguments return the same instance.
    ///
    /// # Errors
    /// Fails with [`ExtError::UnregisteredClass`] when the class was never registered, and
    /// with the root's specialization errors for an unacceptable storage type.
    pub fn find(
        &self,
        item_class: &ItemClass,
        storage_type: Option<&DataType>,
    ) -> Result<ExtensionTypeRef> {
        let storage_type = storage_type.unwrap_or(&DataType::Null);
        if let Some(found) = self.cached(item_class, storage_type) {
            return Ok(found);
        }
        let root = self.cached(item_class, &DataType::Null).ok_or_else(|| {
            ExtError::UnregisteredClass {
                item_class: item_class.name(),
            }
        })?;
        let specialized = root.specialize(storage_type, item_class, self)?;
        tracing::debug!(
            extension = %specialized.extension_name(),
            item_class = %item_class,
            storage = %storage_type,
            "created specialized extension type"
        );
        let mut classes = self.classes.write();
        let cache = classes
            .get_mut(item_class)
            .ok_or_else(|| ExtError::UnregisteredClass {
                item_class: item_class.name(),
            })?;
        Ok(Arc::clone(
            cache.entry(storage_type.clone()).or_insert(specialized),
        ))
    }

    fn cached(&self, item_class: &ItemClass, storage_type: &DataType) -> Option<ExtensionTypeRef> {
        self.classes
            .read()
            .get(item_class)
            .and_then(|cache| cache.get(storage_type))
            .cloned()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy of both maps. The copy is detached from the engine table.
impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            sync_with_engine: false,
            roots: RwLock::new(self.roots.read().clone()),
            classes: RwLock::new(self.classes.read().clone()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots: Vec<String> = self
            .roots
            .read()
            .iter()
            .map(|r| r.extension_name())
            .collect();
        f.debug_struct("Registry")
            .field("sync_with_engine", &self.sync_with_engine)
            .field("roots", &roots)
            .field("item_classes", &self.classes.read().len())
            .finish()
    }
}
