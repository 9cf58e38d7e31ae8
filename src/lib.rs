#![deny(missing_docs)]
//! typed-arrow-ext: typed extension arrays over Arrow.
//!
//! A [`Registry`] matches item classes (records, integer enums, tensors) to extension types
//! that know how to encode them into Arrow storage, carry them through field metadata, and
//! decode them back into [`Item`]s.

pub mod array;
pub mod base_types;
pub mod bridge;
pub mod error;
pub mod extension;
pub mod extensions;
pub mod factory;
pub mod item;
pub mod primitive;
pub mod registry;
pub mod utils;

/// Prelude exporting the most common traits and types.
pub mod prelude {
    pub use crate::{
        array::{AnyArray, ExtensionArray, IndexKey, Indexed},
        bridge::{ItemType, typed_array},
        error::{ErrorKind, ExtError, Result},
        extension::{ExtensionType, ExtensionTypeRef},
        extensions::{EnumArray, RecordArray, TensorArray},
        factory::{array, asarray},
        item::{
            BaseClass, EnumClass, EnumValue, Item, ItemClass, RecordClass, RecordField,
            RecordValue, Tensor, TimeValue,
        },
        registry::Registry,
    };
}

// Re-export Arrow crates so derives can reference a stable path
// and downstream users don't need to depend on Arrow directly.
pub use arrow_array;
pub use arrow_buffer;
pub use arrow_data;
pub use arrow_schema;
#[cfg(feature = "derive")]
pub use typed_arrow_ext_derive::{IntEnum, Record};

// Public re-exports for convenience
pub use crate::{
    array::{AnyArray, ExtensionArray},
    bridge::{Duration, Microsecond, Millisecond, Nanosecond, Second, Timestamp},
    error::{ExtError, Result},
    item::{Item, ItemClass},
    registry::Registry,
};
