//! Bridge from Rust value types to items and item classes.
//!
//! [`ItemType`] gives a Rust type a fixed [`ItemClass`] and a lossless conversion to and from
//! [`Item`], so columns can be built from and decoded into plain Rust values.
//!
//! - Primitives: `bool`, `i{8,16,32,64}`, `u{8,16,32,64}`, `f16`, `f{32,64}`.
//! - Utf8/Binary: `String` → `Utf8`, `Vec<u8>` → `Binary`.
//! - [`Timestamp<U>`] and [`Duration<U>`] with unit markers ([`Second`], [`Millisecond`],
//!   [`Microsecond`], [`Nanosecond`]).
//! - [`Tensor`](crate::item::Tensor) → the tensor extension.
//! - `Option<T>` for nullable values.
//! - Structs and fieldless enums through `#[derive(Record)]` and `#[derive(IntEnum)]`.

mod binary;
mod option;
mod primitives;
mod strings;
mod temporal;
mod tensor;

pub use temporal::{Duration, Microsecond, Millisecond, Nanosecond, Second, TimeUnitSpec, Timestamp};

use crate::{
    array::AnyArray,
    error::{ExtError, Result},
    factory,
    item::{Item, ItemClass},
    registry::Registry,
};

/// Binding from a Rust type to an item class.
pub trait ItemType: Sized {
    /// Whether the binding admits nulls; `true` only for `Option<T>`.
    const NULLABLE: bool = false;

    /// Class of every item this type converts into.
    fn item_class() -> ItemClass;

    /// Convert into an item; `None` encodes a null slot.
    fn into_item(self) -> Option<Item>;

    /// Convert back from a decoded slot.
    ///
    /// # Errors
    /// Fails with [`ExtError::UnexpectedNull`] on a null slot for a non-nullable binding and
    /// with [`ExtError::UnsupportedItem`] on an item of another class.
    fn from_item(item: Option<Item>) -> Result<Self>;
}

/// Error for a slot that does not decode into `T`.
pub fn mismatch<T: ItemType>(item: Option<Item>) -> ExtError {
    match item {
        None => ExtError::unexpected_null(T::item_class().name()),
        Some(item) => ExtError::unsupported(T::item_class().name(), item.class().name()),
    }
}

/// Items of a sequence of typed values.
pub fn to_items<T, I>(values: I) -> impl Iterator<Item = Option<Item>>
where
    T: ItemType,
    I: IntoIterator<Item = T>,
{
    values.into_iter().map(ItemType::into_item)
}

/// Build a column from typed values.
///
/// Extension classes not yet known to `registry`, including those of nested record fields,
/// are registered first.
pub fn typed_array<T, I>(values: I, size: Option<usize>, registry: &Registry) -> Result<AnyArray>
where
    T: ItemType,
    I: IntoIterator<Item = T>,
{
    ensure_registered(&T::item_class(), registry)?;
    factory::array(to_items(values), size, registry)
}

fn ensure_registered(class: &ItemClass, registry: &Registry) -> Result<()> {
    if !class.is_extension() || registry.contains(class) {
        return Ok(());
    }
    if let ItemClass::Record(record) = class {
        for field in record.fields() {
            ensure_registered(field.class(), registry)?;
        }
    }
    registry.register_item_class(class).map(|_| ())
}
