//! Nullable bindings: `Option<T>` maps `None` to a null slot of `T`'s class.

use super::ItemType;
use crate::{error::Result, item::{Item, ItemClass}};

impl<T> ItemType for Option<T>
where
    T: ItemType,
{
    const NULLABLE: bool = true;

    fn item_class() -> ItemClass {
        T::item_class()
    }

    fn into_item(self) -> Option<Item> {
        self.and_then(T::into_item)
    }

    fn from_item(item: Option<Item>) -> Result<Self> {
        // Null is valid data here.
        match item {
            None => Ok(None),
            some => T::from_item(some).map(Some),
        }
    }
}
