//! Utf8 binding.

use super::{ItemType, mismatch};
use crate::{
    error::Result,
    item::{BaseClass, Item, ItemClass},
};

impl ItemType for String {
    fn item_class() -> ItemClass {
        ItemClass::Base(BaseClass::Utf8)
    }
    fn into_item(self) -> Option<Item> {
        Some(Item::Utf8(self))
    }
    fn from_item(item: Option<Item>) -> Result<Self> {
        match item {
            Some(Item::Utf8(value)) => Ok(value),
            other => Err(mismatch::<Self>(other)),
        }
    }
}
