//! Binary binding.

use super::{ItemType, mismatch};
use crate::{
    error::Result,
    item::{BaseClass, Item, ItemClass},
};

impl ItemType for Vec<u8> {
    fn item_class() -> ItemClass {
        ItemClass::Base(BaseClass::Binary)
    }
    fn into_item(self) -> Option<Item> {
        Some(Item::Binary(self))
    }
    fn from_item(item: Option<Item>) -> Result<Self> {
        match item {
            Some(Item::Binary(value)) => Ok(value),
            other => Err(mismatch::<Self>(other)),
        }
    }
}
