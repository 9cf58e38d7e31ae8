//! Tensor binding.

use super::{ItemType, mismatch};
use crate::{
    error::Result,
    item::{Item, ItemClass, Tensor},
};

impl ItemType for Tensor {
    fn item_class() -> ItemClass {
        ItemClass::Tensor
    }
    fn into_item(self) -> Option<Item> {
        Some(Item::Tensor(self))
    }
    fn from_item(item: Option<Item>) -> Result<Self> {
        match item {
            Some(Item::Tensor(tensor)) => Ok(tensor),
            other => Err(mismatch::<Self>(other)),
        }
    }
}
