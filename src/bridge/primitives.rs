//! Primitive bindings (integers, floats, bool, f16).

use half::f16;

use super::{ItemType, mismatch};
use crate::{
    error::Result,
    item::{BaseClass, Item, ItemClass},
};

macro_rules! impl_primitive_item {
    ($rust:ty, $variant:ident) => {
        impl ItemType for $rust {
            fn item_class() -> ItemClass {
                ItemClass::Base(BaseClass::$variant)
            }
            fn into_item(self) -> Option<Item> {
                Some(Item::$variant(self))
            }
            fn from_item(item: Option<Item>) -> Result<Self> {
                match item {
                    Some(Item::$variant(value)) => Ok(value),
                    other => Err(mismatch::<Self>(other)),
                }
            }
        }
    };
}

impl_primitive_item!(bool, Boolean);
impl_primitive_item!(i8, Int8);
impl_primitive_item!(i16, Int16);
impl_primitive_item!(i32, Int32);
impl_primitive_item!(i64, Int64);
impl_primitive_item!(u8, UInt8);
impl_primitive_item!(u16, UInt16);
impl_primitive_item!(u32, UInt32);
impl_primitive_item!(u64, UInt64);
impl_primitive_item!(f16, Float16);
impl_primitive_item!(f32, Float32);
impl_primitive_item!(f64, Float64);
