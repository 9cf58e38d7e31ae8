//! Temporal bindings: Timestamp and Duration with compile-time unit markers.

use std::{fmt, marker::PhantomData};

use arrow_schema::TimeUnit;

use super::{ItemType, mismatch};
use crate::{
    error::Result,
    item::{BaseClass, Item, ItemClass, TimeValue},
};

/// Marker describing a time unit.
pub trait TimeUnitSpec: 'static {
    /// The `arrow_schema::TimeUnit` of this marker.
    const UNIT: TimeUnit;
}

/// Seconds.
pub enum Second {}
impl TimeUnitSpec for Second {
    const UNIT: TimeUnit = TimeUnit::Second;
}

/// Milliseconds.
pub enum Millisecond {}
impl TimeUnitSpec for Millisecond {
    const UNIT: TimeUnit = TimeUnit::Millisecond;
}

/// Microseconds.
pub enum Microsecond {}
impl TimeUnitSpec for Microsecond {
    const UNIT: TimeUnit = TimeUnit::Microsecond;
}

/// Nanoseconds.
pub enum Nanosecond {}
impl TimeUnitSpec for Nanosecond {
    const UNIT: TimeUnit = TimeUnit::Nanosecond;
}

macro_rules! time_binding {
    ($(#[$doc:meta])* $name:ident, $variant:ident) => {
        $(#[$doc])*
        pub struct $name<U: TimeUnitSpec>(pub i64, pub PhantomData<U>);

        impl<U: TimeUnitSpec> $name<U> {
            /// Wrap a raw tick count.
            pub fn new(value: i64) -> Self {
                Self(value, PhantomData)
            }

            /// Raw tick count.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        // Manual impls: the unit markers are uninhabited and implement nothing.
        impl<U: TimeUnitSpec> Clone for $name<U> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<U: TimeUnitSpec> Copy for $name<U> {}

        impl<U: TimeUnitSpec> PartialEq for $name<U> {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl<U: TimeUnitSpec> Eq for $name<U> {}

        impl<U: TimeUnitSpec> fmt::Debug for $name<U> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), TimeValue::new(self.0, U::UNIT))
            }
        }

        impl<U: TimeUnitSpec> ItemType for $name<U> {
            fn item_class() -> ItemClass {
                ItemClass::Base(BaseClass::$variant(U::UNIT))
            }
            fn into_item(self) -> Option<Item> {
                Some(Item::$variant(TimeValue::new(self.0, U::UNIT)))
            }
            fn from_item(item: Option<Item>) -> Result<Self> {
                match item {
                    Some(Item::$variant(time)) if time.unit == U::UNIT => Ok(Self::new(time.value)),
                    other => Err(mismatch::<Self>(other)),
                }
            }
        }
    };
}

time_binding!(
    /// Timestamp value without timezone.
    Timestamp,
    Timestamp
);
time_binding!(
    /// Elapsed time.
    Duration,
    Duration
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_must_match() {
        let item = Timestamp::<Millisecond>::new(1_700_000_000_000).into_item();
        assert_eq!(item, Some(Item::Timestamp(TimeValue::millis(1_700_000_000_000))));
        assert!(Timestamp::<Second>::from_item(item.clone()).is_err());
        assert_eq!(
            Timestamp::<Millisecond>::from_item(item).unwrap().value(),
            1_700_000_000_000
        );
    }

    #[test]
    fn duration_class_carries_unit() {
        assert_eq!(
            Duration::<Nanosecond>::item_class(),
            ItemClass::Base(BaseClass::Duration(TimeUnit::Nanosecond))
        );
    }
}
