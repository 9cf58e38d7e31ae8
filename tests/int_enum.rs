use std::sync::Arc;

use typed_arrow_ext::{
    arrow_array::{Array, ArrayRef, Int64Array},
    arrow_schema::DataType,
    prelude::*,
};

fn weekday() -> Arc<EnumClass> {
    Arc::new(EnumClass::new("Weekday", [("Mon", 1), ("Tue", 2), ("Wed", 3)]).unwrap())
}

fn day(name: &str) -> Option<Item> {
    Some(Item::Enum(EnumValue::from_name(&weekday(), name).unwrap()))
}

#[test]
fn members_round_trip() {
    let registry = Registry::with_defaults();
    let items = vec![day("Tue"), None, day("Mon"), day("Wed")];
    let array = EnumArray::from_items(items.clone(), None, &registry).unwrap();

    assert_eq!(array.len(), 4);
    assert_eq!(array.storage().data_type(), &DataType::Int64);
    assert_eq!(array.to_list().unwrap(), items);
    assert_eq!(array.enum_class(), Some(&weekday()));

    let values = array.values().unwrap();
    assert_eq!(values.value(0), 2);
    assert!(values.is_null(1));
    assert_eq!(values.value(3), 3);
}

#[test]
fn member_lookup() {
    let class = weekday();
    let tue = EnumValue::from_value(&class, 2).unwrap();
    assert_eq!(tue.name(), "Tue");
    assert_eq!(class.value_of("Wed"), Some(3));
    assert_eq!(class.name_of(1), Some("Mon"));

    let err = EnumValue::from_value(&class, 9).unwrap_err();
    assert!(matches!(err, ExtError::InvalidEnumValue { value: 9, .. }));
    assert_eq!(err.kind(), ErrorKind::Value);

    let err = EnumValue::from_name(&class, "Sun").unwrap_err();
    assert!(matches!(err, ExtError::UnknownMember { .. }));
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(err.to_string(), "enum 'Weekday' has no member named 'Sun'");

    let err = EnumClass::new("Twice", [("A", 1), ("A", 2)]).unwrap_err();
    assert!(matches!(err, ExtError::DuplicateMember { .. }));
}

#[test]
fn aliased_values_are_rejected() {
    let registry = Registry::with_defaults();
    let class = Arc::new(EnumClass::new("Alias", [("One", 1), ("Uno", 1)]).unwrap());
    let item = Some(Item::Enum(EnumValue::from_name(&class, "Uno").unwrap()));
    let err = EnumArray::from_items([item], None, &registry).unwrap_err();
    assert!(matches!(err, ExtError::DuplicateMember { .. }));
}

#[test]
fn storage_must_be_int64() {
    let registry = Registry::with_defaults();
    let class: ItemClass = weekday().into();
    registry.register_item_class(&class).unwrap();

    let err = registry.find(&class, Some(&DataType::Int32)).unwrap_err();
    assert!(matches!(err, ExtError::InvalidStorage { .. }));

    let root = registry.find(&class, None).unwrap();
    let storage: ArrayRef = Arc::new(typed_arrow_ext::arrow_array::Int32Array::from(vec![1]));
    assert!(ExtensionArray::try_new(root, storage).is_err());
}

#[test]
fn size_and_all_null_inputs() {
    let registry = Registry::with_defaults();

    let padded = EnumArray::from_items([day("Mon")], Some(3), &registry).unwrap();
    assert_eq!(padded.len(), 3);
    assert_eq!(padded.null_count(), 2);

    let truncated = EnumArray::from_items([day("Mon"), day("Tue"), day("Wed")], Some(2), &registry)
        .unwrap();
    assert_eq!(truncated.to_list().unwrap(), vec![day("Mon"), day("Tue")]);

    let nulls = EnumArray::from_items([None, None, None], Some(2), &registry).unwrap();
    assert_eq!(nulls.len(), 2);
    assert!(nulls.ext_type().is_root());
    assert!(nulls.values().is_none());
}

#[test]
fn other_items_are_rejected() {
    let registry = Registry::with_defaults();
    let err = EnumArray::from_items([day("Mon"), Some(Item::Int64(1))], None, &registry)
        .unwrap_err();
    assert!(matches!(err, ExtError::UnsupportedItem { .. }));
}

#[test]
fn stored_values_outside_the_class_fail_to_decode() {
    let registry = Registry::with_defaults();
    let class: ItemClass = weekday().into();
    registry.register_item_class(&class).unwrap();
    let ext = registry.find(&class, Some(&DataType::Int64)).unwrap();
    let storage: ArrayRef = Arc::new(Int64Array::from(vec![1, 42]));
    let array = EnumArray::try_new(ExtensionArray::try_new(ext, storage).unwrap()).unwrap();

    assert_eq!(array.get_item(0).unwrap(), day("Mon"));
    assert!(matches!(
        array.get_item(1).unwrap_err(),
        ExtError::InvalidEnumValue { value: 42, .. }
    ));
}
