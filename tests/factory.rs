use std::sync::Arc;

use typed_arrow_ext::{
    arrow_array::{Array, ArrayRef, Int64Array, StringArray, cast::AsArray},
    arrow_schema::{DataType, TimeUnit},
    factory::read_item,
    prelude::*,
};

#[test]
fn base_items_fall_back_to_primitive_columns() {
    let registry = Registry::with_defaults();
    let array = array(
        [Some(Item::Int64(1)), None, Some(Item::Int64(3))],
        None,
        &registry,
    )
    .unwrap();
    let AnyArray::Base(column) = &array else {
        panic!("expected a primitive column");
    };
    assert_eq!(column.data_type(), &DataType::Int64);
    assert_eq!(column.null_count(), 1);
    assert_eq!(read_item(&array, 2).unwrap(), Some(Item::Int64(3)));
    assert_eq!(array.to_vec::<i64>().unwrap(), vec![Some(1), None, Some(3)]);
}

#[test]
fn all_null_inputs_become_null_columns() {
    let registry = Registry::with_defaults();

    let array = array([None, None, None], None, &registry).unwrap();
    assert_eq!(array.data_type(), &DataType::Null);
    assert_eq!(array.len(), 3);

    // Never longer than what was scanned.
    let array = array_of_nulls(3, Some(10), &registry);
    assert_eq!(array.len(), 3);
    let array = array_of_nulls(3, Some(2), &registry);
    assert_eq!(array.len(), 2);
    let array = array_of_nulls(0, None, &registry);
    assert!(array.is_empty());
}

fn array_of_nulls(n: usize, size: Option<usize>, registry: &Registry) -> AnyArray {
    typed_arrow_ext::factory::array(std::iter::repeat_n(None, n), size, registry).unwrap()
}

#[test]
fn size_truncates_and_pads_primitive_columns() {
    let registry = Registry::with_defaults();
    let items = || (1..=4).map(|v| Some(Item::Int32(v)));

    let short = array(items(), Some(2), &registry).unwrap();
    assert_eq!(short.to_vec::<i32>().unwrap(), vec![Some(1), Some(2)]);

    let long = array(items(), Some(6), &registry).unwrap();
    assert_eq!(long.len(), 6);
    assert_eq!(long.storage().null_count(), 2);
}

#[test]
fn temporal_and_text_columns() {
    let registry = Registry::with_defaults();
    let stamps = array(
        [Some(Item::Timestamp(TimeValue::micros(5))), None],
        None,
        &registry,
    )
    .unwrap();
    assert_eq!(
        stamps.data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, None)
    );
    assert_eq!(
        stamps.get_item(0).unwrap(),
        Some(Item::Timestamp(TimeValue::micros(5)))
    );

    let text = array([Some(Item::from("hi"))], None, &registry).unwrap();
    assert_eq!(text.storage().as_string::<i32>().value(0), "hi");
}

#[test]
fn mixed_base_items_are_rejected() {
    let registry = Registry::with_defaults();
    let err = array(
        [Some(Item::Int64(1)), Some(Item::Utf8("x".into()))],
        None,
        &registry,
    )
    .unwrap_err();
    assert!(matches!(err, ExtError::UnsupportedItem { .. }));
}

#[test]
fn unregistered_extension_items_have_no_primitive_type() {
    let registry = Registry::with_defaults();
    let class = Arc::new(EnumClass::new("Flag", [("On", 1), ("Off", 0)]).unwrap());
    let items = || [Some(Item::Enum(EnumValue::from_name(&class, "On").unwrap()))];

    let err = array(items(), None, &registry).unwrap_err();
    assert!(matches!(err, ExtError::NoPrimitiveType { .. }));

    registry.register_item_class(&class.clone().into()).unwrap();
    let built = array(items(), None, &registry).unwrap();
    assert_eq!(built.ext_type().unwrap().basename(), "int_enum");
}

#[test]
fn asarray_passes_arrays_through() {
    let registry = Registry::with_defaults();
    let column: ArrayRef = Arc::new(StringArray::from(vec![Some("a"), None]));
    let passed = asarray(Arc::clone(&column), Some(99), &registry).unwrap();
    assert!(Arc::ptr_eq(passed.storage(), &column));

    let encoded = asarray(vec![Some(Item::Int64(7))], None, &registry).unwrap();
    assert_eq!(
        encoded.storage().as_primitive::<typed_arrow_ext::arrow_array::types::Int64Type>(),
        &Int64Array::from(vec![7])
    );
}

#[test]
fn any_array_slicing() {
    let registry = Registry::with_defaults();
    let array = array((0..5).map(|v| Some(Item::Int64(v))), None, &registry).unwrap();
    let sliced = array.slice(1, 3).unwrap();
    assert_eq!(sliced.to_vec::<i64>().unwrap(), vec![Some(1), Some(2), Some(3)]);
    assert!(matches!(
        array.slice(4, 2).unwrap_err(),
        ExtError::OutOfBounds { .. }
    ));
    assert!(matches!(
        read_item(&array, 5).unwrap_err(),
        ExtError::OutOfBounds { .. }
    ));
}
