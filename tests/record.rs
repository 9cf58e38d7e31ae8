use std::sync::Arc;

use typed_arrow_ext::{
    arrow_array::{Array, ArrayRef, Int64Array, RecordBatch, cast::AsArray, types::Int64Type},
    arrow_schema::{DataType, Schema},
    factory::ColumnInput,
    prelude::*,
};

fn point() -> Arc<RecordClass> {
    Arc::new(
        RecordClass::new(
            "Point",
            vec![
                RecordField::new("x", BaseClass::Int64, false),
                RecordField::new("y", BaseClass::Float64, true),
            ],
        )
        .unwrap(),
    )
}

fn point_item(x: i64, y: Option<f64>) -> Option<Item> {
    let value = RecordValue::from_fields(
        point(),
        [("x", Some(Item::Int64(x))), ("y", y.map(Item::Float64))],
    )
    .unwrap();
    Some(Item::Record(value))
}

fn points(registry: &Registry) -> RecordArray {
    RecordArray::from_items(
        [point_item(1, Some(0.5)), None, point_item(3, Some(1.5))],
        None,
        registry,
    )
    .unwrap()
}

#[test]
fn items_round_trip() {
    let registry = Registry::with_defaults();
    let items = vec![point_item(1, Some(0.5)), None, point_item(3, None)];
    let array = RecordArray::from_items(items.clone(), None, &registry).unwrap();

    assert_eq!(array.len(), 3);
    assert_eq!(array.null_count(), 1);
    assert!(array.is_null(1));
    assert_eq!(array.to_list().unwrap(), items);
    assert_eq!(array.record_class(), Some(&point()));
    assert_eq!(
        array.storage().data_type(),
        &DataType::Struct(
            vec![
                typed_arrow_ext::arrow_schema::Field::new("x", DataType::Int64, true),
                typed_arrow_ext::arrow_schema::Field::new("y", DataType::Float64, true),
            ]
            .into()
        )
    );
}

#[test]
fn keyword_construction_checks_fields() {
    let err = RecordValue::from_fields(point(), [("z", Some(Item::Int64(1)))]).unwrap_err();
    assert!(matches!(err, ExtError::UnknownField { .. }));

    let err = RecordValue::from_fields(point(), [("y", Some(Item::Float64(1.0)))]).unwrap_err();
    assert!(matches!(err, ExtError::UnexpectedNull { .. }));

    let value = RecordValue::from_fields(point(), [("x", Some(Item::Int64(9)))]).unwrap();
    assert_eq!(value.get("y").unwrap(), None);
    assert_eq!(value.get("x").unwrap(), Some(&Item::Int64(9)));
}

#[test]
fn size_truncates_and_pads() {
    let registry = Registry::with_defaults();
    let items = [point_item(1, None), point_item(2, None), point_item(3, None)];

    let short = RecordArray::from_items(items.clone(), Some(2), &registry).unwrap();
    assert_eq!(short.len(), 2);
    assert_eq!(short.get_item(1).unwrap(), point_item(2, None));

    let long = RecordArray::from_items(items, Some(5), &registry).unwrap();
    assert_eq!(long.len(), 5);
    assert_eq!(long.null_count(), 2);
    assert_eq!(long.get_item(4).unwrap(), None);
}

#[test]
fn all_null_input_uses_the_root() {
    let registry = Registry::with_defaults();
    let array = RecordArray::from_items([None, None], None, &registry).unwrap();
    assert_eq!(array.len(), 2);
    assert!(array.ext_type().is_root());
    assert_eq!(array.storage().data_type(), &DataType::Null);
    assert!(array.keys().is_empty());
    assert_eq!(array.to_list().unwrap(), vec![None, None]);
}

#[test]
fn mixed_classes_are_rejected() {
    let registry = Registry::with_defaults();
    let other = Arc::new(RecordClass::new("Other", vec![RecordField::new("x", BaseClass::Int64, false)]).unwrap());
    let other_item = Item::Record(RecordValue::new(other, vec![Some(Item::Int64(1))]).unwrap());
    let err = RecordArray::from_items([point_item(1, None), Some(other_item)], None, &registry)
        .unwrap_err();
    assert!(matches!(err, ExtError::UnsupportedItem { .. }));

    let err = RecordArray::from_items([Some(Item::Int64(1))], None, &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn keys_and_fields() {
    let registry = Registry::with_defaults();
    let array = points(&registry);
    assert_eq!(array.keys(), vec!["x", "y"]);

    let AnyArray::Base(x) = array.field("x").unwrap() else {
        panic!("x is a primitive column");
    };
    let x = x.as_primitive::<Int64Type>();
    assert_eq!(x.value(0), 1);
    assert_eq!(x.value(2), 3);

    let err = array.field("z").unwrap_err();
    assert!(matches!(err, ExtError::UnknownField { .. }));
}

#[test]
fn indexing_and_slicing() {
    let registry = Registry::with_defaults();
    let array = points(&registry);

    let Indexed::Item(last) = array.index(-1_i64).unwrap() else {
        panic!("position yields an item");
    };
    assert_eq!(last, point_item(3, Some(1.5)));
    assert!(matches!(
        array.index(3_usize).unwrap_err(),
        ExtError::OutOfBounds { .. }
    ));

    let Indexed::Array(tail) = array.index(1_usize..10).unwrap() else {
        panic!("range yields an array");
    };
    assert_eq!(tail.len(), 2);
    assert!(Arc::ptr_eq(tail.ext_type(), array.ext_type()));
    assert_eq!(tail.get_item(1).unwrap(), point_item(3, Some(1.5)));
    assert!(array.slice(2, 2).is_err());
}

#[test]
fn empty_replace_returns_the_same_array() {
    let registry = Registry::with_defaults();
    let array = points(&registry);
    let replaced = array
        .replace(Vec::<(&str, ColumnInput)>::new(), &registry)
        .unwrap();
    assert!(replaced.ptr_eq(&array));
}

#[test]
fn replace_keeps_type_and_validity() {
    let registry = Registry::with_defaults();
    let array = points(&registry);
    let x: ArrayRef = Arc::new(Int64Array::from(vec![10, 20, 30]));
    let replaced = array.replace([("x", x)], &registry).unwrap();

    assert!(Arc::ptr_eq(replaced.ext_type(), array.ext_type()));
    assert!(replaced.is_null(1));
    assert_eq!(replaced.get_item(2).unwrap(), point_item(30, Some(1.5)));
}

#[test]
fn replace_with_items() {
    let registry = Registry::with_defaults();
    let array = points(&registry);
    let ys = vec![Some(Item::Float64(9.0)), None, None];
    let replaced = array.replace([("y", ys)], &registry).unwrap();
    assert_eq!(replaced.get_item(0).unwrap(), point_item(1, Some(9.0)));
    assert_eq!(replaced.get_item(2).unwrap(), point_item(3, None));
}

#[test]
fn replace_errors() {
    let registry = Registry::with_defaults();
    let array = points(&registry);

    let short: ArrayRef = Arc::new(Int64Array::from(vec![1]));
    let err = array.replace([("x", short)], &registry).unwrap_err();
    assert!(matches!(err, ExtError::LengthMismatch { expected: 3, actual: 1, .. }));

    // Names are checked before anything is encoded.
    let bad = vec![Some(Item::Utf8("not encoded".into()))];
    let err = array.replace([("nope", bad)], &registry).unwrap_err();
    assert!(matches!(err, ExtError::UnknownField { .. }));
}

fn level() -> Arc<EnumClass> {
    Arc::new(EnumClass::new("Level", [("Low", 1), ("High", 2)]).unwrap())
}

fn reading() -> Arc<RecordClass> {
    Arc::new(
        RecordClass::new(
            "Reading",
            vec![
                RecordField::new("at", point(), false),
                RecordField::new("level", level(), true),
                RecordField::new("label", BaseClass::Utf8, true),
            ],
        )
        .unwrap(),
    )
}

fn reading_item(x: i64, level_name: Option<&str>, label: &str) -> Option<Item> {
    let level = level_name.map(|n| Item::Enum(EnumValue::from_name(&level(), n).unwrap()));
    let value = RecordValue::new(
        reading(),
        vec![point_item(x, Some(0.0)), level, Some(Item::from(label))],
    )
    .unwrap();
    Some(Item::Record(value))
}

fn nested_registry() -> Registry {
    let registry = Registry::with_defaults();
    registry.register_item_class(&point().into()).unwrap();
    registry.register_item_class(&level().into()).unwrap();
    registry.register_item_class(&reading().into()).unwrap();
    registry
}

#[test]
fn nested_extension_children() {
    let registry = nested_registry();
    let items = vec![
        reading_item(1, Some("High"), "a"),
        None,
        reading_item(2, None, "b"),
    ];
    let array = typed_arrow_ext::factory::array(items.clone(), None, &registry).unwrap();
    let array = RecordArray::try_new(array.into_extension().unwrap()).unwrap();

    assert_eq!(array.to_list().unwrap(), items);
    let level = array.field("level").unwrap();
    assert_eq!(level.ext_type().unwrap().basename(), "int_enum");
    assert_eq!(
        level.get_item(0).unwrap(),
        Some(Item::Enum(EnumValue::from_name(&self::level(), "High").unwrap()))
    );
    let at = array.field("at").unwrap();
    assert_eq!(at.ext_type().unwrap().basename(), "record");
}

#[test]
fn record_batch_round_trip() {
    let registry = nested_registry();
    let items = vec![reading_item(1, Some("Low"), "a"), reading_item(2, Some("High"), "b")];
    let array = RecordArray::from_items(items.clone(), None, &registry).unwrap();

    let field = array.to_field("readings").unwrap();
    let schema = Arc::new(Schema::new(vec![field]));
    let batch = RecordBatch::try_new(schema, vec![Arc::clone(array.storage())]).unwrap();

    let schema = batch.schema();
    let column = AnyArray::from_field(schema.field(0), Arc::clone(batch.column(0)), &registry).unwrap();
    assert!(Arc::ptr_eq(column.ext_type().unwrap(), array.ext_type()));
    assert_eq!(column.to_list().unwrap(), items);

    // A registry that never saw the classes still decodes the data.
    let fresh = Registry::with_defaults();
    let column = AnyArray::from_field(schema.field(0), Arc::clone(batch.column(0)), &fresh).unwrap();
    assert_eq!(column.to_list().unwrap(), items);
}
