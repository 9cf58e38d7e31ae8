use std::sync::Arc;

use typed_arrow_ext::{
    arrow_schema::{DataType, Field, TimeUnit},
    base_types::{is_supported_base_type, semantic_class_of, shape_of},
    prelude::*,
};

#[test]
fn supported_primitive_types() {
    for dt in [
        DataType::Null,
        DataType::Boolean,
        DataType::UInt16,
        DataType::Float16,
        DataType::Utf8,
        DataType::Binary,
        DataType::Timestamp(TimeUnit::Nanosecond, None),
        DataType::Duration(TimeUnit::Second),
    ] {
        assert!(is_supported_base_type(&dt), "{dt} should be supported");
    }
    for dt in [
        DataType::LargeUtf8,
        DataType::Date32,
        DataType::Timestamp(TimeUnit::Second, Some("UTC".into())),
        DataType::List(Arc::new(Field::new_list_field(DataType::Int64, true))),
    ] {
        assert!(!is_supported_base_type(&dt), "{dt} should not be supported");
    }
}

#[test]
fn zoned_timestamps_are_unmapped() {
    let err = semantic_class_of(&DataType::Timestamp(TimeUnit::Millisecond, Some("+01:00".into())))
        .unwrap_err();
    assert!(matches!(err, ExtError::UnmappedType(_)));
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn shapes_of_item_classes() {
    assert_eq!(shape_of(None).unwrap(), DataType::Null);
    assert_eq!(
        shape_of(Some(&BaseClass::Timestamp(TimeUnit::Millisecond).into())).unwrap(),
        DataType::Timestamp(TimeUnit::Millisecond, None)
    );
    let err = shape_of(Some(&ItemClass::Tensor)).unwrap_err();
    assert!(matches!(err, ExtError::NoPrimitiveType { .. }));
}

#[test]
fn class_names() {
    assert_eq!(BaseClass::Duration(TimeUnit::Microsecond).name(), "duration[us]");
    assert_eq!(ItemClass::from(BaseClass::Boolean).to_string(), "bool");
    assert_eq!(ItemClass::Tensor.name(), "Tensor");
    assert!(ItemClass::Tensor.is_extension());
    assert!(!ItemClass::from(BaseClass::Int8).is_extension());
    assert_eq!(Item::from(1_u16).class(), ItemClass::Base(BaseClass::UInt16));
}
