use std::sync::Arc;

use typed_arrow_ext::{
    IntEnum, Millisecond, Record, Timestamp,
    arrow_array::RecordBatch,
    arrow_schema::Schema,
    prelude::*,
};

#[derive(IntEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Active = 1,
    #[int_enum(name = "on_hold")]
    Paused = 5,
    Closed = 9,
}

#[derive(Record, Debug, Clone, PartialEq)]
struct Address {
    city: String,
    zip: Option<i32>,
}

#[derive(Record, Debug, Clone, PartialEq)]
#[record(name = "Customer")]
struct CustomerRow {
    id: i64,
    #[record(name = "home")]
    address: Option<Address>,
    status: Status,
    score: Option<f64>,
    since: Timestamp<Millisecond>,
}

fn rows() -> Vec<CustomerRow> {
    vec![
        CustomerRow {
            id: 1,
            address: Some(Address {
                city: "NYC".into(),
                zip: None,
            }),
            status: Status::Active,
            score: Some(0.5),
            since: Timestamp::new(1_700_000_000_000),
        },
        CustomerRow {
            id: 2,
            address: None,
            status: Status::Paused,
            score: None,
            since: Timestamp::new(1_700_000_100_000),
        },
    ]
}

#[test]
fn derived_classes_describe_the_type() {
    let ItemClass::Record(class) = CustomerRow::item_class() else {
        panic!("records bind to record classes");
    };
    assert_eq!(class.name(), "Customer");
    assert_eq!(
        class.keys().collect::<Vec<_>>(),
        vec!["id", "home", "status", "score", "since"]
    );
    let nullable: Vec<bool> = class.fields().iter().map(RecordField::nullable).collect();
    assert_eq!(nullable, vec![false, true, false, true, false]);
    assert_eq!(class.fields()[1].class(), &Address::item_class());

    let ItemClass::Enum(status) = Status::item_class() else {
        panic!("enums bind to enum classes");
    };
    assert_eq!(
        status.members(),
        &[
            ("Active".to_string(), 1),
            ("on_hold".to_string(), 5),
            ("Closed".to_string(), 9)
        ]
    );
}

#[test]
fn item_conversion_round_trips() {
    for row in rows() {
        let item = row.clone().into_item();
        assert_eq!(CustomerRow::from_item(item).unwrap(), row);
    }
    let item = Status::Paused.into_item().unwrap();
    let Item::Enum(member) = &item else {
        panic!("expected an enum item");
    };
    assert_eq!(member.name(), "on_hold");
    assert_eq!(member.value(), 5);
    assert_eq!(Status::from_item(Some(item)).unwrap(), Status::Paused);

    assert!(Status::from_item(None).is_err());
    assert!(Address::from_item(Some(Item::Int64(1))).is_err());
}

#[test]
fn typed_arrays_round_trip() {
    let registry = Registry::with_defaults();
    let array = typed_array(rows(), None, &registry).unwrap();

    assert!(registry.contains(&CustomerRow::item_class()));
    assert!(registry.contains(&Address::item_class()));
    assert!(registry.contains(&Status::item_class()));

    let back: Vec<Option<CustomerRow>> = array.to_vec().unwrap();
    assert_eq!(back, rows().into_iter().map(Some).collect::<Vec<_>>());

    let records = RecordArray::try_new(array.into_extension().unwrap()).unwrap();
    let statuses = records.field("status").unwrap();
    assert_eq!(
        statuses.to_vec::<Status>().unwrap(),
        vec![Some(Status::Active), Some(Status::Paused)]
    );
}

#[test]
fn nullable_rows_and_registration() {
    let registry = Registry::with_defaults();
    registry.register::<Address>().unwrap();
    let addresses = vec![
        Some(Address {
            city: "SF".into(),
            zip: Some(94111),
        }),
        None,
    ];
    let array = typed_array(addresses.clone(), None, &registry).unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array.to_vec::<Address>().unwrap(), addresses);
}

#[test]
fn typed_arrays_survive_record_batches() {
    let registry = Registry::with_defaults();
    let array = typed_array(rows(), None, &registry).unwrap();
    let schema = Arc::new(Schema::new(vec![array.to_field("customers").unwrap()]));
    let batch = RecordBatch::try_new(schema, vec![Arc::clone(array.storage())]).unwrap();

    // Decoding through a registry that never saw the types.
    let fresh = Registry::with_defaults();
    let schema = batch.schema();
    let column = AnyArray::from_field(schema.field(0), Arc::clone(batch.column(0)), &fresh).unwrap();
    let back: Vec<Option<CustomerRow>> = column.to_vec().unwrap();
    assert_eq!(back, rows().into_iter().map(Some).collect::<Vec<_>>());
}
