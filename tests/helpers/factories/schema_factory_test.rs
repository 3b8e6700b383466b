use crate::schema::TypeId;
use crate::test_helpers::factory::Factory;

#[test]
fn test_schema_factory_defaults() {
    let schema = Factory::schema().create();
    assert_eq!(schema.name, "result");
    assert_eq!(schema.attributes.len(), 1);
    assert_eq!(schema.attributes[0].type_id, TypeId::Int32);
    assert_eq!(schema.dimensions[0].chunk_interval, 4);
}

#[test]
fn test_schema_factory_record_round_trips_flags() {
    let record = Factory::schema()
        .with_nullable_attribute("v", "double")
        .with_empty_indicator()
        .with_dimension("i", 0, 9, 5)
        .create_record();
    assert!(record.selective);
    assert_eq!(record.attributes[0].flags, 1);
    assert_eq!(record.attributes[1].flags, 2);
    assert_eq!(record.attributes[1].id, 1);
    assert_eq!(record.dimensions[0].end_max, 9);
}
