use crate::schema::TypeId;

#[test]
fn parses_builtin_tags() {
    assert_eq!(TypeId::parse("int32"), TypeId::Int32);
    assert_eq!(TypeId::parse("uint64"), TypeId::Uint64);
    assert_eq!(TypeId::parse("datetimetz"), TypeId::DatetimeTz);
    assert_eq!(TypeId::parse("indicator"), TypeId::Indicator);
    assert_eq!(TypeId::parse("binary"), TypeId::Binary);
}

#[test]
fn parses_fixed_strings_and_keeps_unknown_tags() {
    assert_eq!(TypeId::parse("string_12"), TypeId::FixedString(12));
    assert_eq!(
        TypeId::parse("string_x"),
        TypeId::Other("string_x".to_string())
    );
    assert_eq!(TypeId::parse("rational"), TypeId::Other("rational".into()));
}

#[test]
fn display_round_trips_tags() {
    for tag in ["int8", "double", "string", "string_4", "datetime", "rational"] {
        assert_eq!(TypeId::parse(tag).to_string(), tag);
    }
}

#[test]
fn byte_sizes() {
    assert_eq!(TypeId::Bool.byte_size(), Some(1));
    assert_eq!(TypeId::Uint16.byte_size(), Some(2));
    assert_eq!(TypeId::Float.byte_size(), Some(4));
    assert_eq!(TypeId::Datetime.byte_size(), Some(8));
    assert_eq!(TypeId::DatetimeTz.byte_size(), Some(16));
    assert_eq!(TypeId::FixedString(7).byte_size(), Some(7));
    assert_eq!(TypeId::String.byte_size(), None);
}

#[test]
fn numeric_classification() {
    assert!(TypeId::Uint8.is_integer());
    assert!(!TypeId::Double.is_integer());
    assert!(TypeId::Double.is_numeric());
    assert!(!TypeId::Bool.is_numeric());
    assert!(!TypeId::String.is_numeric());
}
