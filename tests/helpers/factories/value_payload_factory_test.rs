use crate::chunk::DecoderOptions;
use crate::chunk::format::{RunKind, ValueLayout};
use crate::test_helpers::factories::ValuePayloadFactory;
use crate::test_helpers::factory::Factory;

#[test]
fn test_value_payload_factory_lays_out_runs() {
    let payload = Factory::value_payload()
        .literal(2, 0)
        .nulls(1, 3)
        .with_data(&[1, 0, 0, 0, 2, 0, 0, 0])
        .create();

    let layout = ValueLayout::parse(&payload, DecoderOptions::default()).unwrap();
    assert_eq!(layout.runs.len(), 2);
    assert_eq!(layout.total_cells, 3);
    assert_eq!(layout.runs[1].kind, RunKind::Nulls { missing_reason: 3 });
    assert_eq!(layout.payload_start, 48 + 3 * 12);
}

#[test]
fn test_value_payload_factory_strings_use_long_form_past_255() {
    let long = "x".repeat(300);
    let payload = Factory::value_payload().create();
    assert_eq!(payload.len(), 48 + 12);

    let strings = ValuePayloadFactory::strings(&["ab", &long]).create();
    let layout = ValueLayout::parse(&strings, DecoderOptions::default()).unwrap();
    assert_eq!(layout.header.elem_size, 0);
    assert_eq!(layout.header.var_offs, 8);
    // short form: len byte + "ab\0"; long form: 0 + u32 + 301 bytes
    assert_eq!(layout.header.data_size, 8 + 4 + 5 + 301);
}
