use crate::chunk::DecoderOptions;
use crate::chunk::format::BitmapLayout;
use crate::test_helpers::factory::Factory;

#[test]
fn test_bitmap_payload_factory_assigns_physical_positions() {
    let payload = Factory::bitmap_payload().segment(1, 2).segment(5, 3).create();
    let layout = BitmapLayout::parse(&payload, DecoderOptions::default()).unwrap();

    assert_eq!(layout.n_non_empty, 5);
    assert_eq!(layout.segments[0].p_position, 0);
    assert_eq!(layout.segments[1].p_position, 2);
    assert_eq!(layout.logical_end(), 8);
}
