use bytes::Bytes;

use crate::chunk::{CellIterator, DecoderOptions, EmptyBitmapChunk};
use crate::errors::DecodeError;
use crate::logging::init_for_tests;
use crate::schema::Dimension;
use crate::test_helpers::factory::Factory;

fn dims() -> Vec<Dimension> {
    vec![
        Dimension {
            name: "x".into(),
            start_min: 0,
            curr_start: 0,
            curr_end: 3,
            end_max: 3,
            chunk_interval: 2,
            chunk_overlap: 0,
        },
        Dimension {
            name: "y".into(),
            start_min: 0,
            curr_start: 0,
            curr_end: 9,
            end_max: 9,
            chunk_interval: 5,
            chunk_overlap: 0,
        },
    ]
}

fn decode(payload: Bytes, origin: &[i64]) -> EmptyBitmapChunk {
    init_for_tests();
    let meta = Factory::chunk().with_coordinates(origin).create_meta();
    EmptyBitmapChunk::decode(meta, payload, &dims(), DecoderOptions::default()).unwrap()
}

#[test]
fn walks_present_cells_only() {
    let payload = Factory::bitmap_payload()
        .segment(1, 2)
        .segment(7, 1)
        .create();
    let mut chunk = decode(payload, &[2, 5]);
    assert_eq!(chunk.present_cells(), 3);

    let mut cells = Vec::new();
    loop {
        cells.push((
            chunk.position(),
            chunk.logical_position(),
            chunk.coordinates().unwrap().to_vec(),
        ));
        if !chunk.advance() {
            break;
        }
    }
    assert_eq!(
        cells,
        vec![
            (0, 1, vec![2, 6]),
            (1, 2, vec![2, 7]),
            (2, 7, vec![3, 7]),
        ]
    );
    assert!(chunk.end_of_chunk());
    assert!(matches!(chunk.coordinates(), Err(DecodeError::EndOfChunk)));
}

#[test]
fn has_next_is_pure() {
    let payload = Factory::bitmap_payload().segment(0, 1).segment(4, 1).create();
    let mut chunk = decode(payload, &[0, 0]);

    assert!(chunk.has_next());
    assert!(chunk.has_next());
    assert_eq!(chunk.logical_position(), 0);
    assert!(chunk.advance());
    assert_eq!(chunk.logical_position(), 4);
    assert!(!chunk.has_next());
    assert!(!chunk.advance());
}

#[test]
fn empty_bitmap_is_exhausted() {
    let payload = Factory::bitmap_payload().create();
    let chunk = decode(payload, &[0, 0]);
    assert!(chunk.end_of_chunk());
    assert!(!chunk.end_of_array());
    assert!(!chunk.has_next());
}

#[test]
fn end_of_array_sentinel() {
    let meta = Factory::chunk().eof().create_meta();
    let chunk =
        EmptyBitmapChunk::decode(meta, Bytes::new(), &dims(), DecoderOptions::default()).unwrap();
    assert!(chunk.end_of_array());
    assert!(matches!(chunk.coordinates(), Err(DecodeError::EndOfArray)));
}

#[test]
fn bitmap_past_tile_is_rejected() {
    // tile at x=2,y=5 holds 2 x 5 cells
    let payload = Factory::bitmap_payload().segment(9, 2).create();
    let meta = Factory::chunk().with_coordinates(&[2, 5]).create_meta();
    assert!(EmptyBitmapChunk::decode(meta, payload, &dims(), DecoderOptions::default()).is_err());
}
