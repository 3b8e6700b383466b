use crate::chunk::TileGeometry;
use crate::schema::Dimension;

fn dim(name: &str, start: i64, end: i64, interval: i64) -> Dimension {
    Dimension {
        name: name.into(),
        start_min: start,
        curr_start: start,
        curr_end: end,
        end_max: end,
        chunk_interval: interval,
        chunk_overlap: 0,
    }
}

#[test]
fn last_axis_varies_fastest() {
    let dims = vec![dim("x", 0, 5, 3), dim("y", 0, 9, 5)];
    let geometry = TileGeometry::new(&dims, &[3, 5]).unwrap();
    assert_eq!(geometry.extents(), &[3, 5]);
    assert_eq!(geometry.cell_count(), 15);
    assert_eq!(geometry.coordinates_of(0), vec![3, 5]);
    assert_eq!(geometry.coordinates_of(1), vec![3, 6]);
    assert_eq!(geometry.coordinates_of(5), vec![4, 5]);
    assert_eq!(geometry.coordinates_of(14), vec![5, 9]);
}

#[test]
fn edge_tiles_are_clipped() {
    let dims = vec![dim("x", 0, 9, 4)];
    let geometry = TileGeometry::new(&dims, &[8]).unwrap();
    assert_eq!(geometry.extents(), &[2]);
    assert_eq!(geometry.cell_count(), 2);
}

#[test]
fn coordinates_round_trip_over_whole_tile() {
    let dims = vec![dim("x", -2, 7, 3), dim("y", 0, 3, 2), dim("z", 10, 20, 4)];
    let geometry = TileGeometry::new(&dims, &[1, 2, 18]).unwrap();
    assert_eq!(geometry.extents(), &[3, 2, 3]);
    for n in 0..geometry.cell_count() {
        let coords = geometry.coordinates_of(n);
        for (k, c) in coords.iter().enumerate() {
            assert!(*c >= geometry.origin()[k]);
            assert!(*c < geometry.origin()[k] + geometry.extents()[k]);
        }
        assert_eq!(geometry.index_of(&coords), n);
    }
}

#[test]
fn rejects_coordinate_count_mismatch() {
    let dims = vec![dim("x", 0, 3, 2)];
    assert!(TileGeometry::new(&dims, &[0, 0]).is_err());
}

#[test]
fn rejects_origin_past_end() {
    let dims = vec![dim("x", 0, 3, 2)];
    assert!(TileGeometry::new(&dims, &[4]).is_err());
}
