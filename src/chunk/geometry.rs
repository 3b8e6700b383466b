use crate::errors::DecodeError;
use crate::schema::Dimension;

/// Origin and per-axis extents of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGeometry {
    origin: Vec<i64>,
    extents: Vec<i64>,
}

impl TileGeometry {
    pub fn new(dimensions: &[Dimension], origin: &[i64]) -> Result<Self, DecodeError> {
        if origin.len() != dimensions.len() {
            return Err(DecodeError::Malformed(format!(
                "chunk has {} coordinates but the array has {} dimensions",
                origin.len(),
                dimensions.len()
            )));
        }
        let extents: Vec<i64> = dimensions
            .iter()
            .zip(origin)
            .map(|(dim, &o)| dim.extent_from(o))
            .collect();
        if let Some(k) = extents.iter().position(|&e| e <= 0) {
            return Err(DecodeError::Malformed(format!(
                "tile origin {} lies past the end of dimension '{}'",
                origin[k], dimensions[k].name
            )));
        }
        Ok(Self {
            origin: origin.to_vec(),
            extents,
        })
    }

    pub fn origin(&self) -> &[i64] {
        &self.origin
    }

    pub fn extents(&self) -> &[i64] {
        &self.extents
    }

    /// Cells in the tile, saturating on overflow.
    pub fn cell_count(&self) -> u64 {
        self.extents
            .iter()
            .fold(1u64, |acc, &e| acc.saturating_mul(e as u64))
    }

    /// Row-major mapping from a logical index to coordinates; the last axis
    /// varies fastest.
    pub fn coordinates_into(&self, index: u64, out: &mut [i64]) {
        let mut rest = index;
        for k in (0..self.extents.len()).rev() {
            let extent = self.extents[k] as u64;
            out[k] = self.origin[k] + (rest % extent) as i64;
            rest /= extent;
        }
    }

    pub fn coordinates_of(&self, index: u64) -> Vec<i64> {
        let mut out = vec![0; self.origin.len()];
        self.coordinates_into(index, &mut out);
        out
    }

    /// Inverse of `coordinates_of`.
    pub fn index_of(&self, coords: &[i64]) -> u64 {
        coords
            .iter()
            .zip(&self.origin)
            .zip(&self.extents)
            .fold(0u64, |acc, ((&c, &o), &e)| acc * e as u64 + (c - o) as u64)
    }
}
