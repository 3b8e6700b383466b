use tracing::debug;

use crate::chunk::{CellIterator, DecoderOptions, EmptyBitmapChunk, ValueChunk};
use crate::client::array::{ChunkSource, ResultArray};
use crate::errors::{ClientError, DecodeError, UsageError};
use crate::schema::ArraySchema;

/// Chunks of every attribute for one tile.
struct Tile {
    values: Vec<ValueChunk>,
    bitmap: Option<EmptyBitmapChunk>,
}

impl Tile {
    fn empty() -> Self {
        Self {
            values: Vec::new(),
            bitmap: None,
        }
    }

    /// The iterator whose progress stands for the whole tile.
    fn lead(&self) -> Option<&dyn CellIterator> {
        match self.values.first() {
            Some(chunk) => Some(chunk as &dyn CellIterator),
            None => self.bitmap.as_ref().map(|b| b as &dyn CellIterator),
        }
    }

    fn end_of_array(&self) -> bool {
        self.lead().is_none_or(|c| c.end_of_array())
    }

    fn end_of_chunk(&self) -> bool {
        self.lead().is_none_or(|c| c.end_of_chunk())
    }

    fn has_next(&self) -> bool {
        self.lead().is_some_and(|c| c.has_next())
    }

    /// Steps every iterator once, the bitmap included.
    fn advance_all(&mut self) -> Result<(), DecodeError> {
        let mut positions = Vec::with_capacity(self.values.len() + 1);
        for chunk in self.values.iter_mut() {
            if !chunk.advance() {
                return Err(DecodeError::Malformed(format!(
                    "attribute {} ran out of cells before the others",
                    chunk.attribute_id()
                )));
            }
            positions.push(chunk.position());
        }
        if let Some(bitmap) = self.bitmap.as_mut() {
            if !bitmap.advance() {
                return Err(DecodeError::Malformed(
                    "empty bitmap ran out of cells before the attributes".to_string(),
                ));
            }
            positions.push(bitmap.position());
        }
        if positions.windows(2).any(|w| w[0] != w[1]) {
            return Err(DecodeError::Malformed(format!(
                "attribute chunks out of step: {:?}",
                positions
            )));
        }
        Ok(())
    }
}

/// Cell-by-cell walk over a result array with every attribute in lock-step.
///
/// Holds the current tile and the one after it, so whether more cells
/// follow is known without blocking on the wire.
pub struct ArrayCursor<C: ChunkSource> {
    source: C,
    array: ResultArray,
    options: DecoderOptions,
    current: Tile,
    next: Tile,
    have_more_values: bool,
    have_more_chunks: bool,
    exhausted: bool,
    cells_seen: u64,
}

impl<C: ChunkSource> ArrayCursor<C> {
    /// Fetches the first two tiles and positions on the first cell.
    pub fn open(source: C, array: ResultArray, options: DecoderOptions) -> Result<Self, ClientError> {
        let mut cursor = Self {
            source,
            array,
            options,
            current: Tile::empty(),
            next: Tile::empty(),
            have_more_values: false,
            have_more_chunks: false,
            exhausted: false,
            cells_seen: 0,
        };
        if cursor.array.schema.attributes.is_empty() {
            cursor.exhausted = true;
            return Ok(cursor);
        }

        cursor.current = cursor.fetch_tile()?;
        if cursor.current.end_of_array() {
            debug!(target: "scidb_client::cursor", "array {} is empty", cursor.array.name());
            cursor.exhausted = true;
            return Ok(cursor);
        }
        cursor.load_next()?;
        if cursor.settle()? {
            cursor.cells_seen = 1;
        }
        Ok(cursor)
    }

    fn fetch_tile(&mut self) -> Result<Tile, ClientError> {
        let schema = &self.array.schema;
        let mut tile = Tile::empty();
        for attr in &schema.attributes {
            let raw = self.source.fetch(&self.array, attr.id)?;
            if attr.empty_indicator {
                tile.bitmap = Some(EmptyBitmapChunk::decode(
                    raw.meta,
                    raw.payload,
                    &schema.dimensions,
                    self.options,
                )?);
            } else {
                tile.values.push(ValueChunk::decode(
                    raw.meta,
                    raw.payload,
                    attr,
                    &schema.dimensions,
                    self.options,
                )?);
            }
        }
        check_tile(&tile)?;
        Ok(tile)
    }

    /// Fetches the next tile that has cells, or the end-of-array tile.
    fn load_next(&mut self) -> Result<(), ClientError> {
        loop {
            self.next = self.fetch_tile()?;
            if self.next.end_of_array() || !self.next.end_of_chunk() {
                break;
            }
            debug!(target: "scidb_client::cursor", "skipping empty tile");
        }
        self.have_more_chunks = !self.next.end_of_array();
        Ok(())
    }

    /// Makes the current tile the one fetched ahead and refills the look-ahead.
    fn rotate(&mut self) -> Result<(), ClientError> {
        self.current = std::mem::replace(&mut self.next, Tile::empty());
        self.load_next()
    }

    /// Skips tiles without cells. Returns false when the array runs out.
    fn settle(&mut self) -> Result<bool, ClientError> {
        loop {
            if !self.current.end_of_chunk() {
                self.have_more_values = self.current.has_next();
                return Ok(true);
            }
            if !self.have_more_chunks {
                self.exhaust();
                return Ok(false);
            }
            self.rotate()?;
        }
    }

    fn exhaust(&mut self) {
        self.exhausted = true;
        self.have_more_values = false;
        self.have_more_chunks = false;
        debug!(
            target: "scidb_client::cursor",
            "array {} exhausted after {} cells", self.array.name(), self.cells_seen
        );
    }

    /// Moves to the next cell. Returns false once past the last cell.
    /// A failed move leaves the cursor exhausted.
    pub fn move_next(&mut self) -> Result<bool, ClientError> {
        let moved = self.step();
        if moved.is_err() {
            self.exhaust();
        }
        moved
    }

    fn step(&mut self) -> Result<bool, ClientError> {
        if self.exhausted {
            return Ok(false);
        }
        if self.have_more_values {
            self.current.advance_all()?;
            self.have_more_values = self.current.has_next();
        } else if self.have_more_chunks {
            self.rotate()?;
            if !self.settle()? {
                return Ok(false);
            }
        } else {
            self.exhaust();
            return Ok(false);
        }
        self.cells_seen += 1;
        Ok(true)
    }

    /// Whether `move_next` would land on another cell.
    pub fn has_next(&self) -> bool {
        !self.exhausted && (self.have_more_values || self.have_more_chunks)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// 1-based ordinal of the current cell; 0 before the first.
    pub fn cell_number(&self) -> u64 {
        self.cells_seen
    }

    pub fn schema(&self) -> &ArraySchema {
        &self.array.schema
    }

    pub fn array(&self) -> &ResultArray {
        &self.array
    }

    /// Coordinates of the current cell. The bitmap is authoritative when
    /// the array has one.
    pub fn coordinates(&self) -> Result<&[i64], ClientError> {
        if self.exhausted {
            return Err(UsageError::CursorExhausted.into());
        }
        let lead: &dyn CellIterator = match (&self.current.bitmap, self.current.values.first()) {
            (Some(bitmap), _) => bitmap,
            (None, Some(chunk)) => chunk,
            (None, None) => return Err(UsageError::CursorExhausted.into()),
        };
        Ok(lead.coordinates()?)
    }

    /// Current cell of one value attribute.
    pub fn attribute(&self, attribute_id: u32) -> Result<&ValueChunk, ClientError> {
        if self.exhausted {
            return Err(UsageError::CursorExhausted.into());
        }
        self.current
            .values
            .iter()
            .find(|c| c.attribute_id() == attribute_id)
            .ok_or(ClientError::Usage(UsageError::InvalidColumn(
                attribute_id as usize,
            )))
    }

    /// Current cells of all value attributes, in attribute order.
    pub fn values(&self) -> Result<&[ValueChunk], ClientError> {
        if self.exhausted {
            return Err(UsageError::CursorExhausted.into());
        }
        Ok(&self.current.values)
    }

    pub fn into_source(self) -> C {
        self.source
    }
}

/// Every chunk of a tile must describe the same region and cell count.
fn check_tile(tile: &Tile) -> Result<(), DecodeError> {
    let mut iters: Vec<(&[i64], bool, u64)> = tile
        .values
        .iter()
        .map(|c| (c.meta().coordinates.as_slice(), c.end_of_array(), c.cell_count()))
        .collect();
    if let Some(bitmap) = &tile.bitmap {
        iters.push((
            bitmap.meta().coordinates.as_slice(),
            bitmap.end_of_array(),
            bitmap.present_cells(),
        ));
    }
    let Some(&(origin, eof, cells)) = iters.first() else {
        return Ok(());
    };
    for &(other_origin, other_eof, other_cells) in &iters[1..] {
        if other_eof != eof {
            return Err(DecodeError::Malformed(
                "attributes disagree on end of array".to_string(),
            ));
        }
        if eof {
            continue;
        }
        if other_origin != origin {
            return Err(DecodeError::Malformed(format!(
                "attribute tiles at {:?} and {:?} do not line up",
                origin, other_origin
            )));
        }
        if other_cells != cells {
            return Err(DecodeError::Malformed(format!(
                "tile at {:?} holds {} cells in one attribute and {} in another",
                origin, cells, other_cells
            )));
        }
    }
    Ok(())
}
