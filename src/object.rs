//! Object codec - composite tile placements and their slope layout
//!
//! Objects live in two blobs: a byte stream holding every object's tile
//! rows back to back, and a metadata table of 4-byte entries
//! (`offset: u16 BE, width: u8, height: u8`) pointing into it.
//!
//! Stream grammar, per object:
//! - `0xFF` ends the object
//! - `0xFE` ends the current row
//! - any other byte with bit `0x80` set is a slope descriptor; the first
//!   sets the upper slope, the second the lower slope
//! - anything else starts a 3-byte tile record `(repeat, tile, slot)`
//!
//! Slope row counts are not stored; they are the number of rows that
//! follow each descriptor. Reverse slopes store their lower section first.

use log::trace;

use crate::error::{FormatIssue, Result, TilesetError};

const END_OF_OBJECT: u8 = 0xFF;
const END_OF_ROW: u8 = 0xFE;
const SLOPE_MARKER: u8 = 0x80;
const REVERSE_SLOPE: u8 = 0x02;

/// Metadata entry size
pub const META_ENTRY_SIZE: usize = 4;
const RECORD_SIZE: usize = 3;

/// One placement in an object grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileRef {
    /// Repeat mode / placement parameters
    pub repeat: u8,
    /// Tile index within the source tileset
    pub tile: u8,
    /// Low 2 bits: source tileset slot. Upper bits: item field.
    pub slot_byte: u8,
}

impl TileRef {
    pub fn new(repeat: u8, tile: u8, slot_byte: u8) -> Self {
        Self { repeat, tile, slot_byte }
    }

    /// Tileset slot (0-3) this reference draws from.
    pub fn slot(&self) -> u8 {
        self.slot_byte & 0x03
    }

    /// Item/flag bits above the slot.
    pub fn item(&self) -> u8 {
        self.slot_byte >> 2
    }

    pub fn with_slot(self, slot: u8) -> Self {
        Self { slot_byte: (self.slot_byte & 0xFC) | (slot & 0x03), ..self }
    }

    pub fn is_empty(&self) -> bool {
        *self == TileRef::default()
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.repeat, self.tile, self.slot_byte]
    }
}

/// Slope descriptor with the number of rows it covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Slope {
    /// Control byte; 0 means no slope
    pub kind: u8,
    pub rows: u8,
}

impl Slope {
    pub const NONE: Slope = Slope { kind: 0, rows: 0 };

    pub fn new(kind: u8, rows: u8) -> Self {
        Self { kind, rows }
    }

    pub fn is_set(&self) -> bool {
        self.kind != 0
    }

    pub fn is_reverse(&self) -> bool {
        self.is_set() && self.kind & REVERSE_SLOPE != 0
    }
}

/// Rectangular grid of tile references, indexed by (row, column).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileRef>,
}

impl TileGrid {
    /// Grid filled with one reference.
    pub fn filled(width: usize, height: usize, tile: TileRef) -> Self {
        Self { width, height, cells: vec![tile; width * height] }
    }

    /// Build from rows; `None` if the rows are not all the same length.
    pub fn from_rows(rows: Vec<Vec<TileRef>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self { width, height, cells: rows.into_iter().flatten().collect() })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&TileRef> {
        if row < self.height && column < self.width {
            self.cells.get(row * self.width + column)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut TileRef> {
        if row < self.height && column < self.width {
            self.cells.get_mut(row * self.width + column)
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileRef]> {
        // chunks(0) panics; an empty grid has no rows anyway
        self.cells.chunks(self.width.max(1))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [TileRef]> {
        self.cells.chunks_mut(self.width.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<TileRef>> {
        self.rows().map(<[TileRef]>::to_vec).collect()
    }
}

/// A reusable composite of tile placements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object {
    pub upper_slope: Slope,
    pub lower_slope: Slope,
    pub tiles: TileGrid,
}

impl Object {
    pub fn new(tiles: TileGrid) -> Self {
        Self { upper_slope: Slope::NONE, lower_slope: Slope::NONE, tiles }
    }

    pub fn with_slopes(tiles: TileGrid, upper_slope: Slope, lower_slope: Slope) -> Self {
        Self { upper_slope, lower_slope, tiles }
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn is_slope(&self) -> bool {
        self.upper_slope.is_set()
    }

    pub fn is_reverse_slope(&self) -> bool {
        self.upper_slope.is_reverse()
    }
}

/// One metadata table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMeta {
    pub offset: u16,
    pub width: u8,
    pub height: u8,
}

impl ObjectMeta {
    pub fn to_bytes(self) -> [u8; META_ENTRY_SIZE] {
        let [hi, lo] = self.offset.to_be_bytes();
        [hi, lo, self.width, self.height]
    }
}

/// Parse the metadata blob.
pub fn decode_metadata(buffer: &[u8]) -> Result<Vec<ObjectMeta>> {
    if buffer.len() % META_ENTRY_SIZE != 0 {
        let expected = buffer.len() / META_ENTRY_SIZE * META_ENTRY_SIZE;
        return Err(TilesetError::size("object metadata", expected, buffer.len()));
    }

    Ok(buffer
        .chunks_exact(META_ENTRY_SIZE)
        .map(|e| ObjectMeta { offset: u16::from_be_bytes([e[0], e[1]]), width: e[2], height: e[3] })
        .collect())
}

/// Move the last `n` rows to the front.
///
/// Reverse slopes are stored lower section first; this turns stream order
/// into top-to-bottom order. [`restore_reverse_rows`] undoes it.
pub fn rotate_reverse_rows<T>(rows: &mut [T], n: usize) {
    let n = n.min(rows.len());
    rows.rotate_right(n);
}

/// Move the first `n` rows to the back. Inverse of [`rotate_reverse_rows`].
pub fn restore_reverse_rows<T>(rows: &mut [T], n: usize) {
    let n = n.min(rows.len());
    rows.rotate_left(n);
}

/// Where `0xFE` row counts accumulate while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlopeState {
    NoSlope,
    UpperSet,
    BothSet,
}

/// Parse a single object starting at `meta.offset`.
fn decode_object(stream: &[u8], meta: ObjectMeta, index: usize, tile_count: usize) -> Result<Object> {
    let start = meta.offset as usize;
    let fail = |offset: usize, issue: FormatIssue| TilesetError::Format { object: index, offset, issue };

    if start >= stream.len() {
        return Err(fail(start, FormatIssue::OffsetOutOfRange { len: stream.len() }));
    }

    let mut rows: Vec<Vec<TileRef>> = vec![Vec::new()];
    let mut upper = Slope::NONE;
    let mut lower = Slope::NONE;
    let mut state = SlopeState::NoSlope;
    let mut pos = start;

    loop {
        let byte = *stream.get(pos).ok_or_else(|| fail(pos, FormatIssue::MissingTerminator))?;
        match byte {
            END_OF_OBJECT => break,
            END_OF_ROW => {
                rows.push(Vec::new());
                match state {
                    SlopeState::NoSlope => {}
                    SlopeState::UpperSet => upper.rows = upper.rows.saturating_add(1),
                    SlopeState::BothSet => lower.rows = lower.rows.saturating_add(1),
                }
                pos += 1;
            }
            b if b & SLOPE_MARKER != 0 => {
                state = match state {
                    SlopeState::NoSlope => {
                        upper.kind = b;
                        SlopeState::UpperSet
                    }
                    SlopeState::UpperSet => {
                        lower.kind = b;
                        SlopeState::BothSet
                    }
                    SlopeState::BothSet => return Err(fail(pos, FormatIssue::ExtraSlope(b))),
                };
                pos += 1;
            }
            _ => {
                let record = stream.get(pos..pos + RECORD_SIZE).ok_or_else(|| {
                    fail(pos, FormatIssue::TruncatedRecord { available: stream.len() - pos })
                })?;
                let tile = TileRef::new(record[0], record[1], record[2]);
                if tile.tile as usize >= tile_count {
                    return Err(fail(pos, FormatIssue::TileIndex { tile: tile.tile, tile_count }));
                }
                // rows always holds at least one row here
                if let Some(row) = rows.last_mut() {
                    row.push(tile);
                }
                pos += RECORD_SIZE;
            }
        }
    }

    // The final 0xFE opens a row the terminator never fills
    if rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }

    if upper.is_reverse() && rows.len() > 1 {
        rotate_reverse_rows(&mut rows, lower.rows as usize);
    }

    let (width, height) = (meta.width as usize, meta.height as usize);
    if width == 0 || height == 0 {
        return Err(fail(start, FormatIssue::Empty { width, height }));
    }
    if rows.len() != height {
        return Err(fail(start, FormatIssue::RowCount { actual: rows.len(), expected: height }));
    }
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(fail(start, FormatIssue::RaggedRow { row, actual: r.len(), expected: width }));
    }

    let tiles = TileGrid::from_rows(rows)
        .ok_or_else(|| fail(start, FormatIssue::RowCount { actual: 0, expected: height }))?;
    trace!("object {}: {}x{} at {:#06x}, slopes {:?}/{:?}", index, width, height, start, upper, lower);
    Ok(Object { upper_slope: upper, lower_slope: lower, tiles })
}

/// Decode every object described by the metadata table.
///
/// # Errors
///
/// `TilesetError::Size` for a malformed metadata table and
/// `TilesetError::Format` for the first object that violates the grammar.
pub fn decode_objects(stream: &[u8], metadata: &[u8], tile_count: usize) -> Result<Vec<Object>> {
    decode_metadata(metadata)?
        .into_iter()
        .enumerate()
        .map(|(index, meta)| decode_object(stream, meta, index, tile_count))
        .collect()
}

fn push_row(out: &mut Vec<u8>, row: &[TileRef]) {
    for tile in row {
        out.extend_from_slice(&tile.to_bytes());
    }
    out.push(END_OF_ROW);
}

/// Check that an object can be written and read back unchanged.
fn validate_for_encode(object: &Object, index: usize, tile_count: usize) -> Result<()> {
    let fail = |issue: FormatIssue| TilesetError::Format { object: index, offset: 0, issue };
    let (width, height) = (object.width(), object.height());

    if width == 0 || height == 0 {
        return Err(fail(FormatIssue::Empty { width, height }));
    }
    if width > u8::MAX as usize || height > u8::MAX as usize {
        return Err(TilesetError::Dimensions {
            what: "object",
            expected: "at most 255x255".to_string(),
            actual: format!("{}x{}", width, height),
        });
    }

    for (row, tiles) in object.tiles.rows().enumerate() {
        for (column, tile) in tiles.iter().enumerate() {
            if tile.repeat & SLOPE_MARKER != 0 {
                return Err(fail(FormatIssue::ControlByteInRecord(tile.repeat)));
            }
            if tile.tile as usize >= tile_count {
                return Err(TilesetError::UnresolvedReference {
                    object: index,
                    row,
                    column,
                    tile: tile.tile,
                    tile_count,
                });
            }
        }
    }

    let (upper, lower) = (object.upper_slope, object.lower_slope);
    if !upper.is_set() && lower.is_set() {
        return Err(fail(FormatIssue::LowerWithoutUpper));
    }
    if object.is_slope() {
        for kind in [upper.kind, lower.kind] {
            if kind >= END_OF_ROW {
                return Err(fail(FormatIssue::ReservedSlopeKind(kind)));
            }
            if kind != 0 && kind & SLOPE_MARKER == 0 {
                return Err(fail(FormatIssue::UnmarkedSlope(kind)));
            }
        }
        let lower_rows = if lower.is_set() { lower.rows } else { 0 };
        if upper.rows as usize + lower_rows as usize != height {
            return Err(fail(FormatIssue::SlopeRows { upper: upper.rows, lower: lower.rows, height }));
        }
    }
    Ok(())
}

/// Encode one object to its stream bytes.
pub fn encode_object(object: &Object, tile_count: usize) -> Result<Vec<u8>> {
    encode_indexed(object, 0, tile_count)
}

fn encode_indexed(object: &Object, index: usize, tile_count: usize) -> Result<Vec<u8>> {
    validate_for_encode(object, index, tile_count)?;
    let mut out = Vec::with_capacity(object.width() * object.height() * RECORD_SIZE + object.height() + 3);

    if !object.is_slope() {
        for row in object.tiles.rows() {
            push_row(&mut out, row);
        }
        out.push(END_OF_OBJECT);
        return Ok(out);
    }

    let lower_rows = if object.lower_slope.is_set() { object.lower_slope.rows as usize } else { 0 };
    let mut rows: Vec<&[TileRef]> = object.tiles.rows().collect();
    if object.is_reverse_slope() && rows.len() > 1 {
        restore_reverse_rows(&mut rows, lower_rows);
    }

    let split = object.upper_slope.rows as usize;
    out.push(object.upper_slope.kind);
    for row in &rows[..split] {
        push_row(&mut out, row);
    }
    if object.lower_slope.is_set() {
        out.push(object.lower_slope.kind);
        for row in &rows[split..] {
            push_row(&mut out, row);
        }
    }
    out.push(END_OF_OBJECT);
    Ok(out)
}

/// Encode all objects into `(stream, metadata)` blobs.
///
/// Each metadata entry records the stream length at the moment its object
/// was appended.
pub fn encode_objects(objects: &[Object], tile_count: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut stream = Vec::new();
    let mut metadata = Vec::with_capacity(objects.len() * META_ENTRY_SIZE);

    for (index, object) in objects.iter().enumerate() {
        let offset = u16::try_from(stream.len())
            .map_err(|_| TilesetError::size("object stream", u16::MAX as usize, stream.len()))?;
        let bytes = encode_indexed(object, index, tile_count)?;
        let meta = ObjectMeta { offset, width: object.width() as u8, height: object.height() as u8 };
        metadata.extend_from_slice(&meta.to_bytes());
        stream.extend_from_slice(&bytes);
    }
    Ok((stream, metadata))
}
