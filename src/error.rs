//! Error types shared by the tileset codecs

use thiserror::Error;

use crate::compress::CompressError;

/// Specific way an object byte stream broke the object grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatIssue {
    /// Stream ended before the 0xFF terminator
    #[error("stream ended before the end-of-object marker")]
    MissingTerminator,
    /// A 3-byte tile record was cut short by the end of the stream
    #[error("tile record truncated ({available} of 3 bytes available)")]
    TruncatedRecord { available: usize },
    /// Metadata points outside the object stream
    #[error("offset is outside the {len}-byte object stream")]
    OffsetOutOfRange { len: usize },
    /// More than an upper and a lower slope descriptor in one object
    #[error("third slope descriptor {0:#04x}")]
    ExtraSlope(u8),
    /// A row does not have the declared width
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow { row: usize, actual: usize, expected: usize },
    /// Parsed row count differs from the declared height
    #[error("object has {actual} rows, expected {expected}")]
    RowCount { actual: usize, expected: usize },
    /// Width or height of zero
    #[error("object has zero size ({width}x{height})")]
    Empty { width: usize, height: usize },
    /// Tile index beyond the tile count
    #[error("tile index {tile} is out of range for {tile_count} tiles")]
    TileIndex { tile: u8, tile_count: usize },
    /// First byte of a tile record would be read back as a control byte
    #[error("repeat byte {0:#04x} collides with the control byte range")]
    ControlByteInRecord(u8),
    /// A slope kind without its marker bit
    #[error("slope kind {0:#04x} is missing the 0x80 marker bit")]
    UnmarkedSlope(u8),
    /// Slope row counts don't cover the grid exactly
    #[error("slope rows {upper}+{lower} don't match height {height}")]
    SlopeRows { upper: u8, lower: u8, height: usize },
    /// Slope kind collides with a row or object terminator
    #[error("slope kind {0:#04x} is a reserved control byte")]
    ReservedSlopeKind(u8),
    /// Lower slope given without an upper slope
    #[error("lower slope set without an upper slope")]
    LowerWithoutUpper,
}

/// Error raised by the tileset codecs and the load/save path.
#[derive(Debug, Error)]
pub enum TilesetError {
    /// A buffer does not have the length its format requires
    #[error("{what} must be {expected} bytes, got {actual}")]
    Size { what: &'static str, expected: usize, actual: usize },
    /// An image or tile list does not have the required shape
    #[error("{what} must be {expected}, got {actual}")]
    Dimensions { what: &'static str, expected: String, actual: String },
    /// An object stream violates the object grammar
    #[error("object {object} at offset {offset:#06x}: {issue}")]
    Format { object: usize, offset: usize, issue: FormatIssue },
    /// Required blobs were not found in the archive
    #[error("missing tileset assets: {}", .0.join(", "))]
    MissingAsset(Vec<String>),
    /// A tile reference can't be written because it points past the tile table
    #[error("object {object} row {row} column {column}: tile {tile} is out of range for {tile_count} tiles")]
    UnresolvedReference { object: usize, row: usize, column: usize, tile: u8, tile_count: usize },
    /// The compression collaborator failed
    #[error("compression failed: {0}")]
    Compression(#[from] CompressError),
}

impl TilesetError {
    /// Shorthand for a byte-length mismatch.
    pub(crate) fn size(what: &'static str, expected: usize, actual: usize) -> Self {
        TilesetError::Size { what, expected, actual }
    }

    /// Shorthand for an image dimension mismatch.
    pub(crate) fn dimensions(what: &'static str, expected: (u32, u32), actual: (u32, u32)) -> Self {
        TilesetError::Dimensions {
            what,
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

pub type Result<T> = std::result::Result<T, TilesetError>;
