//! Texture atlas layout - places the 256 tiles into the 1024x256 texture
//!
//! Each tile is 24x24 and sits in the middle of a 32x32 cell. The 4-pixel
//! border around it is filled by clamping to the nearest tile pixel so
//! filtered sampling near the tile edge does not bleed in neighboring
//! cells. The border is write-only; reading tiles back ignores it.
//!
//! Also converts tiles to and from a flat 384x384 sheet (16x16 tiles, no
//! border), which is the form tiles are edited in.

use image::{GenericImageView, RgbaImage};

use crate::error::{Result, TilesetError};
use crate::pixel::{TEXTURE_HEIGHT, TEXTURE_WIDTH};
use crate::tileset::TILE_COUNT;

/// Edge length of a tile image
pub const TILE_SIZE: u32 = 24;
/// Edge length of an atlas cell
pub const CELL_SIZE: u32 = 32;
/// Clamped border width on each side of a tile
pub const BORDER: u32 = (CELL_SIZE - TILE_SIZE) / 2;

/// Cells per atlas row
const ATLAS_COLUMNS: u32 = TEXTURE_WIDTH / CELL_SIZE;

/// Tiles per sheet row
const SHEET_COLUMNS: u32 = 16;
/// Edge length of the tile sheet
pub const SHEET_SIZE: u32 = SHEET_COLUMNS * TILE_SIZE;

/// Top-left corner of cell `index` in the atlas.
fn cell_origin(index: usize) -> (u32, u32) {
    let index = index as u32;
    ((index % ATLAS_COLUMNS) * CELL_SIZE, (index / ATLAS_COLUMNS) * CELL_SIZE)
}

/// Top-left corner of tile `index` in the sheet.
fn sheet_origin(index: usize) -> (u32, u32) {
    let index = index as u32;
    ((index % SHEET_COLUMNS) * TILE_SIZE, (index / SHEET_COLUMNS) * TILE_SIZE)
}

pub(crate) fn check_tiles(tiles: &[RgbaImage]) -> Result<()> {
    if tiles.len() != TILE_COUNT {
        return Err(TilesetError::Dimensions {
            what: "tile list",
            expected: format!("{} tiles", TILE_COUNT),
            actual: format!("{} tiles", tiles.len()),
        });
    }
    if let Some(tile) = tiles.iter().find(|t| t.dimensions() != (TILE_SIZE, TILE_SIZE)) {
        return Err(TilesetError::dimensions("tile", (TILE_SIZE, TILE_SIZE), tile.dimensions()));
    }
    Ok(())
}

/// Nearest interior coordinate for a cell-local coordinate.
fn clamp_to_tile(local: u32) -> u32 {
    local.clamp(BORDER, BORDER + TILE_SIZE - 1) - BORDER
}

/// Compose 256 tiles into the bordered atlas.
///
/// Every pixel of a cell reads the tile pixel nearest to it: interior
/// pixels map 1:1, edge borders repeat the adjacent row or column, and the
/// 4x4 corners repeat the tile's corner pixel.
///
/// # Errors
///
/// Returns `TilesetError::Dimensions` unless given exactly 256 tiles of 24x24.
pub fn composite(tiles: &[RgbaImage]) -> Result<RgbaImage> {
    check_tiles(tiles)?;

    let mut atlas = RgbaImage::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
    for (index, tile) in tiles.iter().enumerate() {
        let (cx, cy) = cell_origin(index);
        for y in 0..CELL_SIZE {
            for x in 0..CELL_SIZE {
                let pixel = *tile.get_pixel(clamp_to_tile(x), clamp_to_tile(y));
                atlas.put_pixel(cx + x, cy + y, pixel);
            }
        }
    }
    Ok(atlas)
}

/// Read the 256 tiles back out of an atlas, dropping the borders.
pub fn decompose(atlas: &RgbaImage) -> Result<Vec<RgbaImage>> {
    if atlas.dimensions() != (TEXTURE_WIDTH, TEXTURE_HEIGHT) {
        return Err(TilesetError::dimensions(
            "atlas",
            (TEXTURE_WIDTH, TEXTURE_HEIGHT),
            atlas.dimensions(),
        ));
    }

    Ok((0..TILE_COUNT)
        .map(|index| {
            let (cx, cy) = cell_origin(index);
            atlas.view(cx + BORDER, cy + BORDER, TILE_SIZE, TILE_SIZE).to_image()
        })
        .collect())
}

/// Lay tiles out edge to edge in a 384x384 sheet.
pub fn to_sheet(tiles: &[RgbaImage]) -> Result<RgbaImage> {
    check_tiles(tiles)?;

    let mut sheet = RgbaImage::new(SHEET_SIZE, SHEET_SIZE);
    for (index, tile) in tiles.iter().enumerate() {
        let (sx, sy) = sheet_origin(index);
        for (x, y, pixel) in tile.enumerate_pixels() {
            sheet.put_pixel(sx + x, sy + y, *pixel);
        }
    }
    Ok(sheet)
}

/// Cut a 384x384 sheet into 256 tiles.
pub fn from_sheet(sheet: &RgbaImage) -> Result<Vec<RgbaImage>> {
    if sheet.dimensions() != (SHEET_SIZE, SHEET_SIZE) {
        return Err(TilesetError::dimensions("tile sheet", (SHEET_SIZE, SHEET_SIZE), sheet.dimensions()));
    }

    Ok((0..TILE_COUNT)
        .map(|index| {
            let (sx, sy) = sheet_origin(index);
            sheet.view(sx, sy, TILE_SIZE, TILE_SIZE).to_image()
        })
        .collect())
}
