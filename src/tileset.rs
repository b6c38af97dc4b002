//! Tileset aggregate - 256 tiles plus the object list
//!
//! Owns the decoded data and drives the codecs when reading from or
//! writing to an [`Archive`]. A tileset is a plain value owned by the
//! caller; nothing here is global.

use image::{Rgba, RgbaImage};
use log::{debug, info, warn};

use crate::archive::{Archive, AssetPaths, LocatedAssets};
use crate::atlas::{self, TILE_SIZE};
use crate::behavior::{self, TileBehavior};
use crate::compress::{Compressor, ProgressFn};
use crate::error::{Result, TilesetError};
use crate::object::{self, Object, TileGrid, TileRef};
use crate::pixel;

/// Tiles per tileset
pub const TILE_COUNT: usize = 256;

/// Slot assigned to a blank tileset
pub const DEFAULT_SLOT: u8 = 1;

/// Internal name of a blank tileset
pub const DEFAULT_NAME: &str = "Pa1_untitled";

/// One 24x24 tile and its behavior record.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub image: RgbaImage,
    pub behavior: TileBehavior,
}

impl Tile {
    pub fn blank() -> Self {
        Self { image: RgbaImage::new(TILE_SIZE, TILE_SIZE), behavior: TileBehavior::default() }
    }

    /// Copy of the image with alpha forced to 255.
    pub fn opaque(&self) -> RgbaImage {
        let mut image = self.image.clone();
        for pixel in image.pixels_mut() {
            pixel[3] = 0xFF;
        }
        image
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::blank()
    }
}

/// Result of a display lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileLookup<'a> {
    Tile(&'a Tile),
    /// Reference points at another tileset slot or past the tile table
    Unknown,
}

/// Tiles, objects, and the slot they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    /// Internal name used for archive paths
    pub name: String,
    /// Source partition (0-3) of this tileset's own tiles
    pub slot: u8,
    tiles: Vec<Tile>,
    pub objects: Vec<Object>,
}

impl Default for Tileset {
    fn default() -> Self {
        Self::new()
    }
}

impl Tileset {
    /// 256 blank tiles, no objects.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            slot: DEFAULT_SLOT,
            tiles: vec![Tile::blank(); TILE_COUNT],
            objects: Vec::new(),
        }
    }

    /// Always [`TILE_COUNT`] tiles.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn tile_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    pub fn behaviors(&self) -> [TileBehavior; TILE_COUNT] {
        let mut out = [TileBehavior::default(); TILE_COUNT];
        for (slot, tile) in out.iter_mut().zip(&self.tiles) {
            *slot = tile.behavior;
        }
        out
    }

    pub fn set_behaviors(&mut self, behaviors: &[TileBehavior; TILE_COUNT]) {
        for (tile, behavior) in self.tiles.iter_mut().zip(behaviors) {
            tile.behavior = *behavior;
        }
    }

    pub fn images(&self) -> Vec<RgbaImage> {
        self.tiles.iter().map(|t| t.image.clone()).collect()
    }

    /// Replace every tile image.
    ///
    /// # Errors
    ///
    /// `TilesetError::Dimensions` unless given 256 images of 24x24; the
    /// tileset is unchanged on error.
    pub fn set_images(&mut self, images: Vec<RgbaImage>) -> Result<()> {
        atlas::check_tiles(&images)?;
        for (tile, image) in self.tiles.iter_mut().zip(images) {
            tile.image = image;
        }
        Ok(())
    }

    /// Append a 1x1 object pointing at tile 0 of this slot; returns its index.
    pub fn add_object(&mut self) -> usize {
        let tiles = TileGrid::filled(1, 1, TileRef::new(0, 0, self.slot));
        self.push_object(Object::new(tiles))
    }

    pub fn push_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Remove an object. Every later object moves down one index.
    pub fn remove_object(&mut self, index: usize) -> Option<Object> {
        if index < self.objects.len() {
            Some(self.objects.remove(index))
        } else {
            None
        }
    }

    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    /// Zero every behavior record.
    pub fn clear_behaviors(&mut self) {
        for tile in &mut self.tiles {
            tile.behavior = TileBehavior::default();
        }
    }

    /// Move the tileset to `slot`, retargeting its object references.
    ///
    /// Non-empty references and the first reference of each row get the new
    /// slot bits; item bits are kept.
    pub fn set_slot(&mut self, slot: u8) {
        let slot = slot & 0x03;
        self.slot = slot;
        for object in &mut self.objects {
            for row in object.tiles.rows_mut() {
                for (column, tile) in row.iter_mut().enumerate() {
                    if column == 0 || !tile.is_empty() {
                        *tile = tile.with_slot(slot);
                    }
                }
            }
        }
    }

    /// Look up the tile a reference shows, for display.
    pub fn resolve(&self, tile: &TileRef) -> TileLookup<'_> {
        if tile.slot() != self.slot {
            return TileLookup::Unknown;
        }
        match self.tiles.get(tile.tile as usize) {
            Some(t) => TileLookup::Tile(t),
            None => TileLookup::Unknown,
        }
    }

    /// Pixel of a display lookup; unknown references are transparent.
    pub fn resolve_pixel(&self, tile: &TileRef, x: u32, y: u32) -> Rgba<u8> {
        match self.resolve(tile) {
            TileLookup::Tile(t) if x < TILE_SIZE && y < TILE_SIZE => *t.image.get_pixel(x, y),
            _ => Rgba([0, 0, 0, 0]),
        }
    }

    /// Decode a tileset from an archive.
    pub fn from_archive<A: Archive + ?Sized>(archive: &A, compressor: &dyn Compressor) -> Result<Self> {
        let found = LocatedAssets::scan(archive);
        let missing = found.missing();
        if !missing.is_empty() {
            return Err(TilesetError::MissingAsset(missing));
        }

        let texture = blob(archive, &found.texture);
        let behaviors = blob(archive, &found.behaviors);
        let stream = blob(archive, &found.objects);
        let metadata = blob(archive, &found.metadata);
        debug!(
            "blobs: texture {} B, behaviors {} B, objects {} B, metadata {} B",
            texture.len(),
            behaviors.len(),
            stream.len(),
            metadata.len()
        );

        let raw = compressor.decompress(texture)?;
        let image = pixel::decode_texture(&raw)?;
        let images = atlas::decompose(&image)?;
        let behaviors = behavior::decode_behaviors(behaviors)?;
        let objects = object::decode_objects(stream, metadata, TILE_COUNT)?;

        let slot = match objects.first().and_then(|o| o.tiles.get(0, 0)) {
            Some(first) => first.slot(),
            None => {
                warn!("tileset has no objects, keeping default slot {}", DEFAULT_SLOT);
                DEFAULT_SLOT
            }
        };

        let tiles = images
            .into_iter()
            .zip(behaviors)
            .map(|(image, behavior)| Tile { image, behavior })
            .collect();
        let name = found.name().unwrap_or(DEFAULT_NAME).to_string();
        info!("loaded tileset '{}' (slot {}, {} objects)", name, slot, objects.len());

        Ok(Self { name, slot, tiles, objects })
    }

    /// Replace this tileset with one decoded from `archive`.
    ///
    /// All or nothing: on error `self` is left as it was.
    pub fn load<A: Archive + ?Sized>(&mut self, archive: &A, compressor: &dyn Compressor) -> Result<()> {
        *self = Self::from_archive(archive, compressor)?;
        Ok(())
    }

    /// Encode the four blobs without touching an archive.
    ///
    /// Returns `(compressed texture, behaviors, object stream, metadata)`.
    pub fn encode(
        &self,
        compressor: &dyn Compressor,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>)> {
        let image = atlas::composite(&self.images())?;
        let raw = pixel::encode_texture(&image)?;
        let (stream, metadata) = object::encode_objects(&self.objects, TILE_COUNT)?;
        let behaviors = behavior::encode_behaviors(&self.behaviors());
        let texture = compressor.compress(&raw, progress)?;
        debug!("texture compressed {} -> {} B", raw.len(), texture.len());
        Ok((texture, behaviors, stream, metadata))
    }

    /// Write the tileset into `archive` under its internal name.
    ///
    /// Nothing is written unless every blob encodes.
    pub fn save<A: Archive + ?Sized>(
        &self,
        archive: &mut A,
        compressor: &dyn Compressor,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<()> {
        let (texture, behaviors, stream, metadata) = self.encode(compressor, progress)?;
        let paths = AssetPaths::for_name(&self.name);
        archive.set(&paths.texture, texture);
        archive.set(&paths.behaviors, behaviors);
        archive.set(&paths.objects, stream);
        archive.set(&paths.metadata, metadata);
        info!("saved tileset '{}' ({} objects)", self.name, self.objects.len());
        Ok(())
    }
}

fn blob<'a, A: Archive + ?Sized>(archive: &'a A, path: &Option<String>) -> &'a [u8] {
    path.as_deref().and_then(|p| archive.get(p)).unwrap_or_default()
}
