//! JSON manifest for an unpacked tileset
//!
//! Everything except the tile pixels (which go to a PNG sheet) is stored
//! in a plain JSON document so it can be edited and diffed by hand.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::behavior::{BehaviorParseError, TileBehavior};
use crate::object::{Object, Slope, TileGrid, TileRef};
use crate::tileset::{Tileset, TILE_COUNT};

/// Error reading or converting a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest has {0} behaviors, expected 256")]
    BehaviorCount(usize),
    #[error("behavior {index}: {source}")]
    Behavior { index: usize, source: BehaviorParseError },
    #[error("object {0}: rows must be non-empty and all the same length")]
    ObjectShape(usize),
    #[error("slot {0} is out of range (0-3)")]
    Slot(u8),
}

/// Serialized form of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// `[kind, rows]`
    #[serde(default)]
    pub upper_slope: [u8; 2],
    #[serde(default)]
    pub lower_slope: [u8; 2],
    /// `[repeat, tile, slot_byte]` per cell
    pub rows: Vec<Vec<[u8; 3]>>,
}

/// Serialized form of a tileset, minus pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub slot: u8,
    /// 256 hex strings, see [`TileBehavior::to_hex`]
    pub behaviors: Vec<String>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

impl From<&Object> for ObjectEntry {
    fn from(object: &Object) -> Self {
        Self {
            upper_slope: [object.upper_slope.kind, object.upper_slope.rows],
            lower_slope: [object.lower_slope.kind, object.lower_slope.rows],
            rows: object
                .tiles
                .rows()
                .map(|row| row.iter().map(|t| t.to_bytes()).collect())
                .collect(),
        }
    }
}

impl ObjectEntry {
    fn to_object(&self, index: usize) -> Result<Object, ManifestError> {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(|&[a, b, c]| TileRef::new(a, b, c)).collect())
            .collect();
        let tiles = TileGrid::from_rows(rows)
            .filter(|g| g.width() > 0 && g.height() > 0)
            .ok_or(ManifestError::ObjectShape(index))?;
        Ok(Object::with_slopes(
            tiles,
            Slope::new(self.upper_slope[0], self.upper_slope[1]),
            Slope::new(self.lower_slope[0], self.lower_slope[1]),
        ))
    }
}

impl Manifest {
    pub fn from_tileset(tileset: &Tileset) -> Self {
        Self {
            name: tileset.name.clone(),
            slot: tileset.slot,
            behaviors: tileset.tiles().iter().map(|t| t.behavior.to_hex()).collect(),
            objects: tileset.objects.iter().map(ObjectEntry::from).collect(),
        }
    }

    /// Apply names, behaviors and objects onto `tileset`, leaving its images alone.
    ///
    /// The tileset is only modified once the whole manifest has been validated.
    pub fn apply(&self, tileset: &mut Tileset) -> Result<(), ManifestError> {
        if self.slot > 3 {
            return Err(ManifestError::Slot(self.slot));
        }
        if self.behaviors.len() != TILE_COUNT {
            return Err(ManifestError::BehaviorCount(self.behaviors.len()));
        }

        let mut behaviors = [TileBehavior::default(); TILE_COUNT];
        for (index, (slot, hex)) in behaviors.iter_mut().zip(&self.behaviors).enumerate() {
            *slot = TileBehavior::from_hex(hex).map_err(|source| ManifestError::Behavior { index, source })?;
        }
        let objects = self
            .objects
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_object(index))
            .collect::<Result<Vec<_>, _>>()?;

        tileset.name = self.name.clone();
        tileset.slot = self.slot;
        tileset.set_behaviors(&behaviors);
        tileset.objects = objects;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
