//! Read-only commands: info, objects, tile

use std::path::Path;
use std::process::ExitCode;

use crate::manifest::ObjectEntry;
use crate::object::Object;
use crate::tileset::{Tileset, TileLookup, TILE_COUNT};

use super::{open_tileset, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the info command
pub fn run_info(archive: &Path) -> ExitCode {
    let tileset = match open_tileset(archive) {
        Ok((_, tileset)) => tileset,
        Err(code) => return code,
    };

    let with_behavior = tileset.tiles().iter().filter(|t| !t.behavior.is_empty()).count();
    let slopes = tileset.objects.iter().filter(|o| o.is_slope()).count();

    println!("Tileset: {}", tileset.name);
    println!("Slot:    {}", tileset.slot);
    println!("Objects: {} ({} slopes)", tileset.objects.len(), slopes);
    println!("Tiles with behavior: {}/{}", with_behavior, TILE_COUNT);
    ExitCode::from(EXIT_SUCCESS)
}

fn object_line(index: usize, object: &Object, tileset: &Tileset) -> String {
    let mut line = format!("#{:<4} {}x{}", index, object.width(), object.height());
    if object.is_slope() {
        line.push_str(&format!(
            " slope {:#04x}/{} lower {:#04x}/{}",
            object.upper_slope.kind, object.upper_slope.rows, object.lower_slope.kind, object.lower_slope.rows
        ));
        if object.is_reverse_slope() {
            line.push_str(" reverse");
        }
    }
    let foreign = object
        .tiles
        .rows()
        .flatten()
        .filter(|t| !t.is_empty() && tileset.resolve(t) == TileLookup::Unknown)
        .count();
    if foreign > 0 {
        line.push_str(&format!(" ({} tiles from other slots)", foreign));
    }
    line
}

/// Execute the objects command
pub fn run_objects(archive: &Path, index: Option<usize>, json: bool) -> ExitCode {
    let tileset = match open_tileset(archive) {
        Ok((_, tileset)) => tileset,
        Err(code) => return code,
    };

    let selected: Vec<(usize, &Object)> = match index {
        Some(i) => match tileset.objects.get(i) {
            Some(object) => vec![(i, object)],
            None => {
                eprintln!("Error: object {} out of range ({} objects)", i, tileset.objects.len());
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        None => tileset.objects.iter().enumerate().collect(),
    };

    if json {
        let entries: Vec<ObjectEntry> = selected.iter().map(|(_, o)| ObjectEntry::from(*o)).collect();
        match serde_json::to_string_pretty(&entries) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        for (i, object) in selected {
            println!("{}", object_line(i, object, &tileset));
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the tile command
pub fn run_tile(archive: &Path, index: usize) -> ExitCode {
    let tileset = match open_tileset(archive) {
        Ok((_, tileset)) => tileset,
        Err(code) => return code,
    };

    let Some(tile) = tileset.tile(index) else {
        eprintln!("Error: tile index {} out of range (0-{})", index, TILE_COUNT - 1);
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    println!("Tile {}", index);
    println!("  raw:      {}", tile.behavior);
    println!("  behavior: {}", tile.behavior.describe());
    ExitCode::from(EXIT_SUCCESS)
}
