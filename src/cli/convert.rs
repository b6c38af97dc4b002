//! Unpack and pack commands
//!
//! `unpack` writes the tile sheet PNG and the JSON manifest (and optionally
//! the raw atlas) from an archive; `pack` does the reverse.

use std::path::Path;
use std::process::ExitCode;

use log::{debug, info};

use crate::archive::{Archive, LocatedAssets, MemoryArchive};
use crate::atlas;
use crate::compress::{Compressor, Passthrough, Progress};
use crate::config::PuzzleConfig;
use crate::manifest::Manifest;
use crate::output::{load_png, save_png};
use crate::pixel;
use crate::tileset::Tileset;

use super::{open_tileset, EXIT_ERROR, EXIT_SUCCESS};

fn fail(e: impl std::fmt::Display) -> ExitCode {
    eprintln!("Error: {}", e);
    ExitCode::from(EXIT_ERROR)
}

/// Execute the unpack command
pub fn run_unpack(archive_dir: &Path, output: &Path, config: &PuzzleConfig) -> ExitCode {
    let (archive, tileset) = match open_tileset(archive_dir) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let images: Vec<_> = if config.export.opaque {
        tileset.tiles().iter().map(|t| t.opaque()).collect()
    } else {
        tileset.images()
    };
    let sheet = match atlas::to_sheet(&images) {
        Ok(sheet) => sheet,
        Err(e) => return fail(e),
    };
    let sheet_path = output.join(&config.export.sheet);
    if let Err(e) = save_png(&sheet, &sheet_path) {
        return fail(e);
    }
    println!("Wrote {}", sheet_path.display());

    let manifest_path = output.join(&config.export.manifest);
    if let Err(e) = Manifest::from_tileset(&tileset).save(&manifest_path) {
        return fail(e);
    }
    println!("Wrote {}", manifest_path.display());

    if let Some(atlas_file) = config.atlas_file() {
        let atlas_path = output.join(atlas_file);
        if let Err(e) = export_atlas(&archive, config.export.opaque, &atlas_path) {
            return fail(e);
        }
        println!("Wrote {}", atlas_path.display());
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Write the stored texture as-is, borders included.
fn export_atlas(archive: &MemoryArchive, opaque: bool, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let found = LocatedAssets::scan(archive);
    let texture = found.texture.as_deref().and_then(|p| archive.get(p)).unwrap_or_default();
    let raw = Passthrough::new().decompress(texture)?;
    let image = if opaque { pixel::decode_texture_opaque(&raw)? } else { pixel::decode_texture(&raw)? };
    save_png(&image, path)?;
    Ok(())
}

/// Build a tileset from a sheet plus an optional manifest.
///
/// Without a manifest the name and slot come from the config and every
/// behavior is zero.
pub(crate) fn assemble(input: &Path, name: Option<&str>, config: &PuzzleConfig) -> Result<Tileset, Box<dyn std::error::Error>> {
    let sheet = load_png(&input.join(&config.export.sheet))?;
    let mut tileset = Tileset::new();
    tileset.set_images(atlas::from_sheet(&sheet)?)?;

    let manifest_path = input.join(&config.export.manifest);
    if manifest_path.is_file() {
        Manifest::load(&manifest_path)?.apply(&mut tileset)?;
        debug!("applied manifest {}", manifest_path.display());
    } else {
        info!("no manifest at {}, using config defaults", manifest_path.display());
        tileset.name = config.tileset.name.clone();
        tileset.slot = config.tileset.slot;
    }
    if let Some(name) = name {
        tileset.name = name.to_string();
    }
    Ok(tileset)
}

/// Execute the pack command
pub fn run_pack(input: &Path, output: &Path, name: Option<&str>, config: &PuzzleConfig) -> ExitCode {
    let tileset = match assemble(input, name, config) {
        Ok(tileset) => tileset,
        Err(e) => return fail(e),
    };

    let mut archive = if output.is_dir() {
        match MemoryArchive::load_dir(output) {
            Ok(archive) => archive,
            Err(e) => return fail(e),
        }
    } else {
        MemoryArchive::new()
    };

    let mut report = |p: Progress| eprint!("\rCompressing texture... {:>3}%", p.percent());
    let progress: Option<&mut dyn FnMut(Progress)> = if config.pack.progress { Some(&mut report) } else { None };
    let saved = tileset.save(&mut archive, &Passthrough::new(), progress);
    if config.pack.progress {
        eprintln!();
    }
    if let Err(e) = saved {
        return fail(e);
    }

    if let Err(e) = archive.save_dir(output) {
        return fail(e);
    }
    println!("Packed '{}' into {}", tileset.name, output.display());
    ExitCode::from(EXIT_SUCCESS)
}
