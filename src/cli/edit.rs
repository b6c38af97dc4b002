//! Edit command - in-place tileset changes

use std::path::Path;
use std::process::ExitCode;

use crate::compress::Passthrough;

use super::{open_tileset, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the edit command
pub fn run_edit(archive_dir: &Path, slot: Option<u8>, clear_behaviors: bool, clear_objects: bool) -> ExitCode {
    if slot.is_none() && !clear_behaviors && !clear_objects {
        eprintln!("Error: nothing to do (use --slot, --clear-behaviors or --clear-objects)");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let (mut archive, mut tileset) = match open_tileset(archive_dir) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    if clear_objects {
        println!("Removed {} objects", tileset.objects.len());
        tileset.clear_objects();
    }
    if clear_behaviors {
        tileset.clear_behaviors();
        println!("Cleared behaviors");
    }
    if let Some(slot) = slot {
        tileset.set_slot(slot);
        println!("Moved to slot {}", slot);
    }

    if let Err(e) = tileset.save(&mut archive, &Passthrough::new(), None) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = archive.save_dir(archive_dir) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    ExitCode::from(EXIT_SUCCESS)
}
