//! CLI integration tests
//!
//! These run the `puzzle` binary against directory archives and check the
//! files and exit codes it produces.

use std::path::Path;
use std::process::{Command, Output};

use puzzle::archive::MemoryArchive;
use puzzle::behavior::TileBehavior;
use puzzle::compress::Passthrough;
use puzzle::object::{Object, TileGrid, TileRef};
use puzzle::Tileset;
use serial_test::serial;
use tempfile::TempDir;

fn puzzle(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_puzzle"))
        .args(args)
        .current_dir(cwd)
        // Keep a user config out of the way
        .env("XDG_CONFIG_HOME", cwd)
        .output()
        .expect("Failed to execute puzzle")
}

fn write_archive(dir: &Path) -> Tileset {
    let mut tileset = Tileset::new();
    tileset.name = "Pa1_cli".to_string();
    if let Some(tile) = tileset.tile_mut(3) {
        tile.behavior = TileBehavior([0, 0, 0, 0x01, 0, 0x02, 0, 0]);
    }
    tileset.push_object(Object::new(TileGrid::filled(2, 2, TileRef::new(0, 3, 1))));

    let mut archive = MemoryArchive::new();
    tileset.save(&mut archive, &Passthrough::new(), None).unwrap();
    archive.save_dir(dir).unwrap();
    tileset
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
#[serial]
fn test_info_summarizes_archive() {
    let temp = TempDir::new().unwrap();
    write_archive(&temp.path().join("arc"));

    let output = puzzle(&["info", "arc"], temp.path());
    assert!(output.status.success(), "info failed: {}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("Tileset: Pa1_cli"));
    assert!(text.contains("Objects: 1 (0 slopes)"));
    assert!(text.contains("Tiles with behavior: 1/256"));
}

#[test]
#[serial]
fn test_tile_and_bad_index() {
    let temp = TempDir::new().unwrap();
    write_archive(&temp.path().join("arc"));

    let output = puzzle(&["tile", "arc", "3"], temp.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("0000 0001 0002 0000"));

    let output = puzzle(&["tile", "arc", "256"], temp.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
#[serial]
fn test_objects_json() {
    let temp = TempDir::new().unwrap();
    write_archive(&temp.path().join("arc"));

    let output = puzzle(&["objects", "arc", "--json"], temp.path());
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["rows"][1][1], serde_json::json!([0, 3, 1]));

    let output = puzzle(&["objects", "arc", "--index", "7"], temp.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
#[serial]
fn test_unpack_then_pack_round_trip() {
    let temp = TempDir::new().unwrap();
    let original = write_archive(&temp.path().join("arc"));

    let output = puzzle(&["unpack", "arc", "-o", "out", "--atlas", "atlas.png"], temp.path());
    assert!(output.status.success(), "unpack failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(temp.path().join("out/tiles.png").is_file());
    assert!(temp.path().join("out/tileset.json").is_file());
    let atlas = image::open(temp.path().join("out/atlas.png")).unwrap();
    assert_eq!((atlas.width(), atlas.height()), (1024, 256));

    let output = puzzle(&["pack", "out", "-o", "packed", "--quiet"], temp.path());
    assert!(output.status.success(), "pack failed: {}", String::from_utf8_lossy(&output.stderr));

    let archive = MemoryArchive::load_dir(&temp.path().join("packed")).unwrap();
    let packed = Tileset::from_archive(&archive, &Passthrough::new()).unwrap();
    assert_eq!(packed, original);
}

#[test]
#[serial]
fn test_pack_uses_config_without_manifest() {
    let temp = TempDir::new().unwrap();
    write_archive(&temp.path().join("arc"));
    assert!(puzzle(&["unpack", "arc", "-o", "out"], temp.path()).status.success());
    std::fs::remove_file(temp.path().join("out/tileset.json")).unwrap();
    std::fs::write(temp.path().join("puzzle.toml"), "[tileset]\nname = \"Pa2_conf\"\nslot = 2\n").unwrap();

    let output = puzzle(&["pack", "out", "-o", "packed", "--quiet"], temp.path());
    assert!(output.status.success(), "pack failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(temp.path().join("packed/BG_tex/Pa2_conf_tex.bin.LZ").is_file());
}

#[test]
#[serial]
fn test_edit_slot_and_clear() {
    let temp = TempDir::new().unwrap();
    write_archive(&temp.path().join("arc"));

    let output = puzzle(&["edit", "arc", "--slot", "3", "--clear-behaviors"], temp.path());
    assert!(output.status.success(), "edit failed: {}", String::from_utf8_lossy(&output.stderr));

    let archive = MemoryArchive::load_dir(&temp.path().join("arc")).unwrap();
    let edited = Tileset::from_archive(&archive, &Passthrough::new()).unwrap();
    assert_eq!(edited.slot, 3);
    assert!(edited.tiles().iter().all(|t| t.behavior.is_empty()));

    assert_eq!(puzzle(&["edit", "arc"], temp.path()).status.code(), Some(2));
}

#[test]
#[serial]
fn test_missing_archive_fails() {
    let temp = TempDir::new().unwrap();
    let output = puzzle(&["info", "nope"], temp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}
