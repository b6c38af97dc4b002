//! Configuration schema types for `puzzle.toml`
//!
//! Defines the structure and validation rules for the tool configuration.

use serde::{Deserialize, Serialize};

use crate::tileset::{DEFAULT_NAME, DEFAULT_SLOT};

/// Tileset identity used when packing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetConfig {
    /// Internal name, determines the archive paths
    #[serde(default = "default_name")]
    pub name: String,
    /// Slot (0-3) of the tileset's own tiles
    #[serde(default = "default_slot")]
    pub slot: u8,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_slot() -> u8 {
    DEFAULT_SLOT
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self { name: default_name(), slot: default_slot() }
    }
}

/// File names written by `unpack` and read by `pack`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Strip alpha from the tile sheet
    #[serde(default)]
    pub opaque: bool,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Bordered atlas PNG; empty to skip
    #[serde(default)]
    pub atlas: String,
}

fn default_sheet() -> String {
    "tiles.png".to_string()
}

fn default_manifest() -> String {
    "tileset.json".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { opaque: false, sheet: default_sheet(), manifest: default_manifest(), atlas: String::new() }
    }
}

/// Packing behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Print compression progress to stderr
    #[serde(default = "default_true")]
    pub progress: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PackConfig {
    fn default() -> Self {
        Self { progress: true }
    }
}

/// Complete puzzle.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    #[serde(default)]
    pub tileset: TilesetConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub pack: PackConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "tileset.slot")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "puzzle.toml: '{}' {}", self.field, self.message)
    }
}

impl PuzzleConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
        };

        if self.tileset.name.is_empty() {
            push("tileset.name", "must be a non-empty string");
        } else if self.tileset.name.contains('/') {
            push("tileset.name", "must not contain '/'");
        }
        if self.tileset.slot > 3 {
            push("tileset.slot", "must be between 0 and 3");
        }
        if self.export.sheet.is_empty() {
            push("export.sheet", "must be a non-empty file name");
        }
        if self.export.manifest.is_empty() {
            push("export.manifest", "must be a non-empty file name");
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Atlas file name, if one should be written
    pub fn atlas_file(&self) -> Option<&str> {
        Some(self.export.atlas.as_str()).filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: PuzzleConfig = toml::from_str("").unwrap();
        assert_eq!(config, PuzzleConfig::default());
        assert_eq!(config.tileset.name, "Pa1_untitled");
        assert_eq!(config.tileset.slot, 1);
        assert_eq!(config.export.sheet, "tiles.png");
        assert!(config.pack.progress);
        assert!(config.atlas_file().is_none());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[tileset]
name = "Pa0_jyotyu"
slot = 0

[export]
opaque = true
sheet = "sheet.png"
manifest = "meta.json"
atlas = "atlas.png"

[pack]
progress = false
"#;
        let config: PuzzleConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tileset.name, "Pa0_jyotyu");
        assert_eq!(config.tileset.slot, 0);
        assert!(config.export.opaque);
        assert_eq!(config.export.manifest, "meta.json");
        assert_eq!(config.atlas_file(), Some("atlas.png"));
        assert!(!config.pack.progress);
        assert!(config.is_valid());
    }

    #[test]
    fn test_validation_slot_out_of_range() {
        let config: PuzzleConfig = toml::from_str("[tileset]\nslot = 4\n").unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "tileset.slot"));
    }

    #[test]
    fn test_validation_empty_names() {
        let toml = r#"
[tileset]
name = ""

[export]
sheet = ""
manifest = ""
"#;
        let config: PuzzleConfig = toml::from_str(toml).unwrap();
        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["tileset.name", "export.sheet", "export.manifest"]);
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigValidationError { field: "tileset.slot".into(), message: "bad".into() };
        assert_eq!(error.to_string(), "puzzle.toml: 'tileset.slot' bad");
    }
}
