//! Tile behavior table
//!
//! Each of the 256 tiles carries an 8-byte behavior record (collision,
//! terrain, parameters). The table is stored as 256 consecutive records
//! with no header or delimiters.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, TilesetError};
use crate::tileset::TILE_COUNT;

/// Bytes per behavior record
pub const BEHAVIOR_SIZE: usize = 8;
/// Size of the behavior table blob
pub const BEHAVIOR_TABLE_BYTES: usize = TILE_COUNT * BEHAVIOR_SIZE;

/// One tile's raw behavior bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileBehavior(pub [u8; BEHAVIOR_SIZE]);

/// Failure to parse a behavior hex string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BehaviorParseError {
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    #[error("expected 16 hex digits, got {0}")]
    InvalidLength(usize),
}

impl TileBehavior {
    pub fn is_empty(&self) -> bool {
        self.0 == [0; BEHAVIOR_SIZE]
    }

    /// Hex form grouped in 16-bit words, e.g. `0000 0001 0800 0000`.
    pub fn to_hex(&self) -> String {
        self.0
            .chunks(2)
            .map(|pair| format!("{:02x}{:02x}", pair[0], pair[1]))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse the form produced by [`TileBehavior::to_hex`]. Whitespace is ignored.
    pub fn from_hex(s: &str) -> std::result::Result<Self, BehaviorParseError> {
        let digits: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(bad) = digits.iter().find(|c| !c.is_ascii_hexdigit()) {
            return Err(BehaviorParseError::InvalidHex(*bad));
        }
        if digits.len() != BEHAVIOR_SIZE * 2 {
            return Err(BehaviorParseError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; BEHAVIOR_SIZE];
        for (byte, pair) in bytes.iter_mut().zip(digits.chunks(2)) {
            // Both digits were validated above
            let hi = pair[0].to_digit(16).unwrap_or(0) as u8;
            let lo = pair[1].to_digit(16).unwrap_or(0) as u8;
            *byte = hi << 4 | lo;
        }
        Ok(TileBehavior(bytes))
    }

    /// Informational breakdown of the record.
    pub fn describe(&self) -> BehaviorInfo {
        let core = CoreType::classify(self);
        BehaviorInfo {
            core,
            parameter: core.parameter_name(self.0[7]),
            properties: Property::ALL.iter().copied().filter(|p| p.is_set(self)).collect(),
            terrain: terrain_name(self.0[5]),
        }
    }
}

impl fmt::Display for TileBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Decode the 2048-byte behavior table.
pub fn decode_behaviors(buffer: &[u8]) -> Result<[TileBehavior; TILE_COUNT]> {
    if buffer.len() != BEHAVIOR_TABLE_BYTES {
        return Err(TilesetError::size("behavior table", BEHAVIOR_TABLE_BYTES, buffer.len()));
    }

    let mut records = [TileBehavior::default(); TILE_COUNT];
    for (record, chunk) in records.iter_mut().zip(buffer.chunks_exact(BEHAVIOR_SIZE)) {
        record.0.copy_from_slice(chunk);
    }
    Ok(records)
}

/// Encode 256 behavior records into the table blob.
pub fn encode_behaviors(records: &[TileBehavior; TILE_COUNT]) -> Vec<u8> {
    records.iter().flat_map(|r| r.0).collect()
}

/// Primary classification of a tile, as shown by the info panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoreType {
    Default,
    Slope,
    ReverseSlope,
    PartialBlock,
    Coin,
    ExplodableBlock,
    ClimbableGrid,
    Spike,
    Pipe,
}

impl CoreType {
    /// First matching flag wins, in this order.
    fn classify(b: &TileBehavior) -> Self {
        let [_, b1, b2, b3, ..] = b.0;
        if b3 & 0x20 != 0 {
            CoreType::Slope
        } else if b3 & 0x40 != 0 {
            CoreType::ReverseSlope
        } else if b2 & 0x08 != 0 {
            CoreType::PartialBlock
        } else if b3 & 0x02 != 0 {
            CoreType::Coin
        } else if b3 & 0x08 != 0 {
            CoreType::ExplodableBlock
        } else if b2 & 0x04 != 0 {
            CoreType::ClimbableGrid
        } else if b2 & 0x10 != 0 {
            CoreType::Spike
        } else if b1 & 0x01 != 0 {
            CoreType::Pipe
        } else {
            CoreType::Default
        }
    }

    /// Byte-7 parameter names for this core type.
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            CoreType::Default => &GENERIC_PARAMS,
            CoreType::Slope => &SLOPE_PARAMS,
            CoreType::ReverseSlope => &REVERSE_SLOPE_PARAMS,
            CoreType::PartialBlock => &PARTIAL_BLOCK_PARAMS,
            CoreType::Coin => &COIN_PARAMS,
            CoreType::ExplodableBlock => &EXPLODABLE_BLOCK_PARAMS,
            CoreType::ClimbableGrid => &CLIMBABLE_GRID_PARAMS,
            CoreType::Spike => &SPIKE_PARAMS,
            CoreType::Pipe => &PIPE_PARAMS,
        }
    }

    /// Parameter name for byte 7, or [`UNKNOWN`].
    ///
    /// Default tiles use sparse values: 0x23 and 0x28 are the first two
    /// entries, and 0x35 onwards counts from the third.
    pub fn parameter_name(self, value: u8) -> &'static str {
        let index = match self {
            CoreType::Default => match value {
                0x23 => 1,
                0x28 => 2,
                v if v >= 0x35 => (v - 0x32) as usize,
                _ => 0,
            },
            _ => value as usize,
        };
        self.parameters().get(index).copied().unwrap_or(UNKNOWN)
    }

    pub fn name(self) -> &'static str {
        match self {
            CoreType::Default => "Default",
            CoreType::Slope => "Slope",
            CoreType::ReverseSlope => "Reverse Slope",
            CoreType::PartialBlock => "Partial Block",
            CoreType::Coin => "Coin",
            CoreType::ExplodableBlock => "Explodable Block",
            CoreType::ClimbableGrid => "Climbable Grid",
            CoreType::Spike => "Spike",
            CoreType::Pipe => "Pipe",
        }
    }
}

/// Independent flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Property {
    Solid,
    Breakable,
    PassThrough,
    PassDown,
    Falling,
    Ledge,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::Solid,
        Property::Breakable,
        Property::PassThrough,
        Property::PassDown,
        Property::Falling,
        Property::Ledge,
    ];

    /// (byte index, mask)
    fn bit(self) -> (usize, u8) {
        match self {
            Property::Solid => (3, 0x01),
            Property::Breakable => (3, 0x10),
            Property::PassThrough => (2, 0x80),
            Property::PassDown => (2, 0x20),
            Property::Falling => (1, 0x02),
            Property::Ledge => (1, 0x08),
        }
    }

    fn is_set(self, b: &TileBehavior) -> bool {
        let (index, mask) = self.bit();
        b.0[index] & mask != 0
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::Solid => "Solid",
            Property::Breakable => "Breakable",
            Property::PassThrough => "Pass-Through",
            Property::PassDown => "Pass-Down",
            Property::Falling => "Falling",
            Property::Ledge => "Ledge",
        }
    }
}

/// Shown for any lookup that falls outside a known table.
pub const UNKNOWN: &str = "Unknown";

const TERRAIN_TYPES: [&str; 16] = [
    "Default",
    "Ice",
    "Snow",
    "Quicksand",
    "Conveyor Belt Right",
    "Conveyor Belt Left",
    "Horiz. Climbing Rope",
    "Damage Tile",
    "Ledge",
    "Ladder",
    "Staircase",
    "Carpet",
    "Dusty",
    "Grass",
    "Muffled",
    "Beach Sand",
];

const GENERIC_PARAMS: [&str; 10] = [
    "None",
    "Beanstalk Stop",
    "Dash Coin",
    "Battle Coin",
    "Red Block Outline A",
    "Red Block Outline B",
    "Cave Entrance Right",
    "Cave Entrance Left",
    UNKNOWN,
    UNKNOWN,
];

const SLOPE_PARAMS: [&str; 19] = [
    "Steep Upslope",
    "Steep Downslope",
    "Upslope 1",
    "Upslope 2",
    "Downslope 1",
    "Downslope 2",
    "Steep Upslope 1",
    "Steep Upslope 2",
    "Steep Downslope 1",
    "Steep Downslope 2",
    "Slope Edge (solid)",
    "Gentle Upslope 1",
    "Gentle Upslope 2",
    "Gentle Upslope 3",
    "Gentle Upslope 4",
    "Gentle Downslope 1",
    "Gentle Downslope 2",
    "Gentle Downslope 3",
    "Gentle Downslope 4",
];

const REVERSE_SLOPE_PARAMS: [&str; 19] = [
    "Steep Downslope",
    "Steep Upslope",
    "Downslope 1",
    "Downslope 2",
    "Upslope 1",
    "Upslope 2",
    "Steep Downslope 1",
    "Steep Downslope 2",
    "Steep Upslope 1",
    "Steep Upslope 2",
    "Slope Edge (solid)",
    "Gentle Downslope 1",
    "Gentle Downslope 2",
    "Gentle Downslope 3",
    "Gentle Downslope 4",
    "Gentle Upslope 1",
    "Gentle Upslope 2",
    "Gentle Upslope 3",
    "Gentle Upslope 4",
];

const PARTIAL_BLOCK_PARAMS: [&str; 16] = [
    "None",
    "Upper Left",
    "Upper Right",
    "Top Half",
    "Lower Left",
    "Left Half",
    "Diagonal Downwards",
    "Upper Left 3/4",
    "Lower Right",
    "Diagonal Downwards",
    "Right Half",
    "Upper Right 3/4",
    "Lower Half",
    "Lower Left 3/4",
    "Lower Right 3/4",
    "Full Brick",
];

const COIN_PARAMS: [&str; 5] = ["Generic Coin", "Coin", "Nothing", "Coin", "Pow Block Coin"];

const EXPLODABLE_BLOCK_PARAMS: [&str; 7] =
    ["None", "Stone Block", "Wooden Block", "Red Block", UNKNOWN, UNKNOWN, UNKNOWN];

const CLIMBABLE_GRID_PARAMS: [&str; 11] = [
    "None",
    "Free Move",
    "Upper Left Corner",
    "Top",
    "Upper Right Corner",
    "Left Side",
    "Center",
    "Right Side",
    "Lower Left Corner",
    "Bottom",
    "Lower Right Corner",
];

const SPIKE_PARAMS: [&str; 8] = [
    "Double Left Spikes",
    "Double Right Spikes",
    "Double Upwards Spikes",
    "Double Downwards Spikes",
    "Long Spike Down 1",
    "Long Spike Down 2",
    "Single Downwards Spike",
    "Spike Block",
];

const PIPE_PARAMS: [&str; 32] = [
    "Vert. Top Entrance Left",
    "Vert. Top Entrance Right",
    "Vert. Bottom Entrance Left",
    "Vert. Bottom Entrance Right",
    "Vert. Center Left",
    "Vert. Center Right",
    "Vert. On Top Junction Left",
    "Vert. On Top Junction Right",
    "Horiz. Left Entrance Top",
    "Horiz. Left Entrance Bottom",
    "Horiz. Right Entrance Top",
    "Horiz. Right Entrance Bottom",
    "Horiz. Center Left",
    "Horiz. Center Right",
    "Horiz. On Top Junction Top",
    "Horiz. On Top Junction Bottom",
    "Vert. Mini Pipe Top",
    UNKNOWN,
    "Vert. Mini Pipe Bottom",
    UNKNOWN,
    UNKNOWN,
    UNKNOWN,
    "Vert. On Top Mini-Junction",
    UNKNOWN,
    "Horiz. Mini Pipe Left",
    UNKNOWN,
    "Horiz. Mini Pipe Right",
    UNKNOWN,
    "Vert. Mini Pipe Center",
    "Horiz. Mini Pipe Center",
    "Horiz. On Top Mini-Junction",
    "Block Covered Corner",
];

/// Terrain name for byte 5, or [`UNKNOWN`].
pub fn terrain_name(value: u8) -> &'static str {
    TERRAIN_TYPES.get(value as usize).copied().unwrap_or(UNKNOWN)
}

/// Human-readable breakdown of a behavior record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BehaviorInfo {
    pub core: CoreType,
    /// Byte-7 parameter, interpreted per core type
    pub parameter: &'static str,
    pub properties: Vec<Property>,
    pub terrain: &'static str,
}

impl fmt::Display for BehaviorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props = if self.properties.is_empty() {
            "None".to_string()
        } else {
            self.properties.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
        };
        write!(f, "{} ({}) / {} / {}", self.core.name(), self.parameter, props, self.terrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned_table() -> Vec<u8> {
        (0..BEHAVIOR_TABLE_BYTES).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let buffer = patterned_table();
        let records = decode_behaviors(&buffer).unwrap();
        assert_eq!(encode_behaviors(&records), buffer);
    }

    #[test]
    fn test_record_layout() {
        let buffer = patterned_table();
        let records = decode_behaviors(&buffer).unwrap();
        assert_eq!(records[1].0, buffer[8..16]);
        assert_eq!(records[255].0, buffer[2040..2048]);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut records = [TileBehavior::default(); TILE_COUNT];
        records[0] = TileBehavior([1, 2, 3, 4, 5, 6, 7, 8]);
        records[200] = TileBehavior([0xFF; 8]);
        let decoded = decode_behaviors(&encode_behaviors(&records)).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_wrong_size_rejected() {
        let err = decode_behaviors(&[0u8; 2047]).unwrap_err();
        assert!(matches!(err, TilesetError::Size { expected: 2048, actual: 2047, .. }));
        assert!(decode_behaviors(&[0u8; 2049]).is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let b = TileBehavior([0x00, 0x01, 0x08, 0x20, 0x00, 0x0d, 0x00, 0x23]);
        assert_eq!(b.to_hex(), "0001 0820 000d 0023");
        assert_eq!(TileBehavior::from_hex(&b.to_hex()), Ok(b));
        assert_eq!(TileBehavior::from_hex("00010820000D0023"), Ok(b));
    }

    #[test]
    fn test_hex_errors() {
        assert_eq!(TileBehavior::from_hex("0000"), Err(BehaviorParseError::InvalidLength(4)));
        assert_eq!(
            TileBehavior::from_hex("0000 0000 0000 00zz"),
            Err(BehaviorParseError::InvalidHex('z'))
        );
    }

    #[test]
    fn test_classify_priority() {
        // Slope bit wins over solid and coin
        let b = TileBehavior([0, 0, 0, 0x20 | 0x02 | 0x01, 0, 0, 0, 0]);
        let info = b.describe();
        assert_eq!(info.core, CoreType::Slope);
        assert_eq!(info.properties, vec![Property::Solid]);

        assert_eq!(TileBehavior([0, 1, 0, 0, 0, 0, 0, 0]).describe().core, CoreType::Pipe);
        assert_eq!(TileBehavior::default().describe().core, CoreType::Default);
    }

    #[test]
    fn test_terrain_unknown_sentinel() {
        assert_eq!(terrain_name(1), "Ice");
        assert_eq!(terrain_name(15), "Beach Sand");
        assert_eq!(terrain_name(16), UNKNOWN);
        assert_eq!(terrain_name(0xFF), UNKNOWN);
    }

    #[test]
    fn test_describe_display() {
        let b = TileBehavior([0, 0x08, 0x80, 0x01, 0, 2, 0, 0]);
        assert_eq!(b.describe().to_string(), "Default (None) / Solid, Pass-Through, Ledge / Snow");
        assert_eq!(TileBehavior::default().describe().to_string(), "Default (None) / None / Default");
    }

    #[test]
    fn test_parameter_per_core_type() {
        let pipe = TileBehavior([0, 0x01, 0, 0, 0, 0, 0, 0x1F]);
        assert_eq!(pipe.describe().parameter, "Block Covered Corner");
        let slope = TileBehavior([0, 0, 0, 0x20, 0, 0, 0, 10]);
        assert_eq!(slope.describe().parameter, "Slope Edge (solid)");
        let coin = TileBehavior([0, 0, 0, 0x02, 0, 0, 0, 5]);
        assert_eq!(coin.describe().parameter, UNKNOWN);
    }

    #[test]
    fn test_default_parameter_mapping() {
        assert_eq!(CoreType::Default.parameter_name(0x00), "None");
        assert_eq!(CoreType::Default.parameter_name(0x10), "None");
        assert_eq!(CoreType::Default.parameter_name(0x23), "Beanstalk Stop");
        assert_eq!(CoreType::Default.parameter_name(0x28), "Dash Coin");
        assert_eq!(CoreType::Default.parameter_name(0x35), "Battle Coin");
        assert_eq!(CoreType::Default.parameter_name(0x39), "Cave Entrance Left");
        assert_eq!(CoreType::Default.parameter_name(0x3C), UNKNOWN);
        assert_eq!(CoreType::Default.parameter_name(0xFF), UNKNOWN);
    }
}
