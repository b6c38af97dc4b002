//! Puzzle - Library for reading and writing game tilesets
//!
//! This library provides functionality to:
//! - Decode and encode the 16-bit texel formats of the tileset texture
//! - Lay tiles out in the bordered texture atlas and in flat sheets
//! - Parse and serialize the object grammar and its metadata table
//! - Read and write the tile behavior table
//! - Load a [`tileset::Tileset`] from an archive and save it back

pub mod archive;
pub mod atlas;
pub mod behavior;
pub mod cli;
pub mod compress;
pub mod config;
pub mod error;
pub mod manifest;
pub mod object;
pub mod output;
pub mod pixel;
pub mod tileset;

pub use error::{Result, TilesetError};
pub use tileset::{Tile, TileLookup, Tileset};
