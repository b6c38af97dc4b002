//! Packed 16-bit texel codec for the tileset texture
//!
//! Every texel is a big-endian `u16` in one of two layouts, chosen by the
//! high bit:
//! - `1rrrrrgggggbbbbb` - RGB555, always opaque
//! - `0aaabbbbggggrrrr` - RGB4A3, 3-bit alpha and 4-bit color
//!
//! The raw texture is 1024x256 texels stored in 4x4 blocks. Blocks are
//! scanned left to right, top to bottom, and the 16 texels inside a block
//! are scanned row by row.

use image::{Rgba, RgbaImage};

use crate::error::{Result, TilesetError};

/// Width of the tileset texture in pixels
pub const TEXTURE_WIDTH: u32 = 1024;
/// Height of the tileset texture in pixels
pub const TEXTURE_HEIGHT: u32 = 256;
/// Size of the raw (uncompressed) texture blob in bytes
pub const TEXTURE_BYTES: usize = (TEXTURE_WIDTH * TEXTURE_HEIGHT * 2) as usize;

/// Edge length of a texel block
const BLOCK: u32 = 4;

/// Pixels with at least this alpha are stored as opaque RGB555
pub const OPAQUE_THRESHOLD: u8 = 245;

const RGB555_FLAG: u16 = 0x8000;

/// Which of the two packed layouts a texel uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    Rgb555,
    Rgb4a3,
}

impl TexelFormat {
    /// Layout of an encoded texel.
    pub fn of_texel(texel: u16) -> Self {
        if texel & RGB555_FLAG != 0 {
            TexelFormat::Rgb555
        } else {
            TexelFormat::Rgb4a3
        }
    }

    /// Layout the encoder picks for a pixel.
    pub fn for_pixel(pixel: Rgba<u8>) -> Self {
        if pixel[3] >= OPAQUE_THRESHOLD {
            TexelFormat::Rgb555
        } else {
            TexelFormat::Rgb4a3
        }
    }
}

/// Expand an `n`-bit component to 8 bits with truncating division.
fn expand(component: u16, max: u16) -> u8 {
    (component as u32 * 255 / max as u32) as u8
}

/// Reduce an 8-bit component to `bits` bits by truncating.
///
/// This is a shift, not `c * max / 255`, so re-encoding a decoded texel
/// gives back the same texel.
fn quantize(component: u8, bits: u32) -> u16 {
    (component >> (8 - bits)) as u16
}

/// Decode one packed texel to RGBA.
///
/// ```
/// use puzzle::pixel::decode_texel;
///
/// assert_eq!(decode_texel(0xFFFF), image::Rgba([255, 255, 255, 255]));
/// assert_eq!(decode_texel(0x0000), image::Rgba([0, 0, 0, 0]));
/// ```
pub fn decode_texel(texel: u16) -> Rgba<u8> {
    match TexelFormat::of_texel(texel) {
        TexelFormat::Rgb555 => {
            let r = expand((texel >> 10) & 0x1F, 0x1F);
            let g = expand((texel >> 5) & 0x1F, 0x1F);
            let b = expand(texel & 0x1F, 0x1F);
            Rgba([r, g, b, 0xFF])
        }
        TexelFormat::Rgb4a3 => {
            let a = expand((texel >> 12) & 0x7, 0x7);
            let b = expand((texel >> 8) & 0xF, 0xF);
            let g = expand((texel >> 4) & 0xF, 0xF);
            let r = expand(texel & 0xF, 0xF);
            Rgba([r, g, b, a])
        }
    }
}

/// Encode one RGBA pixel to a packed texel (lossy).
pub fn encode_texel(pixel: Rgba<u8>) -> u16 {
    let [r, g, b, a] = pixel.0;
    match TexelFormat::for_pixel(pixel) {
        TexelFormat::Rgb555 => {
            RGB555_FLAG | quantize(r, 5) << 10 | quantize(g, 5) << 5 | quantize(b, 5)
        }
        TexelFormat::Rgb4a3 => {
            quantize(a, 3) << 12 | quantize(b, 4) << 8 | quantize(g, 4) << 4 | quantize(r, 4)
        }
    }
}

/// Pixel coordinates of every texel, in storage order.
fn block_order() -> impl Iterator<Item = (u32, u32)> {
    (0..TEXTURE_HEIGHT).step_by(BLOCK as usize).flat_map(|block_y| {
        (0..TEXTURE_WIDTH).step_by(BLOCK as usize).flat_map(move |block_x| {
            (block_y..block_y + BLOCK)
                .flat_map(move |y| (block_x..block_x + BLOCK).map(move |x| (x, y)))
        })
    })
}

/// Decode a raw texture blob into a 1024x256 RGBA image.
///
/// # Errors
///
/// Returns `TilesetError::Size` unless the buffer is exactly
/// [`TEXTURE_BYTES`] long.
pub fn decode_texture(buffer: &[u8]) -> Result<RgbaImage> {
    decode_with(buffer, |pixel| pixel)
}

/// Decode a raw texture blob with every alpha forced to 255.
///
/// This is the alpha-stripped view used when inspecting tiles whose color
/// sits under fully transparent texels.
pub fn decode_texture_opaque(buffer: &[u8]) -> Result<RgbaImage> {
    decode_with(buffer, |Rgba([r, g, b, _])| Rgba([r, g, b, 0xFF]))
}

fn decode_with(buffer: &[u8], map: impl Fn(Rgba<u8>) -> Rgba<u8>) -> Result<RgbaImage> {
    if buffer.len() != TEXTURE_BYTES {
        return Err(TilesetError::size("raw texture", TEXTURE_BYTES, buffer.len()));
    }

    let mut image = RgbaImage::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
    for ((x, y), bytes) in block_order().zip(buffer.chunks_exact(2)) {
        let texel = u16::from_be_bytes([bytes[0], bytes[1]]);
        image.put_pixel(x, y, map(decode_texel(texel)));
    }
    Ok(image)
}

/// Encode a 1024x256 RGBA image into a raw texture blob.
///
/// # Errors
///
/// Returns `TilesetError::Dimensions` if the image is not 1024x256.
pub fn encode_texture(image: &RgbaImage) -> Result<Vec<u8>> {
    if image.dimensions() != (TEXTURE_WIDTH, TEXTURE_HEIGHT) {
        return Err(TilesetError::dimensions(
            "texture",
            (TEXTURE_WIDTH, TEXTURE_HEIGHT),
            image.dimensions(),
        ));
    }

    let mut buffer = Vec::with_capacity(TEXTURE_BYTES);
    for (x, y) in block_order() {
        buffer.extend_from_slice(&encode_texel(*image.get_pixel(x, y)).to_be_bytes());
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_zero_is_transparent_black() {
        assert_eq!(decode_texel(0x0000), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_decode_all_ones_is_opaque_white() {
        assert_eq!(decode_texel(0xFFFF), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_decode_rgb555_channels() {
        // red = 1, green = 16, blue = 31
        let texel = 0x8000 | 1 << 10 | 16 << 5 | 31;
        assert_eq!(decode_texel(texel), Rgba([8, 131, 255, 255]));
    }

    #[test]
    fn test_decode_rgb4a3_truncates() {
        // alpha = 3, blue = 1, green = 7, red = 15
        let texel = 3 << 12 | 1 << 8 | 7 << 4 | 15;
        // 3*255/7 = 109.28, 7*255/15 = 119
        assert_eq!(decode_texel(texel), Rgba([255, 119, 17, 109]));
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(TexelFormat::for_pixel(Rgba([10, 20, 30, 245])), TexelFormat::Rgb555);
        assert_eq!(TexelFormat::for_pixel(Rgba([10, 20, 30, 244])), TexelFormat::Rgb4a3);
        assert_ne!(encode_texel(Rgba([10, 20, 30, 245])) & 0x8000, 0);
        assert_eq!(encode_texel(Rgba([10, 20, 30, 244])) & 0x8000, 0);
    }

    #[test]
    fn test_encode_quantizes() {
        assert_eq!(encode_texel(Rgba([255, 255, 255, 255])), 0xFFFF);
        assert_eq!(encode_texel(Rgba([0, 0, 0, 0])), 0x0000);
        // 244 >> 5 = 7, 0x40 >> 4 = 4
        assert_eq!(encode_texel(Rgba([0x40, 0, 0, 244])), 0x7004);
        // 200 >> 3 = 25, where 200 * 31 / 255 would give 24
        assert_eq!(encode_texel(Rgba([200, 0, 0, 255])), 0x8000 | 25 << 10);
    }

    #[test]
    fn test_re_encoding_decoded_texels_is_stable() {
        for texel in 0..=u16::MAX {
            let pixel = decode_texel(texel);
            // RGB4A3 texels with full alpha are promoted to RGB555 on encode
            if TexelFormat::of_texel(texel) == TexelFormat::Rgb4a3 && pixel[3] >= OPAQUE_THRESHOLD {
                continue;
            }
            assert_eq!(encode_texel(pixel), texel, "texel {:#06x}", texel);
        }
    }

    #[test]
    fn test_block_order_first_block() {
        let coords: Vec<_> = block_order().take(17).collect();
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[3], (3, 0));
        assert_eq!(coords[4], (0, 1));
        assert_eq!(coords[15], (3, 3));
        // Second block starts to the right of the first
        assert_eq!(coords[16], (4, 0));
    }

    #[test]
    fn test_block_order_second_block_row() {
        // 256 blocks of 16 texels make up the first block row
        let coord = block_order().nth(256 * 16).unwrap();
        assert_eq!(coord, (0, 4));
        assert_eq!(block_order().count(), (TEXTURE_WIDTH * TEXTURE_HEIGHT) as usize);
    }

    #[test]
    fn test_zero_texture_round_trip() {
        let raw = vec![0u8; TEXTURE_BYTES];
        let image = decode_texture(&raw).unwrap();
        assert!(image.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
        assert_eq!(encode_texture(&image).unwrap(), raw);
    }

    #[test]
    fn test_decode_places_texels_in_blocks() {
        let mut raw = vec![0u8; TEXTURE_BYTES];
        // Fifth texel is (0, 1) in the first block
        raw[8] = 0xFF;
        raw[9] = 0xFF;
        let image = decode_texture(&raw).unwrap();
        assert_eq!(*image.get_pixel(0, 1), Rgba([255, 255, 255, 255]));
        assert_eq!(*image.get_pixel(4, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_decode_opaque_forces_alpha() {
        let raw = vec![0u8; TEXTURE_BYTES];
        let image = decode_texture_opaque(&raw).unwrap();
        assert_eq!(*image.get_pixel(100, 100), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_wrong_sizes_rejected() {
        assert!(matches!(
            decode_texture(&[0u8; 100]),
            Err(TilesetError::Size { expected: TEXTURE_BYTES, actual: 100, .. })
        ));
        let small = RgbaImage::new(512, 256);
        assert!(matches!(encode_texture(&small), Err(TilesetError::Dimensions { .. })));
    }
}
