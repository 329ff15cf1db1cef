//! Identity Hald CLUT synthesis.
//!
//! The cube is laid out as an 8×8 grid of 64×64 tiles. The tile index is the
//! blue level; inside a tile, x is red and y is green:
//!
//! ```text
//!   tile  = b                     (tile_x = b % 8, tile_y = b / 8)
//!   x     = tile_x * 64 + r
//!   y     = tile_y * 64 + g
//!   value = round(level * 255 / 63)
//! ```

use crate::image::{CHANNELS, PixelBuffer};
use crate::parallel::{ExecContext, fill_rows};

/// Levels per channel.
pub const HALD_LEVELS: u32 = 64;
/// Tiles per row and column of the grid.
pub const HALD_TILES: u32 = 8;
/// Side of the square Hald image in pixels.
pub const HALD_SIZE: u32 = HALD_LEVELS * HALD_TILES;

/// 8-bit code value of a cube level.
#[inline]
pub fn level_to_code(level: u32) -> u8 {
    (level as f32 * 255.0 / (HALD_LEVELS - 1) as f32).round() as u8
}

/// Cube coordinates `(r, g, b)` of a Hald pixel.
#[inline]
pub fn hald_levels_at(x: u32, y: u32) -> (u32, u32, u32) {
    let b = (y / HALD_LEVELS) * HALD_TILES + x / HALD_LEVELS;
    (x % HALD_LEVELS, y % HALD_LEVELS, b)
}

/// Generate the 512×512 identity Hald image.
pub fn generate_hald() -> PixelBuffer {
    let row_len = HALD_SIZE as usize * CHANNELS;
    let mut data = vec![0u8; row_len * HALD_SIZE as usize];

    fill_rows(&mut data, row_len, &ExecContext::default(), |y, row| {
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let (r, g, b) = hald_levels_at(x as u32, y as u32);
            px.copy_from_slice(&[level_to_code(r), level_to_code(g), level_to_code(b), 255]);
        }
    });

    PixelBuffer::from_parts(HALD_SIZE, HALD_SIZE, data)
}
