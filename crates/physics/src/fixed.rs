//! Fixed-point arithmetic.
//!
//! Every position, velocity and acceleration in the simulation is a [`Fixed`]
//! value with 10 fractional bits. Integer math keeps the simulation identical
//! on every platform, which lockstep peers and replays depend on.
//!
//! Two unit systems are in play: pixels (`itof`/`ftoi`) and 32-pixel tiles
//! (`ttof`/`ftot`).

/// A fixed-point number with [`FRAC_BITS`] fractional bits.
pub type Fixed = i32;

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 10;

/// Tile edge length in pixels, as a shift.
pub const TILE_BITS: u32 = 5;

/// Tile edge length in pixels.
pub const TILE_SIZE: i32 = 1 << TILE_BITS;

pub const F1: Fixed = 1 << FRAC_BITS;
pub const F2: Fixed = F1 * 2;
pub const F4: Fixed = F1 * 4;
pub const F8: Fixed = F1 * 8;
pub const F10: Fixed = F1 * 10;
pub const F12: Fixed = F1 * 12;
pub const F16: Fixed = F1 * 16;
pub const F20: Fixed = F1 * 20;
pub const F24: Fixed = F1 * 24;
pub const F28: Fixed = F1 * 28;
pub const F32: Fixed = F1 * 32;
pub const F36: Fixed = F1 * 36;
pub const F40: Fixed = F1 * 40;
pub const F64: Fixed = F1 * 64;
pub const F80: Fixed = F1 * 80;
pub const F100: Fixed = F1 * 100;
pub const F160: Fixed = F1 * 160;
pub const F192: Fixed = F1 * 192;

/// Mask selecting the sub-cell part of a position inside a 4-pixel cell.
pub const CELL_MASK: Fixed = F4 - 1;

/// Pixels to fixed.
#[inline]
pub const fn itof(pixels: i32) -> Fixed {
    pixels << FRAC_BITS
}

/// Fixed to pixels, rounding toward negative infinity.
#[inline]
pub const fn ftoi(value: Fixed) -> i32 {
    value >> FRAC_BITS
}

/// Tiles to fixed.
#[inline]
pub const fn ttof(tiles: i32) -> Fixed {
    tiles << (FRAC_BITS + TILE_BITS)
}

/// Fixed to tiles, rounding toward negative infinity.
#[inline]
pub const fn ftot(value: Fixed) -> i32 {
    value >> (FRAC_BITS + TILE_BITS)
}

/// Pixels to tiles.
#[inline]
pub const fn itot(pixels: i32) -> i32 {
    pixels >> TILE_BITS
}

/// Tiles to pixels.
#[inline]
pub const fn ttoi(tiles: i32) -> i32 {
    tiles << TILE_BITS
}

/// Fixed-point multiply through a 64-bit intermediate.
#[inline]
pub const fn fmul(a: Fixed, b: Fixed) -> Fixed {
    ((a as i64 * b as i64) >> FRAC_BITS) as Fixed
}

/// Fixed-point divide through a 64-bit intermediate. Returns 0 on divide by zero.
#[inline]
pub const fn fdiv(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    (((a as i64) << FRAC_BITS) / b as i64) as Fixed
}

/// Distance covered by `velocity` (fixed per second) over `msps` milliseconds.
#[inline]
pub const fn step_delta(velocity: Fixed, msps: i32) -> Fixed {
    (velocity * msps) >> FRAC_BITS
}
