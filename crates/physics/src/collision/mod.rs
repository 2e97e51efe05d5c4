//! Tile-mask collision queries.
//!
//! The static level geometry is exposed to the simulation only through the
//! [`TileMask`] oracle: pixel-precise solidity queries that depend on the
//! direction of approach, plus a hazard predicate. [`MaskGrid`] is the
//! in-memory implementation built from per-tile 8x8 masks.
//!
//! # Conventions
//!
//! - Queries take fixed-point positions.
//! - Solidity is resolved at 4-pixel cell granularity; the movement resolver
//!   steps in the same 4-pixel units so it can never skip a cell.

mod flags;
mod mask;

pub use flags::TileFlags;
pub use mask::{MaskError, MaskGrid, TileShape};

use crate::fixed::Fixed;

/// Answers collision questions about the static level geometry.
pub trait TileMask {
    /// Whether the point blocks something moving down onto it.
    fn is_solid_down(&self, x: Fixed, y: Fixed) -> bool;

    /// Whether the point blocks something moving up or sideways into it.
    fn is_solid_up(&self, x: Fixed, y: Fixed) -> bool;

    /// Whether the point hurts on contact.
    fn is_hazard(&self, x: Fixed, y: Fixed) -> bool;

    /// Level size in tiles, as `(width, height)`.
    fn size(&self) -> (u16, u16);
}
