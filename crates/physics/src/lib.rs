//! Hopper Physics
//!
//! Deterministic primitives for a tile-based platformer: fixed-point numbers,
//! a lookup-table sine, grid coordinates, the tile-mask collision oracle and
//! the movable body value type.
//!
//! # Determinism Rules
//!
//! 1. No floating point - every quantity is a [`Fixed`] or an integer
//! 2. No system time - callers pass elapsed milliseconds explicitly
//! 3. Lookup tables are built at compile time

pub mod collision;
pub mod fixed;
pub mod grid;
pub mod movable;
pub mod trig;

pub use collision::{MaskError, MaskGrid, TileFlags, TileMask, TileShape};
pub use fixed::Fixed;
pub use grid::GridPos;
pub use movable::Movable;
pub use trig::{fcos, fsin};
