//! In-memory tile mask.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{TileFlags, TileMask};
use crate::fixed::{ftoi, Fixed, TILE_BITS, TILE_SIZE};

/// Pixels per mask cell, as a shift.
const CELL_BITS: u32 = 2;

/// Mask cells along one tile edge.
const CELLS_PER_TILE: u32 = 1 << (TILE_BITS - CELL_BITS);

/// Errors from building a [`MaskGrid`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaskError {
    #[error("tile ({x}, {y}) outside {width}x{height} mask")]
    OutOfBounds { x: u16, y: u16, width: u16, height: u16 },
}

/// Solidity of one tile as an 8x8 grid of 4-pixel cells.
///
/// Bit `row * 8 + col` is set when the cell is solid; row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileShape(pub u64);

impl TileShape {
    pub const EMPTY: Self = Self(0);
    pub const SOLID: Self = Self(u64::MAX);

    /// The bottom `rows` cell rows solid.
    pub const fn floor(rows: u32) -> Self {
        if rows >= CELLS_PER_TILE {
            return Self::SOLID;
        }
        Self(!(u64::MAX >> (rows * CELLS_PER_TILE)))
    }

    /// Build from eight row bytes, top first; bit `c` of a byte is column `c`.
    pub const fn from_rows(rows: [u8; 8]) -> Self {
        let mut bits = 0u64;
        let mut row = 0;
        while row < 8 {
            bits |= (rows[row] as u64) << (row * 8);
            row += 1;
        }
        Self(bits)
    }

    /// A ramp rising toward the right, one cell per column.
    pub const fn ramp_right() -> Self {
        let mut rows = [0u8; 8];
        let mut row = 0;
        while row < 8 {
            // columns 7 - row ..= 7
            rows[row] = (0xFFu16 << (7 - row)) as u8;
            row += 1;
        }
        Self::from_rows(rows)
    }

    #[inline]
    pub const fn is_set(self, col: u32, row: u32) -> bool {
        self.0 & (1 << (row * CELLS_PER_TILE + col)) != 0
    }
}

/// A tile mask for a rectangular level.
///
/// Anything left, right or above the map is solid; below the bottom edge is
/// open so that falling out of the level can be detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskGrid {
    width: u16,
    height: u16,
    shapes: Vec<TileShape>,
    flags: Vec<TileFlags>,
}

enum Probe {
    Solid,
    Open,
    Cell { index: usize, col: u32, row: u32 },
}

impl MaskGrid {
    /// An empty mask of `width` x `height` tiles.
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            shapes: vec![TileShape::EMPTY; len],
            flags: vec![TileFlags::NONE; len],
        }
    }

    fn index(&self, x: u16, y: u16) -> Result<usize, MaskError> {
        if x >= self.width || y >= self.height {
            return Err(MaskError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    pub fn set_tile(&mut self, x: u16, y: u16, shape: TileShape) -> Result<(), MaskError> {
        let index = self.index(x, y)?;
        self.shapes[index] = shape;
        Ok(())
    }

    pub fn set_flags(&mut self, x: u16, y: u16, flags: TileFlags) -> Result<(), MaskError> {
        let index = self.index(x, y)?;
        self.flags[index] = flags;
        Ok(())
    }

    /// Fill tiles `x0..=x1` by `y0..=y1` with one shape.
    pub fn fill(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, shape: TileShape) -> Result<(), MaskError> {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set_tile(x, y, shape)?;
            }
        }
        Ok(())
    }

    pub fn tile(&self, x: u16, y: u16) -> Option<(TileShape, TileFlags)> {
        let index = self.index(x, y).ok()?;
        Some((self.shapes[index], self.flags[index]))
    }

    fn probe(&self, x: Fixed, y: Fixed) -> Probe {
        let (px, py) = (ftoi(x), ftoi(y));
        if px < 0 || py < 0 || px >= self.width as i32 * TILE_SIZE {
            return Probe::Solid;
        }
        if py >= self.height as i32 * TILE_SIZE {
            return Probe::Open;
        }
        let index = (py >> TILE_BITS) as usize * self.width as usize + (px >> TILE_BITS) as usize;
        let cell_mask = TILE_SIZE - 1;
        Probe::Cell {
            index,
            col: ((px & cell_mask) >> CELL_BITS) as u32,
            row: ((py & cell_mask) >> CELL_BITS) as u32,
        }
    }
}

impl TileMask for MaskGrid {
    fn is_solid_down(&self, x: Fixed, y: Fixed) -> bool {
        match self.probe(x, y) {
            Probe::Solid => true,
            Probe::Open => false,
            Probe::Cell { index, col, row } => self.shapes[index].is_set(col, row),
        }
    }

    fn is_solid_up(&self, x: Fixed, y: Fixed) -> bool {
        match self.probe(x, y) {
            Probe::Solid => true,
            Probe::Open => false,
            Probe::Cell { index, col, row } => {
                !self.flags[index].contains(TileFlags::ONE_WAY) && self.shapes[index].is_set(col, row)
            }
        }
    }

    fn is_hazard(&self, x: Fixed, y: Fixed) -> bool {
        match self.probe(x, y) {
            Probe::Solid | Probe::Open => false,
            Probe::Cell { index, col, row } => {
                self.flags[index].contains(TileFlags::HAZARD) && self.shapes[index].is_set(col, row)
            }
        }
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::itof;

    fn grid() -> MaskGrid {
        let mut grid = MaskGrid::new(4, 3);
        grid.fill(0, 2, 3, 2, TileShape::SOLID).unwrap();
        grid.set_tile(1, 1, TileShape::floor(2)).unwrap();
        grid
    }

    #[test]
    fn floor_shape_rows() {
        let shape = TileShape::floor(2);
        assert!(!shape.is_set(0, 5));
        assert!(shape.is_set(0, 6));
        assert!(shape.is_set(7, 7));
        assert_eq!(TileShape::floor(8), TileShape::SOLID);
        assert_eq!(TileShape::floor(0), TileShape::EMPTY);
    }

    #[test]
    fn ramp_rises_to_the_right() {
        let ramp = TileShape::ramp_right();
        assert!(ramp.is_set(7, 0));
        assert!(!ramp.is_set(6, 0));
        assert!(ramp.is_set(0, 7));
        assert!(!ramp.is_set(0, 6));
    }

    #[test]
    fn pixel_queries() {
        let grid = grid();
        assert!(grid.is_solid_down(itof(10), itof(64)));
        assert!(!grid.is_solid_down(itof(40), itof(50)));
        // floor(2) covers the bottom 8 pixels of tile (1, 1)
        assert!(grid.is_solid_down(itof(40), itof(56)));
        assert!(!grid.is_solid_down(itof(40), itof(55)));
    }

    #[test]
    fn outside_the_map() {
        let grid = grid();
        assert!(grid.is_solid_down(-1, itof(10)));
        assert!(grid.is_solid_up(itof(128), itof(10)));
        assert!(grid.is_solid_up(itof(10), -1));
        assert!(!grid.is_solid_down(itof(10), itof(96)));
        assert!(!grid.is_hazard(-1, -1));
    }

    #[test]
    fn one_way_tiles_only_block_landing() {
        let mut grid = grid();
        grid.set_flags(1, 1, TileFlags::ONE_WAY).unwrap();
        assert!(grid.is_solid_down(itof(40), itof(60)));
        assert!(!grid.is_solid_up(itof(40), itof(60)));
    }

    #[test]
    fn hazard_needs_solid_pixel() {
        let mut grid = grid();
        grid.set_flags(1, 1, TileFlags::HAZARD).unwrap();
        assert!(grid.is_hazard(itof(40), itof(60)));
        assert!(!grid.is_hazard(itof(40), itof(40)));
        assert!(!grid.is_hazard(itof(10), itof(70)));
    }

    #[test]
    fn out_of_bounds_writes_fail() {
        let mut grid = grid();
        assert_eq!(
            grid.set_tile(4, 0, TileShape::SOLID),
            Err(MaskError::OutOfBounds { x: 4, y: 0, width: 4, height: 3 })
        );
        assert!(grid.tile(0, 3).is_none());
        assert_eq!(grid.size(), (4, 3));
    }
}
