//! Render target abstraction.
//!
//! The simulation never rasterises anything itself; it issues sprite blits,
//! filled rectangles and palette changes against a [`Canvas`]. Coordinates
//! are screen pixels.

use serde::{Deserialize, Serialize};

/// A sprite owned by the host, with its pixel size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteRef {
    pub id: u32,
    pub width: u16,
    pub height: u16,
}

impl SpriteRef {
    pub const fn new(id: u32, width: u16, height: u16) -> Self {
        Self { id, width, height }
    }
}

/// A palette owned by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaletteId(pub u8);

pub trait Canvas {
    fn draw_sprite(&mut self, sprite: SpriteRef, x: i32, y: i32);

    fn draw_filled_rect(&mut self, x: i32, y: i32, width: i32, height: i32, colour: u8);

    /// Remap the sprite's colours through `palette`.
    fn set_palette(&mut self, sprite: SpriteRef, palette: PaletteId);

    /// Draw the sprite entirely in colour `index` until restored.
    fn flash_palette(&mut self, sprite: SpriteRef, index: u8);

    fn restore_palette(&mut self, sprite: SpriteRef);
}

/// One call made against a [`RecordingCanvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Sprite { sprite: SpriteRef, x: i32, y: i32 },
    FilledRect { x: i32, y: i32, width: i32, height: i32, colour: u8 },
    SetPalette { sprite: SpriteRef, palette: PaletteId },
    FlashPalette { sprite: SpriteRef, index: u8 },
    RestorePalette { sprite: SpriteRef },
}

/// A canvas that only records what was asked of it.
///
/// Used by headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprite blits in call order.
    pub fn sprites(&self) -> impl Iterator<Item = (SpriteRef, i32, i32)> + '_ {
        self.calls.iter().filter_map(|call| match *call {
            DrawCall::Sprite { sprite, x, y } => Some((sprite, x, y)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn draw_sprite(&mut self, sprite: SpriteRef, x: i32, y: i32) {
        self.calls.push(DrawCall::Sprite { sprite, x, y });
    }

    fn draw_filled_rect(&mut self, x: i32, y: i32, width: i32, height: i32, colour: u8) {
        self.calls.push(DrawCall::FilledRect { x, y, width, height, colour });
    }

    fn set_palette(&mut self, sprite: SpriteRef, palette: PaletteId) {
        self.calls.push(DrawCall::SetPalette { sprite, palette });
    }

    fn flash_palette(&mut self, sprite: SpriteRef, index: u8) {
        self.calls.push(DrawCall::FlashPalette { sprite, index });
    }

    fn restore_palette(&mut self, sprite: SpriteRef) {
        self.calls.push(DrawCall::RestorePalette { sprite });
    }
}
