//! Animation player.
//!
//! An [`Anim`] is an ordered list of sprite frames with per-frame pixel
//! offsets, plus the anchor points entities need: where bullets leave
//! (`shoot`), where an attached accessory animation is drawn, and a vertical
//! offset. The current frame is always derived from elapsed time by the
//! caller, never advanced incrementally, so drawing is stateless apart from
//! the last selected frame.

use bincode::{Decode, Encode};
use hopper_physics::fixed::{ftoi, itof, Fixed, F32};
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, PaletteId, SpriteRef};

/// Which way a character or event is turned. Selects mirrored animations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, 1 for right.
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn is_right(self) -> bool {
        self == Facing::Right
    }
}

/// Index of an animation in an [`AnimBank`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimId(pub u16);

/// One frame: a sprite and where it sits relative to the anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimFrame {
    pub sprite: SpriteRef,
    /// Horizontal offset in units of 4 pixels.
    pub x_offset: i8,
    /// Vertical offset in pixels.
    pub y_offset: i8,
}

/// Animation-wide anchor data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimData {
    pub frame_count: usize,
    pub shoot_x: i8,
    pub shoot_y: i8,
    /// Accessory anchor, horizontal part in units of 4 pixels.
    pub accessory_x: i8,
    pub accessory_y: i8,
    pub accessory: Option<AnimId>,
    pub y_offset: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anim {
    frames: Vec<AnimFrame>,
    frame: usize,
    shoot_x: i8,
    shoot_y: i8,
    accessory_x: i8,
    accessory_y: i8,
    accessory: Option<AnimId>,
    y_offset: i8,
    ignore_default_offset: bool,
}

impl Anim {
    pub fn new() -> Self {
        Self::default()
    }

    /// An animation with the given frames and no anchors.
    pub fn with_frames(frames: Vec<AnimFrame>) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Resize the frame storage. New frames are blank.
    pub fn set_frame_count(&mut self, count: usize) {
        self.frames.resize(count, AnimFrame::default());
        self.frame = self.frame.min(count.saturating_sub(1));
    }

    pub fn set_data(&mut self, data: AnimData) {
        self.set_frame_count(data.frame_count);
        self.shoot_x = data.shoot_x;
        self.shoot_y = data.shoot_y;
        self.accessory_x = data.accessory_x;
        self.accessory_y = data.accessory_y;
        self.accessory = data.accessory;
        self.y_offset = data.y_offset;
    }

    /// Select the frame for an absolute, time-derived index.
    ///
    /// Looping animations wrap, others hold their last frame.
    pub fn set_frame(&mut self, index: u32, looping: bool) {
        let count = self.frames.len();
        if count == 0 {
            return;
        }
        let index = index as usize;
        self.frame = if looping { index % count } else { index.min(count - 1) };
    }

    /// Fill the currently selected frame slot.
    pub fn set_frame_data(&mut self, sprite: SpriteRef, x_offset: i8, y_offset: i8) {
        if let Some(frame) = self.frames.get_mut(self.frame) {
            *frame = AnimFrame { sprite, x_offset, y_offset };
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn current(&self) -> Option<&AnimFrame> {
        self.frames.get(self.frame)
    }

    /// Current sprite, if the animation has frames.
    pub fn sprite(&self) -> Option<SpriteRef> {
        self.current().map(|frame| frame.sprite)
    }

    /// Width of the current frame in pixels.
    pub fn width(&self) -> i32 {
        self.current().map_or(0, |frame| frame.sprite.width as i32)
    }

    /// Height of the current frame in pixels.
    pub fn height(&self) -> i32 {
        self.current().map_or(0, |frame| frame.sprite.height as i32)
    }

    fn default_offset_applies(&self) -> bool {
        self.y_offset == 0 && !self.ignore_default_offset
    }

    /// Vertical distance from an entity's anchor to the animation's top.
    pub fn offset(&self) -> Fixed {
        let offset = itof(self.y_offset as i32);
        if self.default_offset_applies() {
            offset + F32
        } else {
            offset
        }
    }

    pub fn disable_default_offset(&mut self) {
        self.ignore_default_offset = true;
    }

    pub fn shoot_x(&self) -> Fixed {
        let x_offset = self.current().map_or(0, |frame| frame.x_offset as i32);
        itof(self.shoot_x as i32 + (x_offset << 2))
    }

    pub fn shoot_y(&self) -> Fixed {
        let y_offset = self.current().map_or(0, |frame| frame.y_offset as i32);
        itof(self.shoot_y as i32 + y_offset - self.y_offset as i32)
    }

    pub fn accessory_x(&self) -> Fixed {
        itof((self.accessory_x as i32) << 2)
    }

    pub fn accessory_y(&self) -> Fixed {
        itof(self.accessory_y as i32 - self.y_offset as i32)
    }

    /// The attached accessory animation, if any.
    pub fn accessory<'a>(&self, bank: &'a AnimBank) -> Option<&'a Anim> {
        self.accessory.and_then(|id| bank.get(id))
    }

    /// Bullet origin of the accessory in the current frame, relative to this
    /// animation's anchor. The frame's horizontal offset counts in whole
    /// pixels here.
    pub fn accessory_shoot_x(&self) -> Fixed {
        let x_offset = self.current().map_or(0, |frame| frame.x_offset as i32);
        itof(self.shoot_x as i32 + ((self.accessory_x as i32) << 2) + x_offset)
    }

    pub fn accessory_shoot_y(&self) -> Fixed {
        let y_offset = self.current().map_or(0, |frame| frame.y_offset as i32);
        itof(self.shoot_y as i32 + self.accessory_y as i32 + y_offset - self.y_offset as i32)
    }

    /// Draw the current frame with its anchor at `(x, y)`, screen-relative.
    pub fn draw(&self, canvas: &mut dyn Canvas, x: Fixed, y: Fixed) {
        let Some(frame) = self.current() else {
            return;
        };
        let px = ftoi(x) + ((frame.x_offset as i32) << 2) + 1;
        let py = if self.y_offset != 0 {
            ftoi(y) + frame.y_offset as i32 - self.y_offset as i32 + 1
        } else if self.ignore_default_offset {
            ftoi(y) + frame.y_offset as i32 + 1
        } else {
            ftoi(y) + frame.y_offset as i32 - 32 + 2
        };
        canvas.draw_sprite(frame.sprite, px, py);
    }

    /// Draw the current frame entirely in colour `index`.
    pub fn draw_flashed(&self, canvas: &mut dyn Canvas, x: Fixed, y: Fixed, index: u8) {
        self.flash_palette(canvas, index);
        self.draw(canvas, x, y);
        self.restore_palette(canvas);
    }

    pub fn set_palette(&self, canvas: &mut dyn Canvas, palette: PaletteId) {
        if let Some(sprite) = self.sprite() {
            canvas.set_palette(sprite, palette);
        }
    }

    pub fn flash_palette(&self, canvas: &mut dyn Canvas, index: u8) {
        if let Some(sprite) = self.sprite() {
            canvas.flash_palette(sprite, index);
        }
    }

    pub fn restore_palette(&self, canvas: &mut dyn Canvas) {
        if let Some(sprite) = self.sprite() {
            canvas.restore_palette(sprite);
        }
    }
}

/// All animations of a level, by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimBank {
    anims: Vec<Anim>,
}

impl AnimBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `anim` under `id`, growing the bank with empty animations.
    pub fn insert(&mut self, id: AnimId, anim: Anim) {
        let index = id.0 as usize;
        if index >= self.anims.len() {
            self.anims.resize(index + 1, Anim::default());
        }
        self.anims[index] = anim;
    }

    pub fn get(&self, id: AnimId) -> Option<&Anim> {
        self.anims.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: AnimId) -> Option<&mut Anim> {
        self.anims.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.anims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anims.is_empty()
    }
}
