//! Resolved control state.
//!
//! The host polls its devices and hands the simulation one of these per
//! player per step. It also travels over the network unchanged.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Bitflags for the controls held during a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ControlState {
    /// Raw bitfield of held controls
    pub bits: u16,
}

impl ControlState {
    // Directions
    pub const UP: u16 = 1 << 0;
    pub const DOWN: u16 = 1 << 1;
    pub const LEFT: u16 = 1 << 2;
    pub const RIGHT: u16 = 1 << 3;

    // Actions
    pub const JUMP: u16 = 1 << 4;
    pub const SWIM: u16 = 1 << 5;
    pub const FIRE: u16 = 1 << 6;
    pub const CHANGE: u16 = 1 << 7; // Cycle ammo type

    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    #[inline]
    pub fn is_set(&self, flag: u16) -> bool {
        (self.bits & flag) != 0
    }

    #[inline]
    pub fn set(&mut self, flag: u16) {
        self.bits |= flag;
    }

    #[inline]
    pub fn clear(&mut self, flag: u16) {
        self.bits &= !flag;
    }

    pub fn up(&self) -> bool {
        self.is_set(Self::UP)
    }

    pub fn down(&self) -> bool {
        self.is_set(Self::DOWN)
    }

    pub fn left(&self) -> bool {
        self.is_set(Self::LEFT)
    }

    pub fn right(&self) -> bool {
        self.is_set(Self::RIGHT)
    }

    pub fn jump(&self) -> bool {
        self.is_set(Self::JUMP)
    }

    pub fn swim(&self) -> bool {
        self.is_set(Self::SWIM)
    }

    pub fn fire(&self) -> bool {
        self.is_set(Self::FIRE)
    }

    pub fn change(&self) -> bool {
        self.is_set(Self::CHANGE)
    }
}
