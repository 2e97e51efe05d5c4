//! Event placement and per-cell bookkeeping.
//!
//! Each grid cell may name an event type. The cell also tracks how often its
//! event has been hit and when a destroyed event's cell is to be cleared.

use hopper_physics::GridPos;
use tracing::debug;

use crate::error::LevelError;
use crate::event::EventType;
use crate::player::PlayerId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EventCell {
    event: Option<u8>,
    hits: u8,
    clear_at: Option<u32>,
    active: bool,
}

/// Event types by grid cell.
#[derive(Debug, Clone)]
pub struct EventGrid {
    width: u16,
    height: u16,
    cells: Vec<EventCell>,
    types: Vec<EventType>,
}

impl EventGrid {
    /// An empty grid of `width` x `height` cells using the given type table.
    pub fn new(width: u16, height: u16, types: Vec<EventType>) -> Self {
        Self {
            width,
            height,
            cells: vec![EventCell::default(); width as usize * height as usize],
            types,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    fn cell(&self, pos: GridPos) -> Option<&EventCell> {
        self.index(pos).map(|index| &self.cells[index])
    }

    fn cell_mut(&mut self, pos: GridPos) -> Option<&mut EventCell> {
        self.index(pos).map(move |index| &mut self.cells[index])
    }

    /// Place event type `id` in a cell.
    pub fn place(&mut self, pos: GridPos, id: u8) -> Result<(), LevelError> {
        if id as usize >= self.types.len() {
            return Err(LevelError::UnknownEventType { pos, id });
        }
        let cell = self.cell_mut(pos).ok_or(LevelError::OutsideLevel { pos })?;
        *cell = EventCell {
            event: Some(id),
            ..EventCell::default()
        };
        Ok(())
    }

    /// The event type in a cell, if there is one.
    pub fn event_type(&self, pos: GridPos) -> Option<&EventType> {
        let id = self.cell(pos)?.event?;
        self.types.get(id as usize)
    }

    /// Remove the event from a cell.
    pub fn clear(&mut self, pos: GridPos) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.event = None;
            cell.clear_at = None;
            cell.hits = 0;
        }
    }

    /// Record a hit on the cell's event.
    ///
    /// Returns the hits remaining before destruction, `0` when this hit
    /// destroys it, or `-1` when the event cannot be hit.
    pub fn hit(&mut self, pos: GridPos, source: Option<PlayerId>) -> i32 {
        let Some(strength) = self.event_type(pos).map(|event_type| event_type.strength) else {
            return -1;
        };
        if strength == 0 {
            return -1;
        }
        let Some(cell) = self.cell_mut(pos) else {
            return -1;
        };
        cell.hits = cell.hits.saturating_add(1);
        let remaining = (strength as i32 - cell.hits as i32).max(0);
        if remaining == 0 {
            debug!(?pos, ?source, "event shot down");
        }
        remaining
    }

    /// Schedule the cell to be cleared at `time`.
    pub fn set_clear_time(&mut self, pos: GridPos, time: u32) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.clear_at = Some(time);
        }
    }

    /// Clear every cell whose scheduled time has passed.
    pub fn expire(&mut self, ticks: u32) {
        for cell in &mut self.cells {
            if cell.clear_at.is_some_and(|time| ticks >= time) {
                cell.event = None;
                cell.clear_at = None;
                cell.hits = 0;
            }
        }
    }

    /// Whether a live entity currently represents the cell's event.
    pub fn is_active(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(|cell| cell.active)
    }

    pub fn set_active(&mut self, pos: GridPos, active: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.active = active;
        }
    }
}
