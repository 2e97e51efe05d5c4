//! Ammunition and weapon selection.
//!
//! The blaster is always available and never runs out. The four ammo slots
//! hold limited shots of toaster, missile, bouncer and TNT; slot `n` fires
//! bullet type `n + 1`.

use tracing::debug;

use crate::bullet::{BulletKind, BulletType};

pub const AMMO_SLOTS: usize = 4;
pub const TNT_SLOT: u8 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arsenal {
    ammo: [u16; AMMO_SLOTS],
    /// `None` is the blaster.
    selected: Option<u8>,
    /// Shots per second. Zero fires once per press.
    fire_speed: u8,
}

impl Arsenal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    pub fn ammo(&self) -> [u16; AMMO_SLOTS] {
        self.ammo
    }

    pub fn fire_speed(&self) -> u8 {
        self.fire_speed
    }

    pub fn set_fire_speed(&mut self, fire_speed: u8) {
        self.fire_speed = fire_speed;
    }

    pub fn add_ammo(&mut self, slot: u8, amount: u16) {
        if let Some(count) = self.ammo.get_mut(slot as usize) {
            *count = count.saturating_add(amount);
        }
    }

    /// Restore counts and selection wholesale, as received from a peer.
    pub(super) fn restore(&mut self, ammo: [u16; AMMO_SLOTS], selected: Option<u8>, fire_speed: u8) {
        self.ammo = ammo;
        self.selected = selected.filter(|slot| (*slot as usize) < AMMO_SLOTS);
        self.fire_speed = fire_speed;
    }

    /// What the selected weapon fires.
    pub fn bullet_kind(&self) -> BulletKind {
        match self.selected {
            None => BulletKind::Ammo(0),
            Some(TNT_SLOT) => BulletKind::Tnt,
            Some(slot) => BulletKind::Ammo(slot + 1),
        }
    }

    /// Whether the level defines something for the selected weapon to fire.
    pub fn is_usable(&self, bullet_types: &[BulletType]) -> bool {
        bullet_types
            .get(self.bullet_kind().type_index() as usize)
            .is_some_and(BulletType::is_usable)
    }

    /// First slot at or after `start` that has ammo.
    fn next_loaded(&self, start: usize) -> Option<u8> {
        (start..AMMO_SLOTS).find(|&slot| self.ammo[slot] > 0).map(|slot| slot as u8)
    }

    /// Spend one shot. An emptied slot, or thrown TNT, gives way to the next
    /// loaded slot.
    pub fn consume(&mut self) {
        let Some(slot) = self.selected else {
            return;
        };
        let count = &mut self.ammo[slot as usize];
        *count = count.saturating_sub(1);
        if *count == 0 || slot == TNT_SLOT {
            self.selected = self.next_loaded(slot as usize + 1);
            debug!(from = slot, to = ?self.selected, "ammo ran out");
        }
    }

    /// Switch to the next loaded weapon, wrapping round to the blaster.
    pub fn cycle(&mut self) {
        let start = self.selected.map_or(0, |slot| slot as usize + 1);
        self.selected = self.next_loaded(start);
        debug!(selected = ?self.selected, "ammo changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blaster_never_runs_out() {
        let mut arsenal = Arsenal::new();
        assert_eq!(arsenal.bullet_kind(), BulletKind::Ammo(0));
        arsenal.consume();
        assert_eq!(arsenal.selected(), None);
    }

    #[test]
    fn cycle_skips_empty_slots() {
        let mut arsenal = Arsenal::new();
        arsenal.add_ammo(1, 5);
        arsenal.add_ammo(TNT_SLOT, 2);

        arsenal.cycle();
        assert_eq!(arsenal.selected(), Some(1));
        assert_eq!(arsenal.bullet_kind(), BulletKind::Ammo(2));
        arsenal.cycle();
        assert_eq!(arsenal.bullet_kind(), BulletKind::Tnt);
        arsenal.cycle();
        assert_eq!(arsenal.selected(), None);
    }

    #[test]
    fn exhaustion_advances_to_the_next_loaded_slot() {
        let mut arsenal = Arsenal::new();
        arsenal.add_ammo(0, 1);
        arsenal.add_ammo(2, 1);
        arsenal.cycle();
        assert_eq!(arsenal.selected(), Some(0));

        arsenal.consume();
        assert_eq!(arsenal.ammo()[0], 0);
        assert_eq!(arsenal.selected(), Some(2));
        arsenal.consume();
        assert_eq!(arsenal.selected(), None);
    }

    #[test]
    fn thrown_tnt_returns_to_the_blaster() {
        let mut arsenal = Arsenal::new();
        arsenal.add_ammo(TNT_SLOT, 5);
        arsenal.cycle();
        assert_eq!(arsenal.bullet_kind(), BulletKind::Tnt);
        arsenal.consume();
        assert_eq!(arsenal.ammo()[TNT_SLOT as usize], 4);
        assert_eq!(arsenal.selected(), None);
    }

    #[test]
    fn usable_needs_a_defined_type() {
        let mut arsenal = Arsenal::new();
        assert!(!arsenal.is_usable(&[]));
        let mut blaster = BulletType::default();
        assert!(!arsenal.is_usable(&[blaster]));
        blaster.sprites[1] = Some(Default::default());
        assert!(arsenal.is_usable(&[blaster]));

        arsenal.add_ammo(0, 1);
        arsenal.cycle();
        assert!(!arsenal.is_usable(&[blaster]));
    }
}
