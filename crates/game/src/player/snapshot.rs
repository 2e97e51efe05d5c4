//! Player state exchanged between peers.
//!
//! A remote player is mirrored from the snapshots its owner sends after each
//! step. The encoding is bincode with fixed-width integers so every field
//! sits at the same offset in every message.

use bincode::{Decode, Encode};
use glam::IVec2;

use super::{ActiveReaction, LevelPlayer, PlayerId, AMMO_SLOTS};
use crate::anim::Facing;
use crate::error::SnapshotError;

fn wire_config() -> impl bincode::config::Config {
    bincode::config::standard().with_fixed_int_encoding()
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub pos: (i32, i32),
    pub vel: (i32, i32),
    pub energy: u8,
    pub shield: u8,
    pub facing: Facing,
    pub floating: bool,
    pub reaction: Option<ActiveReaction>,
    pub ammo: [u16; AMMO_SLOTS],
    pub selected: Option<u8>,
    pub fire_speed: u8,
    pub birds: u8,
}

impl LevelPlayer {
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            pos: (self.body.pos.x, self.body.pos.y),
            vel: (self.body.vel.x, self.body.vel.y),
            energy: self.energy,
            shield: self.shield,
            facing: self.facing,
            floating: self.floating,
            reaction: self.reaction,
            ammo: self.arsenal.ammo(),
            selected: self.arsenal.selected(),
            fire_speed: self.arsenal.fire_speed(),
            birds: self.birds.len().min(u8::MAX as usize) as u8,
        }
    }

    /// Take on a peer's state. The player keeps its own id.
    pub fn apply_snapshot(&mut self, snapshot: &PlayerSnapshot) {
        self.body.pos = IVec2::new(snapshot.pos.0, snapshot.pos.1);
        self.body.vel = IVec2::new(snapshot.vel.0, snapshot.vel.1);
        self.energy = snapshot.energy;
        self.shield = snapshot.shield;
        self.facing = snapshot.facing;
        self.floating = snapshot.floating;
        self.reaction = snapshot.reaction;
        self.arsenal.restore(snapshot.ammo, snapshot.selected, snapshot.fire_speed);
        self.set_birds(snapshot.birds as usize);
    }

    /// Encode this player's state for sending.
    pub fn send(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::encode_to_vec(self.snapshot(), wire_config())?)
    }

    /// Apply state received from a peer.
    pub fn receive(&mut self, data: &[u8]) -> Result<(), SnapshotError> {
        let (snapshot, _): (PlayerSnapshot, usize) = bincode::decode_from_slice(data, wire_config())?;
        self.apply_snapshot(&snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::fixture::TestEnv;
    use crate::player::{Reaction, TNT_SLOT, YELLOW_SHIELD};
    use hopper_physics::fixed::itof;
    use hopper_physics::GridPos;

    #[test]
    fn round_trip() {
        let env = TestEnv::flat();
        let mut sender = env.player_at(GridPos::new(7, 3));
        sender.body.vel = IVec2::new(itof(120), -itof(40));
        sender.facing = Facing::Left;
        sender.give_shield(YELLOW_SHIELD);
        sender.make_invincible(500, &env.config.movement);
        sender.arsenal_mut().add_ammo(TNT_SLOT, 3);
        sender.arsenal_mut().cycle();
        sender.arsenal_mut().set_fire_speed(4);
        sender.set_birds(2);

        let data = sender.send().unwrap();
        let mut receiver = env.player_at(GridPos::new(1, 1));
        receiver.receive(&data).unwrap();

        assert_eq!(receiver.body, sender.body);
        assert_eq!(receiver.facing(), Facing::Left);
        assert_eq!(receiver.shield(), YELLOW_SHIELD);
        assert_eq!(receiver.reaction().map(|r| r.kind), Some(Reaction::Invincible));
        assert_eq!(receiver.arsenal(), sender.arsenal());
        assert_eq!(receiver.birds().len(), 2);
        assert_eq!(receiver.snapshot(), sender.snapshot());
    }

    #[test]
    fn fixed_width_encoding() {
        let env = TestEnv::flat();
        let near = env.player_at(GridPos::new(0, 0)).send().unwrap();
        let far = env.player_at(GridPos::new(60, 10)).send().unwrap();
        assert_eq!(near.len(), far.len());
    }

    #[test]
    fn truncated_data_is_rejected() {
        let env = TestEnv::flat();
        let data = env.player_at(GridPos::new(3, 3)).send().unwrap();
        let mut receiver = env.player_at(GridPos::new(1, 1));
        let before = receiver.snapshot();
        assert!(matches!(receiver.receive(&data[..data.len() / 2]), Err(SnapshotError::Decode(_))));
        assert_eq!(receiver.snapshot(), before);
    }
}
