//! Hopper Headless - Main Entry Point
//!
//! Plays the demo level with a scripted run-and-jump input, draws every frame
//! to a recording canvas and mirrors the player through the network codec
//! the way a remote peer would see it.
//!
//! Usage: `hopper-headless [steps]`. Set `RUST_LOG` to adjust logging.

use anyhow::Context;
use hopper_game::level::fixture;
use hopper_game::player::Reaction;
use hopper_game::{ControlState, FrameEvent, LevelPlayer, PlayerId, RecordingCanvas};
use hopper_physics::fixed::ftoi;
use hopper_protocol::{decode, encode, GameMessage, InputMessage, PlayerStateMessage};
use tracing::{debug, info};

/// Milliseconds per step.
const STEP_MS: i32 = 20;

/// Steps between two player state messages.
const SYNC_INTERVAL: u32 = 50;

const DEFAULT_STEPS: u32 = 1500;

/// Hold right throughout, jump in bursts and fire every half second.
fn scripted_input(step: u32) -> ControlState {
    let mut controls = ControlState::from_bits(ControlState::RIGHT);
    if step % 60 < 12 {
        controls.set(ControlState::JUMP);
    }
    if step % 25 == 0 {
        controls.set(ControlState::FIRE);
    }
    if step % 300 == 150 {
        controls.set(ControlState::CHANGE);
    }
    controls
}

#[derive(Debug, Default)]
struct Summary {
    sounds: usize,
    hits: usize,
    deaths: usize,
    destroyed: usize,
    sprites: usize,
    bytes_sent: usize,
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("hopper_game=info".parse()?)
                .add_directive("hopper_headless=debug".parse()?),
        )
        .init();

    let steps = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("invalid step count {arg:?}"))?,
        None => DEFAULT_STEPS,
    };
    info!(steps, "Starting Hopper (headless)");

    let mut level = fixture::demo_level().context("building demo level")?;
    let local = PlayerId(0);
    let mut mirror = LevelPlayer::new(PlayerId(1), fixture::player_anims(), 0, 0);
    let mut canvas = RecordingCanvas::new();
    let mut summary = Summary::default();

    for step in 1..=steps {
        let input = scripted_input(step);

        // Inputs travel through the codec as they would between peers
        let wire = encode(&GameMessage::Input(InputMessage {
            peer_id: local.0,
            frame: step,
            input,
        }))?;
        summary.bytes_sent += wire.len();
        let GameMessage::Input(message) = decode(&wire)? else {
            anyhow::bail!("input message decoded as another type");
        };

        level.step(step * STEP_MS as u32, STEP_MS, &[message.input]);
        level.view(local, STEP_MS, 0);

        canvas.clear();
        level.draw(0, &mut canvas);
        summary.sprites += canvas.sprites().count();

        for event in level.drain_frame_events() {
            match event {
                FrameEvent::Sound(_) => summary.sounds += 1,
                FrameEvent::PlayerHit { .. } => summary.hits += 1,
                FrameEvent::PlayerKilled { .. } => summary.deaths += 1,
                FrameEvent::EventDestroyed { grid, .. } => {
                    summary.destroyed += 1;
                    debug!(?grid, step, "destroyed");
                }
                FrameEvent::ReactionEnded {
                    player,
                    reaction: Reaction::Killed,
                } => level.respawn(player),
                _ => {}
            }
        }

        if step % SYNC_INTERVAL == 0 {
            let player = level.player(local).context("local player missing")?;
            let state = PlayerStateMessage::capture(local.0, step, player)?;
            let wire = encode(&GameMessage::PlayerState(state))?;
            summary.bytes_sent += wire.len();
            if let GameMessage::PlayerState(state) = decode(&wire)? {
                state.apply(&mut mirror)?;
            }
            debug!(step, x = mirror.body.x(), y = mirror.body.y(), "mirror synced");
        }
    }

    let player = level.player(local).context("local player missing")?;
    info!(?summary, "run finished");
    println!("steps:           {steps}");
    println!("player position: ({}, {})", ftoi(player.body.x()), ftoi(player.body.y()));
    println!("energy:          {}", player.energy());
    println!("live events:     {}", level.events().len());
    println!("live bullets:    {}", level.bullets().len());
    println!("sounds:          {}", summary.sounds);
    println!("hits / deaths:   {} / {}", summary.hits, summary.deaths);
    println!("destroyed:       {}", summary.destroyed);
    println!("sprites drawn:   {}", summary.sprites);
    println!("bytes sent:      {}", summary.bytes_sent);

    Ok(())
}
