//! Headless liberation run.
//!
//! `liberation-sim [config.json|config.ron]` plays one world end to end:
//! rescue the guardian, defeat the commander, watch the festival start.

use anyhow::Context;
use bevy::math::Vec2;

use liberation_core::combat::Combatant;
use liberation_core::gameflow::GameFlowState;
use liberation_core::guardian::GuardianPower;
use liberation_core::logging::{init_tracing, RunSpan};
use liberation_core::player::PlayerInput;
use liberation_core::presentation::TracingPresentation;
use liberation_core::{Simulation, SimulationConfig, SimulationEvent};

const TICK: f32 = 1.0 / 60.0;
const MAX_TICKS: u32 = 60 * 120;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path)
            .with_context(|| format!("loading simulation config from {path}"))?,
        None => SimulationConfig::default(),
    };
    let world = config
        .progression
        .worlds
        .first()
        .cloned()
        .context("config has no worlds")?;
    init_tracing(&config.logging);

    let _span = RunSpan::enter(config.seed, &world);
    let mut sim = Simulation::with_presentation(config, Box::new(TracingPresentation));
    sim.load_world(&world);

    let guardian = sim.spawn_guardian("Guardian", &world, GuardianPower::AreaAttack, Vec2::new(1.0, 0.0));
    let commander = sim.spawn_commander("Commander", &world, Vec2::new(8.0, 0.0));
    sim.spawn_enemy(Vec2::new(5.0, 0.0));

    sim.interact();
    sim.use_guardian_power(guardian);

    // Walk toward the commander and swing until it falls or the player does
    let mut ticks = 0;
    while ticks < MAX_TICKS && !sim.progression().is_world_liberated(&world) {
        let close = sim
            .commander(commander)
            .map(|c| (c.position().x - sim.player().position().x).abs() < 1.0)
            .unwrap_or(true);
        sim.set_input(PlayerInput {
            horizontal: if close { 0.0 } else { 1.0 },
            attack: true,
            ..Default::default()
        });
        sim.tick(TICK);
        for event in sim.drain_events() {
            if let SimulationEvent::Progression(progress) = event {
                tracing::info!(?progress, "progression");
            }
        }
        if sim.flow_state() != GameFlowState::Playing {
            break;
        }
        ticks += 1;
    }

    // Let the festival fade finish
    sim.set_input(PlayerInput::default());
    for _ in 0..(3.0 / TICK) as u32 {
        sim.tick(TICK);
    }

    tracing::info!(
        world = %world,
        liberated = sim.progression().is_world_liberated(&world),
        score = sim.progression().score(),
        elapsed = sim.elapsed(),
        flow = ?sim.flow_state(),
        "run finished"
    );
    sim.shutdown();
    Ok(())
}
