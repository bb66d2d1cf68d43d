//! Bevy integration.
//!
//! [`LiberationPlugin`] owns a [`Simulation`] as a resource, advances it every
//! `Update` with `Time::delta_secs`, mirrors the session flow into
//! `State<GameFlowState>` and republishes simulation events as Bevy events.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::SimulationConfig;
use crate::gameflow::GameFlowState;
use crate::simulation::{Simulation, SimulationEvent};

/// Plugin wiring the simulation into an app. Built from a config so tests and
/// tools can pick seeds and rosters.
#[derive(Default)]
pub struct LiberationPlugin {
    pub config: SimulationConfig,
}

impl LiberationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for LiberationPlugin {
    fn build(&self, app: &mut App) {
        let simulation = Simulation::try_new(self.config.clone()).unwrap_or_else(|err| {
            error!(%err, "invalid simulation config, falling back to defaults");
            Simulation::new(SimulationConfig::default())
        });

        if !app.is_plugin_added::<StatesPlugin>() {
            app.add_plugins(StatesPlugin);
        }
        app.insert_resource(SimulationResource(Arc::new(RwLock::new(simulation))))
            .init_state::<GameFlowState>()
            .add_event::<SimulationEvent>()
            .add_systems(
                Update,
                (simulation_tick_system, forward_events_system, sync_flow_state_system).chain(),
            );
    }
}

/// Shared handle to the simulation. Clone it to drive commands from outside
/// the schedule.
#[derive(Resource, Clone)]
pub struct SimulationResource(pub Arc<RwLock<Simulation>>);

impl SimulationResource {
    pub fn new(simulation: Simulation) -> Self {
        Self(Arc::new(RwLock::new(simulation)))
    }
}

fn simulation_tick_system(time: Res<Time>, sim: Res<SimulationResource>) {
    sim.0.write().tick(time.delta_secs());
}

fn forward_events_system(sim: Res<SimulationResource>, mut writer: EventWriter<SimulationEvent>) {
    let events = sim.0.write().drain_events();
    if !events.is_empty() {
        debug!(count = events.len(), "forwarding simulation events");
    }
    writer.send_batch(events);
}

fn sync_flow_state_system(
    sim: Res<SimulationResource>,
    state: Res<State<GameFlowState>>,
    mut next: ResMut<NextState<GameFlowState>>,
) {
    let current = sim.0.read().flow_state();
    if *state.get() != current {
        next.set(current);
    }
}
