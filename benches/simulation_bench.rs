use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use liberation_core::config::ProgressionConfig;
use liberation_core::guardian::GuardianPower;
use liberation_core::player::{BuffCategory, BuffSet};
use liberation_core::progression::ProgressionGraph;
use liberation_core::presentation::NullPresentation;
use liberation_core::scheduler::TimedEffectScheduler;
use liberation_core::{Simulation, SimulationConfig};

fn crowded_simulation(enemies: usize) -> Simulation {
    let mut sim = Simulation::new(SimulationConfig::default());
    for i in 0..enemies {
        let side = if i % 2 == 0 { 1.0 } else { -1.0 };
        sim.spawn_enemy(Vec2::new(side * (3.0 + i as f32 * 0.5), 0.0));
    }
    sim.spawn_commander("Commander", "Hellas", Vec2::new(20.0, 0.0));
    sim
}

fn bench_simulation_tick(c: &mut Criterion) {
    c.bench_function("tick_10_enemies", |b| {
        let mut sim = crowded_simulation(10);
        b.iter(|| sim.tick(black_box(1.0 / 60.0)))
    });

    c.bench_function("tick_100_enemies", |b| {
        let mut sim = crowded_simulation(100);
        b.iter(|| sim.tick(black_box(1.0 / 60.0)))
    });

    c.bench_function("time_freeze_100_enemies", |b| {
        b.iter(|| {
            let mut sim = crowded_simulation(100);
            let guardian =
                sim.spawn_guardian("Chronos", "Hellas", GuardianPower::TimeFreeze, Vec2::new(1.0, 0.0));
            sim.interact();
            sim.use_guardian_power(guardian);
            for _ in 0..10 {
                sim.tick(1.0);
            }
            black_box(sim.pending_world_effects())
        })
    });
}

fn bench_scheduler(c: &mut Criterion) {
    c.bench_function("scheduler_advance_1000", |b| {
        b.iter(|| {
            let mut scheduler = TimedEffectScheduler::new();
            for i in 0..1000u32 {
                scheduler.schedule((i % 50) as f32 * 0.1, i);
            }
            let mut fired = 0;
            while !scheduler.is_empty() {
                fired += scheduler.advance(black_box(0.1)).len();
            }
            black_box(fired)
        })
    });
}

fn bench_buffs(c: &mut Criterion) {
    c.bench_function("buff_add_remove_64", |b| {
        b.iter(|| {
            let mut buffs = BuffSet::new();
            for i in 0..64 {
                buffs.add_buff(BuffCategory::ALL[i % BuffCategory::ALL.len()], i as f32 * 0.25);
            }
            for i in (0..64).rev() {
                buffs.remove_buff(BuffCategory::ALL[i % BuffCategory::ALL.len()], i as f32 * 0.25);
            }
            black_box(buffs.value(BuffCategory::Attack))
        })
    });
}

fn bench_progression(c: &mut Criterion) {
    let worlds: Vec<String> = (0..16).map(|i| format!("World{i}")).collect();
    c.bench_function("liberate_16_worlds", |b| {
        b.iter(|| {
            let mut graph = ProgressionGraph::new(ProgressionConfig {
                worlds: worlds.clone(),
                ..Default::default()
            });
            let mut p = NullPresentation;
            for w in &worlds {
                graph.report_commander_defeated(w, &mut p);
                graph.report_guardian_rescued(w, &mut p);
            }
            graph.tick(&mut p);
            black_box(graph.is_final_battle_unlocked())
        })
    });
}

criterion_group!(
    benches,
    bench_simulation_tick,
    bench_scheduler,
    bench_buffs,
    bench_progression,
);
criterion_main!(benches);
