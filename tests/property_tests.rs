//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - Buffs: matched add/remove pairs in any order return to the baseline
//! - Progression: reports in any order, with duplicates, give the same score
//! - Final unlock: fires exactly once, on the tick after the last liberation
//! - Damage: exact decrements, one death, nothing while dead or invulnerable
//! - Scheduler: every payload fires exactly once, in registration order

use bevy::math::Vec2;
use proptest::prelude::*;

use liberation_core::combat::{Combatant, DamageOutcome};
use liberation_core::commander::Commander;
use liberation_core::config::{CommanderConfig, EnemyConfig, PlayerConfig, ProgressionConfig};
use liberation_core::enemy::Enemy;
use liberation_core::player::{BuffCategory, BuffSet, Player};
use liberation_core::presentation::{ActorId, NullPresentation};
use liberation_core::progression::{ProgressionEvent, ProgressionGraph};
use liberation_core::scheduler::TimedEffectScheduler;

const WORLDS: [&str; 4] = ["Hellas", "Kemet", "Wano", "Pindorama"];

fn category() -> impl Strategy<Value = BuffCategory> {
    prop::sample::select(BuffCategory::ALL.to_vec())
}

#[derive(Debug, Clone, Copy)]
enum Report {
    Commander(usize),
    Guardian(usize),
}

fn all_reports_with_duplicates() -> impl Strategy<Value = Vec<Report>> {
    let mut reports = Vec::new();
    for w in 0..WORLDS.len() {
        reports.push(Report::Commander(w));
        reports.push(Report::Guardian(w));
    }
    prop::collection::vec(0..reports.len(), 0..6).prop_flat_map(move |dups| {
        let mut all = reports.clone();
        all.extend(dups.into_iter().map(|i| reports[i]));
        Just(all).prop_shuffle()
    })
}

fn graph() -> ProgressionGraph {
    ProgressionGraph::new(ProgressionConfig {
        worlds: WORLDS.iter().map(|w| w.to_string()).collect(),
        ..Default::default()
    })
}

// ============================================================
// Buff Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_buff_round_trip(
        baseline in prop::collection::vec((category(), -50.0f32..50.0), 0..4),
        extra in prop::collection::vec((category(), -50.0f32..50.0), 1..12)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let (added, removal_order) = extra;
        let mut buffs = BuffSet::new();
        for (c, a) in &baseline {
            buffs.add_buff(*c, *a);
        }
        let before: Vec<f32> = BuffCategory::ALL.iter().map(|c| buffs.value(*c)).collect();

        for (c, a) in &added {
            buffs.add_buff(*c, *a);
        }
        for (c, a) in &removal_order {
            buffs.remove_buff(*c, *a);
        }

        for (i, c) in BuffCategory::ALL.iter().enumerate() {
            prop_assert!((buffs.value(*c) - before[i]).abs() < 1e-3,
                "{c:?}: {} vs {}", buffs.value(*c), before[i]);
        }
    }

    #[test]
    fn prop_buffs_reset_exactly_when_all_removed(
        entries in prop::collection::vec((category(), -50.0f32..50.0), 1..16)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let (added, removal_order) = entries;
        let mut buffs = BuffSet::new();
        for (c, a) in &added {
            buffs.add_buff(*c, *a);
        }
        for (c, a) in &removal_order {
            buffs.remove_buff(*c, *a);
        }
        for c in BuffCategory::ALL {
            prop_assert_eq!(buffs.value(c), 0.0);
            prop_assert_eq!(buffs.active_count(c), 0);
        }
    }
}

// ============================================================
// Progression Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_progression_order_invariant(reports in all_reports_with_duplicates()) {
        let mut g = graph();
        let mut p = NullPresentation;
        for report in &reports {
            match report {
                Report::Commander(w) => g.report_commander_defeated(WORLDS[*w], &mut p),
                Report::Guardian(w) => g.report_guardian_rescued(WORLDS[*w], &mut p),
            };
        }
        let per_world = 1000 + 500 + 2000;
        prop_assert_eq!(g.score(), per_world * WORLDS.len() as u32);
        prop_assert_eq!(g.liberated_world_count(), WORLDS.len());
        prop_assert!(!g.is_final_battle_unlocked());

        for _ in 0..3 {
            g.tick(&mut p);
        }
        prop_assert!(g.is_final_battle_unlocked());
        let events = g.drain_events();
        let unlocks = events.iter().filter(|e| **e == ProgressionEvent::FinalBattleUnlocked).count();
        let festivals = events.iter().filter(|e| matches!(e, ProgressionEvent::FestivalStarted(_))).count();
        prop_assert_eq!(unlocks, 1);
        prop_assert_eq!(festivals, WORLDS.len());
    }

    #[test]
    fn prop_partial_progress_never_unlocks(
        reports in all_reports_with_duplicates(),
        cut in 0usize..8,
    ) {
        // Drop every report for one world: it can never liberate
        let skipped = cut % WORLDS.len();
        let mut g = graph();
        let mut p = NullPresentation;
        for report in &reports {
            match report {
                Report::Commander(w) if *w != skipped => { g.report_commander_defeated(WORLDS[*w], &mut p); }
                Report::Guardian(w) if *w != skipped => { g.report_guardian_rescued(WORLDS[*w], &mut p); }
                _ => {}
            }
            g.tick(&mut p);
        }
        prop_assert!(!g.is_world_liberated(WORLDS[skipped]));
        prop_assert!(!g.is_final_battle_unlocked());
        prop_assert_eq!(g.liberated_world_count(), WORLDS.len() - 1);
    }

    #[test]
    fn prop_unknown_worlds_change_nothing(name in "[a-z]{1,12}") {
        let mut g = graph();
        let mut p = NullPresentation;
        prop_assert!(!g.report_commander_defeated(&name, &mut p));
        prop_assert!(!g.report_guardian_rescued(&name, &mut p));
        prop_assert_eq!(g.score(), 0);
        prop_assert!(!g.is_world_liberated(&name));
    }
}

// ============================================================
// Damage Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_enemy_damage_exact_and_single_death(hits in prop::collection::vec(-10i32..60, 1..30)) {
        let mut enemy = Enemy::new(ActorId(1), EnemyConfig::default(), Vec2::ZERO);
        let mut p = NullPresentation;
        let mut deaths = 0;
        for amount in hits {
            let before = enemy.health().current;
            let was_dead = enemy.is_dead();
            let outcome = enemy.take_damage(amount, &mut p);
            if was_dead || amount <= 0 {
                prop_assert_eq!(outcome, DamageOutcome::Ignored);
                prop_assert_eq!(enemy.health().current, before);
                continue;
            }
            prop_assert_eq!(enemy.health().current, before - amount);
            prop_assert_eq!(outcome.dealt(), amount);
            if outcome.is_kill() {
                deaths += 1;
                prop_assert!(enemy.is_dead());
            }
        }
        prop_assert!(deaths <= 1);
        prop_assert_eq!(deaths == 1, enemy.is_dead());
    }

    #[test]
    fn prop_commander_invulnerable_during_phase_change(first in 251i32..499, later in 1i32..400) {
        let mut commander = Commander::new(ActorId(2), "Boss", "Hellas", CommanderConfig::default(), Vec2::ZERO);
        let mut p = NullPresentation;
        commander.take_damage(first, &mut p);
        prop_assert!(commander.is_invulnerable());
        let health = commander.health().current;
        prop_assert_eq!(commander.take_damage(later, &mut p), DamageOutcome::Ignored);
        prop_assert_eq!(commander.health().current, health);
    }

    #[test]
    fn prop_player_hit_applies_at_least_one(amount in 1i32..200, defense in 0.0f32..2.0) {
        let mut player = Player::new(ActorId(0), PlayerConfig::default(), Vec2::ZERO);
        let mut p = NullPresentation;
        player.buffs_mut().add_buff(BuffCategory::Defense, defense);
        let outcome = player.take_damage(amount, &mut p);
        let expected = (amount - (amount as f32 * defense).floor() as i32).max(1);
        prop_assert_eq!(outcome.dealt(), expected);
        // Hit frames (or death) swallow the follow-up
        prop_assert_eq!(player.take_damage(amount, &mut p), DamageOutcome::Ignored);
    }
}

// ============================================================
// Scheduler Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_scheduler_fires_each_once(
        durations in prop::collection::vec(0.0f32..5.0, 1..20),
        step in 0.05f32..1.0,
    ) {
        let mut scheduler = TimedEffectScheduler::new();
        for (i, d) in durations.iter().enumerate() {
            scheduler.schedule(*d, i);
        }
        let mut fired = Vec::new();
        let mut rounds = 0;
        while !scheduler.is_empty() && rounds < 1000 {
            let batch: Vec<usize> = scheduler.advance(step).into_iter().map(|e| e.payload).collect();
            // registration order within one advance
            prop_assert!(batch.windows(2).all(|w| w[0] < w[1]));
            fired.extend(batch);
            rounds += 1;
        }
        fired.sort_unstable();
        prop_assert_eq!(fired, (0..durations.len()).collect::<Vec<_>>());
    }
}
