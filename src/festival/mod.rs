//! Festival transitions.
//!
//! Liberating the current world fades the ambient light from the suppressed
//! palette to the festival palette with smoothstep easing, then swaps the
//! environment and NPC sets and starts the festival music, once. After that a
//! permanent ambient loop plays random festival cues around the listener.
//! Liberating any other world only marks it; entering it later applies the
//! festival state instantly.

use bevy::color::{LinearRgba, Mix};
use bevy::math::Vec2;
use rand::Rng;

use crate::combat::SimRng;
use crate::config::{FestivalConfig, WorldFestivalConfig};
use crate::presentation::{EnvironmentSelector, Presentation};
use crate::scheduler::TimedEffectScheduler;

/// `t² (3 − 2t)` on `t` clamped to [0, 1]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn rgb(c: [f32; 3]) -> LinearRgba {
    LinearRgba::rgb(c[0], c[1], c[2])
}

#[derive(Debug, Clone)]
struct WorldFestival {
    config: WorldFestivalConfig,
    liberated: bool,
}

#[derive(Debug, Clone)]
struct ActiveTransition {
    world: String,
    elapsed: f32,
    start_color: LinearRgba,
    start_intensity: f32,
}

#[derive(Debug, Clone)]
pub struct FestivalController {
    config: FestivalConfig,
    festivals: Vec<WorldFestival>,
    current_world: Option<String>,
    transition: Option<ActiveTransition>,
    ambient_color: LinearRgba,
    light_intensity: f32,
    /// One pending cue per world whose ambient loop is running
    cues: TimedEffectScheduler<String>,
    shut_down: bool,
}

impl FestivalController {
    pub fn new(config: FestivalConfig) -> Self {
        let festivals = config
            .worlds
            .iter()
            .map(|w| WorldFestival {
                config: w.clone(),
                liberated: false,
            })
            .collect();
        Self {
            ambient_color: rgb(config.suppressed_ambient),
            light_intensity: 0.0,
            config,
            festivals,
            current_world: None,
            transition: None,
            cues: TimedEffectScheduler::new(),
            shut_down: false,
        }
    }

    fn festival(&self, world: &str) -> Option<&WorldFestival> {
        self.festivals.iter().find(|f| f.config.world == world)
    }

    fn festival_mut(&mut self, world: &str) -> Option<&mut WorldFestival> {
        self.festivals.iter_mut().find(|f| f.config.world == world)
    }

    pub fn current_world(&self) -> Option<&str> {
        self.current_world.as_deref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_festival_liberated(&self, world: &str) -> bool {
        self.festival(world).is_some_and(|f| f.liberated)
    }

    pub fn ambient_color(&self) -> LinearRgba {
        self.ambient_color
    }

    pub fn light_intensity(&self) -> f32 {
        self.light_intensity
    }

    pub fn has_ambient_loop(&self, world: &str) -> bool {
        self.cues.payloads().any(|w| w == world)
    }

    /// Enter `world`, applying its suppressed or festival state with no fade.
    pub fn set_current_world(
        &mut self,
        world: &str,
        presentation: &mut dyn Presentation,
        rng: &mut SimRng,
    ) {
        self.current_world = Some(world.to_string());
        let Some(festival) = self.festival(world) else {
            tracing::warn!(world, "no festival configured for world");
            return;
        };
        let liberated = festival.liberated;
        let festival_config = festival.config.clone();
        if liberated {
            self.apply_festival_state(&festival_config, presentation);
            self.ensure_ambient_loop(world, rng);
        } else {
            self.apply_suppressed_state(&festival_config, presentation);
        }
    }

    /// Mark `world` liberated and, if it is the current world, start the
    /// fade. Returns false for unknown or already liberated worlds.
    pub fn start_festival(&mut self, world: &str, presentation: &mut dyn Presentation) -> bool {
        let transitioning = self.transition.is_some();
        let is_current = self.current_world.as_deref() == Some(world);
        let Some(festival) = self.festival_mut(world) else {
            tracing::warn!(world, "festival requested for unknown world");
            return false;
        };
        if festival.liberated {
            return false;
        }
        festival.liberated = true;
        let transition_sound = festival.config.transition_sound.clone();
        let festival_name = festival.config.festival_name.clone();

        if transitioning {
            tracing::warn!(world, "festival transition already running; world marked liberated only");
            return true;
        }
        if !is_current {
            tracing::info!(world, "festival recorded for inactive world");
            return true;
        }

        presentation.play_sound(&transition_sound, Vec2::ZERO, 1.0);
        presentation.play_effect(None, "festivalParticles");
        self.transition = Some(ActiveTransition {
            world: world.to_string(),
            elapsed: 0.0,
            start_color: self.ambient_color,
            start_intensity: self.light_intensity,
        });
        tracing::info!(world, festival = %festival_name, "festival transition started");
        true
    }

    /// Advance the fade and the ambient loops. `listener` is where cues are
    /// placed around (the player).
    pub fn tick(
        &mut self,
        delta: f32,
        listener: Vec2,
        presentation: &mut dyn Presentation,
        rng: &mut SimRng,
    ) {
        if self.shut_down {
            return;
        }
        self.advance_transition(delta, presentation, rng);

        for expired in self.cues.advance(delta) {
            let world = expired.payload;
            let Some(festival) = self.festival(&world) else {
                continue;
            };
            if !festival.liberated || festival.config.ambient_clips.is_empty() {
                continue;
            }
            if self.current_world.as_deref() == Some(world.as_str()) {
                let clips = &festival.config.ambient_clips;
                let clip = &clips[rng.gen_range(0..clips.len())];
                let [sx, sy] = self.config.cue_spread.map(f32::abs);
                let offset = Vec2::new(rng.gen_range(-sx..=sx), rng.gen_range(-sy..=sy));
                presentation.play_sound(clip, listener + offset, self.config.cue_volume);
            }
            self.schedule_cue(world, rng);
        }
    }

    fn advance_transition(
        &mut self,
        delta: f32,
        presentation: &mut dyn Presentation,
        rng: &mut SimRng,
    ) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.elapsed += delta.max(0.0);
        let duration = self.config.transition_duration;
        let t = if duration > 0.0 {
            transition.elapsed / duration
        } else {
            1.0
        };
        let eased = smoothstep(t);
        let target = rgb(self.config.festival_ambient);
        self.ambient_color = transition.start_color.mix(&target, eased);
        self.light_intensity = transition.start_intensity + (1.0 - transition.start_intensity) * eased;
        presentation.set_ambient_light(self.ambient_color, self.light_intensity);

        if t < 1.0 {
            return;
        }
        let world = transition.world.clone();
        self.transition = None;
        if let Some(festival) = self.festival(&world) {
            let festival_config = festival.config.clone();
            self.apply_festival_state(&festival_config, presentation);
        }
        self.ensure_ambient_loop(&world, rng);
        tracing::info!(world = %world, "festival transition complete");
    }

    fn apply_festival_state(&mut self, festival: &WorldFestivalConfig, presentation: &mut dyn Presentation) {
        self.ambient_color = rgb(self.config.festival_ambient);
        self.light_intensity = 1.0;
        presentation.set_ambient_light(self.ambient_color, self.light_intensity);
        presentation.set_environment(&festival.world, EnvironmentSelector::Festival);
        presentation.play_music(&festival.festival_music);
    }

    fn apply_suppressed_state(&mut self, festival: &WorldFestivalConfig, presentation: &mut dyn Presentation) {
        self.ambient_color = rgb(self.config.suppressed_ambient);
        self.light_intensity = 0.0;
        presentation.set_ambient_light(self.ambient_color, self.light_intensity);
        presentation.set_environment(&festival.world, EnvironmentSelector::Suppressed);
        presentation.play_music(&festival.suppressed_music);
    }

    fn ensure_ambient_loop(&mut self, world: &str, rng: &mut SimRng) {
        if self.shut_down || self.has_ambient_loop(world) {
            return;
        }
        let has_clips = self
            .festival(world)
            .is_some_and(|f| !f.config.ambient_clips.is_empty());
        if has_clips {
            self.schedule_cue(world.to_string(), rng);
        }
    }

    fn schedule_cue(&mut self, world: String, rng: &mut SimRng) {
        let (min, max) = (self.config.cue_interval_min, self.config.cue_interval_max);
        let delay = rng.gen_range(min.min(max)..=max.max(min));
        self.cues.schedule(delay, world);
    }

    /// Stop every ambient loop and any running fade. Teardown only; the
    /// controller stays silent afterwards.
    pub fn shutdown(&mut self) {
        let loops = self.cues.len();
        self.cues.clear();
        self.transition = None;
        self.shut_down = true;
        tracing::debug!(loops, "festival controller shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::seeded_rng;
    use crate::presentation::{PresentationCall, RecordingPresentation};

    fn controller() -> FestivalController {
        FestivalController::new(FestivalConfig::default())
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < f32::EPSILON);
        assert_eq!(smoothstep(2.0), 1.0);
        assert!(smoothstep(0.25) < 0.25);
    }

    #[test]
    fn test_transition_swaps_environment_once_after_fade() {
        let recorder = RecordingPresentation::new();
        let mut p = recorder.clone();
        let mut rng = seeded_rng(1);
        let mut fc = controller();
        fc.set_current_world("Kemet", &mut p, &mut rng);
        recorder.clear();

        assert!(fc.start_festival("Kemet", &mut p));
        assert!(fc.is_transitioning());

        let festival_swaps = |r: &RecordingPresentation| {
            r.count(|c| {
                matches!(
                    c,
                    PresentationCall::Environment {
                        selector: EnvironmentSelector::Festival,
                        ..
                    }
                )
            })
        };

        for _ in 0..10 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        assert_eq!(festival_swaps(&recorder), 0, "no swap mid-fade");
        assert!(fc.light_intensity() > 0.0 && fc.light_intensity() < 1.0);

        for _ in 0..15 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        assert!(!fc.is_transitioning());
        assert_eq!(festival_swaps(&recorder), 1);
        assert!(recorder
            .calls()
            .contains(&PresentationCall::Music("kemet_festival".into())));
        assert!((fc.light_intensity() - 1.0).abs() < f32::EPSILON);
        assert!(fc.has_ambient_loop("Kemet"));
    }

    #[test]
    fn test_concurrent_request_only_marks_liberated() {
        let mut p = RecordingPresentation::new();
        let mut rng = seeded_rng(1);
        let mut fc = controller();
        fc.set_current_world("Hellas", &mut p, &mut rng);
        fc.start_festival("Hellas", &mut p);
        assert!(fc.start_festival("Wano", &mut p));
        assert!(fc.is_festival_liberated("Wano"));
        for _ in 0..30 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        assert!(!fc.is_transitioning());
        assert!(!fc.has_ambient_loop("Wano"));
    }

    #[test]
    fn test_inactive_world_applied_on_entry() {
        let recorder = RecordingPresentation::new();
        let mut p = recorder.clone();
        let mut rng = seeded_rng(1);
        let mut fc = controller();
        fc.set_current_world("Hellas", &mut p, &mut rng);
        fc.start_festival("Zhongguo", &mut p);
        assert!(!fc.is_transitioning());

        recorder.clear();
        fc.set_current_world("Zhongguo", &mut p, &mut rng);
        assert!(recorder.calls().contains(&PresentationCall::Environment {
            world: "Zhongguo".into(),
            selector: EnvironmentSelector::Festival,
        }));
        assert!((fc.light_intensity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ambient_cues_only_for_current_world() {
        let recorder = RecordingPresentation::new();
        let mut p = recorder.clone();
        let mut rng = seeded_rng(7);
        let mut fc = controller();
        fc.set_current_world("Hispania", &mut p, &mut rng);
        fc.start_festival("Hispania", &mut p);
        for _ in 0..30 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        recorder.clear();

        // 60 simulated seconds at <= 15s spacing
        for _ in 0..600 {
            fc.tick(0.1, Vec2::new(100.0, 0.0), &mut p, &mut rng);
        }
        let sounds: Vec<(String, Vec2, f32)> = recorder
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PresentationCall::Sound { clip, position, volume } => Some((clip, position, volume)),
                _ => None,
            })
            .collect();
        assert!(sounds.len() >= 3);
        for (clip, position, volume) in &sounds {
            assert!(clip.starts_with("hispania_"));
            assert!((position.x - 100.0).abs() <= 10.0);
            assert!(position.y.abs() <= 5.0);
            assert!((volume - 0.5).abs() < f32::EPSILON);
        }

        // Leave the world: the loop keeps running silently
        fc.set_current_world("Kemet", &mut p, &mut rng);
        recorder.clear();
        for _ in 0..600 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        assert_eq!(recorder.count(|c| matches!(c, PresentationCall::Sound { .. })), 0);
        assert!(fc.has_ambient_loop("Hispania"));
    }

    #[test]
    fn test_reversed_cue_ranges_still_play() {
        let recorder = RecordingPresentation::new();
        let mut p = recorder.clone();
        let mut rng = seeded_rng(3);
        let mut fc = FestivalController::new(FestivalConfig {
            cue_interval_min: 4.0,
            cue_interval_max: 2.0,
            cue_spread: [-3.0, -1.0],
            ..Default::default()
        });
        fc.set_current_world("Hispania", &mut p, &mut rng);
        fc.start_festival("Hispania", &mut p);
        for _ in 0..30 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        recorder.clear();

        for _ in 0..200 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        let positions: Vec<Vec2> = recorder
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PresentationCall::Sound { position, .. } => Some(position),
                _ => None,
            })
            .collect();
        assert!(positions.len() >= 4);
        assert!(positions.iter().all(|p| p.x.abs() <= 3.0 && p.y.abs() <= 1.0));
    }

    #[test]
    fn test_shutdown_cancels_loops() {
        let recorder = RecordingPresentation::new();
        let mut p = recorder.clone();
        let mut rng = seeded_rng(2);
        let mut fc = controller();
        fc.set_current_world("Pindorama", &mut p, &mut rng);
        fc.start_festival("Pindorama", &mut p);
        for _ in 0..30 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        fc.shutdown();
        recorder.clear();
        for _ in 0..300 {
            fc.tick(0.1, Vec2::ZERO, &mut p, &mut rng);
        }
        assert!(recorder.calls().is_empty());
        assert!(!fc.has_ambient_loop("Pindorama"));
    }

    #[test]
    fn test_unknown_world() {
        let mut p = RecordingPresentation::new();
        let mut fc = controller();
        assert!(!fc.start_festival("Atlantis", &mut p));
        assert!(!fc.is_festival_liberated("Atlantis"));
    }
}
