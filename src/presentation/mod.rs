//! Collaborator seams consumed by the core.
//!
//! Animation, audio, particles, UI and lighting are fire-and-forget calls on
//! [`Presentation`]; hit detection is a synchronous [`OverlapQuery`]. The core
//! never reads anything back from presentation.

use bevy::color::LinearRgba;
use bevy::math::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a simulated actor. Never reused within a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Collision layer used to filter overlap queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Player,
    Enemy,
}

/// Which environment set is active for a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentSelector {
    /// Dark environment and suppressed NPCs
    Suppressed,
    /// Festival environment and celebrating NPCs
    Festival,
}

/// Presentation side effects. All methods default to no-ops.
pub trait Presentation: Send + Sync {
    fn play_animation(&mut self, _actor: ActorId, _trigger: &str) {}
    fn set_animation_state(&mut self, _actor: ActorId, _state: i32) {}
    fn play_effect(&mut self, _actor: Option<ActorId>, _effect: &str) {}
    fn play_sound(&mut self, _clip: &str, _position: Vec2, _volume: f32) {}
    fn play_music(&mut self, _clip: &str) {}
    fn show_notification(&mut self, _text: &str) {}
    fn update_score_display(&mut self, _score: u32) {}
    fn update_health_display(&mut self, _current: i32, _max: i32) {}
    fn show_dialogue(&mut self, _speaker: &str, _line: &str) {}
    fn set_ambient_light(&mut self, _color: LinearRgba, _intensity: f32) {}
    fn set_environment(&mut self, _world: &str, _selector: EnvironmentSelector) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl Presentation for NullPresentation {}

/// Forwards every call to `tracing` at debug level (headless runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresentation;

impl Presentation for TracingPresentation {
    fn play_animation(&mut self, actor: ActorId, trigger: &str) {
        tracing::debug!(target: "liberation_core::presentation", %actor, trigger, "animation");
    }

    fn play_effect(&mut self, actor: Option<ActorId>, effect: &str) {
        tracing::debug!(target: "liberation_core::presentation", ?actor, effect, "effect");
    }

    fn play_sound(&mut self, clip: &str, position: Vec2, volume: f32) {
        tracing::debug!(
            target: "liberation_core::presentation",
            clip,
            x = position.x,
            y = position.y,
            volume,
            "sound"
        );
    }

    fn play_music(&mut self, clip: &str) {
        tracing::debug!(target: "liberation_core::presentation", clip, "music");
    }

    fn show_notification(&mut self, text: &str) {
        tracing::info!(target: "liberation_core::presentation", "{}", text);
    }

    fn update_score_display(&mut self, score: u32) {
        tracing::debug!(target: "liberation_core::presentation", score, "score");
    }

    fn show_dialogue(&mut self, speaker: &str, line: &str) {
        tracing::info!(target: "liberation_core::presentation", speaker, "{}", line);
    }

    fn set_environment(&mut self, world: &str, selector: EnvironmentSelector) {
        tracing::debug!(target: "liberation_core::presentation", world, ?selector, "environment");
    }
}

/// One recorded presentation call
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationCall {
    Animation { actor: ActorId, trigger: String },
    AnimationState { actor: ActorId, state: i32 },
    Effect { actor: Option<ActorId>, effect: String },
    Sound { clip: String, position: Vec2, volume: f32 },
    Music(String),
    Notification(String),
    ScoreDisplay(u32),
    HealthDisplay { current: i32, max: i32 },
    Dialogue { speaker: String, line: String },
    AmbientLight { color: [f32; 4], intensity: f32 },
    Environment { world: String, selector: EnvironmentSelector },
}

/// Records calls into a shared log. Clones share the same log, so a test can
/// keep one clone and hand the other to the simulation.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresentation {
    calls: Arc<Mutex<Vec<PresentationCall>>>,
    /// Skip the per-tick animation-state spam unless asked for
    record_animation_state: bool,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_animation_state(mut self) -> Self {
        self.record_animation_state = true;
        self
    }

    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn count(&self, predicate: impl Fn(&PresentationCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn animations_for(&self, actor: ActorId) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                PresentationCall::Animation { actor: a, trigger } if *a == actor => {
                    Some(trigger.clone())
                }
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: PresentationCall) {
        self.calls.lock().push(call);
    }
}

impl Presentation for RecordingPresentation {
    fn play_animation(&mut self, actor: ActorId, trigger: &str) {
        self.push(PresentationCall::Animation {
            actor,
            trigger: trigger.to_string(),
        });
    }

    fn set_animation_state(&mut self, actor: ActorId, state: i32) {
        if self.record_animation_state {
            self.push(PresentationCall::AnimationState { actor, state });
        }
    }

    fn play_effect(&mut self, actor: Option<ActorId>, effect: &str) {
        self.push(PresentationCall::Effect {
            actor,
            effect: effect.to_string(),
        });
    }

    fn play_sound(&mut self, clip: &str, position: Vec2, volume: f32) {
        self.push(PresentationCall::Sound {
            clip: clip.to_string(),
            position,
            volume,
        });
    }

    fn play_music(&mut self, clip: &str) {
        self.push(PresentationCall::Music(clip.to_string()));
    }

    fn show_notification(&mut self, text: &str) {
        self.push(PresentationCall::Notification(text.to_string()));
    }

    fn update_score_display(&mut self, score: u32) {
        self.push(PresentationCall::ScoreDisplay(score));
    }

    fn update_health_display(&mut self, current: i32, max: i32) {
        self.push(PresentationCall::HealthDisplay { current, max });
    }

    fn show_dialogue(&mut self, speaker: &str, line: &str) {
        self.push(PresentationCall::Dialogue {
            speaker: speaker.to_string(),
            line: line.to_string(),
        });
    }

    fn set_ambient_light(&mut self, color: LinearRgba, intensity: f32) {
        self.push(PresentationCall::AmbientLight {
            color: [color.red, color.green, color.blue, color.alpha],
            intensity,
        });
    }

    fn set_environment(&mut self, world: &str, selector: EnvironmentSelector) {
        self.push(PresentationCall::Environment {
            world: world.to_string(),
            selector,
        });
    }
}

/// Physics/detection black box: who overlaps a circle on a layer.
pub trait OverlapQuery {
    fn query_overlap(&self, point: Vec2, radius: f32, layer: Layer) -> Vec<ActorId>;
}

/// A collidable body snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: ActorId,
    pub position: Vec2,
    pub radius: f32,
    pub layer: Layer,
}

/// Circle-vs-circle overlap over a flat list of bodies. Rebuilt by the
/// simulation whenever strikes need resolving.
#[derive(Debug, Default, Clone)]
pub struct SpatialIndex {
    bodies: Vec<Body>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: Body) {
        self.bodies.push(body);
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl OverlapQuery for SpatialIndex {
    fn query_overlap(&self, point: Vec2, radius: f32, layer: Layer) -> Vec<ActorId> {
        self.bodies
            .iter()
            .filter(|b| b.layer == layer)
            .filter(|b| b.position.distance(point) <= radius + b.radius)
            .map(|b| b.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_clones_share_log() {
        let recorder = RecordingPresentation::new();
        let mut handle = recorder.clone();
        handle.play_animation(ActorId(3), "hurt");
        handle.update_score_display(1500);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(recorder.animations_for(ActorId(3)), vec!["hurt".to_string()]);
    }

    #[test]
    fn test_animation_state_filtered_by_default() {
        let recorder = RecordingPresentation::new();
        let mut handle = recorder.clone();
        handle.set_animation_state(ActorId(1), 2);
        assert!(recorder.calls().is_empty());

        let verbose = RecordingPresentation::new().with_animation_state();
        let mut handle = verbose.clone();
        handle.set_animation_state(ActorId(1), 2);
        assert_eq!(verbose.calls().len(), 1);
    }

    #[test]
    fn test_spatial_index_filters_layer_and_radius() {
        let mut index = SpatialIndex::new();
        index.insert(Body {
            id: ActorId(1),
            position: Vec2::new(1.0, 0.0),
            radius: 0.0,
            layer: Layer::Enemy,
        });
        index.insert(Body {
            id: ActorId(2),
            position: Vec2::new(5.0, 0.0),
            radius: 0.0,
            layer: Layer::Enemy,
        });
        index.insert(Body {
            id: ActorId(3),
            position: Vec2::new(0.5, 0.0),
            radius: 0.0,
            layer: Layer::Player,
        });

        let hits = index.query_overlap(Vec2::ZERO, 2.0, Layer::Enemy);
        assert_eq!(hits, vec![ActorId(1)]);
        let hits = index.query_overlap(Vec2::ZERO, 2.0, Layer::Player);
        assert_eq!(hits, vec![ActorId(3)]);
    }

    #[test]
    fn test_body_radius_extends_reach() {
        let mut index = SpatialIndex::new();
        index.insert(Body {
            id: ActorId(9),
            position: Vec2::new(2.3, 0.0),
            radius: 0.5,
            layer: Layer::Enemy,
        });
        assert_eq!(index.query_overlap(Vec2::ZERO, 2.0, Layer::Enemy).len(), 1);
    }

    #[test]
    fn test_null_presentation_accepts_everything() {
        let mut p = NullPresentation;
        p.play_animation(ActorId(0), "attack");
        p.set_ambient_light(LinearRgba::WHITE, 1.0);
        p.show_notification("nothing happens");
    }
}
