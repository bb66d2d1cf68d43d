//! Timed effect scheduler.
//!
//! Every "apply now, revert later" behaviour in the core (knockback recovery,
//! attack windups, invincibility frames, phase transitions, buff reversion,
//! freeze expiry, festival ambient cues) is an entry in one of these
//! schedulers. Nothing waits on real time: owners call [`TimedEffectScheduler::advance`]
//! with a simulated delta and handle the payloads that expired.

use serde::{Deserialize, Serialize};

/// Opaque handle returned by [`TimedEffectScheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectHandle(u64);

impl EffectHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct PendingEffect<E> {
    handle: EffectHandle,
    remaining: f32,
    payload: E,
}

/// A payload whose timer ran out during an advance.
#[derive(Debug, Clone, PartialEq)]
pub struct Expired<E> {
    pub handle: EffectHandle,
    pub payload: E,
}

/// Cooperative timer wheel keyed to simulated seconds.
///
/// Entries are kept in registration order, so expirations that land in the
/// same advance are yielded in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct TimedEffectScheduler<E> {
    next_id: u64,
    pending: Vec<PendingEffect<E>>,
}

impl<E> Default for TimedEffectScheduler<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> TimedEffectScheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payload` to expire after `duration` simulated seconds.
    ///
    /// Negative and NaN durations expire on the next advance.
    pub fn schedule(&mut self, duration: f32, payload: E) -> EffectHandle {
        let handle = EffectHandle(self.next_id);
        self.next_id += 1;
        let remaining = if duration.is_nan() {
            0.0
        } else {
            duration.max(0.0)
        };
        self.pending.push(PendingEffect {
            handle,
            remaining,
            payload,
        });
        handle
    }

    /// Drop a pending effect. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, handle: EffectHandle) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending effect whose payload matches, returning how many were dropped.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&E) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !predicate(&p.payload));
        before - self.pending.len()
    }

    pub fn is_pending(&self, handle: EffectHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Seconds left before `handle` fires, if it is still pending.
    pub fn remaining(&self, handle: EffectHandle) -> Option<f32> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.remaining)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything without firing (simulation teardown).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn payloads(&self) -> impl Iterator<Item = &E> {
        self.pending.iter().map(|p| &p.payload)
    }

    /// Advance all timers by `delta` and return the ones that expired, in
    /// registration order. Each payload is returned exactly once.
    pub fn advance(&mut self, delta: f32) -> Vec<Expired<E>> {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        let mut expired = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for mut effect in self.pending.drain(..) {
            effect.remaining -= delta;
            if effect.remaining <= 0.0 {
                expired.push(Expired {
                    handle: effect.handle,
                    payload: effect.payload,
                });
            } else {
                still_pending.push(effect);
            }
        }

        self.pending = still_pending;
        expired
    }

    /// Callback form of [`advance`](Self::advance).
    pub fn advance_with(&mut self, delta: f32, mut on_expire: impl FnMut(EffectHandle, E)) {
        for expired in self.advance(delta) {
            on_expire(expired.handle, expired.payload);
        }
    }
}
