//! Round-robin attack rotation.

use crate::config::AttackPattern;

/// Cursor into the active phase's pattern list.
///
/// The list can change underneath it (phase two swaps lists), so the index is
/// wrapped against whatever list is passed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternRotation {
    index: usize,
}

impl PatternRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next pattern of `patterns`, or `None` for an empty list.
    pub fn next<'a>(&mut self, patterns: &'a [AttackPattern]) -> Option<&'a AttackPattern> {
        if patterns.is_empty() {
            return None;
        }
        let idx = self.index % patterns.len();
        self.index = (idx + 1) % patterns.len();
        patterns.get(idx)
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
