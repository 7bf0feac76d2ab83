use tracing::{debug, info};

use super::decider;
use super::Announcement;
use crate::feed::Snapshot;

/// The triple compared between cycles to decide whether the score moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSignature {
    pub scoreboard: String,
    pub map_count1: Option<i64>,
    pub map_count2: Option<i64>,
}

/// Announcement history carried from one cycle to the next.
#[derive(Debug, Clone, Default)]
pub struct TrackedState {
    /// (matchId, mapNumber) of the previous snapshot; `None` before the first one.
    pub identity: Option<(Option<String>, Option<String>)>,
    pub last_signature: Option<ScoreSignature>,
    pub latched_win: Option<String>,
}

impl TrackedState {
    fn clear_history(&mut self) {
        self.last_signature = None;
        self.latched_win = None;
    }
}

/// Outcome of comparing a snapshot's identity with the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionInfo {
    /// First snapshot, or matchId / mapNumber differs from the previous one.
    pub changed: bool,
    pub first: bool,
}

/// Owns [`TrackedState`] and turns each snapshot into announcements.
#[derive(Debug, Default)]
pub struct StateTracker {
    state: TrackedState,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> &TrackedState {
        &self.state
    }

    /// Record the snapshot's identity, wiping history when it changed.
    ///
    /// Identity compares the raw values, so a missing map number and map `1`
    /// are different maps even though both display as `map1`.
    pub fn observe(&mut self, snap: &Snapshot) -> TransitionInfo {
        let identity = (snap.match_id.clone(), snap.map_number.clone());
        let first = self.state.identity.is_none();
        let changed = self.state.identity.as_ref() != Some(&identity);

        if changed {
            if !first {
                debug!(
                    "Match/map changed: {:?} -> {:?}, clearing announcement history",
                    self.state.identity, identity
                );
            }
            self.state.clear_history();
        }
        self.state.identity = Some(identity);

        TransitionInfo { changed, first }
    }

    /// Full per-cycle step: identity check first, then both announcement rules.
    pub fn process(&mut self, snap: &Snapshot) -> Vec<Announcement> {
        let transition = self.observe(snap);
        if transition.changed {
            info!(
                "{} match {} map {}",
                if transition.first { "Tracking" } else { "Now tracking" },
                snap.match_id.as_deref().unwrap_or("?"),
                snap.map_number.as_deref().unwrap_or("?"),
            );
        }
        decider::decide(&mut self.state, snap)
    }
}
