//! Score and win rules.
//!
//! Both rules run on every cycle, after the tracker has dealt with
//! match/map transitions, and each owns one slot of [`TrackedState`]:
//! the score rule the last signature, the win rule the latch.

use tracing::debug;

use super::format::{non_blank, score_message, scoreboard_text, win_message};
use super::tracker::{ScoreSignature, TrackedState};
use super::Announcement;
use crate::feed::Snapshot;

pub fn decide(state: &mut TrackedState, snap: &Snapshot) -> Vec<Announcement> {
    let mut out = Vec::new();
    if let Some(ann) = score_rule(state, snap) {
        out.push(ann);
    }
    if let Some(ann) = win_rule(state, snap) {
        out.push(ann);
    }
    out
}

/// Announce when the signature moved and the scores are a real, non-opening state.
/// The new signature is stored even when nothing is announced.
fn score_rule(state: &mut TrackedState, snap: &Snapshot) -> Option<Announcement> {
    let signature = ScoreSignature {
        scoreboard: scoreboard_text(snap),
        map_count1: snap.map_count1,
        map_count2: snap.map_count2,
    };
    if state.last_signature.as_ref() == Some(&signature) {
        return None;
    }
    state.last_signature = Some(signature);

    match parse_scores(snap) {
        Some((0, 0)) => None,
        Some(_) => Some(Announcement::score(score_message(snap))),
        None => {
            debug!(
                "Unreadable scores {:?}:{:?}, not announcing",
                snap.score_left, snap.score_right
            );
            None
        }
    }
}

/// `None` unless both sides are integers.
fn parse_scores(snap: &Snapshot) -> Option<(i64, i64)> {
    let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
    Some((parse(&snap.score_left)?, parse(&snap.score_right)?))
}

fn win_rule(state: &mut TrackedState, snap: &Snapshot) -> Option<Announcement> {
    debug!(
        "Win fields: winTeam={:?} winType={:?} winLine={:?}",
        snap.win_team, snap.win_type, snap.win_line
    );

    let (Some(team), Some(win_type)) = (
        non_blank(snap.win_team.as_deref()),
        non_blank(snap.win_type.as_deref()),
    ) else {
        state.latched_win = None;
        return None;
    };

    let text = win_message(team, win_type, snap.win_line.as_deref());
    if state.latched_win.as_deref() == Some(text.as_str()) {
        return None;
    }
    state.latched_win = Some(text.clone());
    Some(Announcement::win(text))
}
