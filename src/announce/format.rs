//! Text rendering for announcements and the score-signature.

use crate::feed::Snapshot;

/// `None` for absent or whitespace-only values.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Map number shown in chat: absent, empty or `0` reads as map 1.
pub fn display_map_number(raw: Option<&str>) -> &str {
    match non_blank(raw) {
        Some(n) if n.trim() != "0" => n,
        _ => "1",
    }
}

/// Series length token, e.g. `BO3` -> `3`, unknown -> `x`.
pub fn best_of_token(match_format: Option<&str>) -> String {
    let format = match_format.unwrap_or_default().trim().to_lowercase();
    let digits = format.strip_prefix("bo").unwrap_or(format.as_str()).trim();
    if digits.is_empty() {
        "x".to_string()
    } else {
        digits.to_string()
    }
}

/// Scoreboard line used to detect a score-worthy change. Keeps the raw map number.
pub fn scoreboard_text(snap: &Snapshot) -> String {
    format!(
        "{} {} : {} {} (Map {}, {})",
        field(&snap.team_name1),
        field(&snap.score_left),
        field(&snap.score_right),
        field(&snap.team_name2),
        field(&snap.map_number),
        field(&snap.map_info),
    )
}

pub fn score_message(snap: &Snapshot) -> String {
    format!(
        "| ({}) {} {}:{} {} ({}) | map{} | bo{}",
        snap.map_count1.unwrap_or(0),
        field(&snap.team_name1),
        field(&snap.score_left),
        field(&snap.score_right),
        field(&snap.team_name2),
        snap.map_count2.unwrap_or(0),
        display_map_number(snap.map_number.as_deref()),
        best_of_token(snap.match_format.as_deref()),
    )
}

pub fn win_message(team: &str, win_type: &str, line: Option<&str>) -> String {
    format!("🏆 {} wins {}! {}", team, win_type, line.unwrap_or_default())
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
