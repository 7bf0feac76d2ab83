pub mod decider;
pub mod format;
pub mod tracker;

pub use tracker::StateTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    Score,
    Win,
}

impl std::fmt::Display for AnnouncementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnouncementKind::Score => write!(f, "score"),
            AnnouncementKind::Win => write!(f, "win"),
        }
    }
}

/// A chat line ready to send. Emitted once per change, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub text: String,
}

impl Announcement {
    pub fn score(text: String) -> Self {
        Announcement {
            kind: AnnouncementKind::Score,
            text,
        }
    }

    pub fn win(text: String) -> Self {
        Announcement {
            kind: AnnouncementKind::Win,
            text,
        }
    }
}
