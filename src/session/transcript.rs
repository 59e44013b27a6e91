use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::modes::Mode;

const PREVIEW_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One user message or one assistant reply within a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

/// The persisted turn history of one resumable conversation within one
/// mode. Turns alternate user/assistant starting with user; normal
/// operation never persists a dangling unanswered user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub mode: Mode,
    pub id: String,
    pub created_at: DateTime<Local>,
    pub turns: Vec<Turn>,
}

impl Transcript {
    /// Allocate a fresh empty transcript. The id encodes creation time down
    /// to milliseconds so ids sort consistently with creation order.
    pub fn new(mode: Mode) -> Self {
        let now = Local::now();
        Self {
            mode,
            id: now.format("%Y%m%d_%H%M%S%3f").to_string(),
            created_at: now,
            turns: Vec::new(),
        }
    }

    /// First user line, shortened for resume menus.
    pub fn preview(&self) -> String {
        let first_user = self
            .turns
            .iter()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
            .unwrap_or("");
        let line = first_user.lines().next().unwrap_or("");
        if line.chars().count() > PREVIEW_MAX_CHARS {
            let truncated: String = line.chars().take(PREVIEW_MAX_CHARS).collect();
            format!("{}...", truncated)
        } else {
            line.to_string()
        }
    }

    /// A crash between the user-turn append and the assistant-turn append
    /// leaves a trailing user turn behind. Detect and drop it so a resumed
    /// conversation starts from a consistent state.
    pub fn repair_dangling_user_turn(&mut self) -> bool {
        if self.turns.last().map(|t| t.role) == Some(Role::User) {
            self.turns.pop();
            return true;
        }
        false
    }
}

/// What the resume menu shows for one saved transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSummary {
    pub id: String,
    pub created_at: DateTime<Local>,
    pub preview: String,
    pub turn_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_first_user_line() {
        let mut t = Transcript::new(Mode::Normal);
        assert_eq!(t.preview(), "");

        t.turns.push(Turn::user("short question"));
        t.turns.push(Turn::assistant("answer"));
        assert_eq!(t.preview(), "short question");

        let mut long = Transcript::new(Mode::Normal);
        long.turns.push(Turn::user("x".repeat(100)));
        let preview = long.preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 63);
    }

    #[test]
    fn test_repair_drops_only_trailing_user_turn() {
        let mut t = Transcript::new(Mode::Codex);
        t.turns.push(Turn::user("q1"));
        t.turns.push(Turn::assistant("a1"));
        assert!(!t.repair_dangling_user_turn());
        assert_eq!(t.turns.len(), 2);

        t.turns.push(Turn::user("q2"));
        assert!(t.repair_dangling_user_turn());
        assert_eq!(t.turns.len(), 2);
        assert_eq!(t.turns.last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_ids_sort_with_creation_time() {
        let a = Transcript::new(Mode::Normal);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = Transcript::new(Mode::Normal);
        assert!(b.id >= a.id);
    }
}
