pub mod engine;
pub mod history;
pub mod selector;
pub mod transcript;

pub use engine::{Session, SessionEngine};
pub use history::HistoryStore;
pub use selector::{InteractiveMenu, MenuChoice, TerminalMenu};
pub use transcript::{Role, Transcript, TranscriptSummary, Turn};
