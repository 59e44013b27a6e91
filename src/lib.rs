pub mod app;
pub mod cli;
pub mod models;
pub mod modes;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{Config, ConfigStore, ModeConfig};
pub use models::{ChatProvider, OpenAiProvider};
pub use modes::Mode;
pub use runtime::Runtime;
pub use session::{HistoryStore, SessionEngine};
pub use utils::{KitError, ProviderError};
