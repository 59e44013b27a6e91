pub mod atomic;
pub mod clipboard;
pub mod errors;

pub use atomic::atomic_write;
pub use clipboard::{ClipboardSource, SystemClipboard};
pub use errors::{KitError, ProviderError};
