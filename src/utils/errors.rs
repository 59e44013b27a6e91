use thiserror::Error;

use crate::modes::Mode;

/// Main error type for kiterm
#[derive(Error, Debug)]
pub enum KitError {
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Configuration file is corrupt: {0}")]
    ConfigCorrupt(String),

    #[error("Failed to write configuration: {0}")]
    ConfigWrite(#[source] std::io::Error),

    #[error("No instruction text available for mode '{0}'")]
    MissingInstructions(Mode),

    #[error("Unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    #[error("No saved conversation '{id}' for mode '{mode}'")]
    TranscriptNotFound { mode: Mode, id: String },

    #[error("Failed to write conversation history: {0}")]
    HistoryWrite(#[source] std::io::Error),

    #[error("No saved conversations to resume for mode '{0}'")]
    NoHistoryAvailable(Mode),

    #[error("No input provided (argument and clipboard were both empty)")]
    EmptyInput,

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a `ChatProvider`. The session engine never retries;
/// these abort the current invocation and are reported verbatim.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit reached: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),
}
