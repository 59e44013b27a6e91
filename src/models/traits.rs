use async_trait::async_trait;

use super::types::ChatRequest;
use crate::utils::ProviderError;

/// Contract the session engine delegates the single blocking model call to.
/// Implementations own retry/backoff policy entirely; the engine treats
/// every error as fatal to the current invocation and commits nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Execute one chat request and return the assistant's reply text.
    async fn send(&self, request: ChatRequest) -> Result<String, ProviderError>;
}
