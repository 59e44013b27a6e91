use crate::modes::ReasoningEffort;
use crate::session::transcript::Turn;

/// Web-search tool wiring for a request. The security mode restricts the
/// search to a whitelist of hostnames; plain websearch leaves it open.
#[derive(Debug, Clone, PartialEq)]
pub struct WebSearchOptions {
    pub allowed_domains: Option<Vec<String>>,
}

/// Everything a provider needs for one model call: the assembled system
/// directive, the full prior turn sequence (unbounded; any truncation or
/// windowing is the provider's concern), the new user content, and the
/// mode's resolved parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system_directive: String,
    pub prior_turns: Vec<Turn>,
    pub user_content: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub reasoning_effort: ReasoningEffort,
    pub web_search: Option<WebSearchOptions>,
}
