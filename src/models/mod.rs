pub mod openai;
pub mod traits;
pub mod types;

pub use openai::OpenAiProvider;
pub use traits::ChatProvider;
pub use types::{ChatRequest, WebSearchOptions};
