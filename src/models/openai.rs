use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::traits::ChatProvider;
use super::types::ChatRequest;
use crate::modes::ReasoningEffort;
use crate::session::transcript::Role;
use crate::utils::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 300;

/// `ChatProvider` backed by the OpenAI Responses API.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Create a provider from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::Auth("OPENAI_API_KEY environment variable not set".to_string()))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, base_url)
    }

    pub fn new(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn send(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let body = build_request_body(&request);
        let url = format!("{}/v1/responses", self.base_url);
        debug!(model = %request.model, turns = request.prior_turns.len(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, detail));
        }

        let reply: ResponsesReply = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("malformed response body: {}", e)))?;
        extract_output_text(&reply)
    }
}

/// Assemble the Responses API request body. Prior turns and the new user
/// content become input items with `input_text`/`output_text` parts; the
/// reasoning block is omitted at effort `none`, and sampling temperature is
/// only sent alongside it (reasoning models reject sampling parameters).
fn build_request_body(request: &ChatRequest) -> Value {
    let mut input = Vec::new();
    for turn in &request.prior_turns {
        let (role, part_type) = match turn.role {
            Role::User => ("user", "input_text"),
            Role::Assistant => ("assistant", "output_text"),
        };
        input.push(json!({
            "role": role,
            "content": [{"type": part_type, "text": turn.content}],
        }));
    }
    input.push(json!({
        "role": "user",
        "content": [{"type": "input_text", "text": request.user_content}],
    }));

    let mut body = json!({
        "model": request.model,
        "instructions": request.system_directive,
        "input": input,
        "max_output_tokens": request.max_tokens,
    });

    if request.reasoning_effort == ReasoningEffort::None {
        body["temperature"] = json!(request.temperature);
    } else {
        body["reasoning"] = json!({"effort": request.reasoning_effort.as_str()});
    }

    if let Some(search) = &request.web_search {
        let tool = match &search.allowed_domains {
            Some(domains) => json!({
                "type": "web_search",
                "filters": {"allowed_domains": domains},
            }),
            None => json!({"type": "web_search"}),
        };
        body["tools"] = json!([tool]);
        body["tool_choice"] = json!("auto");
    }

    body
}

fn map_error_status(status: StatusCode, detail: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
        _ => ProviderError::Api(format!("HTTP {}: {}", status, detail)),
    }
}

/// Concatenated text of all `output_text` parts of `message` output items.
fn extract_output_text(reply: &ResponsesReply) -> Result<String, ProviderError> {
    let mut text = String::new();
    for item in &reply.output {
        if item.kind != "message" {
            continue;
        }
        for part in item.content.as_deref().unwrap_or_default() {
            if part.kind == "output_text" {
                if let Some(t) = &part.text {
                    text.push_str(t);
                }
            }
        }
    }
    if text.is_empty() {
        return Err(ProviderError::Api("response contained no output text".to_string()));
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    content: Option<Vec<ContentPart>>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}
