use tripflow_core::{TripflowError, TripflowResult};

/// Connection settings for an OpenAI-compatible chat endpoint.
///
/// Works with OpenAI, OpenRouter, Groq, Ollama, and any other provider
/// that implements the chat completions API.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL without the `/v1/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier sent in the request body.
    pub model: String,
    /// Bearer token. May be empty for local providers.
    pub api_key: String,
    /// Completion token cap.
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            max_tokens: 1024,
        }
    }
}

/// Minimal OpenAI-compatible chat completions client.
pub struct ChatClient {
    config: ChatConfig,
    http: reqwest::Client,
}

impl ChatClient {
    /// Creates a client over the given endpoint settings.
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Sends one system + user exchange and returns the assistant text.
    pub async fn complete(&self, system: &str, user: &str) -> TripflowResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TripflowError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| TripflowError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(TripflowError::Http(format!(
                "chat API error {status}: {resp_body}"
            )));
        }

        parse_chat_response(&resp_body)
    }
}

/// Extracts the first choice's message content.
pub(crate) fn parse_chat_response(body: &serde_json::Value) -> TripflowResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TripflowError::Http(format!("malformed chat response: {body}")))
}
